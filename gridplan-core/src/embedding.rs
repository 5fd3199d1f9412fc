//! Conversion between observations and flat tensors.
use anyhow::Result;
use ndarray::{Array1, ArrayView1};

/// Converts observations to flat `f32` tensors and back.
///
/// Planning code stores observations in [`StepRecord`](crate::StepRecord)
/// trajectories through an embedding, so the layout of an observation is
/// decided by the embedding and not by the environment.
pub trait ObservationEmbedding<O> {
    /// Length of the embedded tensor.
    fn obs_dim(&self) -> usize;

    /// Embeds an observation.
    fn obs_to_tensor(&self, obs: &O) -> Result<Array1<f32>>;

    /// Recovers the observation from its embedding.
    fn tensor_to_obs(&self, tensor: ArrayView1<f32>) -> Result<O>;
}
