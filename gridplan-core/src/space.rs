//! Discrete space.
use crate::error::GridplanError;
use ndarray::{Array1, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A space of `n` integers starting from `start`, i.e., `{start, ..., start + n - 1}`.
///
/// Both actions and observations of the toy-text environments live in
/// discrete spaces. Elements are exchanged with tensors as one-hot vectors,
/// see [`Discrete::one_hot()`] and [`Discrete::index_of()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrete {
    n: usize,
    start: usize,
}

impl Discrete {
    /// Constructs a space of `n` elements starting from 0.
    pub fn new(n: usize) -> Self {
        Self { n, start: 0 }
    }

    /// Constructs a space of `n` elements starting from `start`.
    pub fn with_start(n: usize, start: usize) -> Self {
        Self { n, start }
    }

    /// The number of elements.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The smallest element.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns `true` if `x` is an element of the space.
    pub fn contains(&self, x: usize) -> bool {
        x >= self.start && x < self.start + self.n
    }

    /// Samples an element uniformly.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        self.start + rng.gen_range(0..self.n)
    }

    /// Samples an element uniformly among those with `mask[i] == true`.
    ///
    /// Returns `start` if no element is allowed.
    pub fn sample_masked(&self, mask: &[bool], rng: &mut impl Rng) -> usize {
        let valid = mask
            .iter()
            .take(self.n)
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
            .collect::<Vec<_>>();

        if valid.is_empty() {
            self.start
        } else {
            self.start + valid[rng.gen_range(0..valid.len())]
        }
    }

    /// Encodes an element as a one-hot vector of length `n`.
    pub fn one_hot(&self, x: usize) -> Result<Array1<f32>, GridplanError> {
        if !self.contains(x) {
            return Err(GridplanError::IndexOutOfRange {
                index: x,
                start: self.start,
                end: self.start + self.n,
            });
        }
        let mut v = Array1::zeros(self.n);
        v[x - self.start] = 1.0;
        Ok(v)
    }

    /// Decodes a one-hot vector into an element of the space.
    ///
    /// The vector must have length `n`, contain exactly one `1` and zeros elsewhere.
    pub fn index_of(&self, v: ArrayView1<f32>) -> Result<usize, GridplanError> {
        if v.len() != self.n {
            return Err(GridplanError::InvalidOneHot(format!(
                "length {} differs from {}",
                v.len(),
                self.n
            )));
        }

        let mut hot = None;
        for (i, &e) in v.iter().enumerate() {
            if e == 1.0 {
                if hot.is_some() {
                    return Err(GridplanError::InvalidOneHot(
                        "more than one hot element".to_string(),
                    ));
                }
                hot = Some(i);
            } else if e != 0.0 {
                return Err(GridplanError::InvalidOneHot(format!(
                    "element {} is {}",
                    i, e
                )));
            }
        }

        match hot {
            Some(i) => Ok(self.start + i),
            None => Err(GridplanError::InvalidOneHot("no hot element".to_string())),
        }
    }
}
