//! Categorical distribution over actions.
use rand::Rng;

/// A categorical distribution over `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    probs: Vec<f32>,
}

impl Categorical {
    /// Normalises non-negative weights into a distribution.
    ///
    /// Falls back to the uniform distribution when the weights do not sum to
    /// a positive finite value.
    pub fn new(weights: Vec<f32>) -> Self {
        let sum: f32 = weights.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Self::uniform(weights.len());
        }
        Self {
            probs: weights.into_iter().map(|w| w / sum).collect(),
        }
    }

    /// The uniform distribution.
    pub fn uniform(n: usize) -> Self {
        Self {
            probs: vec![1.0 / n as f32; n],
        }
    }

    /// `softmax(logits)`. Entries of `-inf` get probability 0.
    pub fn from_logits(logits: &[f32]) -> Self {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max.is_finite() {
            return Self::uniform(logits.len());
        }
        Self::new(logits.iter().map(|l| (l - max).exp()).collect())
    }

    /// Uniform over the entries equal to the maximum. `None` entries are
    /// never chosen.
    pub fn uniform_over_max(scores: &[Option<f32>]) -> Self {
        let max = scores
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        Self::new(
            scores
                .iter()
                .map(|s| match s {
                    Some(s) if *s == max => 1.0,
                    _ => 0.0,
                })
                .collect(),
        )
    }

    /// One-hot on the first maximum. `None` entries are never chosen.
    pub fn argmax(scores: &[Option<f32>]) -> Self {
        let mut best: Option<(usize, f32)> = None;
        for (i, s) in scores.iter().enumerate() {
            if let Some(s) = *s {
                if best.map_or(true, |(_, b)| s > b) {
                    best = Some((i, s));
                }
            }
        }
        match best {
            None => Self::uniform(scores.len()),
            Some((i, _)) => {
                let mut probs = vec![0.0; scores.len()];
                probs[i] = 1.0;
                Self { probs }
            }
        }
    }

    /// Probabilities of the outcomes.
    pub fn probs(&self) -> &[f32] {
        &self.probs
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Returns `true` if there are no outcomes.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Entropy in nats.
    pub fn entropy(&self) -> f32 {
        -self
            .probs
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|p| p * p.ln())
            .sum::<f32>()
    }

    /// Draws an outcome.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        let u: f32 = rng.gen();
        let mut acc = 0.0;
        let mut last = 0;
        for (i, &p) in self.probs.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            acc += p;
            last = i;
            if u < acc {
                return i;
            }
        }
        // Rounding left the cumulative sum short of 1.
        last
    }
}
