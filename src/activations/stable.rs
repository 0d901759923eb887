//! Numerically stable transforms used by the stochastic policies.
//!
//! - [`log_sum_exp`] shifts by the maximum before exponentiating, so large
//!   logits never overflow.
//! - [`softmax`] normalizes through `log_sum_exp` and renormalizes the result.
//! - [`softplus`] maps any real to a strictly positive value and is used to
//!   parameterize a Gaussian variance.

use ndarray::{Array1, ArrayView1};

/// `log(sum(exp(x)))` computed as `max(x) + log(sum(exp(x - max(x))))`.
///
/// Returns negative infinity for an empty slice or when every element is
/// negative infinity.
pub fn log_sum_exp(logits: ArrayView1<f32>) -> f32 {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    if !max_logit.is_finite() {
        return max_logit;
    }
    let sum_shifted: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    max_logit + sum_shifted.ln()
}

/// Softmax through the log-sum-exp normalizer.
pub fn softmax(logits: ArrayView1<f32>) -> Array1<f32> {
    let normalizer = log_sum_exp(logits);
    let mut probs = logits.mapv(|x| (x - normalizer).exp());
    let total = probs.sum();
    if total > 0.0 {
        probs /= total;
    }
    probs
}

/// `log(1 + exp(x))`, never zero for a real input. NaN stays NaN.
pub fn softplus(x: f32) -> f32 {
    if x.is_nan() {
        return x;
    }
    let value = x.max(0.0) + (-x.abs()).exp().ln_1p();
    value.max(f32::MIN_POSITIVE)
}
