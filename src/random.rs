//! Sampling helpers that tolerate degenerate ranges.

use rand::Rng;

/// Uniform sample in `[lo, hi)`; collapses to `lo` when the span is empty or invalid
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return if lo.is_finite() { lo } else { 0.0 };
    }
    rng.gen_range(lo..hi)
}

/// Uniform sample in `[0, extent)` for a positive extent
pub fn within<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    uniform(rng, (0.0, extent))
}
