//! Parameter vectors: the thing an [`crate::Animation`] actually tweens
//! (— "a named vector of `f64` parameters, not a single
//! scalar, so one animation can drive position *and* scale *and* opacity
//! together").

use indexmap::IndexMap;

/// A named bundle of `f64` values interpolated together by one
/// [`crate::Animation`]. Order-preserving so `snapshot`-style consumers
/// (tests, devtools) see a stable key order.
pub type ParamVector = IndexMap<String, f64>;

/// Linearly interpolate every key present in `to`. A key missing from
/// `from` is treated as already at its `to` value (no animation for that
/// key) rather than an error — lets callers add a new parameter mid-tween
/// without special-casing it.
pub fn lerp_params(from: &ParamVector, to: &ParamVector, t: f64) -> ParamVector {
    to.iter()
        .map(|(key, &to_value)| {
            let value = match from.get(key) {
                Some(&from_value) => from_value + (to_value - from_value) * t,
                None => to_value,
            };
            (key.clone(), value)
        })
        .collect()
}
