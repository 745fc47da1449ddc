//! Test helpers shared by the tile server crates.
//!
//! - [`generators`]: deterministic contact matrices, balancing weights,
//!   signal tracks and gene-like features
//! - [`fixtures`]: user ids, toy assemblies and a temporary data directory
//! - `assert_approx_eq!` / `assert_rel_eq!` for quantized float checks
//!
//! Pull it in as a dev-dependency with a relative path:
//! `test-utils = { path = "../test-utils" }`.

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a relative error is within `tolerance` (useful after half
/// precision quantization).
#[macro_export]
macro_rules! assert_rel_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let scale = left.abs().max(right.abs()).max(1.0);
        $crate::assert_approx_eq!(left / scale, right / scale, $tolerance);
    }};
}
