//! Test data generators for synthetic genomic data.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

/// Creates a symmetric contact matrix with a strong diagonal.
///
/// Each cell is `100 / (1 + |row - col|) + (row * col) % 7`.
///
/// # Returns
///
/// A `Vec<f32>` of `n * n` values in row-major order.
///
/// # Example
///
/// ```
/// use test_utils::create_contact_matrix;
///
/// let m = create_contact_matrix(4);
/// assert_eq!(m.len(), 16);
/// assert_eq!(m[0], 100.0);
/// assert_eq!(m[1 * 4 + 2], m[2 * 4 + 1]);
/// ```
pub fn create_contact_matrix(n: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let distance = row.abs_diff(col) as f32;
            data.push(100.0 / (1.0 + distance) + ((row * col) % 7) as f32);
        }
    }
    data
}

/// Creates balancing weights near 1.0 for an `n`-bin matrix.
pub fn create_balancing_weights(n: usize) -> Vec<f32> {
    (0..n).map(|i| 1.0 / (1.0 + (i % 5) as f32 * 0.25)).collect()
}

/// Creates a dense signal of `len` bins with value `(i % 50) / 10`.
///
/// # Example
///
/// ```
/// use test_utils::create_signal;
///
/// let s = create_signal(100);
/// assert_eq!(s[0], 0.0);
/// assert_eq!(s[51], 0.1);
/// ```
pub fn create_signal(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i % 50) as f32 / 10.0).collect()
}

/// A synthetic gene-like interval.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticFeature {
    pub uid: String,
    pub name: String,
    pub importance: f64,
    pub start: u64,
    pub end: u64,
}

/// Creates `count` non-overlapping features spaced `spacing` apart, each
/// `length` long.
///
/// Importance cycles so that every tenth feature is the most important, and
/// names are `GENE{i}` with a `-AS` suffix on odd features.
pub fn create_features(count: usize, spacing: u64, length: u64) -> Vec<SyntheticFeature> {
    (0..count)
        .map(|i| {
            let start = i as u64 * spacing;
            let name = if i % 2 == 1 {
                format!("GENE{}-AS", i)
            } else {
                format!("GENE{}", i)
            };
            SyntheticFeature {
                uid: format!("feature-{:04}", i),
                name,
                importance: ((i % 10) + 1) as f64,
                start,
                end: start + length,
            }
        })
        .collect()
}

/// Renders chrom-sizes file contents.
pub fn chromsizes_text(chroms: &[(&str, u64)]) -> String {
    chroms
        .iter()
        .map(|(name, size)| format!("{}\t{}\n", name, size))
        .collect()
}
