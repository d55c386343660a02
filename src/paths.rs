//! Path utilities for the on-demand import plugin
//!
//! Module specifiers are built from plain string segments, never from the
//! filesystem, so the join rule stays the same on every host.

/// Joins import path segments with `/`, dropping empty segments
///
/// No other normalization is applied: `./`, `..` and duplicate separators
/// inside a segment are kept as written.
///
/// # Arguments
///
/// * `segments` - The path segments to join
///
/// # Returns
///
/// The joined path, or an empty string if every segment is empty
pub fn path_join<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
