//! Command handlers grouped by concern.

pub(crate) mod licences;
pub(crate) mod pipeline;
pub(crate) mod rules;

/// Collapse a repeated CLI flag into a filter value: an empty list means the
/// dimension is unconstrained and must not serialise.
pub(crate) fn none_if_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}
