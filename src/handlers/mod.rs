//! HTTP handlers for the namespace API.

pub mod browse_handlers;
pub mod bucket_handlers;
pub mod health_handlers;
pub mod transfer_handlers;

use crate::namespace::{ItemError, preview};
use serde::Serialize;

/// How many per-object failures a response spells out; the rest are
/// represented by the count alone.
pub(crate) const ERROR_PREVIEW_LIMIT: usize = 3;

/// Bounded view of a failure list for API responses.
#[derive(Serialize)]
pub(crate) struct ErrorSummary {
    pub count: usize,
    pub preview: Vec<String>,
}

impl ErrorSummary {
    pub(crate) fn from_errors(errors: &[ItemError]) -> Self {
        Self {
            count: errors.len(),
            preview: preview(errors, ERROR_PREVIEW_LIMIT),
        }
    }
}
