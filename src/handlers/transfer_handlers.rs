//! Copy/move handler. The orchestrator does the work; this layer turns
//! its report into a user-facing message with bounded error previews.

use crate::errors::AppError;
use crate::handlers::ErrorSummary;
use crate::namespace::NamespaceService;
use crate::namespace::transfer::{TransferOp, TransferRequest};
use axum::{Json, extract::State};
use serde_json::json;

/// `POST /transfer`
pub async fn transfer(
    State(service): State<NamespaceService>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = service.transfer(&req).await?;

    let verb = match report.op {
        TransferOp::Copy => "Copied",
        TransferOp::Move => "Moved",
    };
    let message = if report.copy_errors.is_empty() {
        format!(
            "{} '{}' to '{}/{}' ({} objects).",
            verb, req.src_path, report.dst_bucket, report.destination, report.copied
        )
    } else {
        format!(
            "{} {} objects to '{}/{}' with {} errors.",
            verb,
            report.copied,
            report.dst_bucket,
            report.destination,
            report.copy_errors.len()
        )
    };
    tracing::info!("{}", message);

    let cleanup = report.cleanup.as_ref().map(|outcome| {
        json!({
            "deleted": outcome.deleted,
            "errors": ErrorSummary::from_errors(&outcome.errors),
        })
    });

    Ok(Json(json!({
        "message": message,
        "op": report.op,
        "destination": report.destination,
        "dst_bucket": report.dst_bucket,
        "copied": report.copied,
        "cancelled": report.cancelled,
        "copy_errors": ErrorSummary::from_errors(&report.copy_errors),
        "cleanup": cleanup,
    })))
}
