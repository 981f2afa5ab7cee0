//! Bucket lifecycle handlers. Thin pass-throughs to the store, except
//! that bucket deletion empties the namespace first via the recursive
//! deleter (the store only drops empty buckets cleanly).

use crate::errors::AppError;
use crate::handlers::ErrorSummary;
use crate::namespace::NamespaceService;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateBucketReq {
    pub name: String,
}

/// `GET /buckets`
pub async fn list_buckets(
    State(service): State<NamespaceService>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(service.list_buckets().await?))
}

/// `POST /buckets`
pub async fn create_bucket(
    State(service): State<NamespaceService>,
    Json(req): Json<CreateBucketReq>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim();
    service.create_bucket(name).await?;
    tracing::info!("created bucket {}", name);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("Bucket '{}' created.", name),
        })),
    ))
}

/// `DELETE /buckets/{bucket}` — empty the bucket, then drop it. Objects
/// that could not be removed are reported; the bucket itself is only
/// dropped when the store accepts the deletion.
pub async fn delete_bucket(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = service.delete_bucket(&bucket).await?;
    tracing::info!(
        "deleted bucket {} ({} objects removed, {} errors)",
        bucket,
        outcome.deleted,
        outcome.errors.len()
    );
    Ok(Json(serde_json::json!({
        "message": format!("Bucket '{}' deleted.", bucket),
        "deleted": outcome.deleted,
        "errors": ErrorSummary::from_errors(&outcome.errors),
    })))
}
