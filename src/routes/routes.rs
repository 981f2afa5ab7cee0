//! Defines routes for the namespace API.
//!
//! ## Structure
//! - **Bucket-level endpoints**
//!   - `GET    /buckets` — list buckets
//!   - `POST   /buckets` — create bucket
//!   - `DELETE /buckets/{bucket}` — empty and delete bucket
//!
//! - **Namespace endpoints (per bucket)**
//!   - `GET    /b/{bucket}?path=` — browse one folder level
//!   - `POST   /b/{bucket}/folders` — create folder (placeholder upload)
//!   - `POST   /b/{bucket}/upload` — multipart file upload
//!   - `GET    /b/{bucket}/download?path=` — download file
//!   - `DELETE /b/{bucket}/file?path=` — delete one file
//!   - `DELETE /b/{bucket}/folder?path=` — recursive folder delete
//!
//! - **Cross-bucket**
//!   - `POST   /transfer` — copy/move a file or folder

use crate::{
    handlers::{
        browse_handlers::{
            browse, create_folder, delete_file, delete_folder, download_file, upload_file,
        },
        bucket_handlers::{create_bucket, delete_bucket, list_buckets},
        health_handlers::{healthz, readyz},
        transfer_handlers::transfer,
    },
    namespace::NamespaceService,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for the whole API.
///
/// The router carries shared state (`NamespaceService`) to all handlers.
pub fn routes() -> Router<NamespaceService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Bucket-level routes
        .route("/buckets", get(list_buckets).post(create_bucket))
        .route("/buckets/{bucket}", delete(delete_bucket))
        // Namespace routes
        .route("/b/{bucket}", get(browse))
        .route("/b/{bucket}/folders", post(create_folder))
        .route("/b/{bucket}/upload", post(upload_file))
        .route("/b/{bucket}/download", get(download_file))
        .route("/b/{bucket}/file", delete(delete_file))
        .route("/b/{bucket}/folder", delete(delete_folder))
        // Cross-bucket transfer
        .route("/transfer", post(transfer))
}
