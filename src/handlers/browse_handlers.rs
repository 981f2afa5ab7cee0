//! Handlers for browsing and mutating a single bucket's namespace:
//! listing a path, creating folders, uploading, downloading and deleting.
//! Storage concerns are delegated to `NamespaceService`.

use crate::errors::AppError;
use crate::handlers::ErrorSummary;
use crate::models::node::{FileNode, FolderNode};
use crate::namespace::{NamespaceService, path};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderReq {
    #[serde(default)]
    pub path: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct BrowseResponse {
    pub bucket: String,
    pub path: String,
    pub segments: Vec<String>,
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
}

/// `GET /b/{bucket}?path=` — one level of the emulated tree.
pub async fn browse(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    Query(q): Query<PathQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    let prefix = path::join_path([q.path.as_str()]);
    let listing = service.browse(&bucket, &prefix).await?;
    Ok(Json(BrowseResponse {
        segments: path::split_path(&prefix),
        bucket,
        path: prefix,
        folders: listing.folders,
        files: listing.files,
    }))
}

/// `POST /b/{bucket}/folders` — create a folder by placeholder upload.
pub async fn create_folder(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    Json(req): Json<CreateFolderReq>,
) -> Result<impl IntoResponse, AppError> {
    let parent = path::join_path([req.path.as_str()]);
    let key = service.create_folder(&bucket, &parent, &req.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("Folder '{}' created.", req.name),
            "placeholder": key,
        })),
    ))
}

/// `POST /b/{bucket}/upload` — multipart upload into the current path.
/// Fields: `path` (optional parent prefix), `file` (the payload).
pub async fn upload_file(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut parent = String::new();
    let mut upload: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("path") => {
                parent = field
                    .text()
                    .await
                    .map_err(|err| AppError::bad_request(err.to_string()))?;
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::bad_request(err.to_string()))?;
                upload = Some((filename, data));
            }
            _ => {}
        }
    }

    let (filename, data) = upload
        .ok_or_else(|| AppError::bad_request("please choose a file to upload"))?;
    // Browsers may send a full client-side path; only the last segment
    // names the object.
    let filename = path::basename(&filename);
    let parent = path::join_path([parent.as_str()]);
    let size = data.len();
    let key = service.upload_file(&bucket, &parent, &filename, data).await?;
    tracing::info!("uploaded {}/{} ({} bytes)", bucket, key, size);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("Uploaded '{}'.", filename),
            "key": key,
            "size": size,
        })),
    ))
}

/// `GET /b/{bucket}/download?path=` — whole object as an attachment.
pub async fn download_file(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    Query(q): Query<PathQuery>,
) -> Result<Response, AppError> {
    let key = path::join_path([q.path.as_str()]);
    if key.is_empty() {
        return Err(AppError::bad_request("path is required"));
    }
    let data = service.download_file(&bucket, &key).await?;

    let disposition = format!("attachment; filename=\"{}\"", path::basename(&key));
    let mut response = Response::new(Body::from(data));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    Ok(response)
}

/// `DELETE /b/{bucket}/file?path=` — remove one object.
pub async fn delete_file(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    Query(q): Query<PathQuery>,
) -> Result<impl IntoResponse, AppError> {
    let key = path::join_path([q.path.as_str()]);
    if key.is_empty() {
        return Err(AppError::bad_request("path is required"));
    }
    service.delete_file(&bucket, &key).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Deleted '{}'.", key),
    })))
}

/// `DELETE /b/{bucket}/folder?path=` — recursive delete of a subtree.
/// The bucket root is rejected here; emptying a whole bucket is part of
/// bucket deletion, not folder deletion.
pub async fn delete_folder(
    State(service): State<NamespaceService>,
    Path(bucket): Path<String>,
    Query(q): Query<PathQuery>,
) -> Result<impl IntoResponse, AppError> {
    let prefix = path::join_path([q.path.as_str()]);
    if prefix.is_empty() {
        return Err(AppError::bad_request(
            "nothing to delete at bucket root; use file delete instead",
        ));
    }
    let outcome = service.delete_folder(&bucket, &prefix).await?;
    tracing::info!(
        "deleted {} objects under {}/{} ({} errors)",
        outcome.deleted,
        bucket,
        prefix,
        outcome.errors.len()
    );
    Ok(Json(serde_json::json!({
        "message": format!("Deleted {} objects under '{}'.", outcome.deleted, prefix),
        "deleted": outcome.deleted,
        "errors": ErrorSummary::from_errors(&outcome.errors),
    })))
}
