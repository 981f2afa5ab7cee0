//! SqliteStore — the production `ObjectStore` backend: SQLite for object
//! metadata, local disk for payloads sharded beneath
//! `base_path/{bucket}/{shard}/{shard}/{key}`.
//!
//! Listing emulates the hosted-storage flavor the namespace layer was
//! built against: only immediate children of a prefix come back, and a
//! child that exists solely as a deeper key prefix is a synthetic entry
//! with no `id` and no `size`.

use crate::models::{bucket::Bucket, object::ObjectRecord};
use crate::store::{
    Entry, ListOptions, ObjectStore, StoreError, StoreResult, derive_entries,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const BUCKET_NAME_MAX_LEN: usize = 63;

#[derive(Clone)]
pub struct SqliteStore {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where object payloads are stored.
    pub base_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    fn ensure_key_safe(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Bucket names become directory names, so keep them to one clean
    /// segment. Fine-grained grammar checks belong to the caller.
    fn ensure_bucket_name_safe(&self, name: &str) -> StoreResult<()> {
        let invalid = |reason: &str| StoreError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if name.trim() != name {
            return Err(invalid("cannot begin or end with whitespace"));
        }
        if name.is_empty() || name.len() > BUCKET_NAME_MAX_LEN {
            return Err(invalid("must be between 1 and 63 characters"));
        }
        if name == "." || name == ".." {
            return Err(invalid("cannot be '.' or '..'"));
        }
        if name
            .bytes()
            .any(|b| b == b'/' || b == b'\\' || b.is_ascii_control())
        {
            return Err(invalid("cannot contain path separators or control characters"));
        }
        Ok(())
    }

    /// Compute the physical base folder path for a bucket.
    fn bucket_root(&self, bucket_name: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(bucket_name);
        path
    }

    /// Generate two-level shard identifiers for an object key.
    ///
    /// Uses MD5(bucket/key) and returns the first two bytes as lowercase
    /// hexadecimal strings (00–ff). Reduces file count per directory.
    fn object_shards(bucket_name: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket_name, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Construct a fully-qualified object payload path.
    fn object_path(&self, bucket_name: &str, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(bucket_name, key);
        let mut path = self.bucket_root(bucket_name);
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    /// Fetch bucket metadata, or BucketNotFound.
    async fn fetch_bucket(&self, bucket: &str) -> StoreResult<Bucket> {
        self.ensure_bucket_name_safe(bucket)?;
        sqlx::query_as::<_, Bucket>("SELECT id, name, created_at FROM buckets WHERE name = ?")
            .bind(bucket)
            .fetch_one(&*self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => StoreError::BucketNotFound(bucket.to_string()),
                other => StoreError::Sqlx(other),
            })
    }

    /// Fetch one object metadata record, or ObjectNotFound.
    async fn fetch_object(&self, bucket: &Bucket, key: &str) -> StoreResult<ObjectRecord> {
        sqlx::query_as::<_, ObjectRecord>(
            "SELECT id, bucket_id, key, size_bytes, etag, last_modified
             FROM objects WHERE key = ? AND bucket_id = ?",
        )
        .bind(key)
        .bind(bucket.id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::ObjectNotFound {
                bucket: bucket.name.clone(),
                key: key.to_string(),
            },
            other => StoreError::Sqlx(other),
        })
    }

    /// Recursively remove empty directories up to the bucket root.
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }

    async fn remove_one(&self, bucket_rec: &Bucket, key: &str) -> StoreResult<()> {
        self.ensure_key_safe(key)?;
        let result = sqlx::query("DELETE FROM objects WHERE key = ? AND bucket_id = ?")
            .bind(key)
            .bind(bucket_rec.id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ObjectNotFound {
                bucket: bucket_rec.name.clone(),
                key: key.to_string(),
            });
        }

        let file_path = self.object_path(&bucket_rec.name, key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed physical file {}", file_path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("file {} already missing", file_path.display());
            }
            Err(err) => return Err(StoreError::Io(err)),
        }

        if let Some(parent) = file_path.parent() {
            let bucket_root = self.bucket_root(&bucket_rec.name);
            self.prune_empty_dirs(parent, &bucket_root).await;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for SqliteStore {
    async fn list(&self, bucket: &str, prefix: &str, opts: ListOptions) -> StoreResult<Vec<Entry>> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        let trimmed = prefix.trim_matches('/');

        let rows: Vec<ObjectRecord> = if trimmed.is_empty() {
            sqlx::query_as::<_, ObjectRecord>(
                "SELECT id, bucket_id, key, size_bytes, etag, last_modified
                 FROM objects WHERE bucket_id = ? ORDER BY key ASC",
            )
            .bind(bucket_rec.id)
            .fetch_all(&*self.db)
            .await?
        } else {
            sqlx::query_as::<_, ObjectRecord>(
                "SELECT id, bucket_id, key, size_bytes, etag, last_modified
                 FROM objects WHERE bucket_id = ? AND key LIKE ? ESCAPE '\\'
                 ORDER BY key ASC",
            )
            .bind(bucket_rec.id)
            .bind(format!("{}/%", like_escape(trimmed)))
            .fetch_all(&*self.db)
            .await?
        };

        Ok(derive_entries(
            trimmed,
            rows.into_iter()
                .map(|r| (r.key, r.id, r.size_bytes, r.last_modified)),
            opts,
        ))
    }

    /// Write the payload through a temp file, fsync, rename into place,
    /// then upsert the metadata row (overwrite semantics).
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> StoreResult<()> {
        self.ensure_key_safe(key)?;
        let bucket_rec = self.fetch_bucket(bucket).await?;

        let file_path = self.object_path(&bucket_rec.name, key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StoreError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let mut file = File::create(&tmp_path).await?;
        let write_result = async {
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        let etag = format!("{:x}", md5::compute(&data));
        let insert_result = sqlx::query(
            "INSERT INTO objects (id, bucket_id, key, size_bytes, etag, last_modified)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(bucket_id, key) DO UPDATE SET
                 size_bytes = excluded.size_bytes,
                 etag = excluded.etag,
                 last_modified = excluded.last_modified",
        )
        .bind(Uuid::new_v4())
        .bind(bucket_rec.id)
        .bind(key)
        .bind(data.len() as i64)
        .bind(&etag)
        .bind(Utc::now())
        .execute(&*self.db)
        .await;

        match insert_result {
            Ok(_) => Ok(()),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(StoreError::Sqlx(err))
            }
        }
    }

    async fn download(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.ensure_key_safe(key)?;
        let bucket_rec = self.fetch_bucket(bucket).await?;
        let object = self.fetch_object(&bucket_rec, key).await?;

        let file_path = self.object_path(&bucket_rec.name, &object.key);
        match fs::read(&file_path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        for key in keys {
            self.remove_one(&bucket_rec, key).await?;
        }
        Ok(())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM buckets ORDER BY name ASC")
                .fetch_all(&*self.db)
                .await?;
        Ok(names)
    }

    async fn create_bucket(&self, name: &str) -> StoreResult<()> {
        self.ensure_bucket_name_safe(name)?;
        let bucket_root = self.bucket_root(name);
        fs::create_dir_all(&bucket_root).await?;

        match sqlx::query("INSERT INTO buckets (id, name, created_at) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(Utc::now())
            .execute(&*self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::BucketAlreadyExists(name.to_string()))
            }
            Err(err) => Err(StoreError::Sqlx(err)),
        }
    }

    async fn delete_bucket(&self, name: &str) -> StoreResult<()> {
        self.ensure_bucket_name_safe(name)?;
        let result = sqlx::query("DELETE FROM buckets WHERE name = ?")
            .bind(name)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::BucketNotFound(name.to_string()));
        }

        let bucket_path = self.bucket_root(name);
        if let Err(err) = fs::remove_dir_all(&bucket_path).await {
            if err.kind() != io::ErrorKind::NotFound {
                debug!(
                    "failed to remove bucket directory {} after delete: {}",
                    bucket_path.display(),
                    err
                );
            }
        }
        Ok(())
    }
}

/// Return true if a SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Escape `%`, `_` and `\` so key characters are matched literally in a
/// LIKE pattern (the segment grammar allows `_`).
fn like_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
