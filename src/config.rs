use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    pub database_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Filesystem-style API over a flat object store")]
pub struct Args {
    /// Host to bind to (overrides BUCKETFS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKETFS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where object payloads are stored (overrides BUCKETFS_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Database URL (overrides BUCKETFS_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("BUCKETFS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKETFS_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKETFS_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKETFS_PORT"),
        };
        let env_storage = env::var("BUCKETFS_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/objects"));
        let env_db = env::var("BUCKETFS_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/bucketfs.db".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_host_and_port() {
        let cfg = AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            storage_dir: PathBuf::from("/tmp/objects"),
            database_url: "sqlite://./meta.db".into(),
        };
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn cli_flags_parse() {
        let args =
            Args::try_parse_from(["bucketfs", "--migrate", "--port", "9000"]).unwrap();
        assert!(args.migrate);
        assert_eq!(args.port, Some(9000));
        assert!(args.storage_dir.is_none());
    }
}
