use crate::core::platform::Branch;
use thiserror::Error;

pub type UpdateResult<T> = Result<T, UpdateError>;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A client or upstream version string that is not `major.minor[.build[.revision]]`.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("{0} does not have a release source")]
    UnsupportedBranch(Branch),

    #[error("Unknown source {0}")]
    UnknownSource(String),

    #[error("Latest update not found")]
    NoUpdateFound,

    #[error("Latest update file not found")]
    NoArtifactFound,

    /// Artifact transfer failed; aborts the current ingestion pass.
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Upstream API error: {0}")]
    UpstreamApi(String),

    /// A uniqueness rule the store should never see violated was violated anyway.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}
