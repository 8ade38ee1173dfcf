//! Error type shared by holder implementations.
//!
//! The public `ContentHolder` contract never returns these: expected failures
//! (missing entries, permission denial, name collisions) collapse into `None`
//! or an empty listing at the trait boundary. Internal helpers return
//! `Result<_, HolderError>` so the cause can be logged before it is dropped.

/// Error type for holder operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderError {
    /// Path not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// Path already exists
    AlreadyExists(String),
    /// Name is empty, `.`/`..`, or contains a separator
    InvalidName(String),
    /// Operation not supported by this holder type
    NotSupported,
    /// The archive library rejected the archive or an entry
    Archive(String),
    /// Generic I/O error
    Io(String),
}

impl std::fmt::Display for HolderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Path not found: {}", path),
            Self::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            Self::AlreadyExists(path) => write!(f, "Already exists: {}", path),
            Self::InvalidName(name) => write!(f, "Invalid name: {:?}", name),
            Self::NotSupported => write!(f, "Operation not supported"),
            Self::Archive(msg) => write!(f, "Archive error: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for HolderError {}

impl From<std::io::Error> for HolderError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for HolderError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::from(io),
            zip::result::ZipError::FileNotFound => Self::NotFound("entry not found in archive".to_string()),
            other => Self::Archive(other.to_string()),
        }
    }
}

/// Checks that `name` can be used as a single path segment.
///
/// Rejects empty names, `.` and `..`, and anything containing `/`, `\` or NUL.
pub fn validate_name(name: &str) -> Result<(), HolderError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(HolderError::InvalidName(name.to_string()));
    }
    Ok(())
}
