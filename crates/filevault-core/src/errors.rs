use filevault_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that is used in log events, in the
/// upload response envelope and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Content storage
    /// I/O error writing or moving a content blob. Fatal to the enclosing write.
    StorageFailure,
    /// Declared content size differs from the bytes read from the stream
    ContentSizeMismatch,
    /// Producing or persisting a metadata snapshot failed. Never surfaced past
    /// the storage listener.
    MetadataWriteFailure,

    // Startup
    /// Non-absolute or unusable root path, unreadable configuration
    Configuration,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::StorageFailure => "ERR_STORAGE_FAILURE",
            ExErrorKind::ContentSizeMismatch => "ERR_CONTENT_SIZE_MISMATCH",
            ExErrorKind::MetadataWriteFailure => "ERR_METADATA_WRITE_FAILURE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus context for
/// debugging. Built with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (record id or external id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the record and blob lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    /// Configured storage root is not an absolute path
    #[error("Not absolute root path: {path}")]
    RelativeRootPath { path: String },

    /// Record not found in the database
    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: String },

    /// Blob not found in the data area
    #[error("Blob not found: {external_id}")]
    BlobNotFound { external_id: String },

    /// External id is not a well-formed blob identifier
    #[error("Invalid external id: {external_id}")]
    InvalidExternalId { external_id: String },

    /// Record declares content but carries no content handle
    #[error("Record {record_id} declares {content_size} bytes but has no content")]
    MissingContent {
        record_id: String,
        content_size: i64,
    },

    /// Record reached the persistence boundary with its payload still inline
    #[error("Record {record_id} still carries inline content at commit")]
    InlineContentAtCommit { record_id: String },

    /// External id was already assigned to the record
    #[error("Record {record_id} already has external id {external_id}")]
    ExternalIdAlreadySet {
        record_id: String,
        external_id: String,
    },

    /// Declared size differs from the number of bytes in the stream
    #[error("Content size mismatch: declared {expected} bytes, stream had {actual}")]
    ContentSizeMismatch { expected: u64, actual: u64 },

    /// Declared size is negative
    #[error("Invalid content size: {content_size}")]
    InvalidContentSize { content_size: i64 },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<VaultError> for ExError {
    fn from(err: VaultError) -> Self {
        let message = err.to_string();
        match err {
            VaultError::RelativeRootPath { path } => ExError::new(ExErrorKind::Configuration)
                .with_entity_id(path)
                .with_message(message),

            VaultError::RecordNotFound { record_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(record_id)
                .with_message(message),

            VaultError::BlobNotFound { external_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(external_id)
                .with_message(message),

            VaultError::InvalidExternalId { external_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_id(external_id)
                    .with_message(message)
            }

            VaultError::MissingContent { record_id, .. } => {
                ExError::new(ExErrorKind::StorageFailure)
                    .with_entity_id(record_id)
                    .with_message(message)
            }

            VaultError::InlineContentAtCommit { record_id } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(record_id)
                    .with_message(message)
            }

            VaultError::ExternalIdAlreadySet { record_id, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(record_id)
                    .with_message(message)
            }

            VaultError::ContentSizeMismatch { .. } => {
                ExError::new(ExErrorKind::ContentSizeMismatch).with_message(message)
            }

            VaultError::InvalidContentSize { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            VaultError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to VaultError
impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Serialization {
            message: err.to_string(),
        }
    }
}
