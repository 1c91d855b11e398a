use conform_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Covers the failures of the layer *around* the comparator: decoding the
/// invocation envelope, reaching collaborators, persisting baselines.
/// Comparison outcomes are never errors; they are reported through
/// [`crate::compare::Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidEvent,
    InvalidLocator,
    MissingField,

    // Collaborators
    NotFound,
    Io,
    Serialization,
    ExternalService,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidEvent => "ERR_INVALID_EVENT",
            ExErrorKind::InvalidLocator => "ERR_INVALID_LOCATOR",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a stable classification plus the resource context needed to
/// correlate a failed evaluation in the logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    resource_type: Option<String>,
    resource_id: Option<String>,
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
            resource_type: None,
            resource_id: None,
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

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

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

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

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
        if let Some(resource_type) = &self.resource_type {
            write!(f, " (resource_type: {})", resource_type)?;
        }
        if let Some(resource_id) = &self.resource_id {
            write!(f, " (resource_id: {})", resource_id)?;
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
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for rule evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConformError {
    // ===== Envelope Errors =====
    /// The invocation envelope or one of its embedded documents is not valid
    #[error("Invalid event: {reason}")]
    InvalidEvent { reason: String },

    /// Neither a configuration item nor a configuration item summary was delivered
    #[error("Event carries neither configurationItem nor configurationItemSummary")]
    MissingConfigurationItem,

    /// A field that must hold an object holds something else
    #[error("Field {field} is not an object: {found}")]
    FieldNotObject { field: String, found: String },

    // ===== Baseline Errors =====
    /// Baseline locator is malformed
    #[error("Invalid baseline locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// No baseline document stored under the key
    #[error("Baseline not found: container={container} key={key}")]
    BaselineNotFound { container: String, key: String },

    // ===== Collaborator Errors =====
    /// Configuration history holds no item for the resource
    #[error("No configuration history for {resource_type} {resource_id}")]
    HistoryNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// The compliance-reporting collaborator refused the evaluation
    #[error("Evaluation report rejected: {reason}")]
    ReportRejected { reason: String },

    /// The notification collaborator refused the message
    #[error("Notification to {topic} rejected: {reason}")]
    PublishRejected { topic: String, reason: String },
}

/// Conversion from ConformError to the canonical ExError
impl From<ConformError> for ExError {
    fn from(err: ConformError) -> Self {
        let message = err.to_string();
        match err {
            ConformError::InvalidEvent { .. } => {
                ExError::new(ExErrorKind::InvalidEvent).with_message(message)
            }

            ConformError::MissingConfigurationItem => ExError::new(ExErrorKind::MissingField)
                .with_op("parse_invoking_event")
                .with_message(message),

            ConformError::FieldNotObject { .. } => ExError::new(ExErrorKind::InvalidEvent)
                .with_op("parse_invoking_event")
                .with_message(message),

            ConformError::InvalidLocator { .. } => ExError::new(ExErrorKind::InvalidLocator)
                .with_op("parse_locator")
                .with_message(message),

            ConformError::BaselineNotFound { .. } => ExError::new(ExErrorKind::NotFound)
                .with_op("fetch_baseline")
                .with_message(message),

            ConformError::HistoryNotFound {
                resource_type,
                resource_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_op("fetch_history")
                .with_resource_type(resource_type)
                .with_resource_id(resource_id)
                .with_message(message),

            ConformError::ReportRejected { .. } => ExError::new(ExErrorKind::ExternalService)
                .with_op("put_evaluation")
                .with_message(message),

            ConformError::PublishRejected { .. } => ExError::new(ExErrorKind::ExternalService)
                .with_op("publish_notification")
                .with_message(message),
        }
    }
}
