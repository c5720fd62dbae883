//! Scene error taxonomy.
//!
//! Every variant except [`SceneError::ImageLoad`] is a protocol violation:
//! the engine sent something the scene cannot honor. The dispatcher never
//! lets these escape; it logs them and forces a stop.

/// Error raised while applying engine input to the scene.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// `defineObject` reused an identifier that is still registered.
    #[error("Duplicated object identifier given for {0}")]
    DuplicateIdentifier(String),
    /// `defineObject` carried a descriptor no object can be built from.
    #[error("Invalid object declaration given for {id}: {reason}")]
    InvalidDeclaration { id: String, reason: String },
    /// `updateObject` referenced an identifier that is not registered.
    #[error("Invalid object updating for {0}")]
    UnknownUpdateTarget(String),
    /// `animateObject` referenced an identifier that is not registered.
    #[error("Invalid object animate for {0}")]
    UnknownAnimateTarget(String),
    /// A recognized property carried a value of the wrong shape.
    #[error("Invalid value for property {property} of {id}")]
    InvalidProperty { id: String, property: String },
    /// The command payload itself was malformed.
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
    /// An image resource failed to load.
    #[error("Unable to load image {id} from {url}")]
    ImageLoad { id: String, url: String },
}

impl SceneError {
    /// Grepable error code, stable across message wording changes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateIdentifier(_) => "E_DUPLICATE_IDENTIFIER",
            Self::InvalidDeclaration { .. } => "E_INVALID_DECLARATION",
            Self::UnknownUpdateTarget(_) | Self::UnknownAnimateTarget(_) => "E_UNKNOWN_OBJECT",
            Self::InvalidProperty { .. } => "E_INVALID_PROPERTY",
            Self::MalformedCommand(_) => "E_MALFORMED_COMMAND",
            Self::ImageLoad { .. } => "E_IMAGE_LOAD",
        }
    }

    /// Whether this error is an engine protocol violation (as opposed to a
    /// resource failure).
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(self, Self::ImageLoad { .. })
    }
}
