//! Error type shared by every fallible floorplan operation.
//!
//! No error is fatal: each one means the mutation was refused and the prior
//! state is intact.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FloorplanError {
    /// A size, capacity, or name constraint was violated.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The operation would break a structural invariant (e.g. zero floorplans).
    #[error("invariant violated: {0}")]
    Invariant(String),
    /// A drop payload was missing or had unusable fields.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("element not found: {0}")]
    ElementNotFound(Uuid),
    #[error("floorplan not found: {0}")]
    FloorplanNotFound(Uuid),
}

impl FloorplanError {
    /// Stable machine-readable code for the host's notification layer.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Invariant(_) => "E_INVARIANT",
            Self::MalformedPayload(_) => "E_MALFORMED_PAYLOAD",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::FloorplanNotFound(_) => "E_FLOORPLAN_NOT_FOUND",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
