// crates/hireflow-core/src/error.rs
// ============================================================================
// Module: HireFlow Error Taxonomy
// Description: The shared error enum every crate in the workspace maps its
//              failures onto at its public boundary.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A single six-variant taxonomy, matching the shape of
//! `decision-gate-core::interfaces`'s per-trait `thiserror` enums but
//! collapsed to one shared enum since every HireFlow component reports
//! into the same pipeline.

use thiserror::Error;

/// The error taxonomy shared across the recruiting pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A dependency (oracle, mailbox backend, SMTP relay) failed in a way
    /// that is expected to succeed on retry.
    #[error("transient external failure: {0}")]
    TransientExternal(String),

    /// A dependency failed in a way retrying will not fix.
    #[error("permanent external failure: {0}")]
    PermanentExternal(String),

    /// Caller-supplied input failed validation.
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested transition conflicts with the entity's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal invariant was violated; indicates a bug rather than bad
    /// input.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl PipelineError {
    /// Builds a [`PipelineError::TransientExternal`].
    pub fn transient_external(msg: impl Into<String>) -> Self {
        Self::TransientExternal(msg.into())
    }

    /// Builds a [`PipelineError::PermanentExternal`].
    pub fn permanent_external(msg: impl Into<String>) -> Self {
        Self::PermanentExternal(msg.into())
    }

    /// Builds a [`PipelineError::InputValidation`].
    pub fn input_validation(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }

    /// Builds a [`PipelineError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Builds a [`PipelineError::Conflict`].
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Builds a [`PipelineError::Invariant`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// True if retrying the same operation unchanged might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientExternal(_))
    }
}
