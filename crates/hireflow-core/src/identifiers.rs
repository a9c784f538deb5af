// crates/hireflow-core/src/identifiers.rs
// ============================================================================
// Module: HireFlow Identifiers
// Description: Canonical opaque identifiers for recruiting-pipeline entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire
//          forms, matching the auto-incrementing primary keys of the store.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Numeric identifiers wrap `NonZeroU64` and enforce the 1-based,
//! non-zero invariant at construction. [`LinkToken`] is the one
//! non-numeric identifier: an opaque, unguessable 128-bit value handed to
//! candidates rather than an ordinal.

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

macro_rules! numeric_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a new identifier from a non-zero value.
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            /// Creates an identifier from a raw value (`None` if zero).
            #[must_use]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }

            /// Returns the identifier as `i64`, the form `SQLite` stores
            /// `INTEGER PRIMARY KEY` columns as. Saturates at `i64::MAX`
            /// rather than truncating; no identifier in this system is
            /// expected to approach that value.
            #[must_use]
            pub fn as_i64(self) -> i64 {
                i64::try_from(self.0.get()).unwrap_or(i64::MAX)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = crate::error::PipelineError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                u64::try_from(value)
                    .ok()
                    .and_then(Self::from_raw)
                    .ok_or_else(|| {
                        crate::error::PipelineError::invariant(format!(
                            "identifier must be a positive integer, got {value}"
                        ))
                    })
            }
        }
    };
}

numeric_id!(JobId, "Identifier for a [`crate::model::Job`].");
numeric_id!(EmailId, "Identifier for an [`crate::model::Email`].");
numeric_id!(CandidateId, "Identifier for a [`crate::model::Candidate`].");
numeric_id!(
    ApplicationId,
    "Identifier for an [`crate::model::Application`]."
);
numeric_id!(EventId, "Identifier for an [`crate::model::Event`].");
numeric_id!(
    InterviewLinkId,
    "Identifier for an [`crate::model::InterviewLink`] row."
);

/// Opaque, unguessable token handed to a candidate for the interview-link
/// flow.
///
/// # Invariants
/// - 128 bits of entropy, rendered as 32 lowercase hex characters on the
///   wire and in the store.
/// - Never parsed for meaning; only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkToken([u8; 16]);

impl LinkToken {
    /// Wraps a raw 16-byte value as a token.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the token's raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parses a 32-character lowercase hex string into a token.
    ///
    /// # Errors
    /// Returns [`crate::error::PipelineError::InputValidation`] if `s` is
    /// not exactly 32 hex characters.
    pub fn parse(s: &str) -> Result<Self, crate::error::PipelineError> {
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(crate::error::PipelineError::input_validation(format!(
                "invalid interview link token: {s}"
            )));
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            let hi = hex_val(s.as_bytes()[i * 2]);
            let lo = hex_val(s.as_bytes()[i * 2 + 1]);
            *chunk = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

const fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_rejects_zero() {
        assert!(JobId::from_raw(0).is_none());
        assert_eq!(JobId::from_raw(7).map(JobId::get), Some(7));
    }

    #[test]
    fn link_token_round_trips_through_display_and_parse() {
        let token = LinkToken::from_bytes([0xab; 16]);
        let rendered = token.to_string();
        assert_eq!(rendered.len(), 32);
        let parsed = LinkToken::parse(&rendered).expect("valid hex token");
        assert_eq!(parsed, token);
    }

    #[test]
    fn link_token_rejects_wrong_length() {
        assert!(LinkToken::parse("abcd").is_err());
    }
}
