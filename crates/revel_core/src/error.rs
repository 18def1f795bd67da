//! Error taxonomy
//!
//! Configuration mistakes fail fast at registration. Environment
//! transience (missing target, unsized scroller) is not an error at all:
//! the engine defers those bindings instead of rejecting them.

use thiserror::Error;

/// Errors surfaced by registration-time validation
#[derive(Debug, Error)]
pub enum Error {
    /// A condition predicate string could not be parsed
    #[error("malformed condition predicate `{input}`: {reason}")]
    MalformedPredicate { input: String, reason: String },

    /// A trigger resolved with its start offset past its end offset
    #[error("degenerate trigger range: start offset {start} exceeds end offset {end}")]
    DegenerateRange { start: f32, end: f32 },

    /// A scrub coefficient must be non-negative
    #[error("invalid scrub coefficient {0} (must be >= 0)")]
    InvalidScrub(f32),

    /// A segment declared under an alignment group started before the
    /// previous segment in that group
    #[error("segment start regresses within alignment group `{align}`")]
    SegmentOrder { align: String },

    /// A second pin tried to activate on a scroller that already has one
    #[error("scroller already has an active pin region")]
    PinContention,

    /// An anchor name was not registered with the engine
    #[error("unknown anchor `{0}`")]
    UnknownAnchor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DegenerateRange {
            start: 900.0,
            end: 100.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("900"));
        assert!(msg.contains("100"));
    }
}
