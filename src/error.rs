use thiserror::Error;

/// Errors raised while decoding a CABAC-coded slice segment.
///
/// A `TruncatedBitstream`, `BinaryOverflow`, or `InvariantViolation` is
/// fatal for the slice currently being decoded; an `IgnorableWarning`
/// is not, and the caller may substitute a default and continue.
#[derive(Debug, Error)]
pub enum Error {
    /// The arithmetic engine ran past the end of the supplied buffer.
    #[error("truncated bitstream: needed {needed} byte(s), {available} available")]
    TruncatedBitstream { needed: usize, available: usize },
    /// A unary prefix (last-position, MVD, or coefficient remainder)
    /// ran to `CABAC_MAX_BIN` without terminating. Spec-illegal input.
    #[error("{syntax_element}: unary prefix exceeded CABAC_MAX_BIN ({limit})")]
    BinaryOverflow {
        syntax_element: &'static str,
        limit: u32,
    },
    /// An internal invariant was violated (e.g. a context state left
    /// the range [0, 125] after a transition).
    #[error("invariant violation: {detail}")]
    InvariantViolation { detail: String },
    /// Non-fatal: caller may log and substitute a default.
    #[error("ignorable: {detail}")]
    IgnorableWarning { detail: String },
}

/// A specialised `Result` type for decoding operations.
pub type Result<T> = ::std::result::Result<T, Error>;
