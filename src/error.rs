//! Error reporting.
//!
//! Recoverable misuse never panics and never returns `Result`: the offending call returns a
//! benign value, records an [`ErrorKind`] in the context's last-error flag, and leaves all other
//! state unchanged. [`RenderContext::get_last_error`][crate::context::RenderContext::get_last_error]
//! is the sole reporter and clears the flag on read.

use thiserror::Error;

/// Kinds of recoverable misuse captured by the per-context last-error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    /// No error has occurred since the flag was last read.
    #[default]
    None,
    /// An out-of-range handle, mismatched buffer size, non-power-of-two texture dimension or
    /// similar invalid parameter was detected.
    InvalidValue,
    /// The call is not valid in the current state, e.g. making a context current while another
    /// one already is on this thread.
    InvalidOperation,
    /// The operation is reserved by the API but not implemented.
    Unimplemented,
}

/// Fatal errors raised while constructing a render context.
///
/// Unlike the last-error flag, these indicate a context that never became usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The requested context dimensions were not positive.
    #[error("context dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}
