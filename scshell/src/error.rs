//! Shell-layer errors.
//!
//! Unlike build/config/solve errors, these never abort the whole run: a
//! [`ShellError::Parse`] is reported to standard error and the shell moves on
//! to the next line; only [`ShellError::ExpectMismatch`] changes the process
//! exit code.

use thiserror::Error;

/// A malformed or unrecognized line, or a structured failure surfaced while
/// executing one.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A line could not be parsed or its underlying call failed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based input line number.
        line: usize,
        /// Human-readable description of what went wrong.
        reason: String,
    },
    /// An `expect <N>` command saw a different number of accumulated matches.
    #[error("expect mismatch: expected {expected}, got {actual}")]
    ExpectMismatch {
        /// The count named by the `expect` command.
        expected: usize,
        /// The number of matches actually accumulated since the last `expect`.
        actual: usize,
    },
}
