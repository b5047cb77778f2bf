//! Error classification shared by every service error type.
//!
//! Degraded paths log `error_code()` as a structured field so failures are
//! grepable even though none of them reach the user.

/// Grepable error code and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
