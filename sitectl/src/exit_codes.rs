//! Stable exit codes for `sitectl`.
//!
//! A failing external tool that reports its own exit code is passed through
//! unchanged instead of being mapped onto one of these.

/// Command completed successfully.
pub const OK: i32 = 0;
/// Usage error, invalid configuration, filesystem failure, or a tool that
/// died without an exit code.
pub const FAILURE: i32 = 1;
