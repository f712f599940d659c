//! Package installation: mirror registry and retrying installer
//!
//! The registry is pure state plus one write operation (rewriting the
//! package manager's endpoint file); the installer wraps the external
//! package manager CLI with a bounded retry loop that escalates through
//! mirror tiers on failure.

pub mod install;
pub mod mirrors;

pub use install::PackageManager;
pub use mirrors::MirrorRegistry;
