//! CLI command implementations.

pub mod deps;
pub mod init;
pub mod registry;
pub mod release;
pub mod status;
