//! Library surface of the CLIF QC command-line tool.
//!
//! The pipeline and session types live here so integration tests can
//! drive a full QC pass without spawning the binary.

pub mod logging;
pub mod pipeline;
pub mod session;
