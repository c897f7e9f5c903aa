//! Assembler regression test driver
//!
//! Runs every assembly fixture in a tree through the assembler under test
//! and checks the produced bytes and diagnostics against golden data.

pub mod common;
pub mod compare;
pub mod fixture;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result, Settings, SuiteConfig};
pub use testing::{run_suite, SuiteSummary};
