//! Test harness for clang-tidy checks.
//!
//! Runs the analysis tool in fix mode over an annotated test source and
//! verifies the applied fixes (`CHECK-FIXES`), the emitted diagnostics
//! (`CHECK-MESSAGES`) and notes (`CHECK-NOTES`) with `FileCheck`.

pub use crate::errors::{CheckError, Result};

pub mod annotations;
pub mod cli;
pub mod config;
pub mod errors;
pub mod files;
pub mod output;
pub mod process;
pub mod run;
pub mod sanitize;
pub mod standards;
pub mod verify;
