//! # sform-cli — Form Engine Command-Line Interface
//!
//! Drives the form engine from files so schemas can be checked without a
//! rendering front end.
//!
//! ## Subcommands
//!
//! - `fields`: print the derived field tree
//! - `validate`: print the error map; non-zero exit when not empty
//! - `submit`: validate and hand the payload to a file or HTTP endpoint
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the library crates and write to a
//!   caller-supplied writer.

pub mod fields;
pub mod input;
pub mod submit;
pub mod validate;
