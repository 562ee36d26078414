//! Recursive copying of files and directory trees.
//!
//! - `core::copy`     : single source, file or directory tree
//! - `core::batch`    : several sources into one directory
//! - `core::classify` : file vs. directory decisions for paths
//! - `cli`, `config`  : argument and config file handling for the binary

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::cli::args::{BatchPolicy, CopyOptions, OverwritePolicy};
pub use crate::core::batch::copy_all;
pub use crate::core::classify::{Classification, classify, classify_prospective, looks_like_file};
pub use crate::core::copy::copy;
pub use crate::error::{CopyError, CopyResult, ErrorKind};
