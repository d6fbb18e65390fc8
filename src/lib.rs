//! partsbin - component files from remote repositories, cached locally
//!
//! Fetches component source files from remotes and keeps them in a
//! content-addressed disk cache with hash verification and a 7-day TTL.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod ui;

pub use error::{PartsbinError, PartsbinResult};
