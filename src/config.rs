//! JSON configuration DTOs and the file-loading glue around them.
//!
//! The shape on disk is:
//!
//! ```json
//! { "movies": [ { "movie": "<name>", "theatres": [ "<name>", ... ] }, ... ] }
//! ```
//!
//! Unknown keys are ignored; missing required keys or empty names fail to load.
//! Building the in-memory [`crate::catalog::Catalog`] from a parsed [`ConfigRoot`]
//! is handled by [`crate::catalog::Catalog::load`].

use serde::Deserialize;
use std::fs;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigRoot {
    pub movies: Vec<MovieConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieConfig {
    pub movie: String,
    pub theatres: Vec<String>,
}

/// Reads `file_path` and parses it as a [`ConfigRoot`].
///
/// A malformed document (missing `movies`, wrong field types) is reported as
/// [`Error::BadMessage`] rather than the raw serde error, matching the bad-message
/// taxonomy the catalog loader uses for the rest of its validation.
pub fn load_config(file_path: &str) -> Result<ConfigRoot> {
    let data = fs::read_to_string(file_path)?;
    serde_json::from_str(&data).map_err(|e| Error::BadMessage(format!("malformed configuration: {e}")))
}
