// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for NetBox resolution and tag enrichment

use thiserror::Error;

/// Errors that can occur while resolving an address through NetBox
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetBoxError {
    /// The address search returned no matches
    #[error("No results found in NetBox for query: {0}")]
    EmptyResult(String),

    /// A response body did not have the expected JSON shape
    #[error("Malformed NetBox response: {0}")]
    MalformedResponse(String),

    /// Network or client failure talking to NetBox
    #[error("NetBox transport error: {0}")]
    Transport(String),

    /// NetBox answered with a non-success status
    #[error("NetBox returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NetBoxError {
    /// Whether the failure happened on the wire rather than in the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetBoxError::Transport(_) | NetBoxError::HttpStatus { .. }
        )
    }
}

/// Result type for NetBox operations
pub type NetBoxResult<T> = Result<T, NetBoxError>;

impl From<reqwest::Error> for NetBoxError {
    fn from(err: reqwest::Error) -> Self {
        NetBoxError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NetBoxError {
    fn from(err: serde_json::Error) -> Self {
        NetBoxError::MalformedResponse(err.to_string())
    }
}
