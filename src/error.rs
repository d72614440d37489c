//! Error types for the MediCare HMS core.

use thiserror::Error;

use crate::models::Collection;

/// Failures talking to the entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to entity store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("entity store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("malformed {collection} record: {source}")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid entity store base url: {0}")]
    InvalidBaseUrl(String),

    #[error("could not load fixture: {0}")]
    Fixture(String),
}

/// Failures sending an email through the notification integration.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email integration rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid email recipient: {0}")]
    InvalidRecipient(String),
}

/// Application level errors surfaced to the pages.
#[derive(Debug, Error)]
pub enum HmsError {
    /// A required form field was empty; raised before any store call.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("{collection} in status {from} has no further transition")]
    InvalidTransition { collection: Collection, from: String },

    /// Another submission from the same form is still in flight.
    #[error("a submission is already in progress")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl HmsError {
    /// True for failures caught locally before anything reached the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, HmsError::MissingField(_) | HmsError::InvalidField { .. })
    }
}

pub type Result<T, E = HmsError> = std::result::Result<T, E>;
