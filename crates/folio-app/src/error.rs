// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// The only way a page fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source unavailable for page {page}: {reason}")]
pub struct SourceUnavailable {
    pub page: u32,
    pub reason: SourceFailure,
}

impl SourceUnavailable {
    pub fn connection(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            reason: SourceFailure::Connection(message.into()),
        }
    }

    pub fn status(page: u32, status: u16, message: impl Into<String>) -> Self {
        Self {
            page,
            reason: SourceFailure::Status {
                status,
                message: message.into(),
            },
        }
    }

    pub fn payload(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            reason: SourceFailure::Payload(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceFailure {
    #[error("cannot reach source: {0}")]
    Connection(String),
    #[error("source returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed payload: {0}")]
    Payload(String),
}
