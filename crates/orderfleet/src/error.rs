// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the fleet admin API and registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetError {
    InputInvalid,
    NotFound,
    AlreadyExists,
    AlreadyRunning,
    Unauthorized,
    Internal,
}

impl FleetError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InputInvalid => 400,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::AlreadyRunning => 409,
            Self::Unauthorized => 401,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputInvalid => "INPUT_INVALID",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::AlreadyRunning => "ALREADY_RUNNING",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for FleetError {}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Classification of a single venue-adapter attempt failure.
///
/// Never escapes a Worker's scheduler loop: every variant is turned into an
/// `error` `EventRecord` and counted against `error_count`.
#[derive(Debug, Clone)]
pub enum VenueError {
    /// No response was received (connect/timeout failure).
    Network(String),
    /// A non-2xx HTTP status was returned, with a body.
    HttpStatus { status: u16, reason: String },
    /// A 2xx response carried a venue-level failure code.
    Semantic(String),
    /// The response body could not be parsed into the expected shape.
    Parse(String),
    /// The adapter has no usable credentials (missing key material).
    CredentialMissing,
    /// The order's venue name did not match any implemented adapter.
    NotImplemented(String),
}

impl VenueError {
    /// Human-readable reason, already extracted per the venue's error-field
    /// precedence (`retMsg` > `message` > `errorMsg` > `error` > raw body).
    pub fn reason(&self) -> String {
        match self {
            Self::Network(msg) => msg.clone(),
            Self::HttpStatus { reason, .. } => reason.clone(),
            Self::Semantic(reason) => reason.clone(),
            Self::Parse(msg) => msg.clone(),
            Self::CredentialMissing => "credential missing".to_owned(),
            Self::NotImplemented(venue) => format!("venue not implemented: {venue}"),
        }
    }
}

impl fmt::Display for VenueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::HttpStatus { status, reason } => write!(f, "http {status}: {reason}"),
            Self::Semantic(reason) => write!(f, "venue error: {reason}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::CredentialMissing => write!(f, "credential missing"),
            Self::NotImplemented(venue) => write!(f, "venue not implemented: {venue}"),
        }
    }
}

impl std::error::Error for VenueError {}
