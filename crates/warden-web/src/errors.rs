// Copyright 2024 Warden Project
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the request boundary and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use warden_core::AbilityError;

/// Errors surfaced by the boundary and by handlers using it.
#[derive(Error, Debug)]
pub enum WebError {
    /// A denial or a missing authorization check.
    #[error(transparent)]
    Ability(#[from] AbilityError),

    /// Invalid configuration value.
    #[error("Configuration Error ({key}): {message}")]
    Config {
        /// The offending configuration key.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// Socket or other I/O failure.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested resource does not exist.
    #[error("Resource Not Found: {0}")]
    NotFound(String),
}

impl WebError {
    /// Status code returned for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Ability(AbilityError::AccessDenied { .. }) => StatusCode::FORBIDDEN,
            WebError::Ability(AbilityError::AuthorizationNotPerformed) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Config { .. } | WebError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
