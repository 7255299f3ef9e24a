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

//! axum middleware installing one [`RequestAuthorization`] per request.

use crate::boundary::{AbilityFactory, AuthorizationBoundary, RequestAuthorization};
use crate::config::EnforcementConfig;
use crate::errors::WebError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tracing::error;
use warden_core::Ability;

/// Shared state of the enforcement middleware.
#[derive(Clone)]
pub struct Enforcement {
    factory: AbilityFactory,
    config: Arc<EnforcementConfig>,
}

impl Enforcement {
    /// Creates the middleware state from an ability factory and settings.
    pub fn new<F>(factory: F, config: EnforcementConfig) -> Self
    where
        F: Fn(&HeaderMap) -> Ability + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            config: Arc::new(config),
        }
    }

    /// The active settings.
    pub fn config(&self) -> &EnforcementConfig {
        &self.config
    }
}

/// Wraps every route of `router` with [`enforce_authorization`].
pub fn with_authorization<S>(router: Router<S>, enforcement: Enforcement) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(enforcement, enforce_authorization))
}

/// Builds the request's boundary, runs the handler, then verifies that the
/// handler authorized (or skipped) when verification is enabled.
///
/// Error responses pass through unchecked: a handler that failed before
/// reaching its `authorize` call already produced the response to send.
pub async fn enforce_authorization(
    State(enforcement): State<Enforcement>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = Arc::new(
        RequestAuthorization::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
            Arc::clone(&enforcement.factory),
        )
        .with_denial_logging(enforcement.config.log_denials),
    );
    request.extensions_mut().insert(Arc::clone(&authorization));

    let response = next.run(request).await;

    let failed = response.status().is_client_error() || response.status().is_server_error();
    if enforcement.config.verify_authorized && !failed {
        if let Err(err) = authorization.verify_authorized() {
            error!(
                method = %authorization.method(),
                path = %authorization.uri().path(),
                "request finished without authorization"
            );
            return WebError::from(err).into_response();
        }
    }
    response
}
