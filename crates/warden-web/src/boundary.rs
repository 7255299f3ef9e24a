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

//! The authorization boundary: how request handlers reach the current
//! actor's ability.

use crate::scope::AuthorizationScope;
use axum::http::{HeaderMap, Method, Uri};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use warden_core::{Ability, AbilityError, ActionKey, Args};

/// Builds the ability for the actor identified by a request's headers.
///
/// Supplied by the application; this is where actor lookup and the
/// per-deployment grant definitions live.
pub type AbilityFactory = Arc<dyn Fn(&HeaderMap) -> Ability + Send + Sync>;

/// Implemented by types that enforce authorization for one unit of work.
///
/// Implementors provide the scope and a way to build the actor's ability;
/// the checks themselves are provided.
pub trait AuthorizationBoundary {
    /// The scope caching this unit of work's ability.
    fn authorization_scope(&self) -> &AuthorizationScope;

    /// Builds the current actor's ability. Called at most once per scope.
    fn build_ability(&self) -> Ability;

    /// The current actor's ability, built on first use.
    fn current_ability(&self) -> &Ability {
        self.authorization_scope()
            .ability_or_init(|| self.build_ability())
    }

    /// See [`Ability::can`].
    fn can<S: Any>(&self, action: impl Into<ActionKey>, subject: &S, args: Args<'_>) -> bool {
        self.current_ability().can(action, subject, args)
    }

    /// See [`Ability::cannot`].
    fn cannot<S: Any>(&self, action: impl Into<ActionKey>, subject: &S, args: Args<'_>) -> bool {
        self.current_ability().cannot(action, subject, args)
    }

    /// Checks `action` on `subject` and records that authorization was
    /// performed, whether or not it is denied.
    fn authorize<S: Any>(
        &self,
        action: impl Into<ActionKey>,
        subject: &S,
        args: Args<'_>,
    ) -> Result<(), AbilityError> {
        self.authorization_scope().mark_performed();
        self.current_ability().authorize(action, subject, args)
    }

    /// Declares that this unit of work needs no authorization check.
    fn skip_authorization(&self) {
        self.authorization_scope().skip();
    }

    /// Fails with [`AbilityError::AuthorizationNotPerformed`] when neither
    /// `authorize` nor `skip_authorization` was called.
    fn verify_authorized(&self) -> Result<(), AbilityError> {
        self.authorization_scope().verify()
    }
}

/// The boundary for one HTTP request.
///
/// Inserted into request extensions by
/// [`enforce_authorization`](crate::middleware::enforce_authorization);
/// handlers extract it as `Extension<Arc<RequestAuthorization>>`.
pub struct RequestAuthorization {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    factory: AbilityFactory,
    scope: AuthorizationScope,
    log_denials: bool,
}

impl RequestAuthorization {
    /// Creates the boundary for a request.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, factory: AbilityFactory) -> Self {
        Self {
            method,
            uri,
            headers,
            factory,
            scope: AuthorizationScope::new(),
            log_denials: false,
        }
    }

    /// Enables logging of denied requests.
    pub fn with_denial_logging(mut self, enabled: bool) -> Self {
        self.log_denials = enabled;
        self
    }

    /// The request's headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request's method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request's URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }
}

impl AuthorizationBoundary for RequestAuthorization {
    fn authorization_scope(&self) -> &AuthorizationScope {
        &self.scope
    }

    fn build_ability(&self) -> Ability {
        (self.factory)(&self.headers)
    }

    fn authorize<S: Any>(
        &self,
        action: impl Into<ActionKey>,
        subject: &S,
        args: Args<'_>,
    ) -> Result<(), AbilityError> {
        self.scope.mark_performed();
        let result = self.current_ability().authorize(action, subject, args);
        if let Err(err) = &result {
            if self.log_denials {
                warn!(method = %self.method, path = %self.uri.path(), "{}", err);
            }
        }
        result
    }
}

impl fmt::Debug for RequestAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RequestAuthorization")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("scope", &self.scope)
            .finish()
    }
}
