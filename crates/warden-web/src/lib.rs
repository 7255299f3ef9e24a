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

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Request boundary for warden abilities.
//!
//! Builds one [`warden_core::Ability`] per request from an application
//! supplied factory, exposes it to handlers through
//! [`AuthorizationBoundary`], and rejects requests whose handler never
//! called `authorize` or `skip_authorization`.

pub mod boundary;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod scope;

pub use boundary::{AbilityFactory, AuthorizationBoundary, RequestAuthorization};
pub use config::EnforcementConfig;
pub use errors::WebError;
pub use middleware::{enforce_authorization, with_authorization, Enforcement};
pub use scope::AuthorizationScope;
