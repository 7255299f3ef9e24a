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

//! Defines the error types raised by ability checks.

use crate::types::{ActionKey, SubjectKey};
use thiserror::Error;

/// The error type for authorization operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbilityError {
    /// `authorize` was called for an action the ability does not permit.
    #[error("Access Denied: not authorized to {action} {subject}")]
    AccessDenied {
        /// The attempted action.
        action: ActionKey,
        /// The key the checked subject resolved to.
        subject: SubjectKey,
    },

    /// A unit of work finished without calling `authorize` and without
    /// explicitly skipping authorization. Raised by boundary collaborators,
    /// never by the ability itself.
    #[error("Authorization Not Performed: no authorize call or explicit skip in this unit of work")]
    AuthorizationNotPerformed,
}

impl AbilityError {
    /// Convenience constructor for [`AbilityError::AccessDenied`].
    pub fn access_denied(action: impl Into<ActionKey>, subject: impl Into<SubjectKey>) -> Self {
        AbilityError::AccessDenied {
            action: action.into(),
            subject: subject.into(),
        }
    }

    /// True for [`AbilityError::AccessDenied`].
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AbilityError::AccessDenied { .. })
    }
}
