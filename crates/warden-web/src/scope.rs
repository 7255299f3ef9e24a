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

//! Request-scoped ability cache and the "authorization was performed" record.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use warden_core::{Ability, AbilityError};

/// State for one unit of work.
///
/// The ability is built on first access and reused for the rest of the unit;
/// [`AuthorizationScope::reset`] drops it along with the performed/skipped
/// marks.
#[derive(Debug, Default)]
pub struct AuthorizationScope {
    ability: OnceLock<Ability>,
    performed: AtomicBool,
    skipped: AtomicBool,
}

impl AuthorizationScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached ability, building it with `init` on first access.
    pub fn ability_or_init(&self, init: impl FnOnce() -> Ability) -> &Ability {
        self.ability.get_or_init(init)
    }

    /// True once the ability was built.
    pub fn is_loaded(&self) -> bool {
        self.ability.get().is_some()
    }

    /// Records that an authorization check ran.
    pub fn mark_performed(&self) {
        self.performed.store(true, Ordering::Release);
    }

    /// True once an authorization check ran.
    pub fn is_performed(&self) -> bool {
        self.performed.load(Ordering::Acquire)
    }

    /// Records that this unit of work deliberately skips authorization.
    pub fn skip(&self) {
        self.skipped.store(true, Ordering::Release);
    }

    /// True once authorization was explicitly skipped.
    pub fn is_skipped(&self) -> bool {
        self.skipped.load(Ordering::Acquire)
    }

    /// Fails with [`AbilityError::AuthorizationNotPerformed`] unless a check
    /// ran or authorization was skipped.
    pub fn verify(&self) -> Result<(), AbilityError> {
        if self.is_performed() || self.is_skipped() {
            Ok(())
        } else {
            Err(AbilityError::AuthorizationNotPerformed)
        }
    }

    /// Clears the cached ability and both marks.
    pub fn reset(&mut self) {
        self.ability.take();
        *self.performed.get_mut() = false;
        *self.skipped.get_mut() = false;
    }
}
