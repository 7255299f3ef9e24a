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

//! The actor-facing facade over a [`PolicyStore`].
//!
//! An [`Ability`] is built once per actor, typically right after the actor
//! is loaded, and then queried read-only:
//!
//! ```
//! use warden_core::{args, Ability, Args, SubjectKey};
//!
//! struct Comment;
//! struct PrivateMessage {
//!     owner_id: u64,
//! }
//!
//! let ability = Ability::define(|ability| {
//!     ability.grant("read", SubjectKey::of::<Comment>());
//!     ability.grant_if("read", |msg: &PrivateMessage, args: &Args<'_>| {
//!         args.get::<u64>(0) == Some(&msg.owner_id)
//!     });
//! });
//!
//! let message = PrivateMessage { owner_id: 7 };
//! assert!(ability.can("read", &Comment, args![]));
//! assert!(ability.can("read", &message, args![7u64]));
//! assert!(ability.cannot("read", &message, args![8u64]));
//! assert!(ability.cannot("delete", &Comment, args![]));
//! ```

use crate::errors::AbilityError;
use crate::grant::{Grant, Truthy};
use crate::store::PolicyStore;
use crate::types::{key_of, ActionKey, Args, SubjectKey};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// The permissions of one actor.
///
/// Grants are added with the `grant*` methods, normally all at construction.
/// Once [`Ability::allow_anything`] is called the instance answers every
/// check with "allowed" for the rest of its life.
///
/// Mutation needs `&mut self`, so an ability shared behind `&` or `Arc` is
/// read-only and safe to query from several threads.
#[derive(Default)]
pub struct Ability {
    policies: PolicyStore,
    unrestricted: bool,
    attempts: AtomicU64,
}

impl Ability {
    /// Creates an ability with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ability and lets `definition` add its grants.
    pub fn define(definition: impl FnOnce(&mut Ability)) -> Self {
        let mut ability = Self::new();
        definition(&mut ability);
        ability
    }

    /// Allows `action` on `subject` unconditionally.
    pub fn grant(&mut self, action: impl Into<ActionKey>, subject: impl Into<SubjectKey>) -> &mut Self {
        self.add_grant(action.into(), subject.into(), Grant::AlwaysAllow)
    }

    /// Allows each of `actions` on `subject` unconditionally.
    pub fn grant_all<I, A>(&mut self, actions: I, subject: impl Into<SubjectKey>) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionKey>,
    {
        let subject = subject.into();
        for action in actions {
            self.add_grant(action.into(), subject.clone(), Grant::AlwaysAllow);
        }
        self
    }

    /// Allows `action` on instances of `T` for which `predicate` holds.
    ///
    /// Checks against the `T` type key or a tag never satisfy the predicate.
    pub fn grant_if<T, F, R>(&mut self, action: impl Into<ActionKey>, predicate: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &Args<'_>) -> R + Send + Sync + 'static,
        R: Truthy,
    {
        self.add_grant(action.into(), SubjectKey::of::<T>(), Grant::typed(predicate))
    }

    /// Allows `action` on `subject` when `predicate` holds for the checked value.
    ///
    /// The predicate receives whatever was checked: an instance, or the key
    /// itself when a key was queried.
    pub fn grant_with<F, R>(
        &mut self,
        action: impl Into<ActionKey>,
        subject: impl Into<SubjectKey>,
        predicate: F,
    ) -> &mut Self
    where
        F: Fn(&dyn Any, &Args<'_>) -> R + Send + Sync + 'static,
        R: Truthy,
    {
        self.add_grant(action.into(), subject.into(), Grant::conditional(predicate))
    }

    fn add_grant(&mut self, action: ActionKey, subject: SubjectKey, grant: Grant) -> &mut Self {
        debug!(%action, %subject, conditional = grant.is_conditional(), "granting action");
        if self.policies.rule_for(subject.clone()).add_grant(action.clone(), grant).is_some() {
            debug!(%action, %subject, "replaced existing grant");
        }
        self
    }

    /// Switches this instance to allow everything. There is no way back.
    pub fn allow_anything(&mut self) {
        if !self.unrestricted {
            debug!("ability escalated to allow anything");
        }
        self.unrestricted = true;
    }

    /// True once [`Ability::allow_anything`] was called.
    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Checks whether `action` is allowed on `subject`.
    ///
    /// `subject` may be a concrete value, looked up by its type, or a
    /// [`SubjectKey`], looked up directly.
    pub fn can<S: Any>(&self, action: impl Into<ActionKey>, subject: &S, args: Args<'_>) -> bool {
        let action = action.into();
        self.check(&action, &key_of(subject), subject, &args)
    }

    /// The negation of [`Ability::can`].
    pub fn cannot<S: Any>(&self, action: impl Into<ActionKey>, subject: &S, args: Args<'_>) -> bool {
        !self.can(action, subject, args)
    }

    /// Fails with [`AbilityError::AccessDenied`] when `action` is not allowed.
    ///
    /// Every call counts as an authorization attempt, whatever its outcome.
    pub fn authorize<S: Any>(
        &self,
        action: impl Into<ActionKey>,
        subject: &S,
        args: Args<'_>,
    ) -> Result<(), AbilityError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let action = action.into();
        let key = key_of(subject);
        if self.check(&action, &key, subject, &args) {
            return Ok(());
        }
        warn!(%action, subject = %key, "access denied");
        Err(AbilityError::AccessDenied { action, subject: key })
    }

    /// Number of `authorize` calls made on this instance.
    pub fn authorization_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// The underlying rule table.
    pub fn policies(&self) -> &PolicyStore {
        &self.policies
    }

    fn check(&self, action: &ActionKey, key: &SubjectKey, subject: &dyn Any, args: &Args<'_>) -> bool {
        if self.unrestricted {
            trace!(%action, subject = %key, "unrestricted ability");
            return true;
        }
        let allowed = self.policies.lookup_key(key).authorized(action, subject, args);
        trace!(%action, subject = %key, allowed, "checked ability");
        allowed
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Ability")
            .field("policies", &self.policies)
            .field("unrestricted", &self.unrestricted)
            .field("attempts", &self.authorization_attempts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    struct Comment;

    struct PrivateMessage {
        owner_id: u64,
    }

    fn owner_only() -> Ability {
        Ability::define(|ability| {
            ability.grant("read", SubjectKey::of::<Comment>());
            ability.grant_if("read", |msg: &PrivateMessage, args: &Args<'_>| {
                args.get::<u64>(0).map_or(false, |uid| *uid == msg.owner_id)
            });
        })
    }

    #[test]
    fn test_empty_ability_denies() {
        let ability = Ability::new();
        assert!(ability.cannot("read", &Comment, args![]));
        assert!(ability.cannot("manage", &Comment, args![]));
        assert!(!ability.is_unrestricted());
    }

    #[test]
    fn test_owner_predicate() {
        let ability = owner_only();
        let msg = PrivateMessage { owner_id: 7 };

        assert!(ability.can("read", &Comment, args![]));
        assert!(ability.can("read", &msg, args![7u64]));
        assert!(ability.cannot("read", &msg, args![8u64]));
        assert!(ability.cannot("read", &msg, args![]));
        assert!(ability.cannot("delete", &Comment, args![]));
    }

    #[test]
    fn test_type_key_query_against_typed_predicate() {
        let ability = owner_only();
        // unconditional grants answer type-level questions
        assert!(ability.can("read", &SubjectKey::of::<Comment>(), args![]));
        // typed predicates need an instance
        assert!(ability.cannot("read", &SubjectKey::of::<PrivateMessage>(), args![7u64]));
    }

    #[test]
    fn test_tag_subjects() {
        let ability = Ability::define(|ability| {
            ability.grant("view", "dashboard");
            ability.grant_with("export", "reports", |subject: &dyn Any, _: &Args<'_>| {
                subject.downcast_ref::<SubjectKey>() == Some(&SubjectKey::tag("reports"))
            });
        });

        assert!(ability.can("view", &SubjectKey::tag("dashboard"), args![]));
        assert!(ability.cannot("edit", &SubjectKey::tag("dashboard"), args![]));
        assert!(ability.can("export", &SubjectKey::tag("reports"), args![]));
    }

    #[test]
    fn test_grant_all() {
        let ability = Ability::define(|ability| {
            ability.grant_all(["read", "update"], SubjectKey::of::<Comment>());
        });
        assert!(ability.can("read", &Comment, args![]));
        assert!(ability.can("update", &Comment, args![]));
        assert!(ability.cannot("destroy", &Comment, args![]));
        assert_eq!(ability.policies().len(), 1);
    }

    #[test]
    fn test_allow_anything_is_per_instance_and_permanent() {
        let mut admin = owner_only();
        let user = owner_only();
        admin.allow_anything();
        admin.grant_if("read", |_: &PrivateMessage, _: &Args<'_>| false);
        admin.allow_anything();

        assert!(admin.is_unrestricted());
        assert!(admin.can("read", &PrivateMessage { owner_id: 1 }, args![2u64]));
        assert!(!admin.cannot("launch", &"missiles", args![]));
        assert!(user.cannot("launch", &"missiles", args![]));
    }

    #[test]
    fn test_authorize() {
        let ability = owner_only();
        let msg = PrivateMessage { owner_id: 7 };

        assert_eq!(ability.authorize("read", &msg, args![7u64]), Ok(()));
        let err = ability.authorize("read", &msg, args![8u64]).unwrap_err();
        assert_eq!(
            err,
            AbilityError::AccessDenied {
                action: ActionKey::from("read"),
                subject: SubjectKey::of::<PrivateMessage>(),
            }
        );
        assert_eq!(ability.authorization_attempts(), 2);
    }

    #[test]
    fn test_overwrite_uses_latest_grant() {
        let mut ability = Ability::new();
        ability.grant("read", SubjectKey::of::<PrivateMessage>());
        ability.grant_if("read", |msg: &PrivateMessage, _: &Args<'_>| msg.owner_id == 1);

        assert!(ability.can("read", &PrivateMessage { owner_id: 1 }, args![]));
        assert!(ability.cannot("read", &PrivateMessage { owner_id: 2 }, args![]));
    }
}
