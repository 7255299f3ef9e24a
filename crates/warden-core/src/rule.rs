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

//! Per-subject rule tables and the null fallback.

use crate::grant::Grant;
use crate::types::{ActionKey, Args};
use std::any::Any;
use std::collections::HashMap;

/// Anything that can answer "is `action` allowed on `subject`?".
pub trait Rule: Send + Sync {
    /// Decides whether `action` is permitted on `subject` given `args`.
    fn authorized(&self, action: &ActionKey, subject: &dyn Any, args: &Args<'_>) -> bool;
}

/// The action grants recorded for one subject key.
#[derive(Debug, Default)]
pub struct SubjectRule {
    grants: HashMap<ActionKey, Grant>,
}

impl SubjectRule {
    /// Creates an empty rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `grant` under `action`, replacing any earlier grant for it.
    pub fn add_grant(&mut self, action: impl Into<ActionKey>, grant: Grant) -> Option<Grant> {
        self.grants.insert(action.into(), grant)
    }

    /// The grant that decides `action`: `manage` first, then the action itself.
    pub fn resolve(&self, action: &ActionKey) -> Option<&Grant> {
        self.grants
            .get(&ActionKey::MANAGE)
            .or_else(|| self.grants.get(action))
    }

    /// The grant stored under exactly `action`.
    pub fn grant(&self, action: &ActionKey) -> Option<&Grant> {
        self.grants.get(action)
    }

    /// Actions with a grant on this subject.
    pub fn actions(&self) -> impl Iterator<Item = &ActionKey> {
        self.grants.keys()
    }

    /// Number of stored grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// True when no grant was ever stored.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl Rule for SubjectRule {
    fn authorized(&self, action: &ActionKey, subject: &dyn Any, args: &Args<'_>) -> bool {
        self.resolve(action)
            .map_or(false, |grant| grant.allows(subject, args))
    }
}

/// Denies every action. Returned by lookups that find no rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRule;

/// The shared instance handed out on every lookup miss.
pub static NULL_RULE: NullRule = NullRule;

impl Rule for NullRule {
    fn authorized(&self, _action: &ActionKey, _subject: &dyn Any, _args: &Args<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Doc {
        public: bool,
    }

    fn read() -> ActionKey {
        ActionKey::from("read")
    }

    #[test]
    fn test_unknown_action_is_denied() {
        let mut rule = SubjectRule::new();
        rule.add_grant("read", Grant::AlwaysAllow);

        assert!(rule.authorized(&read(), &Doc { public: false }, &Args::none()));
        assert!(!rule.authorized(&ActionKey::from("delete"), &Doc { public: false }, &Args::none()));
    }

    #[test]
    fn test_manage_wins_over_specific_grant() {
        let mut rule = SubjectRule::new();
        rule.add_grant("manage", Grant::AlwaysAllow);
        rule.add_grant("read", Grant::typed(|_: &Doc, _: &Args<'_>| false));

        assert!(rule.authorized(&read(), &Doc { public: false }, &Args::none()));
        assert!(rule.authorized(&ActionKey::from("archive"), &Doc { public: false }, &Args::none()));
    }

    #[test]
    fn test_conditional_manage_gates_every_action() {
        let mut rule = SubjectRule::new();
        rule.add_grant("read", Grant::AlwaysAllow);
        rule.add_grant("manage", Grant::typed(|doc: &Doc, _: &Args<'_>| doc.public));

        // the specific grant is shadowed, not consulted as a fallback
        assert!(!rule.authorized(&read(), &Doc { public: false }, &Args::none()));
        assert!(rule.authorized(&read(), &Doc { public: true }, &Args::none()));
    }

    #[test]
    fn test_add_grant_replaces_previous() {
        let mut rule = SubjectRule::new();
        assert!(rule.add_grant("read", Grant::AlwaysAllow).is_none());
        let previous = rule.add_grant("read", Grant::typed(|doc: &Doc, _: &Args<'_>| doc.public));

        assert!(matches!(previous, Some(Grant::AlwaysAllow)));
        assert_eq!(rule.len(), 1);
        assert!(!rule.authorized(&read(), &Doc { public: false }, &Args::none()));
    }

    #[test]
    fn test_predicate_not_invoked_without_grant() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut rule = SubjectRule::new();
        rule.add_grant(
            "read",
            Grant::conditional(move |_, _: &Args<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        assert!(!rule.authorized(&ActionKey::from("update"), &(), &Args::none()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(rule.authorized(&read(), &(), &args![1u8]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_null_rule_denies_everything() {
        assert!(!NULL_RULE.authorized(&read(), &(), &Args::none()));
        assert!(!NULL_RULE.authorized(&ActionKey::MANAGE, &Doc { public: true }, &args![true]));
    }
}
