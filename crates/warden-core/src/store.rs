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

//! Subject-key resolution and the subject → rule table.

use crate::rule::{Rule, SubjectRule, NULL_RULE};
use crate::types::{key_of, SubjectKey};
use std::any::Any;
use std::collections::HashMap;

/// Maps subject keys to their rules.
///
/// Writes go through [`PolicyStore::rule_for`], which takes a declared key
/// (a tag or a type). Reads go through [`PolicyStore::lookup_rule`], which
/// accepts either a key or a concrete subject and resolves the latter by its
/// runtime type.
#[derive(Debug, Default)]
pub struct PolicyStore {
    rules: HashMap<SubjectKey, SubjectRule>,
}

impl PolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rule for `key`, creating an empty one on first use.
    pub fn rule_for(&mut self, key: impl Into<SubjectKey>) -> &mut SubjectRule {
        self.rules.entry(key.into()).or_default()
    }

    /// Finds the rule deciding checks against `subject`, or the null rule.
    pub fn lookup_rule<S: Any>(&self, subject: &S) -> &dyn Rule {
        self.lookup_key(&key_of(subject))
    }

    /// Finds the rule stored under `key`, or the null rule.
    pub fn lookup_key(&self, key: &SubjectKey) -> &dyn Rule {
        match self.rules.get(key) {
            Some(rule) => rule as &dyn Rule,
            None => &NULL_RULE,
        }
    }

    /// The rule stored under `key`, if one was ever created.
    pub fn get(&self, key: &SubjectKey) -> Option<&SubjectRule> {
        self.rules.get(key)
    }

    /// True when at least one grant was added for `key`.
    pub fn contains(&self, key: &SubjectKey) -> bool {
        self.rules.contains_key(key)
    }

    /// Subject keys that have a rule.
    pub fn keys(&self) -> impl Iterator<Item = &SubjectKey> {
        self.rules.keys()
    }

    /// Number of subject keys with a rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when nothing was ever granted.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::Grant;
    use crate::types::{ActionKey, Args};

    struct Comment;
    struct Reaction;

    #[test]
    fn test_rules_are_created_lazily() {
        let mut store = PolicyStore::new();
        assert!(store.is_empty());

        store.rule_for(SubjectKey::of::<Comment>()).add_grant("read", Grant::AlwaysAllow);
        store.rule_for(SubjectKey::of::<Comment>()).add_grant("update", Grant::AlwaysAllow);

        assert_eq!(store.len(), 1);
        assert!(store.contains(&SubjectKey::of::<Comment>()));
        assert!(!store.contains(&SubjectKey::of::<Reaction>()));
        assert_eq!(store.get(&SubjectKey::of::<Comment>()).map(SubjectRule::len), Some(2));
    }

    #[test]
    fn test_instance_lookup_uses_runtime_type() {
        let mut store = PolicyStore::new();
        store.rule_for(SubjectKey::of::<Comment>()).add_grant("read", Grant::AlwaysAllow);
        let read = ActionKey::from("read");

        assert!(store.lookup_rule(&Comment).authorized(&read, &Comment, &Args::none()));
        assert!(!store.lookup_rule(&Reaction).authorized(&read, &Reaction, &Args::none()));
    }

    #[test]
    fn test_key_lookup_is_direct() {
        let mut store = PolicyStore::new();
        store.rule_for("dashboard").add_grant("read", Grant::AlwaysAllow);
        store.rule_for(SubjectKey::of::<Comment>()).add_grant("read", Grant::AlwaysAllow);
        let read = ActionKey::from("read");

        let tag = SubjectKey::tag("dashboard");
        assert!(store.lookup_rule(&tag).authorized(&read, &tag, &Args::none()));

        let type_key = SubjectKey::of::<Comment>();
        assert!(store.lookup_rule(&type_key).authorized(&read, &type_key, &Args::none()));

        let missing = SubjectKey::tag("reports");
        assert!(!store.lookup_rule(&missing).authorized(&read, &missing, &Args::none()));
    }
}
