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

//! Per-actor authorization rules.
//!
//! An [`Ability`] answers "may this actor perform action A on subject S?".
//! Grants are recorded per subject key and action, either unconditionally or
//! behind a predicate over the checked subject and extra arguments. The
//! reserved `manage` action matches every action on its subject, subjects
//! with no rules fall back to a rule that denies everything, and
//! [`Ability::allow_anything`] turns an instance into one that allows
//! everything.

pub mod ability;
pub mod errors;
pub mod grant;
pub mod rule;
pub mod store;
pub mod types;

pub use ability::Ability;
pub use errors::AbilityError;
pub use grant::{Grant, Predicate, Truthy};
pub use rule::{NullRule, Rule, SubjectRule, NULL_RULE};
pub use store::PolicyStore;
pub use types::{key_of, ActionKey, Args, SubjectKey, TypeRef};
