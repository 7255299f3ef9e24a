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

//! Common type definitions: actions, subject keys and the extra-argument list.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier for an action (e.g. `read`, `update`).
///
/// [`ActionKey::MANAGE`] is not a real action: a grant stored under it
/// matches every action on its subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey(Cow<'static, str>);

impl ActionKey {
    /// The reserved match-all action.
    pub const MANAGE: ActionKey = ActionKey(Cow::Borrowed("manage"));

    /// Creates a new ActionKey from a string-like type.
    pub fn new(action: impl Into<Cow<'static, str>>) -> Self {
        Self(action.into())
    }

    /// Returns true for the reserved `manage` wildcard.
    pub fn is_manage(&self) -> bool {
        *self == Self::MANAGE
    }
}

impl From<&'static str> for ActionKey {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for ActionKey {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&ActionKey> for ActionKey {
    fn from(key: &ActionKey) -> Self {
        key.clone()
    }
}

impl AsRef<str> for ActionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a Rust type, compared by `TypeId`.
///
/// The type name is kept for diagnostics only and takes no part in equality.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// Returns the reference for `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified name of the referenced type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Identifies the class of subject a rule applies to.
///
/// Either an explicit tag with no concrete instance behind it, or a type.
/// Concrete subjects resolve to the `Type` variant of their runtime type, so
/// rules declared against `SubjectKey::of::<Comment>()` apply to every
/// `Comment` instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    /// An abstract, named subject (e.g. `"dashboard"`).
    Tag(Cow<'static, str>),
    /// A subject type.
    Type(TypeRef),
}

impl SubjectKey {
    /// Creates a tag key.
    pub fn tag(name: impl Into<Cow<'static, str>>) -> Self {
        SubjectKey::Tag(name.into())
    }

    /// Creates the key for type `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        SubjectKey::Type(TypeRef::of::<T>())
    }
}

impl From<&'static str> for SubjectKey {
    fn from(s: &'static str) -> Self {
        SubjectKey::Tag(Cow::Borrowed(s))
    }
}

impl From<String> for SubjectKey {
    fn from(s: String) -> Self {
        SubjectKey::Tag(Cow::Owned(s))
    }
}

impl From<TypeRef> for SubjectKey {
    fn from(type_ref: TypeRef) -> Self {
        SubjectKey::Type(type_ref)
    }
}

impl From<&SubjectKey> for SubjectKey {
    fn from(key: &SubjectKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubjectKey::Tag(name) => write!(f, ":{}", name),
            SubjectKey::Type(type_ref) => write!(f, "{}", type_ref.name()),
        }
    }
}

/// Resolves the key a checked subject is looked up under.
///
/// A value that already is a [`SubjectKey`] (a tag or a type reference) is
/// used directly; any other value resolves to its own type.
pub fn key_of<S: Any>(subject: &S) -> SubjectKey {
    match (subject as &dyn Any).downcast_ref::<SubjectKey>() {
        Some(key) => key.clone(),
        None => SubjectKey::of::<S>(),
    }
}

/// Extra context passed along with a check and handed to predicates.
///
/// Build one with the [`args!`](crate::args) macro.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    // Public only so `args!` can use a braced literal, which keeps the
    // borrowed array alive for the enclosing `let`.
    #[doc(hidden)]
    pub values: &'a [&'a dyn Any],
}

impl<'a> Args<'a> {
    /// Wraps a slice of borrowed values.
    pub fn new(values: &'a [&'a dyn Any]) -> Self {
        Self { values }
    }

    /// No extra context.
    pub fn none() -> Args<'static> {
        Args { values: &[] }
    }

    /// Returns the argument at `index` if it exists and is a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&'a T> {
        self.values.get(index).and_then(|value| value.downcast_ref::<T>())
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no arguments were passed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the raw arguments.
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Any> + 'a {
        self.values.iter().copied()
    }
}

impl Default for Args<'static> {
    fn default() -> Self {
        Args::none()
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}

/// Builds an [`Args`] list from borrowed values.
///
/// ```
/// use warden_core::args;
///
/// let owner_id = 7u64;
/// let args = args![owner_id, "inbox"];
/// assert_eq!(args.get::<u64>(0), Some(&7));
/// assert_eq!(args.get::<&str>(1), Some(&"inbox"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::types::Args::none()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::types::Args {
            values: &[$(&$arg as &dyn ::std::any::Any),+],
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Comment;
    struct PrivateMessage;

    #[test]
    fn test_manage_is_reserved_wildcard() {
        assert!(ActionKey::MANAGE.is_manage());
        assert!(ActionKey::from("manage").is_manage());
        assert!(!ActionKey::from("read").is_manage());
    }

    #[test]
    fn test_action_key_equality_ignores_ownership() {
        assert_eq!(ActionKey::from("read"), ActionKey::from("read".to_string()));
        assert_eq!(ActionKey::new("update").to_string(), "update");
    }

    #[test]
    fn test_instances_of_one_type_share_a_key() {
        let first = Comment;
        let second = Comment;
        assert_eq!(key_of(&first), key_of(&second));
        assert_eq!(key_of(&first), SubjectKey::of::<Comment>());
        assert_ne!(key_of(&first), SubjectKey::of::<PrivateMessage>());
    }

    #[test]
    fn test_key_of_passes_keys_through() {
        let tag = SubjectKey::tag("dashboard");
        assert_eq!(key_of(&tag), SubjectKey::from("dashboard"));

        let type_key = SubjectKey::of::<Comment>();
        assert_eq!(key_of(&type_key), SubjectKey::of::<Comment>());
    }

    #[test]
    fn test_tags_and_types_never_collide() {
        let tag = SubjectKey::tag(type_name::<Comment>());
        assert_ne!(tag, SubjectKey::of::<Comment>());
    }

    #[test]
    fn test_absent_subject_has_its_own_key() {
        let absent: Option<Comment> = None;
        assert_eq!(key_of(&absent), SubjectKey::of::<Option<Comment>>());
        assert_ne!(key_of(&absent), SubjectKey::of::<Comment>());
    }

    #[test]
    fn test_args_typed_access() {
        let user_id = 7u64;
        let label = String::from("inbox");
        let args = args![user_id, label];

        assert_eq!(args.len(), 2);
        assert_eq!(args.get::<u64>(0), Some(&7));
        assert_eq!(args.get::<String>(1).map(String::as_str), Some("inbox"));
        // wrong type and out of range both come back empty
        assert_eq!(args.get::<u32>(0), None);
        assert_eq!(args.get::<u64>(5), None);
        assert!(args![].is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(SubjectKey::tag("dashboard").to_string(), ":dashboard");
        assert!(SubjectKey::of::<Comment>().to_string().ends_with("Comment"));
    }
}
