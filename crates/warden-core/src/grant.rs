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

//! Action-level permission units.

use crate::types::Args;
use std::any::Any;
use std::fmt;

/// A stored matching function: `(subject, extra args) -> allowed`.
///
/// The subject is whatever was checked, either a concrete instance or the
/// [`SubjectKey`](crate::types::SubjectKey) itself when a key was queried.
pub type Predicate = Box<dyn Fn(&dyn Any, &Args<'_>) -> bool + Send + Sync>;

/// Coerces a predicate's result to a boolean.
pub trait Truthy {
    /// Returns the boolean reading of `self`.
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

impl<T> Truthy for Option<T> {
    fn truthy(&self) -> bool {
        self.is_some()
    }
}

impl<T, E> Truthy for Result<T, E> {
    fn truthy(&self) -> bool {
        self.is_ok()
    }
}

macro_rules! impl_truthy_for_integers {
    ($($t:ty),*) => {
        $(
            impl Truthy for $t {
                fn truthy(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

impl_truthy_for_integers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// A recorded permission for one (subject key, action) pair.
pub enum Grant {
    /// Allowed without looking at the subject.
    AlwaysAllow,
    /// Allowed when the predicate holds for the checked subject and args.
    Conditional(Predicate),
}

impl Grant {
    /// Wraps a closure returning any [`Truthy`] value.
    pub fn conditional<F, R>(predicate: F) -> Self
    where
        F: Fn(&dyn Any, &Args<'_>) -> R + Send + Sync + 'static,
        R: Truthy,
    {
        Grant::Conditional(Box::new(move |subject: &dyn Any, args: &Args<'_>| {
            predicate(subject, args).truthy()
        }))
    }

    /// Wraps a closure over a concrete subject type.
    ///
    /// Subjects that are not a `T` (including keys queried directly) never
    /// match, and the closure is not called for them.
    pub fn typed<T, F, R>(predicate: F) -> Self
    where
        T: Any,
        F: Fn(&T, &Args<'_>) -> R + Send + Sync + 'static,
        R: Truthy,
    {
        Grant::Conditional(Box::new(move |subject: &dyn Any, args: &Args<'_>| {
            subject
                .downcast_ref::<T>()
                .map_or(false, |subject| predicate(subject, args).truthy())
        }))
    }

    /// Decides this grant for one subject.
    pub fn allows(&self, subject: &dyn Any, args: &Args<'_>) -> bool {
        match self {
            Grant::AlwaysAllow => true,
            Grant::Conditional(predicate) => predicate(subject, args),
        }
    }

    /// True for [`Grant::Conditional`].
    pub fn is_conditional(&self) -> bool {
        matches!(self, Grant::Conditional(_))
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Grant::AlwaysAllow => write!(f, "AlwaysAllow"),
            Grant::Conditional(_) => write!(f, "Conditional(<predicate>)"),
        }
    }
}
