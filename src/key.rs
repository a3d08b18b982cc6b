//! Composite slot identity: declared value type plus an optional name.
//!
//! Two registrations with the same type and the same name address the same
//! slot; the unnamed form is the empty name. Identity is derived from the
//! type's `TypeId`, never from a formatted runtime value, so structurally
//! identical types can never collide.

use std::any::{type_name, TypeId};
use std::fmt;

/// Identity of one slot in a [`Registry`](crate::Registry).
///
/// Built internally by the registry from the declared value type and the
/// caller-supplied name (`""` when unnamed). The `Display` form is
/// `name<type_name>` and appears in error messages and logs; equality and
/// hashing are based on the `TypeId`, so the rendered type name plays no
/// part in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    type_id: TypeId,
    type_name: &'static str,
    name: String,
}

impl SlotKey {
    pub(crate) fn of<T: 'static>(name: &str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: name.to_owned(),
        }
    }

    /// The caller-supplied name, `""` for unnamed registrations.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type, as rendered by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.name, self.type_name)
    }
}
