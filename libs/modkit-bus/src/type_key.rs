use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dispatch key for events, answers and services.
///
/// Identity is the `TypeId`; the `type_name` rides along for diagnostics only,
/// since it is not guaranteed to be unique. Works for `T = dyn Trait`.
#[derive(Clone, Copy)]
pub(crate) struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline]
    pub(crate) fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
