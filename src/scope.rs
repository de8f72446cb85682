use alloc::string::String;
use core::fmt::{self, Display, Formatter};

use crate::{binding::AccessorPath, model::ClassId};

/// Identity of a scope annotation.
/// A scoped type is built once per owning component instance and cached there.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Scope {
    pub name: String,
}

impl Scope {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}

/// Component instance responsible for caching values of a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOwner {
    pub scope: Scope,
    pub component: ClassId,
    pub accessor_path: AccessorPath,
}
