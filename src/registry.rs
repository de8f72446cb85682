use alloc::collections::{btree_map::Entry, BTreeMap};

use crate::{
    binding::{Binding, Merge as _},
    scope::{Scope, ScopeOwner},
    types::TypeKey,
};

/// Bindings collected for one root component.
///
/// Accessor declarations and all other bindings live in separate namespaces,
/// so an accessor can delegate to the binding of the same key.
/// Writes that would break uniqueness are rejected, never overwritten.
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    accessors: BTreeMap<TypeKey, Binding>,
    bindings: BTreeMap<TypeKey, Binding>,
    scope_owners: BTreeMap<Scope, ScopeOwner>,
    scoped: BTreeMap<TypeKey, Scope>,
}

impl BindingRegistry {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accessors: BTreeMap::new(),
            bindings: BTreeMap::new(),
            scope_owners: BTreeMap::new(),
            scoped: BTreeMap::new(),
        }
    }

    /// Adds a binding to the main namespace.
    /// Containers of the same kind are merged, contributions keep their order.
    ///
    /// # Errors
    /// Returns a copy of the registered binding if it can't be combined with `binding`.
    /// The registered one stays in place.
    pub fn insert(&mut self, key: TypeKey, binding: Binding) -> Result<(), Binding> {
        match (self.bindings.remove(&key), binding) {
            (None, binding) => {
                self.bindings.insert(key, binding);
                Ok(())
            }
            (Some(Binding::Container(existing)), Binding::Container(new)) if existing.kind == new.kind => {
                self.bindings.insert(key, Binding::Container(existing.merge(new)));
                Ok(())
            }
            (Some(existing), _) => {
                let conflict = existing.clone();
                self.bindings.insert(key, existing);
                Err(conflict)
            }
        }
    }

    /// Adds an accessor if the key isn't requested yet
    ///
    /// # Errors
    /// Returns a copy of the accessor registered first
    pub fn insert_accessor(&mut self, key: TypeKey, binding: Binding) -> Result<(), Binding> {
        match self.accessors.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(binding);
                Ok(())
            }
            Entry::Occupied(entry) => Err(entry.get().clone()),
        }
    }

    /// Records the owner of a scope, the first owner wins.
    /// Returns `false` if the scope already has an owner.
    pub fn insert_scope_owner(&mut self, owner: ScopeOwner) -> bool {
        match self.scope_owners.entry(owner.scope.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(owner);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Marks the value of `key` as cached per instance of the `scope` owner
    pub fn mark_scoped(&mut self, key: TypeKey, scope: Scope) {
        self.scoped.entry(key).or_insert(scope);
    }

    #[inline]
    #[must_use]
    pub fn accessor(&self, key: &TypeKey) -> Option<&Binding> {
        self.accessors.get(key)
    }

    #[inline]
    #[must_use]
    pub fn binding(&self, key: &TypeKey) -> Option<&Binding> {
        self.bindings.get(key)
    }

    #[inline]
    #[must_use]
    pub fn scope_owner(&self, scope: &Scope) -> Option<&ScopeOwner> {
        self.scope_owners.get(scope)
    }

    #[inline]
    #[must_use]
    pub fn scope_of(&self, key: &TypeKey) -> Option<&Scope> {
        self.scoped.get(key)
    }

    #[inline]
    pub fn accessors(&self) -> impl Iterator<Item = (&TypeKey, &Binding)> {
        self.accessors.iter()
    }

    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = (&TypeKey, &Binding)> {
        self.bindings.iter()
    }

    #[inline]
    pub fn scope_owners(&self) -> impl Iterator<Item = &ScopeOwner> {
        self.scope_owners.values()
    }

    #[inline]
    pub fn scoped(&self) -> impl Iterator<Item = (&TypeKey, &Scope)> {
        self.scoped.iter()
    }
}
