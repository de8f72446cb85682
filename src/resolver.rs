use alloc::string::ToString as _;
use tracing::{debug, debug_span};

use crate::{
    binding::{Binding, ConstructorBinding},
    diagnostics::{Diagnostic, Diagnostics},
    errors::{BindingErrorKind, ScopeErrorKind},
    hierarchy::HierarchyWalker,
    model::{ClassId, Location, Model, Tag},
    registry::BindingRegistry,
    scope::Scope,
    types::TypeKey,
};

/// Answers binding requests of the code generator against a finished registry
pub struct GraphResolver<'a> {
    model: &'a Model,
    registry: &'a BindingRegistry,
}

impl<'a> GraphResolver<'a> {
    #[inline]
    #[must_use]
    pub const fn new(model: &'a Model, registry: &'a BindingRegistry) -> Self {
        Self { model, registry }
    }

    /// Finds how to obtain `key`.
    ///
    /// Lookup order is the accessor namespace (unless `skip_self`), the main namespace
    /// and finally the constructor of a self-injectable class.
    /// `skip_self` is used while generating the body of the accessor itself.
    ///
    /// A scoped self-injectable class without a scope owner is recorded into `diagnostics`.
    /// Returning `None` otherwise records nothing, the caller decides whether a missing binding is an error.
    pub fn resolve(&self, key: &TypeKey, skip_self: bool, diagnostics: &mut Diagnostics) -> Option<Binding> {
        let span = debug_span!("resolve", %key, skip_self);
        let _guard = span.enter();

        if !skip_self {
            if let Some(binding) = self.registry.accessor(key) {
                debug!("Found accessor");
                return Some(binding.clone());
            }
        }

        if let Some(binding) = self.registry.binding(key) {
            debug!("Found binding");
            return Some(binding.clone());
        }

        self.construct(key, diagnostics)
    }

    /// Same as [`Self::resolve`], recording `UnresolvedType` at `location` if nothing is found
    pub fn require(&self, key: &TypeKey, location: Option<&Location>, diagnostics: &mut Diagnostics) -> Option<Binding> {
        let binding = self.resolve(key, false, diagnostics);
        if binding.is_none() {
            diagnostics.push(Diagnostic::error(BindingErrorKind::UnresolvedType { key: key.to_string() }, location));
        }
        binding
    }

    fn construct(&self, key: &TypeKey, diagnostics: &mut Diagnostics) -> Option<Binding> {
        if key.qualifier.is_some() {
            debug!("Qualified key isn't constructible");
            return None;
        }

        let class = key.ty.class()?;
        let decl = self.model.class(class);
        if !decl.has(Tag::SelfInjectable) {
            debug!("Not self-injectable");
            return None;
        }

        let Some(scope) = self.scope_of(class) else {
            debug!("Constructed per use");
            return Some(Binding::constructor(class));
        };

        let Some(owner) = self.registry.scope_owner(&scope) else {
            diagnostics.push(Diagnostic::error(
                ScopeErrorKind::Unresolved {
                    class: decl.name.clone(),
                    scope: scope.to_string(),
                },
                decl.location.as_ref(),
            ));
            return None;
        };

        debug!(%scope, owner = self.model.class_name(owner.component), "Constructed by scope owner");
        Some(Binding::Constructor(ConstructorBinding {
            class,
            accessor_path: Some(owner.accessor_path.clone()),
            scope_owner: Some(owner.component),
        }))
    }

    /// First scope declared along the hierarchy of `class`
    fn scope_of(&self, class: ClassId) -> Option<Scope> {
        let mut found = None;
        HierarchyWalker::new(self.model).visit(class, |class, _| {
            if found.is_none() {
                found.clone_from(&self.model.class(class).scope);
            }
        });
        found
    }
}
