use alloc::string::ToString as _;
use tracing::{debug, info_span};

use crate::{
    binding::AccessorPath,
    collector::{BindingCollector, CollectionContext},
    config::Config,
    diagnostics::Diagnostics,
    errors::GateErrorKind,
    model::{ClassId, Model, Tag},
    registry::BindingRegistry,
    resolver::GraphResolver,
    scope::Scope,
};

/// Result of collecting one root component
pub struct Analysis<'m> {
    model: &'m Model,
    component: ClassId,
    scope: Option<Scope>,
    registry: BindingRegistry,
    diagnostics: Diagnostics,
}

/// Runs one collection pass rooted at `root`.
///
/// `root` is collected as a real component if it's tagged [`Tag::Component`], otherwise as a module.
/// Problems never abort the pass, see [`Analysis::gate`].
#[must_use]
pub fn analyze(model: &Model, root: ClassId, config: Config) -> Analysis<'_> {
    let span = info_span!("analyze", component = model.class_name(root));
    let _guard = span.enter();

    let is_real_component = model.class(root).has(Tag::Component);
    let mut context = CollectionContext::new();
    let scope = BindingCollector::new(model, config).collect(root, is_real_component, &AccessorPath::root(), &mut context);

    debug!(
        accessors = context.registry.accessors().count(),
        bindings = context.registry.bindings().count(),
        diagnostics = context.diagnostics.len(),
        "Collected"
    );

    Analysis {
        model,
        component: root,
        scope,
        registry: context.registry,
        diagnostics: context.diagnostics,
    }
}

impl<'m> Analysis<'m> {
    #[inline]
    #[must_use]
    pub const fn component(&self) -> ClassId {
        self.component
    }

    /// Scope of the root component chain
    #[inline]
    #[must_use]
    pub const fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Diagnostics recorded by the resolver land here as well
    #[inline]
    #[must_use]
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    #[inline]
    #[must_use]
    pub const fn resolver(&self) -> GraphResolver<'_> {
        GraphResolver::new(self.model, &self.registry)
    }

    /// Splits the analysis into a resolver and the diagnostics it records into
    #[inline]
    #[must_use]
    pub fn resolver_with_diagnostics(&mut self) -> (GraphResolver<'_>, &mut Diagnostics) {
        (GraphResolver::new(self.model, &self.registry), &mut self.diagnostics)
    }

    /// Lets code generation proceed only if no error was recorded.
    /// Warnings don't block.
    ///
    /// # Errors
    /// Returns [`GateErrorKind::ErrorsRecorded`] if the pass recorded any error
    pub fn gate(&self) -> Result<&BindingRegistry, GateErrorKind> {
        match self.diagnostics.error_count() {
            0 => Ok(&self.registry),
            count => Err(GateErrorKind::ErrorsRecorded {
                component: self.model.class_name(self.component).to_string(),
                count,
            }),
        }
    }
}
