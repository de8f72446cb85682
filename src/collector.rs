use alloc::{string::ToString, vec::Vec};
use tracing::{debug, info_span};

use crate::{
    binding::{AccessorPath, Binding, ContainerBinding, ContainerKind, MethodBinding},
    config::Config,
    diagnostics::{Diagnostic, Diagnostics},
    errors::{BindingErrorKind, DeclarationErrorKind, ScopeErrorKind},
    hierarchy::HierarchyWalker,
    model::{ClassId, Location, MethodDecl, MethodId, Model, Tag},
    registry::BindingRegistry,
    scope::{Scope, ScopeOwner},
    types::{Substitution, Type, TypeKey},
};

/// State shared by the whole recursive collection of one root component
#[derive(Debug, Clone, Default)]
pub struct CollectionContext {
    pub registry: BindingRegistry,
    pub diagnostics: Diagnostics,
}

impl CollectionContext {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registry: BindingRegistry::new(),
            diagnostics: Diagnostics::new(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ProvidesKind {
    Plain,
    Set,
    Map,
}

impl ProvidesKind {
    fn of(method: &MethodDecl) -> Option<Self> {
        if method.has(Tag::IntoSet) {
            Some(Self::Set)
        } else if method.has(Tag::IntoMap) {
            Some(Self::Map)
        } else if method.has(Tag::Provides) {
            Some(Self::Plain)
        } else {
            None
        }
    }
}

/// What a chain looks like before its methods are collected
struct ChainSurvey {
    chain: Vec<(ClassId, Substitution)>,
    scope: Option<Scope>,
    /// Concrete methods not yet used to implement an abstract declaration
    concrete: Vec<(MethodId, Substitution)>,
}

/// Per-chain values every method of the chain is collected against
struct ChainContext<'a> {
    component: ClassId,
    is_real_component: bool,
    prefix: &'a AccessorPath,
    scope: Option<&'a Scope>,
}

/// Collects bindings declared by a component, its supertypes and its nested components
pub struct BindingCollector<'m> {
    model: &'m Model,
    config: Config,
    walker: HierarchyWalker<'m>,
}

impl<'m> BindingCollector<'m> {
    #[inline]
    #[must_use]
    pub const fn new(model: &'m Model, config: Config) -> Self {
        Self {
            model,
            config,
            walker: HierarchyWalker::new(model),
        }
    }

    /// Collects `class` into `context` and returns the scope of its chain.
    ///
    /// With `is_real_component` abstract provides declarations must be implemented along the chain
    /// and accessors become requests of the generated component.
    /// Otherwise the class is a module folded into an enclosing component.
    pub fn collect(&self, class: ClassId, is_real_component: bool, prefix: &AccessorPath, context: &mut CollectionContext) -> Option<Scope> {
        let mut stack = Vec::new();
        self.collect_nested(class, is_real_component, prefix, &mut stack, context)
    }

    fn collect_nested(
        &self,
        class: ClassId,
        is_real_component: bool,
        prefix: &AccessorPath,
        stack: &mut Vec<ClassId>,
        context: &mut CollectionContext,
    ) -> Option<Scope> {
        let span = info_span!("collect", component = self.model.class_name(class), path = %prefix);
        let _guard = span.enter();

        stack.push(class);

        let ChainSurvey {
            chain,
            scope,
            mut concrete,
        } = self.survey(class, is_real_component, &mut context.diagnostics);

        let chain_context = ChainContext {
            component: class,
            is_real_component,
            prefix,
            scope: scope.as_ref(),
        };
        for (owner, substitution) in &chain {
            for &method in &self.model.class(*owner).methods {
                self.collect_method(method, substitution, &chain_context, &mut concrete, context);
            }
        }

        if let Some(scope) = &scope {
            let inserted = context.registry.insert_scope_owner(ScopeOwner {
                scope: scope.clone(),
                component: class,
                accessor_path: prefix.clone(),
            });
            if inserted {
                debug!(%scope, "Scope owner recorded");
            } else {
                debug!(%scope, "Scope already owned by an enclosing component");
            }
        }

        self.collect_component_references(class, prefix, stack, context);

        stack.pop();
        scope
    }

    fn survey(&self, class: ClassId, is_real_component: bool, diagnostics: &mut Diagnostics) -> ChainSurvey {
        let chain = self.walker.chain(class);
        let mut scope: Option<(Scope, ClassId)> = None;
        let mut concrete = Vec::new();

        for (owner, substitution) in &chain {
            let decl = self.model.class(*owner);

            if let Some(declared) = &decl.scope {
                match &scope {
                    None => scope = Some((declared.clone(), *owner)),
                    Some((existing, existing_owner)) => diagnostics.push(
                        Diagnostic::error(
                            ScopeErrorKind::Conflict {
                                class: decl.name.clone(),
                                scope: declared.to_string(),
                                existing: existing.to_string(),
                            },
                            decl.location.as_ref(),
                        )
                        .with_related(self.model.class(*existing_owner).location.as_ref()),
                    ),
                }
            }

            if is_real_component {
                concrete.extend(
                    decl.methods
                        .iter()
                        .filter(|method| !self.model.method(**method).is_abstract())
                        .map(|method| (*method, substitution.clone())),
                );
            }
        }

        ChainSurvey {
            chain,
            scope: scope.map(|(scope, _)| scope),
            concrete,
        }
    }

    fn collect_method(
        &self,
        method: MethodId,
        substitution: &Substitution,
        chain: &ChainContext<'_>,
        concrete: &mut Vec<(MethodId, Substitution)>,
        context: &mut CollectionContext,
    ) {
        let decl = self.model.method(method);

        if let Some(kind) = ProvidesKind::of(decl) {
            self.collect_provider(method, kind, substitution, chain, concrete, context);
        } else if decl.has(Tag::Accessor) {
            self.collect_accessor(method, substitution, chain, concrete, context);
        }
    }

    fn collect_provider(
        &self,
        method: MethodId,
        kind: ProvidesKind,
        substitution: &Substitution,
        chain: &ChainContext<'_>,
        concrete: &mut Vec<(MethodId, Substitution)>,
        context: &mut CollectionContext,
    ) {
        let decl = self.model.method(method);
        let location = decl.location.as_ref();
        let method_path = self.model.method_path(method);

        if decl.has(Tag::IntoSet) && decl.has(Tag::IntoMap) {
            context.diagnostics.push(Diagnostic::error(
                DeclarationErrorKind::ConflictingContribution { method: method_path },
                location,
            ));
            return;
        }
        if decl.modifiers.is_private {
            context
                .diagnostics
                .push(Diagnostic::error(DeclarationErrorKind::PrivateProvider { method: method_path }, location));
            return;
        }

        let return_type = self.model.return_type(method, substitution);
        if return_type.is_unit() {
            context
                .diagnostics
                .push(Diagnostic::error(DeclarationErrorKind::VoidProvider { method: method_path }, location));
            return;
        }

        let source = if chain.is_real_component && decl.is_abstract() {
            let implementation = match self.implementations(method, substitution, concrete).as_slice() {
                [index] => concrete.remove(*index).0,
                [] => {
                    context.diagnostics.push(Diagnostic::error(
                        DeclarationErrorKind::MissingImplementation {
                            method: method_path,
                            component: self.model.class_name(chain.component).to_string(),
                        },
                        location,
                    ));
                    return;
                }
                candidates => {
                    let candidates: Vec<_> = candidates.iter().map(|index| self.model.method_path(concrete[*index].0)).collect();
                    context.diagnostics.push(Diagnostic::error(
                        DeclarationErrorKind::AmbiguousImplementation {
                            method: method_path,
                            candidates: candidates.join(", "),
                        },
                        location,
                    ));
                    return;
                }
            };
            if ProvidesKind::of(self.model.method(implementation)).is_some() {
                debug!(method = %method_path, "Implemented by a provider of its own");
                return;
            }
            implementation
        } else {
            method
        };

        let accessor_path = chain.prefix.non_root();
        match kind {
            ProvidesKind::Set => {
                let key = TypeKey::new(Type::set_of(return_type));
                let contribution = MethodBinding {
                    method: source,
                    accessor_path,
                    scope_owner: None,
                };
                self.contribute(key, ContainerKind::Set, contribution, location, context);
            }
            ProvidesKind::Map => {
                let Some((key_type, value_type)) = return_type.tuple_pair() else {
                    context.diagnostics.push(Diagnostic::error(
                        DeclarationErrorKind::NotAPair {
                            method: method_path,
                            actual: return_type.to_string(),
                        },
                        location,
                    ));
                    return;
                };
                let key = TypeKey::qualified(Type::map_of(key_type.clone(), value_type.clone()), decl.qualifier.clone());
                let contribution = MethodBinding {
                    method: source,
                    accessor_path,
                    scope_owner: None,
                };
                self.contribute(key, ContainerKind::Map, contribution, location, context);
            }
            ProvidesKind::Plain => {
                let key = TypeKey::qualified(return_type, decl.qualifier.clone());

                if let Some(declared) = &decl.scope {
                    if chain.scope != Some(declared) {
                        context.diagnostics.push(Diagnostic::error(
                            ScopeErrorKind::Mismatch {
                                method: method_path,
                                declared: declared.to_string(),
                                expected: chain.scope.map_or_else(|| "(unscoped)".to_string(), ToString::to_string),
                            },
                            location,
                        ));
                    }
                }

                let scope_owner = decl.scope.as_ref().map(|_| chain.component);
                let registered = self.register(key.clone(), Binding::method(source, accessor_path, scope_owner), location, context);
                if let (true, Some(declared)) = (registered, &decl.scope) {
                    context.registry.mark_scoped(key, declared.clone());
                }
            }
        }
    }

    fn collect_accessor(
        &self,
        method: MethodId,
        substitution: &Substitution,
        chain: &ChainContext<'_>,
        concrete: &[(MethodId, Substitution)],
        context: &mut CollectionContext,
    ) {
        let decl = self.model.method(method);
        let location = decl.location.as_ref();
        let return_type = self.model.return_type(method, substitution);

        if !decl.is_abstract() {
            debug!(method = %self.model.method_path(method), "Method with a body isn't a request");
            return;
        }
        if !decl.params.is_empty() || return_type.is_unit() {
            context.diagnostics.push(Diagnostic::error(
                DeclarationErrorKind::MalformedAccessor {
                    method: self.model.method_path(method),
                },
                location,
            ));
            return;
        }
        if chain.is_real_component
            && concrete
                .iter()
                .any(|(candidate, candidate_substitution)| self.model.overrides(*candidate, candidate_substitution, method, substitution))
        {
            debug!(method = %self.model.method_path(method), "Accessor implemented along the chain");
            return;
        }

        let key = TypeKey::qualified(return_type, decl.qualifier.clone());
        let binding = Binding::method(method, chain.prefix.non_root(), None);

        if !chain.is_real_component {
            self.register(key, binding, location, context);
            return;
        }

        match context.registry.insert_accessor(key.clone(), binding) {
            Ok(()) => debug!(%key, "Accessor registered"),
            Err(existing) if self.config.warn_on_shadowed_accessor => context.diagnostics.push(
                Diagnostic::warning(
                    BindingErrorKind::ShadowedAccessor {
                        key: key.to_string(),
                        new: self.model.method_path(method),
                        old: existing.display(self.model).to_string(),
                    },
                    location,
                )
                .with_related(existing.location(self.model)),
            ),
            Err(_) => debug!(%key, "Accessor already requested"),
        }
    }

    /// Positions of the concrete methods implementing `method`.
    /// A candidate overridden again by a more derived candidate doesn't count.
    fn implementations(&self, method: MethodId, substitution: &Substitution, concrete: &[(MethodId, Substitution)]) -> Vec<usize> {
        let matching: Vec<usize> = concrete
            .iter()
            .enumerate()
            .filter(|(_, (candidate, candidate_substitution))| self.model.overrides(*candidate, candidate_substitution, method, substitution))
            .map(|(index, _)| index)
            .collect();

        matching
            .iter()
            .copied()
            .filter(|index| {
                !matching
                    .iter()
                    .any(|other| other != index && self.inherits(concrete[*other].0, concrete[*index].0))
            })
            .collect()
    }

    /// Whether the owner of `sub` has the owner of `sup` among its supertypes
    fn inherits(&self, sub: MethodId, sup: MethodId) -> bool {
        let (Some(sub_owner), Some(sup_owner)) = (self.model.method(sub).owner, self.model.method(sup).owner) else {
            return false;
        };
        sub_owner != sup_owner
            && self
                .walker
                .chain(sub_owner)
                .iter()
                .any(|(class, _)| *class == sup_owner)
    }

    fn contribute(
        &self,
        key: TypeKey,
        kind: ContainerKind,
        contribution: MethodBinding,
        location: Option<&Location>,
        context: &mut CollectionContext,
    ) {
        if self.config.dedupe_contributions
            && context
                .registry
                .binding(&key)
                .and_then(Binding::as_container)
                .is_some_and(|container| container.contains_method(contribution.method))
        {
            debug!(%key, method = %self.model.method_path(contribution.method), "Contribution already present");
            return;
        }

        self.register(key, Binding::Container(ContainerBinding::new(kind, contribution)), location, context);
    }

    /// Returns `false` if the key was already taken by an incompatible binding
    fn register(&self, key: TypeKey, binding: Binding, location: Option<&Location>, context: &mut CollectionContext) -> bool {
        let new = binding.display(self.model).to_string();

        match context.registry.insert(key.clone(), binding) {
            Ok(()) => {
                debug!(%key, binding = %new, "Registered");
                true
            }
            Err(existing) => {
                context.diagnostics.push(
                    Diagnostic::error(
                        BindingErrorKind::Duplicate {
                            key: key.to_string(),
                            new,
                            old: existing.display(self.model).to_string(),
                        },
                        location,
                    )
                    .with_related(existing.location(self.model)),
                );
                false
            }
        }
    }

    fn collect_component_references(&self, class: ClassId, prefix: &AccessorPath, stack: &mut Vec<ClassId>, context: &mut CollectionContext) {
        let decl = self.model.class(class);
        let Some(constructor) = &decl.constructor else {
            return;
        };

        for param in constructor.params.iter().filter(|param| param.has(Tag::ComponentReference)) {
            let path = prefix.child(param.name.as_str());

            let Some(nested) = param.ty.class() else {
                context.diagnostics.push(Diagnostic::error(
                    DeclarationErrorKind::NotAComponentClass {
                        param: param.name.clone(),
                        ty: param.ty.to_string(),
                    },
                    decl.location.as_ref(),
                ));
                continue;
            };
            if stack.contains(&nested) {
                context.diagnostics.push(Diagnostic::error(
                    DeclarationErrorKind::CyclicComponentReference {
                        class: self.model.class_name(nested).to_string(),
                        path: path.to_string(),
                    },
                    decl.location.as_ref(),
                ));
                continue;
            }

            let is_real_component = self.model.class(nested).has(Tag::Component);
            self.collect_nested(nested, is_real_component, &path, stack, context);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{BindingCollector, CollectionContext};
    use crate::{
        binding::{AccessorPath, Binding, ContainerKind},
        config::Config,
        diagnostics::Category,
        model::{ClassDecl, ClassId, Constructor, Location, MethodDecl, Model, Param, Tag},
        scope::Scope,
        types::{Qualifier, Type, TypeKey},
    };

    use alloc::{
        format,
        string::{String, ToString},
        vec,
        vec::Vec,
    };
    use tracing_test::traced_test;

    fn collect(model: &Model, class: ClassId) -> CollectionContext {
        collect_with(model, class, Config::default())
    }

    fn collect_with(model: &Model, class: ClassId, config: Config) -> CollectionContext {
        let mut context = CollectionContext::new();
        let is_real_component = model.class(class).has(Tag::Component);
        BindingCollector::new(model, config).collect(class, is_real_component, &AccessorPath::root(), &mut context);
        context
    }

    fn foo() -> Type {
        Type::external("Foo")
    }

    #[test]
    #[traced_test]
    fn test_duplicate_keeps_first() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let first = model.add_method(
            component,
            MethodDecl::new("first", Type::external("Baz"))
                .tag(Tag::Provides)
                .at(Location::new("App.kt", 2, 5)),
        );
        model.add_method(
            component,
            MethodDecl::new("second", Type::external("Baz"))
                .tag(Tag::Provides)
                .at(Location::new("App.kt", 3, 5)),
        );

        let context = collect(&model, component);
        let key = TypeKey::new(Type::external("Baz"));

        assert_eq!(context.registry.binding(&key).unwrap().as_method().unwrap().method, first);
        let duplicates: Vec<_> = context.diagnostics.of_category(Category::DuplicateBinding).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(context.diagnostics.len(), 1);

        let message = duplicates[0].message();
        assert!(message.contains("AppComponent.second"));
        assert!(message.contains("AppComponent.first"));
        assert_eq!(duplicates[0].location, Some(Location::new("App.kt", 3, 5)));
        assert_eq!(duplicates[0].related, Some(Location::new("App.kt", 2, 5)));
        assert!(logs_contain("already provided by method AppComponent.first"));
    }

    #[test]
    fn test_self_declared_before_supertypes() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let base = model.add_class(ClassDecl::new("BaseComponent"));
        model.add_supertype(component, model.type_of(base));

        let inherited = model.add_method(base, MethodDecl::new("inherited", foo()).tag(Tag::Provides));
        let own = model.add_method(component, MethodDecl::new("own", foo()).tag(Tag::Provides));

        let context = collect(&model, component);
        let binding = context.registry.binding(&TypeKey::new(foo())).unwrap();

        assert_eq!(binding.as_method().unwrap().method, own);
        assert_ne!(binding.as_method().unwrap().method, inherited);
        assert_eq!(context.diagnostics.of_category(Category::DuplicateBinding).count(), 1);
    }

    #[test]
    fn test_set_contributions_merge_in_order() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let first = model.add_method(component, MethodDecl::new("first", foo()).tag(Tag::IntoSet));
        let second = model.add_method(component, MethodDecl::new("second", foo()).tag(Tag::IntoSet));

        let context = collect(&model, component);
        let container = context
            .registry
            .binding(&TypeKey::new(Type::set_of(foo())))
            .unwrap()
            .as_container()
            .unwrap();

        assert!(context.diagnostics.is_empty());
        assert_eq!(container.kind, ContainerKind::Set);
        let methods: Vec<_> = container.contributions.iter().map(|contribution| contribution.method).collect();
        assert_eq!(methods, [first, second]);
    }

    #[test]
    fn test_map_contribution_requires_pair() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        model.add_method(component, MethodDecl::new("broken", Type::external("Int")).tag(Tag::IntoMap));
        let entry = model.add_method(
            component,
            MethodDecl::new("entry", Type::pair(Type::external("String"), foo()))
                .tag(Tag::IntoMap)
                .qualifier(Qualifier::new("handlers")),
        );

        let context = collect(&model, component);

        assert_eq!(context.diagnostics.len(), 1);
        assert_eq!(context.diagnostics.of_category(Category::InvalidDeclaration).count(), 1);

        let key = TypeKey::qualified(Type::map_of(Type::external("String"), foo()), Some(Qualifier::new("handlers")));
        let container = context.registry.binding(&key).unwrap().as_container().unwrap();
        assert_eq!(container.kind, ContainerKind::Map);
        assert_eq!(container.contributions.len(), 1);
        assert_eq!(container.contributions[0].method, entry);
    }

    #[test]
    fn test_container_kind_mismatch_is_duplicate() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        model.add_method(component, MethodDecl::new("element", foo()).tag(Tag::IntoSet));
        model.add_method(component, MethodDecl::new("plain", Type::set_of(foo())).tag(Tag::Provides));

        let context = collect(&model, component);

        assert_eq!(context.diagnostics.of_category(Category::DuplicateBinding).count(), 1);
        assert!(context
            .registry
            .binding(&TypeKey::new(Type::set_of(foo())))
            .unwrap()
            .as_container()
            .is_some());
    }

    #[test]
    fn test_invalid_providers_register_nothing() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        model.add_method(component, MethodDecl::new("hidden", foo()).tag(Tag::Provides).private());
        model.add_method(component, MethodDecl::new("nothing", Type::Unit).tag(Tag::Provides));
        model.add_method(component, MethodDecl::new("both", foo()).tag(Tag::IntoSet).tag(Tag::IntoMap));

        let context = collect(&model, component);

        assert_eq!(context.diagnostics.of_category(Category::InvalidDeclaration).count(), 3);
        assert_eq!(context.registry.bindings().count(), 0);
    }

    #[test]
    fn test_abstract_provider_uses_implementation() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let module = model.add_class(ClassDecl::new("Module"));
        model.add_supertype(component, model.type_of(module));

        let implementation = model.add_method(component, MethodDecl::new("foo", foo()));
        model.add_method(module, MethodDecl::new("foo", foo()).tag(Tag::Provides).without_body());
        model.add_method(module, MethodDecl::new("bar", Type::external("Bar")).tag(Tag::Provides).without_body());

        let context = collect(&model, component);

        let binding = context.registry.binding(&TypeKey::new(foo())).unwrap();
        assert_eq!(binding.as_method().unwrap().method, implementation);
        assert_eq!(context.diagnostics.of_category(Category::MissingImplementation).count(), 1);
        assert!(context.registry.binding(&TypeKey::new(Type::external("Bar"))).is_none());
    }

    #[test]
    fn test_abstract_provider_in_generic_module() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let module = model.add_class(ClassDecl::new("Module").type_param("T"));
        model.add_supertype(component, model.parameterized(module, vec![foo()]));

        model.add_method(component, MethodDecl::new("bind", foo()).param(Param::new("value", foo())));
        model.add_method(
            module,
            MethodDecl::new("bind", Type::param("T"))
                .param(Param::new("value", Type::param("T")))
                .tag(Tag::Provides)
                .without_body(),
        );

        let context = collect(&model, component);

        assert!(context.diagnostics.is_empty());
        assert!(context.registry.binding(&TypeKey::new(foo())).is_some());
    }

    #[test]
    fn test_scope_conflict_keeps_first() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("Singleton")));
        let base = model.add_class(ClassDecl::new("BaseComponent").scope(Scope::new("Request")));
        model.add_supertype(component, model.type_of(base));

        let mut context = CollectionContext::new();
        let scope = BindingCollector::new(&model, Config::default()).collect(component, true, &AccessorPath::root(), &mut context);

        assert_eq!(scope, Some(Scope::new("Singleton")));
        assert_eq!(context.diagnostics.of_category(Category::ScopeConflict).count(), 1);
        assert_eq!(context.registry.scope_owners().count(), 1);
        assert_eq!(context.registry.scope_owner(&Scope::new("Singleton")).unwrap().component, component);
    }

    #[test]
    fn test_scope_mismatch_still_registers() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("Singleton")));
        model.add_method(component, MethodDecl::new("foo", foo()).tag(Tag::Provides).scope(Scope::new("Request")));
        model.add_method(
            component,
            MethodDecl::new("bar", Type::external("Bar"))
                .tag(Tag::Provides)
                .scope(Scope::new("Singleton")),
        );

        let context = collect(&model, component);

        assert_eq!(context.diagnostics.len(), 1);
        assert_eq!(context.diagnostics.of_category(Category::ScopeMismatch).count(), 1);
        assert!(context.registry.binding(&TypeKey::new(foo())).is_some());

        let bar = TypeKey::new(Type::external("Bar"));
        assert_eq!(context.registry.scope_of(&bar), Some(&Scope::new("Singleton")));
        assert_eq!(context.registry.binding(&bar).unwrap().as_method().unwrap().scope_owner, Some(component));
    }

    #[test]
    fn test_accessors_first_wins() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let first = model.add_method(component, MethodDecl::new("foo", foo()).tag(Tag::Accessor).without_body());
        model.add_method(component, MethodDecl::new("otherFoo", foo()).tag(Tag::Accessor).without_body());

        let context = collect(&model, component);
        let key = TypeKey::new(foo());

        assert!(context.diagnostics.is_empty());
        assert_eq!(context.registry.accessor(&key).unwrap().as_method().unwrap().method, first);
        assert!(context.registry.binding(&key).is_none());

        let context = collect_with(
            &model,
            component,
            Config {
                warn_on_shadowed_accessor: true,
                ..Config::default()
            },
        );
        assert!(!context.diagnostics.has_errors());
        assert_eq!(context.diagnostics.of_category(Category::DuplicateBinding).count(), 1);
    }

    #[test]
    fn test_malformed_and_implemented_accessors() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let base = model.add_class(ClassDecl::new("Base"));
        model.add_supertype(component, model.type_of(base));

        model.add_method(component, MethodDecl::new("foo", foo()));
        model.add_method(base, MethodDecl::new("foo", foo()).tag(Tag::Accessor).without_body());
        model.add_method(
            base,
            MethodDecl::new("bar", Type::external("Bar"))
                .tag(Tag::Accessor)
                .param(Param::new("id", Type::external("Int")))
                .without_body(),
        );

        let context = collect(&model, component);

        assert_eq!(context.registry.accessors().count(), 0);
        assert_eq!(context.diagnostics.of_category(Category::InvalidDeclaration).count(), 1);
    }

    #[test]
    #[traced_test]
    fn test_accessor_with_body_is_not_request() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        model.add_method(component, MethodDecl::new("foo", foo()).tag(Tag::Accessor));

        let context = collect(&model, component);

        assert!(context.diagnostics.is_empty());
        assert_eq!(context.registry.accessors().count(), 0);
        assert_eq!(context.registry.bindings().count(), 0);
        assert!(logs_contain("isn't a request"));
    }

    #[test]
    fn test_losing_scoped_duplicate_not_marked_scoped() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("S")));
        let first = model.add_method(component, MethodDecl::new("first", Type::external("Baz")).tag(Tag::Provides));
        model.add_method(
            component,
            MethodDecl::new("second", Type::external("Baz"))
                .tag(Tag::Provides)
                .scope(Scope::new("S")),
        );

        let context = collect(&model, component);
        let key = TypeKey::new(Type::external("Baz"));

        assert_eq!(context.registry.binding(&key), Some(&Binding::method(first, None, None)));
        assert_eq!(context.registry.scope_of(&key), None);
        assert_eq!(context.registry.scoped().count(), 0);
        assert_eq!(context.diagnostics.of_category(Category::DuplicateBinding).count(), 1);
    }

    #[test]
    fn test_scoped_first_binding_stays_scoped() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("S")));
        model.add_method(
            component,
            MethodDecl::new("first", Type::external("Baz"))
                .tag(Tag::Provides)
                .scope(Scope::new("S")),
        );
        model.add_method(component, MethodDecl::new("second", Type::external("Baz")).tag(Tag::Provides));

        let context = collect(&model, component);

        assert_eq!(context.registry.scope_of(&TypeKey::new(Type::external("Baz"))), Some(&Scope::new("S")));
    }

    #[test]
    fn test_ambiguous_implementation() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let left = model.add_class(ClassDecl::new("Left"));
        let right = model.add_class(ClassDecl::new("Right"));
        model.add_supertype(component, model.type_of(left));
        model.add_supertype(component, model.type_of(right));

        model.add_method(component, MethodDecl::new("foo", foo()).tag(Tag::Provides).without_body());
        model.add_method(left, MethodDecl::new("foo", foo()));
        model.add_method(right, MethodDecl::new("foo", foo()));

        let context = collect(&model, component);

        let invalid: Vec<_> = context.diagnostics.of_category(Category::InvalidDeclaration).collect();
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].message().contains("Left.foo, Right.foo"));
        assert!(context.registry.binding(&TypeKey::new(foo())).is_none());
    }

    #[test]
    fn test_most_derived_implementation_wins() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let base = model.add_class(ClassDecl::new("Base"));
        let module = model.add_class(ClassDecl::new("Module"));
        model.add_supertype(component, model.type_of(base));
        model.add_supertype(component, model.type_of(module));

        let derived = model.add_method(component, MethodDecl::new("foo", foo()));
        model.add_method(base, MethodDecl::new("foo", foo()));
        model.add_method(module, MethodDecl::new("foo", foo()).tag(Tag::Provides).without_body());

        let context = collect(&model, component);

        assert!(context.diagnostics.is_empty());
        assert_eq!(context.registry.binding(&TypeKey::new(foo())), Some(&Binding::method(derived, None, None)));
    }

    #[test]
    fn test_nested_module_accessor_becomes_binding() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let module = model.add_class(ClassDecl::new("NetworkModule"));
        let module_type = model.type_of(module);
        model.set_constructor(
            component,
            Constructor::new(vec![Param::new("network", module_type).tag(Tag::ComponentReference)]),
        );
        let client = model.add_method(module, MethodDecl::new("client", Type::external("Client")).tag(Tag::Accessor).without_body());
        let element = model.add_method(module, MethodDecl::new("interceptor", foo()).tag(Tag::IntoSet));

        let context = collect(&model, component);
        let expected = AccessorPath::root().child("network");

        assert!(context.diagnostics.is_empty());
        let binding = context.registry.binding(&TypeKey::new(Type::external("Client"))).unwrap();
        assert_eq!(binding.as_method().unwrap().method, client);
        assert_eq!(binding.as_method().unwrap().accessor_path, Some(expected.clone()));

        let container = context
            .registry
            .binding(&TypeKey::new(Type::set_of(foo())))
            .unwrap()
            .as_container()
            .unwrap();
        assert_eq!(container.contributions[0].method, element);
        assert_eq!(container.contributions[0].accessor_path, Some(expected));
    }

    #[test]
    fn test_nested_scope_owner_path() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("RequestComponent").tag(Tag::Component).scope(Scope::new("Request")));
        let parent = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("Singleton")));
        let parent_type = model.type_of(parent);
        model.set_constructor(
            component,
            Constructor::new(vec![Param::new("parent", parent_type).tag(Tag::ComponentReference)]),
        );

        let context = collect(&model, component);

        let owner = context.registry.scope_owner(&Scope::new("Singleton")).unwrap();
        assert_eq!(owner.component, parent);
        assert_eq!(owner.accessor_path.to_string(), "parent");
        assert!(context.registry.scope_owner(&Scope::new("Request")).unwrap().accessor_path.is_root());
    }

    #[test]
    fn test_component_reference_cycle() {
        let mut model = Model::new();
        let a = model.add_class(ClassDecl::new("A").tag(Tag::Component));
        let b = model.add_class(ClassDecl::new("B").tag(Tag::Component));
        let (a_type, b_type) = (model.type_of(a), model.type_of(b));
        model.set_constructor(a, Constructor::new(vec![Param::new("b", b_type).tag(Tag::ComponentReference)]));
        model.set_constructor(b, Constructor::new(vec![Param::new("a", a_type).tag(Tag::ComponentReference)]));
        model.add_method(b, MethodDecl::new("foo", foo()).tag(Tag::Provides));

        let context = collect(&model, a);

        assert_eq!(context.diagnostics.of_category(Category::InvalidDeclaration).count(), 1);
        assert!(context.diagnostics.iter().next().unwrap().message().contains("b.a"));
        assert!(context.registry.binding(&TypeKey::new(foo())).is_some());
    }

    #[test]
    fn test_component_reference_to_external_type() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        model.set_constructor(
            component,
            Constructor::new(vec![Param::new("parent", Type::external("Missing")).tag(Tag::ComponentReference)]),
        );

        let context = collect(&model, component);

        assert_eq!(context.diagnostics.of_category(Category::InvalidDeclaration).count(), 1);
    }

    #[test]
    fn test_shared_module_contributions() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component));
        let module = model.add_class(ClassDecl::new("PluginModule"));
        let module_type = model.type_of(module);
        model.set_constructor(
            component,
            Constructor::new(vec![
                Param::new("first", module_type.clone()).tag(Tag::ComponentReference),
                Param::new("second", module_type).tag(Tag::ComponentReference),
            ]),
        );
        model.add_method(module, MethodDecl::new("plugin", foo()).tag(Tag::IntoSet));

        let key = TypeKey::new(Type::set_of(foo()));

        let context = collect(&model, component);
        let container = context.registry.binding(&key).unwrap().as_container().unwrap();
        let paths: Vec<_> = container
            .contributions
            .iter()
            .map(|contribution| contribution.accessor_path.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(paths, ["first", "second"]);

        let context = collect_with(
            &model,
            component,
            Config {
                dedupe_contributions: true,
                ..Config::default()
            },
        );
        let container = context.registry.binding(&key).unwrap().as_container().unwrap();
        assert_eq!(container.contributions.len(), 1);
        assert!(context.diagnostics.is_empty());
    }

    #[test]
    fn test_module_abstract_provider_kept() {
        let mut model = Model::new();
        let module = model.add_class(ClassDecl::new("Module"));
        let declaration = model.add_method(module, MethodDecl::new("foo", foo()).tag(Tag::Provides).without_body());

        let context = collect(&model, module);

        assert!(context.diagnostics.is_empty());
        assert_eq!(
            context.registry.binding(&TypeKey::new(foo())),
            Some(&Binding::method(declaration, None, None))
        );
    }

    #[test]
    fn test_collect_is_deterministic() {
        let mut model = Model::new();
        let component = model.add_class(ClassDecl::new("AppComponent").tag(Tag::Component).scope(Scope::new("Singleton")));
        let module = model.add_class(ClassDecl::new("Module"));
        model.add_supertype(component, model.type_of(module));
        model.add_method(component, MethodDecl::new("a", foo()).tag(Tag::IntoSet));
        model.add_method(module, MethodDecl::new("b", foo()).tag(Tag::IntoSet));
        model.add_method(module, MethodDecl::new("c", Type::external("C")).tag(Tag::Provides));
        model.add_method(module, MethodDecl::new("c2", Type::external("C")).tag(Tag::Provides));

        let first = collect(&model, component);
        let second = collect(&model, component);

        let dump = |context: &CollectionContext| {
            context
                .registry
                .bindings()
                .map(|(key, binding)| alloc::format!("{key} = {}", binding.display(&model)))
                .chain(context.diagnostics.iter().map(ToString::to_string))
                .collect::<Vec<_>>()
        };
        assert_eq!(dump(&first), dump(&second));
    }
}
