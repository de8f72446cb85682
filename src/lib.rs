#![no_std]

extern crate alloc;

pub(crate) mod analysis;
pub(crate) mod binding;
pub(crate) mod collector;
pub(crate) mod config;
pub(crate) mod diagnostics;
pub(crate) mod errors;
pub(crate) mod hierarchy;
pub(crate) mod model;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod scope;
pub(crate) mod types;

pub use analysis::{analyze, Analysis};
pub use binding::{AccessorPath, Binding, BindingDisplay, ConstructorBinding, ContainerBinding, ContainerKind, Merge, MethodBinding};
pub use collector::{BindingCollector, CollectionContext};
pub use config::Config;
pub use diagnostics::{Category, Diagnostic, Diagnostics, Reporter, Severity};
pub use errors::{AnalysisErrorKind, BindingErrorKind, DeclarationErrorKind, GateErrorKind, ReportErrorKind, ScopeErrorKind};
pub use hierarchy::HierarchyWalker;
pub use model::{ClassDecl, ClassId, Constructor, Location, MethodDecl, MethodId, Model, Modifiers, Param, Tag};
pub use registry::BindingRegistry;
pub use resolver::GraphResolver;
pub use scope::{Scope, ScopeOwner};
pub use types::{Qualifier, Substitution, Type, TypeKey};
