use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationErrorKind {
    #[error("@Provides method {method} must not be private")]
    PrivateProvider { method: String },
    #[error("@Provides method {method} must return a value")]
    VoidProvider { method: String },
    #[error("@IntoMap method {method} must return a pair (key, value), found {actual}")]
    NotAPair { method: String, actual: String },
    #[error("{method} can't contribute to both a set and a map")]
    ConflictingContribution { method: String },
    #[error("@Provides method {method} is abstract and not implemented by component {component}")]
    MissingImplementation { method: String, component: String },
    #[error("@Provides method {method} is implemented by more than one method: {candidates}")]
    AmbiguousImplementation { method: String, candidates: String },
    #[error("Accessor {method} must take no arguments and return a value")]
    MalformedAccessor { method: String },
    #[error("Component reference {param}: {ty} isn't a class known to the model")]
    NotAComponentClass { param: String, ty: String },
    #[error("Nested component {class} at {path} is already being collected by an enclosing component")]
    CyclicComponentReference { class: String, path: String },
}
