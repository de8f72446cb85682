use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingErrorKind {
    #[error("Cannot provide {key} with {new}: already provided by {old}")]
    Duplicate { key: String, new: String, old: String },
    #[error("Accessor {new} for {key} is shadowed by {old}")]
    ShadowedAccessor { key: String, new: String, old: String },
    #[error("Cannot find a binding for {key}")]
    UnresolvedType { key: String },
}
