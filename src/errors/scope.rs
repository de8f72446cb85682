use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeErrorKind {
    #[error("{class} declares scope {scope}, but its hierarchy is already scoped to {existing}")]
    Conflict { class: String, scope: String, existing: String },
    #[error("{method} is scoped to {declared}, which doesn't match the component scope {expected}")]
    Mismatch { method: String, declared: String, expected: String },
    #[error("Cannot find a component with scope {scope} to cache {class}")]
    Unresolved { class: String, scope: String },
}
