mod binding;
mod declaration;
mod report;
mod scope;

pub use binding::BindingErrorKind;
pub use declaration::DeclarationErrorKind;
pub use report::{GateErrorKind, ReportErrorKind};
pub use scope::ScopeErrorKind;

/// Any problem the analysis can record against a pass
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    #[error(transparent)]
    Declaration(#[from] DeclarationErrorKind),
    #[error(transparent)]
    Binding(#[from] BindingErrorKind),
    #[error(transparent)]
    Scope(#[from] ScopeErrorKind),
}
