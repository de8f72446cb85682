use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ReportErrorKind {
    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GateErrorKind {
    #[error("Analysis of {component} recorded {count} error(s), code generation refused")]
    ErrorsRecorded { component: String, count: usize },
}
