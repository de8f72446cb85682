use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};
use tracing::{error, warn};

use crate::{
    errors::{AnalysisErrorKind, BindingErrorKind, DeclarationErrorKind, ReportErrorKind, ScopeErrorKind},
    model::Location,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Problem taxonomy the host build gate reasons about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    InvalidDeclaration,
    MissingImplementation,
    DuplicateBinding,
    ScopeConflict,
    ScopeMismatch,
    UnresolvedScope,
    UnresolvedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: AnalysisErrorKind,
    pub location: Option<Location>,
    /// Second declaration involved, e.g. the binding that was registered first
    pub related: Option<Location>,
}

impl Diagnostic {
    #[inline]
    #[must_use]
    pub fn error(kind: impl Into<AnalysisErrorKind>, location: Option<&Location>) -> Self {
        Self {
            severity: Severity::Error,
            kind: kind.into(),
            location: location.cloned(),
            related: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn warning(kind: impl Into<AnalysisErrorKind>, location: Option<&Location>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, location)
        }
    }

    #[inline]
    #[must_use]
    pub fn with_related(mut self, related: Option<&Location>) -> Self {
        self.related = related.cloned();
        self
    }

    #[must_use]
    pub fn category(&self) -> Category {
        use AnalysisErrorKind::{Binding, Declaration, Scope};

        match &self.kind {
            Declaration(DeclarationErrorKind::MissingImplementation { .. }) => Category::MissingImplementation,
            Declaration(_) => Category::InvalidDeclaration,
            Binding(BindingErrorKind::Duplicate { .. } | BindingErrorKind::ShadowedAccessor { .. }) => Category::DuplicateBinding,
            Binding(BindingErrorKind::UnresolvedType { .. }) => Category::UnresolvedType,
            Scope(ScopeErrorKind::Conflict { .. }) => Category::ScopeConflict,
            Scope(ScopeErrorKind::Mismatch { .. }) => Category::ScopeMismatch,
            Scope(ScopeErrorKind::Unresolved { .. }) => Category::UnresolvedScope,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match &self.related {
            Some(related) => alloc::format!("{} (see {related})", self.kind),
            None => alloc::format!("{}", self.kind),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}: {}", self.severity, self.message())
    }
}

/// Host side, position-aware sink
pub trait Reporter {
    /// # Errors
    /// Returns an error if the host fails to accept the message
    fn report(&mut self, severity: Severity, message: &str, location: Option<&Location>) -> anyhow::Result<()>;
}

/// Accumulates diagnostics of one analysis pass.
/// Recording never aborts the pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(category = ?diagnostic.category(), "{}", diagnostic),
            Severity::Warning => warn!(category = ?diagnostic.category(), "{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    #[inline]
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[inline]
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |diagnostic| diagnostic.category() == category)
    }

    /// Replays every diagnostic into `reporter` in recording order
    ///
    /// # Errors
    /// Returns the first failure of the reporter, remaining diagnostics aren't sent
    pub fn report_to<R: Reporter>(&self, reporter: &mut R) -> Result<(), ReportErrorKind> {
        for diagnostic in &self.entries {
            reporter.report(diagnostic.severity, &diagnostic.message(), diagnostic.location.as_ref())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
