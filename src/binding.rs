use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::model::{ClassId, Location, MethodId, Model};

/// Parameter names leading from the root component instance to a nested one.
/// Empty for the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessorPath(Vec<String>);

impl AccessorPath {
    #[inline]
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// `None` for the root, otherwise the path itself
    #[inline]
    #[must_use]
    pub fn non_root(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(self.clone())
        }
    }
}

impl Display for AccessorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Build by invoking the designated constructor of `class`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorBinding {
    pub class: ClassId,
    pub accessor_path: Option<AccessorPath>,
    pub scope_owner: Option<ClassId>,
}

/// Build by invoking a declared factory method or property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBinding {
    pub method: MethodId,
    pub accessor_path: Option<AccessorPath>,
    pub scope_owner: Option<ClassId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Set,
    Map,
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Set => f.write_str("set"),
            ContainerKind::Map => f.write_str("map"),
        }
    }
}

/// Multibinding aggregating contributions in encounter order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBinding {
    pub kind: ContainerKind,
    pub contributions: Vec<MethodBinding>,
    /// First contribution, used to point at the container in messages
    pub source: MethodId,
}

impl ContainerBinding {
    #[inline]
    #[must_use]
    pub fn new(kind: ContainerKind, first: MethodBinding) -> Self {
        Self {
            kind,
            source: first.method,
            contributions: alloc::vec![first],
        }
    }

    #[inline]
    #[must_use]
    pub fn contains_method(&self, method: MethodId) -> bool {
        self.contributions.iter().any(|contribution| contribution.method == method)
    }
}

pub trait Merge<T> {
    type Output;

    #[must_use]
    fn merge(self, other: T) -> Self::Output;
}

impl Merge<MethodBinding> for ContainerBinding {
    type Output = Self;

    #[inline]
    fn merge(mut self, contribution: MethodBinding) -> Self::Output {
        self.contributions.push(contribution);
        self
    }
}

impl Merge<ContainerBinding> for ContainerBinding {
    type Output = Self;

    #[inline]
    fn merge(self, other: ContainerBinding) -> Self::Output {
        other.contributions.into_iter().fold(self, Merge::merge)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Constructor(ConstructorBinding),
    Method(MethodBinding),
    Container(ContainerBinding),
}

impl Binding {
    #[inline]
    #[must_use]
    pub fn method(method: MethodId, accessor_path: Option<AccessorPath>, scope_owner: Option<ClassId>) -> Self {
        Self::Method(MethodBinding {
            method,
            accessor_path,
            scope_owner,
        })
    }

    #[inline]
    #[must_use]
    pub const fn constructor(class: ClassId) -> Self {
        Self::Constructor(ConstructorBinding {
            class,
            accessor_path: None,
            scope_owner: None,
        })
    }

    #[inline]
    #[must_use]
    pub const fn as_method(&self) -> Option<&MethodBinding> {
        match self {
            Self::Method(binding) => Some(binding),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_constructor(&self) -> Option<&ConstructorBinding> {
        match self {
            Self::Constructor(binding) => Some(binding),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_container(&self) -> Option<&ContainerBinding> {
        match self {
            Self::Container(binding) => Some(binding),
            _ => None,
        }
    }

    /// Declaration the binding comes from
    #[must_use]
    pub fn location<'m>(&self, model: &'m Model) -> Option<&'m Location> {
        match self {
            Self::Constructor(binding) => model.class(binding.class).location.as_ref(),
            Self::Method(binding) => model.method(binding.method).location.as_ref(),
            Self::Container(binding) => model.method(binding.source).location.as_ref(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn display<'a>(&'a self, model: &'a Model) -> BindingDisplay<'a> {
        BindingDisplay { binding: self, model }
    }
}

pub struct BindingDisplay<'a> {
    binding: &'a Binding,
    model: &'a Model,
}

fn write_owner(f: &mut Formatter<'_>, model: &Model, accessor_path: Option<&AccessorPath>, scope_owner: Option<ClassId>) -> fmt::Result {
    if let Some(path) = accessor_path.filter(|path| !path.is_root()) {
        write!(f, " via {path}")?;
    }
    if let Some(owner) = scope_owner {
        write!(f, " cached in {}", model.class_name(owner))?;
    }
    Ok(())
}

impl Display for BindingDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.binding {
            Binding::Constructor(binding) => {
                write!(f, "constructor {}", self.model.class_name(binding.class))?;
                write_owner(f, self.model, binding.accessor_path.as_ref(), binding.scope_owner)
            }
            Binding::Method(binding) => {
                write!(f, "method {}", self.model.method_path(binding.method))?;
                write_owner(f, self.model, binding.accessor_path.as_ref(), binding.scope_owner)
            }
            Binding::Container(binding) => {
                write!(f, "{} of [", binding.kind)?;
                for (index, contribution) in binding.contributions.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&self.model.method_path(contribution.method))?;
                }
                f.write_str("]")
            }
        }
    }
}
