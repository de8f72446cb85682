use alloc::{boxed::Box, collections::BTreeMap, string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::model::ClassId;

/// Structural type identity as seen by the source model.
///
/// Two types are the same dependency iff they are structurally equal,
/// so `Named` keeps both the declared name and the model class (if any).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Type {
    Named { name: String, class: Option<ClassId>, args: Vec<Type> },
    /// Type variable, replaced through [`Substitution`]
    Param(String),
    Tuple(Vec<Type>),
    Set(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Unit,
}

pub type Substitution = BTreeMap<String, Type>;

impl Type {
    /// Type declared outside of the model (`Int`, `String`, ...)
    #[inline]
    #[must_use]
    pub fn external(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            class: None,
            args: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    #[inline]
    #[must_use]
    pub fn set_of(element: Type) -> Self {
        Self::Set(Box::new(element))
    }

    #[inline]
    #[must_use]
    pub fn map_of(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    #[inline]
    #[must_use]
    pub fn pair(first: Type, second: Type) -> Self {
        Self::Tuple(alloc::vec![first, second])
    }

    #[must_use]
    pub fn with_args(self, args: Vec<Type>) -> Self {
        match self {
            Self::Named { name, class, .. } => Self::Named { name, class, args },
            other => other,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Model class this type refers to, if it's declared in the model
    #[inline]
    #[must_use]
    pub fn class(&self) -> Option<ClassId> {
        match self {
            Self::Named { class, .. } => *class,
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Type] {
        match self {
            Self::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Key and value types of a two-element tuple
    #[must_use]
    pub fn tuple_pair(&self) -> Option<(&Type, &Type)> {
        match self {
            Self::Tuple(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    #[must_use]
    pub fn substitute(&self, substitution: &Substitution) -> Type {
        if substitution.is_empty() {
            return self.clone();
        }

        match self {
            Self::Param(name) => substitution.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named { name, class, args } => Self::Named {
                name: name.clone(),
                class: *class,
                args: args.iter().map(|arg| arg.substitute(substitution)).collect(),
            },
            Self::Tuple(items) => Self::Tuple(items.iter().map(|item| item.substitute(substitution)).collect()),
            Self::Set(element) => Self::Set(Box::new(element.substitute(substitution))),
            Self::Map(key, value) => Self::Map(Box::new(key.substitute(substitution)), Box::new(value.substitute(substitution))),
            Self::Unit => Self::Unit,
        }
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args, .. } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, args)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Param(name) => f.write_str(name),
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
            Self::Set(element) => write!(f, "Set<{element}>"),
            Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Unit => f.write_str("Unit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Qualifier(pub String);

impl Qualifier {
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@Named(\"{}\")", self.0)
    }
}

/// One requested dependency: a type plus an optional qualifier.
/// Keys differing only by qualifier are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeKey {
    pub ty: Type,
    pub qualifier: Option<Qualifier>,
}

impl TypeKey {
    #[inline]
    #[must_use]
    pub const fn new(ty: Type) -> Self {
        Self { ty, qualifier: None }
    }

    #[inline]
    #[must_use]
    pub const fn qualified(ty: Type, qualifier: Option<Qualifier>) -> Self {
        Self { ty, qualifier }
    }
}

impl From<Type> for TypeKey {
    fn from(ty: Type) -> Self {
        Self::new(ty)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}
