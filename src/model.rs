//! In-memory class model filled by the upstream extraction step.
//!
//! Declarations live in one arena and are addressed by copyable ids,
//! so the collector can hold plain indices instead of references into the source tree.

use alloc::{collections::BTreeSet, string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::{
    scope::Scope,
    types::{Qualifier, Substitution, Type},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(u32);

/// Declaration kinds attached by the extraction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Plain binding method
    Provides,
    /// Contribution to a `Set` multibinding
    IntoSet,
    /// Contribution to a `Map` multibinding, returns a `(key, value)` pair
    IntoMap,
    /// Bare no-argument request for a type inside a component
    Accessor,
    /// Class that receives a generated implementation
    Component,
    /// Constructor parameter holding a nested component instance
    ComponentReference,
    /// Class constructible by its designated constructor without an explicit binding
    SelfInjectable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[inline]
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_abstract: bool,
    /// Not reachable from generated code
    pub is_private: bool,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub tags: BTreeSet<Tag>,
}

impl Param {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: BTreeSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    #[inline]
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Constructor {
    pub params: Vec<Param>,
}

impl Constructor {
    #[inline]
    #[must_use]
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub supertypes: Vec<Type>,
    pub methods: Vec<MethodId>,
    pub constructor: Option<Constructor>,
    pub tags: BTreeSet<Tag>,
    pub scope: Option<Scope>,
    pub location: Option<Location>,
}

impl ClassDecl {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            supertypes: Vec::new(),
            methods: Vec::new(),
            constructor: None,
            tags: BTreeSet::new(),
            scope: None,
            location: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    #[inline]
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[inline]
    #[must_use]
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[inline]
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub owner: Option<ClassId>,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub tags: BTreeSet<Tag>,
    pub modifiers: Modifiers,
    pub qualifier: Option<Qualifier>,
    pub scope: Option<Scope>,
    pub location: Option<Location>,
}

impl MethodDecl {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            owner: None,
            params: Vec::new(),
            return_type,
            tags: BTreeSet::new(),
            modifiers: Modifiers::default(),
            qualifier: None,
            scope: None,
            location: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    #[inline]
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Marks the declaration as abstract
    #[inline]
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn private(mut self) -> Self {
        self.modifiers.is_private = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    #[inline]
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[inline]
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    classes: Vec<ClassDecl>,
    methods: Vec<MethodDecl>,
}

impl Model {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            classes: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn add_class(&mut self, class: ClassDecl) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(class);
        id
    }

    /// Declares `method` on `owner`; declaration order is kept
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_method(&mut self, owner: ClassId, mut method: MethodDecl) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        method.owner = Some(owner);
        self.methods.push(method);
        self.classes[owner.0 as usize].methods.push(id);
        id
    }

    pub fn add_supertype(&mut self, class: ClassId, supertype: Type) {
        self.classes[class.0 as usize].supertypes.push(supertype);
    }

    pub fn set_constructor(&mut self, class: ClassId, constructor: Constructor) {
        self.classes[class.0 as usize].constructor = Some(constructor);
    }

    /// # Panics
    /// Panics if `id` wasn't produced by this model
    #[inline]
    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.0 as usize]
    }

    /// # Panics
    /// Panics if `id` wasn't produced by this model
    #[inline]
    #[must_use]
    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.0 as usize]
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDecl)> {
        self.classes.iter().enumerate().map(|(index, class)| (ClassId(index as u32), class))
    }

    /// Type of the class as seen from inside its own declaration
    #[must_use]
    pub fn type_of(&self, id: ClassId) -> Type {
        let class = self.class(id);
        Type::Named {
            name: class.name.clone(),
            class: Some(id),
            args: class.type_params.iter().map(|name| Type::Param(name.clone())).collect(),
        }
    }

    #[must_use]
    pub fn parameterized(&self, id: ClassId, args: Vec<Type>) -> Type {
        Type::Named {
            name: self.class(id).name.clone(),
            class: Some(id),
            args,
        }
    }

    #[inline]
    #[must_use]
    pub fn class_name(&self, id: ClassId) -> &str {
        &self.class(id).name
    }

    /// `Owner.method` for messages
    #[must_use]
    pub fn method_path(&self, id: MethodId) -> String {
        let method = self.method(id);
        match method.owner {
            Some(owner) => alloc::format!("{}.{}", self.class_name(owner), method.name),
            None => method.name.clone(),
        }
    }

    /// Return type of `method` with the type arguments of `context` applied
    #[inline]
    #[must_use]
    pub fn return_type(&self, method: MethodId, context: &Substitution) -> Type {
        self.method(method).return_type.substitute(context)
    }

    /// Whether `sub` overrides `sup`: same name and parameter types once each side
    /// is viewed through the substitution of the class it was reached from
    #[must_use]
    pub fn overrides(&self, sub: MethodId, sub_context: &Substitution, sup: MethodId, sup_context: &Substitution) -> bool {
        if sub == sup {
            return false;
        }

        let (sub_decl, sup_decl) = (self.method(sub), self.method(sup));
        sub_decl.name == sup_decl.name
            && sub_decl.params.len() == sup_decl.params.len()
            && sub_decl
                .params
                .iter()
                .zip(&sup_decl.params)
                .all(|(left, right)| left.ty.substitute(sub_context) == right.ty.substitute(sup_context))
    }
}
