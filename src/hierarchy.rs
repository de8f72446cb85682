use alloc::{collections::BTreeSet, vec::Vec};

use crate::{
    model::{ClassId, Model},
    types::Substitution,
};

/// Enumerates a class and its transitive supertypes, each once.
///
/// Order is depth-first: the class itself, then every directly declared supertype in declaration order.
/// Supertypes declared outside of the model are skipped.
pub struct HierarchyWalker<'m> {
    model: &'m Model,
}

impl<'m> HierarchyWalker<'m> {
    #[inline]
    #[must_use]
    pub const fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// Calls `on_class` for every class of the chain with the type arguments it was reached with
    pub fn visit<F>(&self, class: ClassId, mut on_class: F)
    where
        F: FnMut(ClassId, &Substitution),
    {
        let mut visited = BTreeSet::new();
        self.walk(class, &Substitution::new(), &mut visited, &mut on_class);
    }

    #[must_use]
    pub fn chain(&self, class: ClassId) -> Vec<(ClassId, Substitution)> {
        let mut chain = Vec::new();
        self.visit(class, |class, substitution| chain.push((class, substitution.clone())));
        chain
    }

    fn walk<F>(&self, class: ClassId, substitution: &Substitution, visited: &mut BTreeSet<ClassId>, on_class: &mut F)
    where
        F: FnMut(ClassId, &Substitution),
    {
        if !visited.insert(class) {
            return;
        }

        on_class(class, substitution);

        for supertype in &self.model.class(class).supertypes {
            let Some(super_class) = supertype.class() else {
                continue;
            };

            let super_substitution: Substitution = self
                .model
                .class(super_class)
                .type_params
                .iter()
                .cloned()
                .zip(supertype.args().iter().map(|arg| arg.substitute(substitution)))
                .collect();
            self.walk(super_class, &super_substitution, visited, on_class);
        }
    }
}
