use std::collections::HashMap;

use crate::model::{Category, CategoryId, Registry};

/// Decides the left-to-right order in which a category's children are laid out.
///
/// Implementations must return every child exactly once. The builder lays out
/// a parent's children before the parent's own elements, so any order keeps
/// parents enclosing their descendants.
pub trait ChildOrder {
    fn children(&self, registry: &Registry, category: &Category) -> Vec<CategoryId>;
}

impl<F> ChildOrder for F
where
    F: Fn(&Registry, &Category) -> Vec<CategoryId>,
{
    fn children(&self, registry: &Registry, category: &Category) -> Vec<CategoryId> {
        self(registry, category)
    }
}

/// Subsets first, then each partition group, all in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredOrder;

impl ChildOrder for DeclaredOrder {
    fn children(&self, _registry: &Registry, category: &Category) -> Vec<CategoryId> {
        category.children().collect()
    }
}

/// Children with the longest chain of nested categories below them first.
///
/// Ties keep declaration order. Deep staircases then grow from the left edge,
/// which keeps most closing borders on the right of the diagram.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestChainFirst;

impl LongestChainFirst {
    fn chain_length(
        registry: &Registry,
        id: CategoryId,
        memo: &mut HashMap<CategoryId, usize>,
    ) -> usize {
        if let Some(&length) = memo.get(&id) {
            return length;
        }
        let children: Vec<CategoryId> = registry
            .category(id)
            .map(|c| c.children().collect())
            .unwrap_or_default();
        let length = children
            .into_iter()
            .map(|child| Self::chain_length(registry, child, memo) + 1)
            .max()
            .unwrap_or(0);
        memo.insert(id, length);
        length
    }
}

impl ChildOrder for LongestChainFirst {
    fn children(&self, registry: &Registry, category: &Category) -> Vec<CategoryId> {
        let mut memo = HashMap::new();
        let mut keyed: Vec<(usize, CategoryId)> = category
            .children()
            .map(|child| (Self::chain_length(registry, child, &mut memo), child))
            .collect();
        // stable: equal lengths stay in declaration order
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, child)| child).collect()
    }
}
