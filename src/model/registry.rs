use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;

use super::validations::{ModelError, validate_registry};

/// Stable index of a member inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MemberId(pub(crate) usize);

/// Stable index of a category inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(pub(crate) usize);

impl MemberId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl CategoryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A sample item shown as a marker inside the categories that contain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub description: String,
    pub link: Option<String>,
    /// Ancestor categories that must never render empty without this member.
    pub required_by: Vec<CategoryId>,
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.trim())
    }
}

/// A node of the containment hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub link: Option<String>,
    /// Members owned directly, not through a child category
    pub elements: Vec<MemberId>,
    pub subsets: Vec<CategoryId>,
    /// Groups of mutually exclusive, jointly exhaustive children
    pub partitions: Vec<Vec<CategoryId>>,
    pub parents: Vec<CategoryId>,
    pub complement: Option<CategoryId>,
}

impl Category {
    /// Subsets first, then the members of every partition, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.subsets
            .iter()
            .chain(self.partitions.iter().flatten())
            .copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }

    /// Printed label of the category's rectangle, e.g. `Natural (ℕ)`.
    pub fn label(&self) -> String {
        if self.symbol.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.symbol)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Immutable arena of categories and members.
///
/// Created by [`RegistryBuilder::build`], which wires parent links, assigns
/// partition complements and rejects cycles.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    members: Vec<Member>,
    categories: Vec<Category>,
    member_names: HashMap<String, MemberId>,
    category_names: HashMap<String, CategoryId>,
}

impl Registry {
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.member_names.get(name).and_then(|&id| self.member(id))
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.category_names.get(name).and_then(|&id| self.category(id))
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Name of a category, or `#<index>` for an id from another registry.
    pub fn category_name(&self, id: CategoryId) -> String {
        match self.category(id) {
            Some(category) => category.name.clone(),
            None => format!("#{}", id.0),
        }
    }

    pub fn member_name(&self, id: MemberId) -> String {
        match self.member(id) {
            Some(member) => member.name.clone(),
            None => format!("#{}", id.0),
        }
    }

    /// All categories reachable below `id`, not including `id` itself.
    pub fn descendants(&self, id: CategoryId) -> HashSet<CategoryId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<CategoryId> = self
            .category(id)
            .map(|c| c.children().collect())
            .unwrap_or_default();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(category) = self.category(next) {
                stack.extend(category.children().filter(|c| !seen.contains(c)));
            }
        }

        seen
    }

    /// Ancestors of `id` in breadth-first order, nearest parents first.
    pub fn ancestors(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<CategoryId> = VecDeque::new();

        if let Some(category) = self.category(id) {
            for &parent in &category.parents {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        while let Some(next) = queue.pop_front() {
            order.push(next);
            if let Some(category) = self.category(next) {
                for &parent in &category.parents {
                    if seen.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
        }

        order
    }

    /// Members of the category and of every category below it.
    pub fn all_members(&self, id: CategoryId) -> Vec<MemberId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut categories = vec![id];
        let mut descendants: Vec<CategoryId> = self.descendants(id).into_iter().collect();
        descendants.sort();
        categories.extend(descendants);

        for category in categories.into_iter().filter_map(|c| self.category(c)) {
            for &member in &category.elements {
                if seen.insert(member) {
                    result.push(member);
                }
            }
        }

        result
    }

    /// Categories ordered for a chooser: most reachable members first, later
    /// registrations first on ties.
    pub fn display_order(&self) -> Vec<CategoryId> {
        let mut keyed: Vec<(usize, CategoryId)> = self
            .categories
            .iter()
            .map(|c| (self.all_members(c.id).len(), c.id))
            .collect();
        keyed.sort_by(|a, b| b.cmp(a));
        keyed.into_iter().map(|(_, id)| id).collect()
    }
}

/// Two-phase constructor for a [`Registry`].
///
/// Nodes are added first without links; edges are wired afterwards and only
/// checked when [`build`](RegistryBuilder::build) is called.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    members: Vec<Member>,
    categories: Vec<Category>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member(&mut self, name: impl Into<String>) -> MemberId {
        self.member_with(name, "", None)
    }

    pub fn member_with(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        link: Option<String>,
    ) -> MemberId {
        let id = MemberId(self.members.len());
        self.members.push(Member {
            id,
            name: name.into(),
            description: description.into(),
            link,
            required_by: Vec::new(),
        });
        id
    }

    pub fn category(&mut self, name: impl Into<String>) -> CategoryId {
        self.category_with(name, "", "", None)
    }

    pub fn category_with(
        &mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
        description: impl Into<String>,
        link: Option<String>,
    ) -> CategoryId {
        let id = CategoryId(self.categories.len());
        self.categories.push(Category {
            id,
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
            link,
            elements: Vec::new(),
            subsets: Vec::new(),
            partitions: Vec::new(),
            parents: Vec::new(),
            complement: None,
        });
        id
    }

    /// Add direct elements to a category. Repeated members are kept once.
    pub fn elements(&mut self, category: CategoryId, members: &[MemberId]) -> &mut Self {
        if let Some(c) = self.categories.get_mut(category.0) {
            for &member in members {
                if !c.elements.contains(&member) {
                    c.elements.push(member);
                }
            }
        }
        self
    }

    pub fn subsets(&mut self, category: CategoryId, subsets: &[CategoryId]) -> &mut Self {
        if let Some(c) = self.categories.get_mut(category.0) {
            c.subsets.extend_from_slice(subsets);
        }
        self
    }

    pub fn partition(&mut self, category: CategoryId, group: &[CategoryId]) -> &mut Self {
        if let Some(c) = self.categories.get_mut(category.0) {
            c.partitions.push(group.to_vec());
        }
        self
    }

    /// Declare that `member` must be materialized whenever `ancestor` is visible.
    pub fn required_by(&mut self, member: MemberId, ancestor: CategoryId) -> &mut Self {
        if let Some(m) = self.members.get_mut(member.0)
            && !m.required_by.contains(&ancestor)
        {
            m.required_by.push(ancestor);
        }
        self
    }

    /// Link parents, assign complements and validate the hierarchy.
    pub fn build(mut self) -> Result<Registry, ModelError> {
        let mut parents: Vec<Vec<CategoryId>> = vec![Vec::new(); self.categories.len()];
        let mut complements: Vec<(CategoryId, CategoryId)> = Vec::new();

        for category in &self.categories {
            for child in category.children() {
                let Some(entry) = parents.get_mut(child.0) else {
                    return Err(ModelError::UnknownCategory {
                        name: format!("#{}", child.0),
                        referenced_by: category.name.clone(),
                    });
                };
                if !entry.contains(&category.id) {
                    entry.push(category.id);
                }
            }
            for group in &category.partitions {
                if let [a, b] = group.as_slice() {
                    complements.push((*a, *b));
                }
            }
        }

        for (category, links) in self.categories.iter_mut().zip(parents) {
            category.parents = links;
        }
        for (a, b) in complements {
            if let Some(c) = self.categories.get_mut(a.0) {
                c.complement = Some(b);
            }
            if let Some(c) = self.categories.get_mut(b.0) {
                c.complement = Some(a);
            }
        }

        let mut registry = Registry {
            members: self.members,
            categories: self.categories,
            member_names: HashMap::new(),
            category_names: HashMap::new(),
        };

        for member in &registry.members {
            if registry
                .member_names
                .insert(member.name.clone(), member.id)
                .is_some()
            {
                return Err(ModelError::DuplicateMember(member.name.clone()));
            }
        }
        for category in &registry.categories {
            if registry
                .category_names
                .insert(category.name.clone(), category.id)
                .is_some()
            {
                return Err(ModelError::DuplicateCategory(category.name.clone()));
            }
        }

        validate_registry(&registry)?;

        Ok(registry)
    }
}
