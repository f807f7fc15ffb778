use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{Category, CategoryId, MemberId, Registry};

use super::LayoutError;
use super::column::Column;
use super::grid::{Grid, Span};
use super::order::{ChildOrder, DeclaredOrder};

/// Requested visibility of one category. Categories not listed are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderInput {
    pub category: CategoryId,
    pub visible: bool,
}

impl RenderInput {
    pub fn shown(category: CategoryId) -> Self {
        Self {
            category,
            visible: true,
        }
    }

    pub fn hidden(category: CategoryId) -> Self {
        Self {
            category,
            visible: false,
        }
    }
}

/// Result of a layout run: the populated grid plus the span of every category
/// that was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub grid: Grid,
    spans: HashMap<CategoryId, Span>,
    roots: Vec<CategoryId>,
}

impl Layout {
    /// Span of a resolved category, visible or not. `None` when it owns no column.
    pub fn span(&self, category: CategoryId) -> Option<Span> {
        self.spans.get(&category).copied()
    }

    /// Union of the spans of the members of a category's `group`-th partition.
    pub fn partition_span(
        &self,
        registry: &Registry,
        category: CategoryId,
        group: usize,
    ) -> Option<Span> {
        let members = registry.category(category)?.partitions.get(group)?;
        members
            .iter()
            .fold(None, |span, &member| Span::merge(span, self.span(member)))
    }

    /// Categories the run started from, in request order.
    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }
}

/// Builds a [`Layout`] from a registry and a list of visibility requests.
///
/// Each category is resolved at most once; a category reachable through
/// several parents reuses its first span.
pub struct LayoutBuilder<'a, O = DeclaredOrder> {
    registry: &'a Registry,
    inputs: Vec<RenderInput>,
    order: O,
}

impl<'a> LayoutBuilder<'a, DeclaredOrder> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            inputs: Vec::new(),
            order: DeclaredOrder,
        }
    }
}

impl<'a, O: ChildOrder> LayoutBuilder<'a, O> {
    /// Replace the child ordering policy.
    pub fn with_order<P: ChildOrder>(self, order: P) -> LayoutBuilder<'a, P> {
        LayoutBuilder {
            registry: self.registry,
            inputs: self.inputs,
            order,
        }
    }

    pub fn input(mut self, input: RenderInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = RenderInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn show(self, category: CategoryId) -> Self {
        self.input(RenderInput::shown(category))
    }

    pub fn hide(self, category: CategoryId) -> Self {
        self.input(RenderInput::hidden(category))
    }

    /// Run the layout. The builder can be reused; every run starts fresh.
    pub fn build(&self) -> Result<Layout, LayoutError> {
        let mut run = LayoutRun::new(self.registry, &self.order, &self.inputs)?;
        let roots = run.render_roots();

        for &root in &roots {
            run.resolve(root)?;
        }

        let spans = run
            .resolved
            .into_iter()
            .filter_map(|(id, resolution)| match resolution {
                Resolution::Done(Some(span)) => Some((id, span)),
                _ => None,
            })
            .collect();

        debug!(
            columns = run.grid.len(),
            roots = roots.len(),
            "layout complete"
        );

        Ok(Layout {
            grid: run.grid,
            spans,
            roots,
        })
    }
}

/// Lay out `inputs` with the declared child order.
pub fn create_layout(registry: &Registry, inputs: &[RenderInput]) -> Result<Layout, LayoutError> {
    LayoutBuilder::new(registry)
        .inputs(inputs.iter().copied())
        .build()
}

#[derive(Debug, Clone, Copy)]
enum Resolution {
    InProgress,
    Done(Option<Span>),
}

/// Working state of one layout run.
struct LayoutRun<'a, O> {
    registry: &'a Registry,
    order: &'a O,
    requested: Vec<CategoryId>,
    visibility: HashMap<CategoryId, bool>,
    grid: Grid,
    placed: HashMap<MemberId, usize>,
    resolved: HashMap<CategoryId, Resolution>,
}

impl<'a, O: ChildOrder> LayoutRun<'a, O> {
    fn new(
        registry: &'a Registry,
        order: &'a O,
        inputs: &[RenderInput],
    ) -> Result<Self, LayoutError> {
        let mut visibility = HashMap::new();
        let mut requested = Vec::new();

        for input in inputs {
            if registry.category(input.category).is_none() {
                return Err(LayoutError::UnknownCategory(input.category.index()));
            }
            // first request for a category wins
            if !visibility.contains_key(&input.category) {
                visibility.insert(input.category, input.visible);
                requested.push(input.category);
            }
        }

        Ok(Self {
            registry,
            order,
            requested,
            visibility,
            grid: Grid::new(),
            placed: HashMap::new(),
            resolved: HashMap::new(),
        })
    }

    fn is_visible(&self, category: CategoryId) -> bool {
        self.visibility.get(&category).copied().unwrap_or(true)
    }

    /// Requested-visible categories not already below another requested-visible one.
    fn render_roots(&self) -> Vec<CategoryId> {
        let shown: Vec<CategoryId> = self
            .requested
            .iter()
            .copied()
            .filter(|&c| self.is_visible(c))
            .collect();

        let mut included: HashSet<CategoryId> = HashSet::new();
        for &category in &shown {
            included.extend(self.registry.descendants(category));
        }

        shown
            .into_iter()
            .filter(|c| !included.contains(c))
            .collect()
    }

    fn resolve(&mut self, id: CategoryId) -> Result<Option<Span>, LayoutError> {
        match self.resolved.get(&id) {
            Some(Resolution::Done(span)) => return Ok(*span),
            Some(Resolution::InProgress) => {
                return Err(LayoutError::Cycle(self.registry.category_name(id)));
            }
            None => {}
        }

        let registry = self.registry;
        let Some(category) = registry.category(id) else {
            return Err(LayoutError::UnknownCategory(id.index()));
        };
        self.resolved.insert(id, Resolution::InProgress);

        let mut span = None;
        for child in self.order.children(registry, category) {
            span = Span::merge(span, self.resolve(child)?);
        }

        let mut fresh = Vec::new();
        for &member in &category.elements {
            match self.placed.get(&member) {
                Some(&index) => span = Span::merge(span, Some(Span::single(index))),
                None => fresh.push(member),
            }
        }

        let visible = self.is_visible(id);
        if !fresh.is_empty() && (visible || self.required_by_ancestor(category, &fresh)) {
            let index = self.grid.push(Column::with_members(fresh.clone()));
            for member in fresh {
                self.placed.insert(member, index);
            }
            debug!(category = %category.name, column = index, "allocated column");
            span = Span::merge(span, Some(Span::single(index)));
        }

        if visible {
            match span {
                Some(span) => {
                    self.grid.column_mut(span.start)?.add_start(id);
                    self.grid.column_mut(span.end)?.add_end(id);
                }
                None => debug!(category = %category.name, "visible category has no columns"),
            }
        }

        self.resolved.insert(id, Resolution::Done(span));
        Ok(span)
    }

    /// Whether a visible ancestor needs some of `fresh` to not render empty.
    ///
    /// Ancestors are searched breadth-first; the first visible one that is
    /// listed in a member's `required_by` decides.
    fn required_by_ancestor(&self, category: &Category, fresh: &[MemberId]) -> bool {
        let required: HashSet<CategoryId> = fresh
            .iter()
            .filter_map(|&m| self.registry.member(m))
            .flat_map(|m| m.required_by.iter().copied())
            .collect();
        if required.is_empty() {
            return false;
        }

        let found = self
            .registry
            .ancestors(category.id)
            .into_iter()
            .find(|&ancestor| self.is_visible(ancestor) && required.contains(&ancestor));

        if let Some(ancestor) = found {
            debug!(
                category = %category.name,
                ancestor = %self.registry.category_name(ancestor),
                "materializing hidden category for ancestor"
            );
            return true;
        }
        false
    }
}
