use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::layout::{Grid, GridVisitor, LayoutError, OpenContext, Span};
use crate::model::{CategoryId, MemberId, Registry};

use super::GeometryError;
use super::metrics::TextMetrics;
use super::options::DrawingOptions;
use super::shapes::{CategoryShape, Diagram, MemberLabel, Rectangle};

/// Which tracked label a shape could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelEdge {
    Leftmost,
    Rightmost,
    Bottom,
}

impl fmt::Display for LabelEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelEdge::Leftmost => write!(f, "left-most"),
            LabelEdge::Rightmost => write!(f, "right-most"),
            LabelEdge::Bottom => write!(f, "bottom-most"),
        }
    }
}

/// Labels seen while one part of a shape was open.
#[derive(Debug, Clone, Copy, Default)]
struct PartBounds {
    leftmost: Option<MemberId>,
    rightmost: Option<MemberId>,
    /// Lowest label and the bottom edge it requires, fan-out included
    bottom: Option<(MemberId, f64)>,
}

/// One shape to draw: a category, or a category and its adjacent complement.
#[derive(Debug)]
struct ShapePlan {
    left: CategoryId,
    right: Option<CategoryId>,
    /// Visible categories nested inside any part
    descendants: HashSet<CategoryId>,
}

impl ShapePlan {
    fn parts(&self) -> impl Iterator<Item = CategoryId> + '_ {
        std::iter::once(self.left).chain(self.right)
    }

    fn last(&self) -> CategoryId {
        self.right.unwrap_or(self.left)
    }
}

/// Grid visitor turning column events into a [`Diagram`].
///
/// Member labels depend only on the grid and are placed up front. Category
/// shapes need the labels seen while each category was open, which the
/// traversal collects.
pub struct GeometryCalculator<'a> {
    registry: &'a Registry,
    grid: &'a Grid,
    options: &'a DrawingOptions,
    metrics: &'a dyn TextMetrics,
    spans: HashMap<CategoryId, Span>,
    labels: Vec<MemberLabel>,
    label_index: HashMap<MemberId, usize>,
    plans: Vec<ShapePlan>,
    plan_of: HashMap<CategoryId, usize>,
    bounds: HashMap<CategoryId, PartBounds>,
}

impl<'a> GeometryCalculator<'a> {
    pub fn new(
        registry: &'a Registry,
        grid: &'a Grid,
        options: &'a DrawingOptions,
        metrics: &'a dyn TextMetrics,
    ) -> Result<Self, GeometryError> {
        options.validate()?;

        let mut calculator = Self {
            registry,
            grid,
            options,
            metrics,
            spans: grid.marked_spans(),
            labels: Vec::new(),
            label_index: HashMap::new(),
            plans: Vec::new(),
            plan_of: HashMap::new(),
            bounds: HashMap::new(),
        };
        calculator.place_labels()?;
        calculator.plan_shapes();
        Ok(calculator)
    }

    fn place_labels(&mut self) -> Result<(), GeometryError> {
        let o = self.options;
        let step = o.column_width / 2.0 + o.column_padding;
        let row_height = o.diameter() + o.member_padding;
        let top = self.grid.max_depth() as f64 * o.band_height();

        for (index, column) in self.grid.columns().iter().enumerate() {
            let x = (index + 1) as f64 * step
                + self.grid.extra_left_padding(index) as f64 * o.overlap_padding;

            for (row, &member) in column.members.iter().enumerate() {
                let Some(m) = self.registry.member(member) else {
                    return Err(GeometryError::UnknownMember(member.index()));
                };
                let y = (row + 1) as f64 * row_height + o.member_radius + top;
                self.label_index.insert(member, self.labels.len());
                self.labels.push(MemberLabel {
                    member,
                    name: m.name.clone(),
                    x,
                    y,
                });
            }
        }
        Ok(())
    }

    /// One plan per marked category in opening order, with complements merged
    /// into their left sibling's plan.
    fn plan_shapes(&mut self) {
        let columns = self.grid.columns();
        for category in columns.iter().flat_map(|c| c.starts.iter().copied()) {
            if self.plan_of.contains_key(&category) || !self.spans.contains_key(&category) {
                continue;
            }

            let partner = self.merge_partner(category);
            let (left, right) = match partner {
                Some(other) => {
                    debug!(
                        left = %self.registry.category_name(category),
                        right = %self.registry.category_name(other),
                        "merging complements into one shape"
                    );
                    (category, Some(other))
                }
                None => (category, None),
            };

            let parts: Vec<CategoryId> = std::iter::once(left).chain(right).collect();
            let descendants = parts
                .iter()
                .flat_map(|&p| self.registry.descendants(p))
                .filter(|d| self.spans.contains_key(d) && !parts.contains(d))
                .collect();

            let plan = self.plans.len();
            for &part in &parts {
                self.plan_of.insert(part, plan);
            }
            self.plans.push(ShapePlan {
                left,
                right,
                descendants,
            });
        }
    }

    /// The complement to share a shape with, if both are marked and touch.
    ///
    /// Called in opening order, so a partner found here always starts right
    /// after `category` ends.
    fn merge_partner(&self, category: CategoryId) -> Option<CategoryId> {
        if !self.options.merge_complements {
            return None;
        }
        let other = self.registry.category(category)?.complement?;
        if self.plan_of.contains_key(&other) {
            return None;
        }
        let span = self.spans.get(&category)?;
        let other_span = self.spans.get(&other)?;
        (span.end + 1 == other_span.start).then_some(other)
    }

    fn depth_at(&self, plan: &ShapePlan, column: usize) -> usize {
        plan.descendants
            .iter()
            .filter(|d| self.spans.get(d).is_some_and(|s| s.covers(column)))
            .count()
    }

    fn label(&self, member: MemberId) -> Result<&MemberLabel, GeometryError> {
        self.label_index
            .get(&member)
            .and_then(|&i| self.labels.get(i))
            .ok_or(GeometryError::UnknownMember(member.index()))
    }

    fn span(&self, category: CategoryId) -> Result<Span, GeometryError> {
        self.spans
            .get(&category)
            .copied()
            .ok_or_else(|| LayoutError::UnknownCategory(category.index()).into())
    }

    fn edge_label(&self, category: CategoryId, edge: LabelEdge) -> Result<&MemberLabel, GeometryError> {
        let bounds = self.bounds.get(&category).copied().unwrap_or_default();
        let member = match edge {
            LabelEdge::Leftmost => bounds.leftmost,
            LabelEdge::Rightmost => bounds.rightmost,
            LabelEdge::Bottom => bounds.bottom.map(|(m, _)| m),
        };
        match member {
            Some(member) => self.label(member),
            None => Err(GeometryError::MissingLabel {
                category: self.registry.category_name(category),
                edge,
            }),
        }
    }

    fn bottom_edge(&self, category: CategoryId) -> Result<f64, GeometryError> {
        match self.bounds.get(&category).and_then(|b| b.bottom) {
            Some((_, edge)) => Ok(edge),
            None => Err(GeometryError::MissingLabel {
                category: self.registry.category_name(category),
                edge: LabelEdge::Bottom,
            }),
        }
    }

    fn shape(&self, plan: &ShapePlan) -> Result<CategoryShape, GeometryError> {
        let o = self.options;
        let inset = o.member_radius + o.member_padding;
        let last = plan.last();
        let left_span = self.span(plan.left)?;
        let right_span = self.span(last)?;

        let leftmost = self.edge_label(plan.left, LabelEdge::Leftmost)?;
        let rightmost = self.edge_label(last, LabelEdge::Rightmost)?;

        let starts = &self.grid.column(left_span.start)?.starts;
        let nested_starts = starts
            .iter()
            .position(|&c| c == plan.left)
            .map_or(0, |i| starts.len() - i - 1);
        let earlier_ends = self
            .grid
            .column(right_span.end)?
            .ends
            .iter()
            .position(|&c| c == last)
            .unwrap_or(0);

        let span = left_span.union(right_span);
        let inner_depth = (span.start..=span.end)
            .map(|column| self.depth_at(plan, column))
            .max()
            .unwrap_or(0);

        let x = leftmost.x - inset - nested_starts as f64 * o.overlap_padding;
        let y = leftmost.y - inset - (inner_depth + 1) as f64 * o.band_height();

        let extra = self
            .grid
            .extra_width(right_span.end, self.registry, o.diameter(), self.metrics)?;
        let width = rightmost.x + inset + earlier_ends as f64 * o.overlap_padding + extra - x;

        let mut bottom = f64::MIN;
        for part in plan.parts() {
            bottom = bottom.max(self.bottom_edge(part)?);
        }
        let height = bottom + inset - y;

        let mut dividers = Vec::new();
        if let Some(right) = plan.right {
            let before = self.edge_label(plan.left, LabelEdge::Rightmost)?;
            let after = self.edge_label(right, LabelEdge::Leftmost)?;
            dividers.push((before.x + after.x) / 2.0);
        }

        let categories: Vec<CategoryId> = plan.parts().collect();
        let labels = categories
            .iter()
            .map(|&c| match self.registry.category(c) {
                Some(category) => Ok(category.label()),
                None => Err(GeometryError::Layout(LayoutError::UnknownCategory(c.index()))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CategoryShape {
            categories,
            labels,
            rect: Rectangle {
                x,
                y,
                width,
                height,
            },
            dividers,
        })
    }

    /// Build the diagram once the traversal has seen every column.
    pub fn finish(self, context: OpenContext) -> Result<Diagram, GeometryError> {
        if let Some(open) = context.open_categories().next() {
            return Err(GeometryError::Unclosed(self.registry.category_name(open)));
        }

        let shapes = self
            .plans
            .iter()
            .map(|plan| self.shape(plan))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            labels = self.labels.len(),
            shapes = shapes.len(),
            "geometry complete"
        );

        Ok(Diagram {
            labels: self.labels,
            shapes,
        })
    }
}

impl GridVisitor for GeometryCalculator<'_> {
    type Error = GeometryError;

    fn on_elements(
        &mut self,
        column: usize,
        members: &[MemberId],
        context: &OpenContext,
    ) -> Result<(), GeometryError> {
        let (Some(&first), Some(&last)) = (members.first(), members.last()) else {
            return Ok(());
        };
        let lowest = self.label(last)?.y;

        for category in context.open_categories() {
            let Some(&plan) = self.plan_of.get(&category) else {
                continue;
            };
            let depth = self
                .plans
                .get(plan)
                .map_or(0, |p| self.depth_at(p, column));
            let edge = lowest + depth as f64 * self.options.overlap_padding;

            let bounds = self.bounds.entry(category).or_default();
            bounds.leftmost.get_or_insert(first);
            bounds.rightmost = Some(first);
            if bounds.bottom.is_none_or(|(_, current)| edge > current) {
                bounds.bottom = Some((last, edge));
            }
        }
        Ok(())
    }
}

/// Compute label positions and category shapes for a laid out grid.
pub fn compute_geometry(
    grid: &Grid,
    registry: &Registry,
    options: &DrawingOptions,
    metrics: &dyn TextMetrics,
) -> Result<Diagram, GeometryError> {
    let mut calculator = GeometryCalculator::new(registry, grid, options, metrics)?;
    let context = grid.traverse(&mut calculator)?;
    calculator.finish(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MonospaceMetrics;
    use crate::layout::{Column, LayoutBuilder, RenderInput, create_layout};
    use crate::model::{Category, RegistryBuilder, number_registry};

    fn metrics() -> MonospaceMetrics {
        MonospaceMetrics::new(12.0)
    }

    fn id(registry: &Registry, name: &str) -> CategoryId {
        registry.category_by_name(name).unwrap().id
    }

    fn member(registry: &Registry, name: &str) -> MemberId {
        registry.member_by_name(name).unwrap().id
    }

    fn rect(x: f64, y: f64, width: f64, height: f64) -> Rectangle {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// W holds N and one more member.
    fn nested() -> Registry {
        let mut b = RegistryBuilder::new();
        let a = b.member("a");
        let bb = b.member("b");
        let c = b.member("c");
        let z = b.member("z");
        let n = b.category("N");
        let w = b.category("W");
        b.elements(n, &[a, bb, c]);
        b.subsets(w, &[n]).elements(w, &[z]);
        b.build().unwrap()
    }

    /// P split into complements L and R, one member each.
    fn complements() -> Registry {
        let mut b = RegistryBuilder::new();
        let a = b.member("a");
        let bb = b.member("b");
        let m = b.member("m");
        let p = b.category("P");
        let l = b.category("L");
        let r = b.category("R");
        let middle = b.category("M");
        b.elements(l, &[a]).elements(r, &[bb]).elements(middle, &[m]);
        b.subsets(p, &[middle]).partition(p, &[l, r]);
        b.build().unwrap()
    }

    fn all_inputs(registry: &Registry) -> Vec<RenderInput> {
        registry.categories().map(|c| RenderInput::shown(c.id)).collect()
    }

    /// Declared order, but with M laid out between L and R.
    fn middle_between(registry: &Registry, category: &Category) -> Vec<CategoryId> {
        match category.name.as_str() {
            "P" => vec![id(registry, "L"), id(registry, "M"), id(registry, "R")],
            _ => category.children().collect(),
        }
    }

    #[test]
    fn test_label_positions() {
        let registry = nested();
        let layout = create_layout(&registry, &[RenderInput::shown(id(&registry, "W"))]).unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        let at = |name: &str| {
            let label = diagram.label(member(&registry, name)).unwrap();
            (label.x, label.y)
        };
        // two enclosing levels push every row down by two bands
        assert_eq!(at("a"), (55.0, 125.0));
        assert_eq!(at("b"), (55.0, 170.0));
        assert_eq!(at("c"), (55.0, 215.0));
        // one column step plus three fan-out steps from column 0
        assert_eq!(at("z"), (100.0, 125.0));
    }

    #[test]
    fn test_nested_rectangles() {
        let registry = nested();
        let layout = create_layout(&registry, &[RenderInput::shown(id(&registry, "W"))]).unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        let w = diagram.shape(id(&registry, "W")).unwrap();
        let n = diagram.shape(id(&registry, "N")).unwrap();
        assert_eq!(n.rect, rect(30.0, 70.0, 50.0, 170.0));
        assert_eq!(w.rect, rect(20.0, 40.0, 105.0, 210.0));
        assert!(w.rect.contains(&n.rect));
        assert_eq!(diagram.shapes[0].categories, vec![id(&registry, "W")]);
        assert_eq!(diagram.extent(), (125.0, 250.0));
    }

    #[test]
    fn test_long_label_widens_short_rectangle() {
        let mut b = RegistryBuilder::new();
        let one = b.member("1");
        let natural = b.category_with("Natural", "N", "", None);
        b.elements(natural, &[one]);
        let registry = b.build().unwrap();

        let layout = create_layout(&registry, &[RenderInput::shown(natural)]).unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        // "Natural (N)" is 132 wide, 92 more than the marker
        let shape = diagram.shape(natural).unwrap();
        assert_eq!(shape.rect, rect(20.0, 40.0, 142.0, 80.0));
        assert_eq!(shape.labels, vec!["Natural (N)".to_string()]);
    }

    #[test]
    fn test_complement_pair_shares_shape() {
        let registry = complements();
        let p = id(&registry, "P");
        let l = id(&registry, "L");
        let r = id(&registry, "R");
        let layout = LayoutBuilder::new(&registry)
            .show(p)
            .hide(id(&registry, "M"))
            .build()
            .unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        assert_eq!(diagram.shapes.len(), 2);
        let outer = diagram.shape(p).unwrap();
        let merged = diagram.shape(l).unwrap();
        assert!(!outer.is_merged());
        assert!(merged.is_merged());
        assert_eq!(merged.categories, vec![l, r]);
        assert_eq!(diagram.shape(r), Some(merged));

        assert_eq!(merged.rect, rect(30.0, 70.0, 105.0, 80.0));
        assert_eq!(merged.dividers, vec![82.5]);
        assert_eq!(outer.rect, rect(20.0, 40.0, 125.0, 120.0));
        assert!(outer.rect.contains(&merged.rect));
    }

    #[test]
    fn test_merge_disabled_draws_each_part() {
        let registry = complements();
        let p = id(&registry, "P");
        let layout = LayoutBuilder::new(&registry)
            .show(p)
            .hide(id(&registry, "M"))
            .build()
            .unwrap();
        let options = DrawingOptions {
            merge_complements: false,
            ..Default::default()
        };
        let diagram = compute_geometry(&layout.grid, &registry, &options, &metrics()).unwrap();

        assert_eq!(diagram.shapes.len(), 3);
        assert!(diagram.shapes.iter().all(|s| !s.is_merged()));
        let right = diagram.shape(id(&registry, "R")).unwrap();
        assert_eq!(right.rect.x, 85.0);
    }

    #[test]
    fn test_separated_complements_are_not_merged() {
        let registry = complements();
        let layout = LayoutBuilder::new(&registry)
            .with_order(middle_between)
            .inputs(all_inputs(&registry))
            .build()
            .unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        assert_eq!(diagram.shapes.len(), 4);
        assert!(diagram.shapes.iter().all(|s| s.dividers.is_empty()));
    }

    #[test]
    fn test_number_catalogue_nests_strictly() {
        let registry = number_registry().unwrap();
        let layout = create_layout(&registry, &all_inputs(&registry)).unwrap();
        let options = DrawingOptions {
            merge_complements: false,
            ..Default::default()
        };
        let diagram = compute_geometry(&layout.grid, &registry, &options, &metrics()).unwrap();

        assert_eq!(diagram.labels.len(), 23);
        assert_eq!(diagram.shapes.len(), registry.len());

        for category in registry.categories() {
            let outer = diagram.shape(category.id).unwrap().rect;
            for inner_id in registry.descendants(category.id) {
                let inner = diagram.shape(inner_id).unwrap().rect;
                let names = (&category.name, registry.category_name(inner_id));
                assert!(outer.x < inner.x, "{names:?}");
                assert!(outer.y < inner.y, "{names:?}");
                assert!(outer.bottom() > inner.bottom(), "{names:?}");
            }
        }
    }

    #[test]
    fn test_labels_stay_inside_their_categories() {
        let registry = number_registry().unwrap();
        let layout = create_layout(&registry, &all_inputs(&registry)).unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();
        let radius = DrawingOptions::default().member_radius;

        for category in registry.categories() {
            let shape = diagram.shape(category.id).unwrap();
            for member in registry.all_members(category.id) {
                let label = diagram.label(member).unwrap();
                assert!(label.x - radius > shape.rect.x, "{} in {}", label.name, category.name);
                assert!(label.y - radius > shape.rect.y, "{} in {}", label.name, category.name);
                assert!(label.y + radius < shape.rect.bottom());
            }
        }
    }

    #[test]
    fn test_geometry_is_idempotent() {
        let registry = number_registry().unwrap();
        let layout = create_layout(&registry, &all_inputs(&registry)).unwrap();
        let options = DrawingOptions::default();
        let first = compute_geometry(&layout.grid, &registry, &options, &metrics()).unwrap();
        let second = compute_geometry(&layout.grid, &registry, &options, &metrics()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_category_without_members_fails() {
        let registry = nested();
        let mut column = Column::new();
        column.add_start(id(&registry, "N"));
        column.add_end(id(&registry, "N"));
        let mut grid = Grid::new();
        grid.push(column);

        let err = compute_geometry(&grid, &registry, &DrawingOptions::default(), &metrics())
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::MissingLabel { ref category, edge: LabelEdge::Leftmost } if category == "N"
        ));
    }

    #[test]
    fn test_unclosed_category_fails() {
        let registry = nested();
        let mut column = Column::with_members(vec![member(&registry, "a")]);
        column.add_start(id(&registry, "W"));
        let mut grid = Grid::new();
        grid.push(column);

        let err = compute_geometry(&grid, &registry, &DrawingOptions::default(), &metrics())
            .unwrap_err();
        assert!(matches!(err, GeometryError::Unclosed(ref name) if name == "W"));
    }

    #[test]
    fn test_invalid_options_fail_before_traversal() {
        let registry = nested();
        let layout = create_layout(&registry, &all_inputs(&registry)).unwrap();
        let options = DrawingOptions {
            column_width: 0.0,
            ..Default::default()
        };
        let err = compute_geometry(&layout.grid, &registry, &options, &metrics()).unwrap_err();
        assert!(matches!(err, GeometryError::Options(_)));
    }

    #[test]
    fn test_diagram_serializes_to_yaml() {
        let registry = complements();
        let layout = create_layout(&registry, &all_inputs(&registry)).unwrap();
        let diagram =
            compute_geometry(&layout.grid, &registry, &DrawingOptions::default(), &metrics()).unwrap();

        let yaml = serde_yaml::to_string(&diagram).unwrap();
        assert!(yaml.contains("shapes:"));
        assert!(yaml.contains("dividers:"));
        assert!(yaml.contains("name: m"));
    }
}
