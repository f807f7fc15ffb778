use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::TextMetrics;
use crate::model::{CategoryId, MemberId, Registry};

use super::LayoutError;
use super::column::{Column, OpenContext};

/// Inclusive range of column indices owned by a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn single(index: usize) -> Self {
        Span {
            start: index,
            end: index,
        }
    }

    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Union of two optional spans, `None` being the empty span.
    pub fn merge(a: Option<Span>, b: Option<Span>) -> Option<Span> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn covers(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of columns in the span.
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Callbacks driven by [`Grid::traverse`].
///
/// Events arrive in column order: every opening category of a column (before
/// it is pushed onto the context), then the column's members if there are
/// any, then every closing category (before it is marked closed).
pub trait GridVisitor {
    type Error: From<LayoutError>;

    fn on_open(
        &mut self,
        _column: usize,
        _category: CategoryId,
        _context: &OpenContext,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_elements(
        &mut self,
        _column: usize,
        _members: &[MemberId],
        _context: &OpenContext,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_close(
        &mut self,
        _column: usize,
        _category: CategoryId,
        _context: &OpenContext,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Canonical text rendering of a grid, one line per event.
///
/// ```text
/// ┌─ Whole
/// | ┌─ Natural
/// | | 1, 2, 3
/// | └─ Natural
/// | 0
/// └─ Whole
/// ```
pub struct TextRenderer<'a> {
    registry: &'a Registry,
    lines: Vec<String>,
}

impl<'a> TextRenderer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            lines: Vec::new(),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl GridVisitor for TextRenderer<'_> {
    type Error = LayoutError;

    fn on_open(
        &mut self,
        _column: usize,
        category: CategoryId,
        context: &OpenContext,
    ) -> Result<(), LayoutError> {
        let depth = context.position(category).unwrap_or(context.len());
        self.lines.push(format!(
            "{}┌─ {}",
            context.prefix(depth),
            self.registry.category_name(category)
        ));
        Ok(())
    }

    fn on_elements(
        &mut self,
        _column: usize,
        members: &[MemberId],
        context: &OpenContext,
    ) -> Result<(), LayoutError> {
        let names: Vec<String> = members
            .iter()
            .map(|&m| self.registry.member_name(m))
            .collect();
        self.lines
            .push(format!("{}{}", context.prefix(context.len()), names.join(", ")));
        Ok(())
    }

    fn on_close(
        &mut self,
        column: usize,
        category: CategoryId,
        context: &OpenContext,
    ) -> Result<(), LayoutError> {
        let name = self.registry.category_name(category);
        let Some(depth) = context.position(category) else {
            return Err(LayoutError::NotInContext {
                category: name,
                column,
            });
        };
        self.lines
            .push(format!("{}└─ {}", context.prefix(depth), name));
        Ok(())
    }
}

/// Ordered sequence of columns produced by the layout builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    columns: Vec<Column>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Append a column at the right edge and return its index.
    pub fn push(&mut self, column: Column) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    pub fn column(&self, index: usize) -> Result<&Column, LayoutError> {
        let len = self.columns.len();
        self.columns
            .get(index)
            .ok_or(LayoutError::ColumnOutOfRange { index, len })
    }

    pub fn column_mut(&mut self, index: usize) -> Result<&mut Column, LayoutError> {
        let len = self.columns.len();
        self.columns
            .get_mut(index)
            .ok_or(LayoutError::ColumnOutOfRange { index, len })
    }

    /// Index of the column holding `member`.
    pub fn find_column(&self, member: MemberId) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.members.contains(&member))
    }

    /// Columns from the left edge up to and including the one holding `member`.
    pub fn columns_up_to(&self, member: MemberId) -> Option<&[Column]> {
        self.find_column(member).map(|i| &self.columns[..=i])
    }

    /// Borders opened at or before `index` plus borders closed before it.
    ///
    /// Each of them shifts the column right by one fan-out step so concentric
    /// borders do not overlap.
    pub fn extra_left_padding(&self, index: usize) -> usize {
        self.columns
            .iter()
            .take(index + 1)
            .enumerate()
            .map(|(i, c)| c.starts.len() + if i < index { c.ends.len() } else { 0 })
            .sum()
    }

    /// Span of every category that has start and end markers.
    pub fn marked_spans(&self) -> HashMap<CategoryId, Span> {
        let mut starts: HashMap<CategoryId, usize> = HashMap::new();
        let mut ends: HashMap<CategoryId, usize> = HashMap::new();

        for (i, column) in self.columns.iter().enumerate() {
            for &category in &column.starts {
                starts.entry(category).or_insert(i);
            }
            for &category in &column.ends {
                ends.insert(category, i);
            }
        }

        starts
            .into_iter()
            .filter_map(|(category, start)| {
                ends.get(&category)
                    .map(|&end| (category, Span { start, end }))
            })
            .collect()
    }

    /// Number of marked categories whose span covers `index`.
    pub fn surrounding_depth(&self, index: usize) -> usize {
        self.marked_spans()
            .values()
            .filter(|span| span.covers(index))
            .count()
    }

    /// Deepest nesting found anywhere in the grid.
    pub fn max_depth(&self) -> usize {
        let spans = self.marked_spans();
        (0..self.columns.len())
            .map(|i| spans.values().filter(|span| span.covers(i)).count())
            .max()
            .unwrap_or(0)
    }

    /// Extra width needed at `index` so a short rectangle does not clip its label.
    ///
    /// Only categories ending here that started at most two columns earlier
    /// are considered; wider rectangles have room for their label already.
    pub fn extra_width(
        &self,
        index: usize,
        registry: &Registry,
        diameter: f64,
        metrics: &dyn TextMetrics,
    ) -> Result<f64, LayoutError> {
        let column = self.column(index)?;
        let spans = self.marked_spans();
        let mut extra: f64 = 0.0;

        for &category in &column.ends {
            let Some(span) = spans.get(&category) else {
                continue;
            };
            if span.start + 2 < index {
                continue;
            }
            let Some(c) = registry.category(category) else {
                return Err(LayoutError::UnknownCategory(category.index()));
            };
            let width = metrics.text_width(&c.label());
            if width > diameter {
                extra = extra.max(width - diameter);
            }
        }

        Ok(extra)
    }

    /// Walk all columns with one shared open-context stack.
    ///
    /// Returns the context left over after the last column; it is empty for
    /// a grid whose every opened category is also closed.
    pub fn traverse<V: GridVisitor>(&self, visitor: &mut V) -> Result<OpenContext, V::Error> {
        let mut context = OpenContext::new();
        for (index, column) in self.columns.iter().enumerate() {
            column.walk(index, &mut context, visitor)?;
        }
        Ok(context)
    }

    /// The canonical text rendering, used as a test oracle.
    pub fn render_text(&self, registry: &Registry) -> Result<String, LayoutError> {
        let mut renderer = TextRenderer::new(registry);
        self.traverse(&mut renderer)?;
        Ok(renderer.into_lines().join("\n"))
    }
}
