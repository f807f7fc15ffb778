use crate::model::{CategoryId, MemberId, Registry};

use super::LayoutError;
use super::grid::{GridVisitor, TextRenderer};

/// An entry of the open-context stack used while walking columns left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextEntry {
    pub category: CategoryId,
    pub open: bool,
}

/// Stack of categories opened so far, outermost first.
///
/// Closed entries stay in place until everything after them is closed too, so
/// indentation of still-open inner categories does not shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenContext {
    entries: Vec<ContextEntry>,
}

impl OpenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ContextEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, category: CategoryId) -> Option<usize> {
        self.entries.iter().position(|e| e.category == category)
    }

    /// Categories currently open, outermost first.
    pub fn open_categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.entries.iter().filter(|e| e.open).map(|e| e.category)
    }

    /// Mark a category open, re-using its slot when it is already on the stack.
    pub fn open(&mut self, category: CategoryId) {
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.open = true,
            None => self.entries.push(ContextEntry { category, open: true }),
        }
    }

    /// Mark a category closed. Returns false if it was never opened.
    pub fn close(&mut self, category: CategoryId) -> bool {
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => {
                entry.open = false;
                true
            }
            None => false,
        }
    }

    /// Pop closed entries from the end of the stack.
    pub fn collect_closed(&mut self) {
        while self.entries.last().is_some_and(|e| !e.open) {
            self.entries.pop();
        }
    }

    /// Indentation for the first `depth` entries: `| ` per open, two spaces per closed.
    pub fn prefix(&self, depth: usize) -> String {
        self.entries
            .iter()
            .take(depth)
            .map(|e| if e.open { "| " } else { "  " })
            .collect()
    }
}

/// One ordered slot of the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub members: Vec<MemberId>,
    /// Categories whose span starts here, most recently added first
    pub starts: Vec<CategoryId>,
    /// Categories whose span ends here, in the order they were added
    pub ends: Vec<CategoryId>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: Vec<MemberId>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn add_member(&mut self, member: MemberId) {
        self.members.push(member);
    }

    pub fn add_start(&mut self, category: CategoryId) {
        self.starts.insert(0, category);
    }

    pub fn add_end(&mut self, category: CategoryId) {
        self.ends.push(category);
    }

    /// Emit this column's open, elements and close events against `context`.
    pub fn walk<V: GridVisitor>(
        &self,
        index: usize,
        context: &mut OpenContext,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        for &category in &self.starts {
            visitor.on_open(index, category, context)?;
            context.open(category);
        }

        if !self.members.is_empty() {
            visitor.on_elements(index, &self.members, context)?;
        }

        for &category in &self.ends {
            visitor.on_close(index, category, context)?;
            if !context.close(category) {
                return Err(LayoutError::NotInContext {
                    category: format!("#{}", category.index()),
                    column: index,
                }
                .into());
            }
            context.collect_closed();
        }

        Ok(())
    }

    /// Text lines of this column, drawn sideways: left-to-right becomes top-to-bottom.
    pub fn render_text(
        &self,
        registry: &Registry,
        context: &mut OpenContext,
    ) -> Result<Vec<String>, LayoutError> {
        let mut renderer = TextRenderer::new(registry);
        self.walk(0, context, &mut renderer)?;
        Ok(renderer.into_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegistryBuilder;

    struct Fixture {
        registry: Registry,
        a: CategoryId,
        b: CategoryId,
        c: CategoryId,
        d: CategoryId,
        zero: MemberId,
        one: MemberId,
        minus_one: MemberId,
    }

    fn fixture() -> Fixture {
        let mut builder = RegistryBuilder::new();
        let zero = builder.member("0");
        let one = builder.member("1");
        let minus_one = builder.member("-1");
        let a = builder.category("Set A");
        let b = builder.category("Set B");
        let c = builder.category("Set C");
        let d = builder.category("Set D");
        Fixture {
            registry: builder.build().unwrap(),
            a,
            b,
            c,
            d,
            zero,
            one,
            minus_one,
        }
    }

    fn entry(category: CategoryId, open: bool) -> ContextEntry {
        ContextEntry { category, open }
    }

    #[test]
    fn test_members_are_comma_separated() {
        let f = fixture();
        let column = Column::with_members(vec![f.zero, f.one, f.minus_one]);

        let mut context = OpenContext::new();
        let lines = column.render_text(&f.registry, &mut context).unwrap();
        assert_eq!(lines, vec!["0, 1, -1"]);
        assert!(context.is_empty());
    }

    #[test]
    fn test_empty_column() {
        let f = fixture();
        let lines = Column::new()
            .render_text(&f.registry, &mut OpenContext::new())
            .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_close_aligns_with_open_position() {
        let f = fixture();
        let mut column = Column::new();
        column.add_end(f.c);

        let mut context = OpenContext::from_entries(vec![
            entry(f.a, true),
            entry(f.b, false),
            entry(f.c, true),
        ]);
        let lines = column.render_text(&f.registry, &mut context).unwrap();

        assert_eq!(lines.join("\n"), "|   └─ Set C");
        assert_eq!(context.entries(), &[entry(f.a, true)]);
    }

    #[test]
    fn test_open_members_close_in_one_column() {
        let f = fixture();
        let mut column = Column::new();
        column.add_start(f.a);
        column.add_member(f.zero);
        column.add_member(f.one);
        column.add_end(f.a);

        let mut context = OpenContext::new();
        let lines = column.render_text(&f.registry, &mut context).unwrap();

        assert_eq!(lines.join("\n"), "┌─ Set A\n| 0, 1\n└─ Set A");
        assert!(context.is_empty());
    }

    #[test]
    fn test_nested_under_existing_context() {
        let f = fixture();
        let mut column = Column::new();
        column.add_start(f.d);
        column.add_member(f.one);
        column.add_end(f.d);

        let mut context = OpenContext::from_entries(vec![entry(f.a, true), entry(f.b, true)]);
        let lines = column.render_text(&f.registry, &mut context).unwrap();

        assert_eq!(lines.join("\n"), "| | ┌─ Set D\n| | | 1\n| | └─ Set D");
        assert_eq!(context.entries(), &[entry(f.a, true), entry(f.b, true)]);
    }

    #[test]
    fn test_close_outer_while_inner_stays_open() {
        let f = fixture();
        let mut column = Column::new();
        column.add_start(f.d);
        column.add_member(f.one);
        column.add_end(f.c);

        let mut context = OpenContext::from_entries(vec![
            entry(f.a, true),
            entry(f.b, false),
            entry(f.c, true),
        ]);
        let lines = column.render_text(&f.registry, &mut context).unwrap();

        assert_eq!(lines.join("\n"), "|   | ┌─ Set D\n|   | | 1\n|   └─ Set C");
        assert_eq!(
            context.entries(),
            &[
                entry(f.a, true),
                entry(f.b, false),
                entry(f.c, false),
                entry(f.d, true),
            ]
        );
    }

    #[test]
    fn test_reopen_uses_existing_position() {
        let f = fixture();
        let mut column = Column::new();
        column.add_start(f.b);
        column.add_member(f.one);

        let mut context = OpenContext::from_entries(vec![
            entry(f.a, true),
            entry(f.b, false),
            entry(f.c, true),
        ]);
        let lines = column.render_text(&f.registry, &mut context).unwrap();

        assert_eq!(lines.join("\n"), "| ┌─ Set B\n| | | 1");
        assert_eq!(context.position(f.b), Some(1));
        assert_eq!(context.len(), 3);
    }

    #[test]
    fn test_close_without_open_fails() {
        let f = fixture();
        let mut column = Column::new();
        column.add_end(f.a);

        let err = column
            .render_text(&f.registry, &mut OpenContext::new())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::NotInContext {
                category: "Set A".to_string(),
                column: 0,
            }
        );
    }

    #[test]
    fn test_starts_are_prepended() {
        let f = fixture();
        let mut column = Column::new();
        column.add_start(f.b);
        column.add_start(f.a);
        column.add_end(f.b);
        column.add_end(f.a);
        assert_eq!(column.starts, vec![f.a, f.b]);
        assert_eq!(column.ends, vec![f.b, f.a]);
    }
}
