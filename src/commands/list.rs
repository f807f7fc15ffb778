//! List command - shows categories widest first.

use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use super::DiagramContext;

/// One line per category: name, symbol and number of members shown inside it.
pub fn list(ctx: &DiagramContext) -> String {
    let registry = ctx.registry();
    let order = registry.display_order();

    if order.is_empty() {
        return format!("No categories in {}\n", ctx.catalog_name());
    }

    let name_width = registry
        .categories()
        .map(|c| c.name.width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for id in order {
        let Some(category) = registry.category(id) else {
            continue;
        };
        let count = registry.all_members(id).len();
        let padding = " ".repeat(name_width - category.name.width());
        out.push_str(&format!(
            "{}{}  {:<6}{}\n",
            category.name.bold(),
            padding,
            category.symbol,
            format!("{} members", count).dimmed()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DrawingOptions;
    use crate::model::{RegistryBuilder, number_registry};

    fn strip_ansi(s: &str) -> String {
        let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        re.replace_all(s, "").to_string()
    }

    #[test]
    fn test_list_widest_first() {
        let ctx = DiagramContext::from_parts(number_registry().unwrap(), DrawingOptions::default());
        let output = strip_ansi(&list(&ctx));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 15);
        assert!(lines[0].starts_with("All Numbers"));
        assert!(lines[0].ends_with("23 members"));
        assert!(lines[14].starts_with("Pure Imaginary"));
    }

    #[test]
    fn test_list_empty_catalogue() {
        let registry = RegistryBuilder::new().build().unwrap();
        let ctx = DiagramContext::from_parts(registry, DrawingOptions::default());
        assert_eq!(list(&ctx), "No categories in built-in number sets\n");
    }
}
