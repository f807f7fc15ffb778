use std::fmt;

use owo_colors::OwoColorize;

use crate::geometry::{GeometryError, OptionsError};
use crate::layout::LayoutError;
use crate::model::{CatalogError, ModelError};

/// Application error with context for actionable error messages.
#[derive(Debug)]
pub enum AppError {
    /// Catalogue file could not be loaded
    Catalog { path: String, source: CatalogError },
    /// Built-in catalogue failed validation
    Model(ModelError),
    /// Options file could not be loaded or holds invalid sizes
    Options { path: String, source: OptionsError },
    /// Category named on the command line does not exist
    UnknownCategory { name: String, known: Vec<String> },
    /// Layout run failed
    Layout(LayoutError),
    /// Geometry could not be computed
    Geometry(GeometryError),
    /// Diagram could not be written as YAML
    Serialize(serde_yaml::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Catalog { path, source } => {
                write!(f, "{}", format_catalog_error(source, path))
            }
            AppError::Model(source) => {
                write!(f, "{}", format_model_error(source, "built-in catalogue"))
            }
            AppError::Options { path, source } => {
                write!(f, "{}", format_options_error(source, path))
            }
            AppError::UnknownCategory { name, known } => {
                write!(f, "{}", format_unknown_category(name, known))
            }
            AppError::Layout(source) => write!(f, "{}", format_layout_error(source)),
            AppError::Geometry(source) => write!(f, "{}", format_geometry_error(source)),
            AppError::Serialize(source) => {
                write!(f, "{}", format_cli_error(&format!("failed to write diagram: {}", source)))
            }
        }
    }
}

impl std::error::Error for AppError {}

/// Extension trait to add file path context to catalogue results.
pub trait CatalogResultExt<T> {
    fn with_path(self, path: &str) -> Result<T, AppError>;
}

impl<T> CatalogResultExt<T> for Result<T, CatalogError> {
    fn with_path(self, path: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Catalog {
            path: path.to_string(),
            source: e,
        })
    }
}

/// Extension trait to add file path context to options results.
pub trait OptionsResultExt<T> {
    fn with_options_path(self, path: &str) -> Result<T, AppError>;
}

impl<T> OptionsResultExt<T> for Result<T, OptionsError> {
    fn with_options_path(self, path: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Options {
            path: path.to_string(),
            source: e,
        })
    }
}

// ============================================================================
// Formatting functions (internal implementation)
// ============================================================================

fn format_cli_error(message: &str) -> String {
    format!("{}: {}\n", "error".red().bold(), message)
}

fn format_catalog_error(error: &CatalogError, path: &str) -> String {
    match error {
        CatalogError::Io(io_err) => {
            let mut out = String::new();
            out.push_str(&format!("{}: ", "error".red().bold()));
            out.push_str(&format!("failed to read catalogue {}\n", path.cyan()));
            out.push('\n');
            out.push_str(&format!("  {}\n", io_err.to_string().dimmed()));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!("    1. Check that {} exists and is readable\n", path.cyan()));
            out.push_str(&format!(
                "    2. Or omit {} to use the built-in number sets\n",
                "--catalog".cyan()
            ));
            out
        }
        CatalogError::Parse(yaml_err) => {
            let mut out = String::new();
            out.push_str(&format!("{}: ", "error".red().bold()));
            out.push_str(&format!("invalid YAML in {}\n", path.cyan()));
            out.push('\n');
            out.push_str(&format!("  {}\n", yaml_err.to_string().dimmed()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "A catalogue has top-level 'members' and 'categories' lists.".dimmed()
            ));
            out
        }
        CatalogError::Model(model_err) => format_model_error(model_err, path),
    }
}

fn format_model_error(error: &ModelError, source: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));

    match error {
        ModelError::UnknownCategory { name, referenced_by } => {
            out.push_str(&format!(
                "'{}' references unknown category '{}'\n",
                referenced_by.yellow(),
                name.yellow()
            ));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                format!("No category named '{}' is defined in {}", name, source).dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!("    1. Add a category named {}\n", name.cyan()));
            out.push_str(&format!(
                "    2. Or remove '{}' from {}\n",
                name.cyan(),
                referenced_by.cyan()
            ));
        }
        ModelError::UnknownMember { name, referenced_by } => {
            out.push_str(&format!(
                "category '{}' references unknown member '{}'\n",
                referenced_by.yellow(),
                name.yellow()
            ));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                format!("No member named '{}' is defined in {}", name, source).dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!("    1. Add {} to the members list\n", name.cyan()));
            out.push_str(&format!(
                "    2. Or remove it from the elements of {}\n",
                referenced_by.cyan()
            ));
        }
        ModelError::SelfReference(name) => {
            out.push_str(&format!("category '{}' contains itself\n", name.yellow()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "A category cannot be its own subset or partition part.".dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Remove '{}' from the subsets and partitions of {}\n",
                name.cyan(),
                name.cyan()
            ));
        }
        ModelError::CycleDetected(name) => {
            out.push_str(&format!(
                "cycle detected in category hierarchy at '{}'\n",
                name.yellow()
            ));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "Categories cannot contain themselves directly or indirectly.".dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Follow the subsets and partitions starting at {} and remove the link back\n",
                name.cyan()
            ));
        }
        ModelError::DuplicateCategory(name) => {
            out.push_str(&format!("duplicate category name '{}'\n", name.yellow()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                format!("Category names must be unique within {}", source).dimmed()
            ));
        }
        ModelError::DuplicateMember(name) => {
            out.push_str(&format!("duplicate member name '{}'\n", name.yellow()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                format!("Member names must be unique within {}", source).dimmed()
            ));
        }
        ModelError::EmptyName => {
            out.push_str(&format!("empty name in {}\n", source.cyan()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "Every member and category needs a non-blank name.".dimmed()
            ));
        }
    }

    out
}

fn format_options_error(error: &OptionsError, path: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!("failed to load drawing options {}\n", path.cyan()));
    out.push_str(&format!("  {} {}\n", "•".red(), error));

    if let OptionsError::Invalid { field, .. } = error {
        out.push('\n');
        out.push_str(&format!("  {}:\n", "To fix this".bold()));
        out.push_str(&format!(
            "    Change {} in {} or remove it to use the default\n",
            field.cyan(),
            path.cyan()
        ));
    }

    out
}

fn format_unknown_category(name: &str, known: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!("category '{}' not found\n", name.yellow()));
    out.push('\n');

    let lowered = name.to_lowercase();
    if let Some(close) = known.iter().find(|k| k.to_lowercase() == lowered) {
        out.push_str(&format!("  {} {}\n", "Did you mean".dimmed(), close.cyan()));
        out.push('\n');
    }

    out.push_str(&format!("  {}:\n", "Available categories".bold()));
    for k in known {
        out.push_str(&format!("    {} {}\n", "•".dimmed(), k));
    }

    out
}

fn format_layout_error(error: &LayoutError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str("layout failed\n");
    out.push_str(&format!("  {} {}\n", "•".red(), error));

    out
}

fn format_geometry_error(error: &GeometryError) -> String {
    match error {
        GeometryError::Layout(e) => format_layout_error(e),
        GeometryError::Options(e) => format_options_error(e, "drawing options"),
        _ => {
            let mut out = String::new();
            out.push_str(&format!("{}: ", "error".red().bold()));
            out.push_str("geometry failed\n");
            out.push_str(&format!("  {} {}\n", "•".red(), error));
            out
        }
    }
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        AppError::Model(e)
    }
}

impl From<LayoutError> for AppError {
    fn from(e: LayoutError) -> Self {
        AppError::Layout(e)
    }
}

impl From<GeometryError> for AppError {
    fn from(e: GeometryError) -> Self {
        AppError::Geometry(e)
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Serialize(e)
    }
}
