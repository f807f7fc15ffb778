//! Shared loading and argument resolution for commands.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error_fmt::{AppError, CatalogResultExt, OptionsResultExt};
use crate::geometry::DrawingOptions;
use crate::layout::RenderInput;
use crate::model::{Registry, load_registry, number_registry};

/// Catalogue and drawing options every command works against.
#[derive(Debug)]
pub struct DiagramContext {
    registry: Registry,
    options: DrawingOptions,
    catalog_path: Option<PathBuf>,
}

impl DiagramContext {
    /// Load the catalogue at `catalog`, or the built-in number sets, plus the
    /// options file at `options` if it exists.
    pub fn load(catalog: Option<&Path>, options: &Path) -> Result<Self, AppError> {
        let registry = match catalog {
            Some(path) => load_registry(path).with_path(&path.display().to_string())?,
            None => number_registry()?,
        };

        let options_str = options.display().to_string();
        let drawing = DrawingOptions::load(options).with_options_path(&options_str)?;
        drawing.validate().with_options_path(&options_str)?;

        debug!(
            categories = registry.len(),
            members = registry.members().count(),
            "catalogue loaded"
        );

        Ok(Self {
            registry,
            options: drawing,
            catalog_path: catalog.map(Path::to_path_buf),
        })
    }

    pub fn from_parts(registry: Registry, options: DrawingOptions) -> Self {
        Self {
            registry,
            options,
            catalog_path: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &DrawingOptions {
        &self.options
    }

    /// Where the catalogue came from, for messages.
    pub fn catalog_name(&self) -> String {
        match &self.catalog_path {
            Some(path) => path.display().to_string(),
            None => "built-in number sets".to_string(),
        }
    }

    /// Turn command line names into layout inputs.
    ///
    /// Hidden names come first so they win over a category also listed as
    /// shown. With nothing shown, every category is shown, widest first.
    pub fn resolve_inputs(
        &self,
        shown: &[String],
        hidden: &[String],
    ) -> Result<Vec<RenderInput>, AppError> {
        let mut inputs = Vec::with_capacity(shown.len() + hidden.len());

        for name in hidden {
            inputs.push(RenderInput::hidden(self.lookup(name)?));
        }

        if shown.is_empty() {
            inputs.extend(
                self.registry
                    .display_order()
                    .into_iter()
                    .map(RenderInput::shown),
            );
        } else {
            for name in shown {
                inputs.push(RenderInput::shown(self.lookup(name)?));
            }
        }

        Ok(inputs)
    }

    fn lookup(&self, name: &str) -> Result<crate::model::CategoryId, AppError> {
        match self.registry.category_by_name(name) {
            Some(category) => Ok(category.id),
            None => Err(AppError::UnknownCategory {
                name: name.to_string(),
                known: self
                    .registry
                    .display_order()
                    .into_iter()
                    .map(|id| self.registry.category_name(id))
                    .collect(),
            }),
        }
    }
}
