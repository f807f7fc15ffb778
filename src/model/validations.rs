use std::collections::HashMap;
use thiserror::Error;

use super::registry::{CategoryId, Registry};

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("category '{referenced_by}' references unknown category '{name}'")]
    UnknownCategory { name: String, referenced_by: String },
    #[error("'{referenced_by}' references unknown member '{name}'")]
    UnknownMember { name: String, referenced_by: String },
    #[error("category '{0}' contains itself")]
    SelfReference(String),
    #[error("cycle detected in category hierarchy at '{0}'")]
    CycleDetected(String),
    #[error("duplicate category name '{0}'")]
    DuplicateCategory(String),
    #[error("duplicate member name '{0}'")]
    DuplicateMember(String),
    #[error("names cannot be empty")]
    EmptyName,
}

/// Validates a freshly linked registry.
///
/// Checks that:
/// - Names are non-empty
/// - Every element and `required_by` reference points into the registry
/// - No category lists itself as a child
/// - The category hierarchy forms a DAG
pub fn validate_registry(registry: &Registry) -> Result<(), ModelError> {
    for member in registry.members() {
        if member.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        for &ancestor in &member.required_by {
            if registry.category(ancestor).is_none() {
                return Err(ModelError::UnknownCategory {
                    name: format!("#{}", ancestor.index()),
                    referenced_by: member.name.clone(),
                });
            }
        }
    }

    for category in registry.categories() {
        if category.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        for &element in &category.elements {
            if registry.member(element).is_none() {
                return Err(ModelError::UnknownMember {
                    name: format!("#{}", element.index()),
                    referenced_by: category.name.clone(),
                });
            }
        }
        if category.children().any(|child| child == category.id) {
            return Err(ModelError::SelfReference(category.name.clone()));
        }
    }

    if let Some(at) = find_cycle(registry) {
        return Err(ModelError::CycleDetected(registry.category_name(at)));
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Returns the category at which a back edge was found, if any.
fn find_cycle(registry: &Registry) -> Option<CategoryId> {
    let mut colors: HashMap<CategoryId, Color> = HashMap::new();
    for category in registry.categories() {
        colors.insert(category.id, Color::White);
    }

    for category in registry.categories() {
        if colors[&category.id] == Color::White
            && let Some(at) = dfs_cycle(registry, category.id, &mut colors)
        {
            return Some(at);
        }
    }

    None
}

fn dfs_cycle(
    registry: &Registry,
    id: CategoryId,
    colors: &mut HashMap<CategoryId, Color>,
) -> Option<CategoryId> {
    colors.insert(id, Color::Gray);

    let category = registry.category(id)?;

    for child in category.children() {
        let child_color = colors.get(&child).copied().unwrap_or(Color::Black);

        match child_color {
            Color::Gray => return Some(child),
            Color::White => {
                if let Some(at) = dfs_cycle(registry, child, colors) {
                    return Some(at);
                }
            }
            Color::Black => {}
        }
    }

    colors.insert(id, Color::Black);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegistryBuilder;

    #[test]
    fn test_valid_dag_with_shared_child() {
        let mut b = RegistryBuilder::new();
        let real = b.category("Real");
        let algebraic = b.category("Algebraic");
        let irrational = b.category("Irrational");
        let root_two = b.category("Quadratic Irrationals");
        b.subsets(algebraic, &[root_two]);
        b.subsets(irrational, &[root_two]);
        b.subsets(real, &[algebraic, irrational]);

        assert!(b.build().is_ok());
    }

    #[test]
    fn test_self_reference() {
        let mut b = RegistryBuilder::new();
        let real = b.category("Real");
        b.subsets(real, &[real]);

        assert_eq!(
            b.build().unwrap_err(),
            ModelError::SelfReference("Real".to_string())
        );
    }

    #[test]
    fn test_cycle_two_nodes() {
        let mut b = RegistryBuilder::new();
        let a = b.category("A");
        let c = b.category("B");
        b.subsets(a, &[c]);
        b.partition(c, &[a]);

        assert!(matches!(b.build().unwrap_err(), ModelError::CycleDetected(_)));
    }

    #[test]
    fn test_cycle_three_nodes() {
        let mut b = RegistryBuilder::new();
        let a = b.category("A");
        let c = b.category("B");
        let d = b.category("C");
        b.subsets(a, &[c]);
        b.subsets(c, &[d]);
        b.subsets(d, &[a]);

        assert_eq!(
            b.build().unwrap_err(),
            ModelError::CycleDetected("A".to_string())
        );
    }

    #[test]
    fn test_empty_name() {
        let mut b = RegistryBuilder::new();
        b.member("  ");

        assert_eq!(b.build().unwrap_err(), ModelError::EmptyName);
    }
}
