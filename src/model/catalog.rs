//! YAML catalogue of members and categories.
//!
//! ```yaml
//! members:
//!   - name: "0"
//!     required_by: [Integers]
//!   - name: "1"
//! categories:
//!   - name: Natural
//!     symbol: ℕ
//!     elements: ["1"]
//!   - name: Whole
//!     subsets: [Natural]
//!     elements: ["0"]
//! ```
//!
//! Names are resolved only after every node exists, so categories may refer
//! to each other in any order.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::registry::{CategoryId, MemberId, Registry, RegistryBuilder};
use super::validations::ModelError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub required_by: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub subsets: Vec<String>,
    #[serde(default)]
    pub partitions: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    pub members: Vec<MemberSpec>,
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalogue file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalogue file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid catalogue: {0}")]
    Model(#[from] ModelError),
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build a registry: create every node, then resolve names into links.
    pub fn into_registry(self) -> Result<Registry, CatalogError> {
        let mut builder = RegistryBuilder::new();
        let mut members: HashMap<String, MemberId> = HashMap::new();
        let mut categories: HashMap<String, CategoryId> = HashMap::new();

        for spec in &self.members {
            let id = builder.member_with(&spec.name, &spec.description, spec.link.clone());
            if members.insert(spec.name.clone(), id).is_some() {
                return Err(ModelError::DuplicateMember(spec.name.clone()).into());
            }
        }
        for spec in &self.categories {
            let id = builder.category_with(
                &spec.name,
                &spec.symbol,
                &spec.description,
                spec.link.clone(),
            );
            if categories.insert(spec.name.clone(), id).is_some() {
                return Err(ModelError::DuplicateCategory(spec.name.clone()).into());
            }
        }

        let lookup_category = |name: &str, referenced_by: &str| {
            categories
                .get(name)
                .copied()
                .ok_or_else(|| ModelError::UnknownCategory {
                    name: name.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
        };

        for spec in &self.categories {
            let id = lookup_category(&spec.name, &spec.name)?;

            let elements = spec
                .elements
                .iter()
                .map(|name| {
                    members
                        .get(name)
                        .copied()
                        .ok_or_else(|| ModelError::UnknownMember {
                            name: name.clone(),
                            referenced_by: spec.name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.elements(id, &elements);

            let subsets = spec
                .subsets
                .iter()
                .map(|name| lookup_category(name, &spec.name))
                .collect::<Result<Vec<_>, _>>()?;
            builder.subsets(id, &subsets);

            for group in &spec.partitions {
                let group = group
                    .iter()
                    .map(|name| lookup_category(name, &spec.name))
                    .collect::<Result<Vec<_>, _>>()?;
                builder.partition(id, &group);
            }
        }

        for spec in &self.members {
            let Some(&member) = members.get(&spec.name) else {
                continue;
            };
            for ancestor in &spec.required_by {
                let ancestor = lookup_category(ancestor, &spec.name)?;
                builder.required_by(member, ancestor);
            }
        }

        Ok(builder.build()?)
    }
}

/// Read and build a registry from a catalogue file.
pub fn load_registry(path: &Path) -> Result<Registry, CatalogError> {
    Catalog::load(path)?.into_registry()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WHOLE: &str = r#"
members:
  - name: "0"
    required_by: [Integers]
  - name: "1"
  - name: "-1"
categories:
  - name: Integers
    subsets: [Whole]
    elements: ["-1"]
  - name: Whole
    subsets: [Natural]
    elements: ["0"]
  - name: Natural
    symbol: ℕ
    elements: ["1"]
"#;

    #[test]
    fn test_forward_references_resolve() {
        let registry = Catalog::parse(WHOLE).unwrap().into_registry().unwrap();
        let whole = registry.category_by_name("Whole").unwrap();
        let natural = registry.category_by_name("Natural").unwrap();
        let integers = registry.category_by_name("Integers").unwrap();

        assert_eq!(whole.subsets, vec![natural.id]);
        assert_eq!(natural.parents, vec![whole.id]);
        assert_eq!(natural.symbol, "ℕ");
        let zero = registry.member_by_name("0").unwrap();
        assert_eq!(zero.required_by, vec![integers.id]);
    }

    #[test]
    fn test_unknown_subset() {
        let yaml = "categories:\n  - name: Whole\n    subsets: [Natural]\n";
        let err = Catalog::parse(yaml).unwrap().into_registry().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Model(ModelError::UnknownCategory { ref name, ref referenced_by })
                if name == "Natural" && referenced_by == "Whole"
        ));
    }

    #[test]
    fn test_unknown_member() {
        let yaml = "categories:\n  - name: Natural\n    elements: [\"7\"]\n";
        let err = Catalog::parse(yaml).unwrap().into_registry().unwrap_err();
        assert!(matches!(err, CatalogError::Model(ModelError::UnknownMember { .. })));
    }

    #[test]
    fn test_duplicate_member() {
        let yaml = "members:\n  - name: \"1\"\n  - name: \"1\"\n";
        let err = Catalog::parse(yaml).unwrap().into_registry().unwrap_err();
        assert!(matches!(err, CatalogError::Model(ModelError::DuplicateMember(ref n)) if n == "1"));
    }

    #[test]
    fn test_cycle_rejected() {
        let yaml = "categories:\n  - name: A\n    subsets: [B]\n  - name: B\n    partitions: [[A]]\n";
        let err = Catalog::parse(yaml).unwrap().into_registry().unwrap_err();
        assert!(matches!(err, CatalogError::Model(ModelError::CycleDetected(_))));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = Catalog::parse("categories:\n  - name: A\n    colour: red\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_load_registry_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.yml");
        std::fs::write(&path, WHOLE).unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.members().count(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_registry(&temp_dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
