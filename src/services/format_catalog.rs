//! Custom format catalog
//!
//! The built-in catalog ships as an embedded YAML document and is parsed once
//! into a process-wide immutable value. Users can layer extra formats on top
//! from their own YAML file; the result is a new catalog, never a mutation of
//! the shared one.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::services::custom_formats::{CustomFormat, FormatCategory};

const BUILTIN_FORMATS: &str = include_str!("definitions/custom_formats.yaml");

static BUILTIN_CATALOG: Lazy<Arc<FormatCatalog>> = Lazy::new(|| {
    let catalog = FormatCatalog::from_yaml_str(BUILTIN_FORMATS)
        .expect("built-in custom format definitions are valid");
    Arc::new(catalog)
});

/// A versioned, ordered set of custom formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatCatalog {
    #[serde(default)]
    pub version: u32,
    pub formats: Vec<CustomFormat>,
}

impl FormatCatalog {
    /// The shared built-in catalog
    pub fn builtin() -> Arc<FormatCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    /// Build a catalog, rejecting empty or duplicate IDs
    pub fn new(version: u32, formats: Vec<CustomFormat>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for format in &formats {
            if format.id.trim().is_empty() {
                return Err(CatalogError::EmptyFormatId(format.name.clone()));
            }
            if !seen.insert(format.id.as_str()) {
                return Err(CatalogError::DuplicateFormat(format.id.clone()));
            }
        }
        Ok(Self { version, formats })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let document: FormatCatalog = serde_yaml::from_str(yaml)?;
        Self::new(document.version, document.formats)
    }

    /// Load a catalog document from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// A new catalog with `extra` appended after this catalog's formats.
    ///
    /// The version is the higher of the two.
    pub fn extended_with(&self, extra: FormatCatalog) -> Result<Self, CatalogError> {
        let version = self.version.max(extra.version);
        let mut formats = self.formats.clone();
        formats.extend(extra.formats);
        let catalog = Self::new(version, formats)?;

        info!(
            version = catalog.version,
            formats = catalog.formats.len(),
            "Extended custom format catalog"
        );

        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CustomFormat> {
        self.formats.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn in_category(&self, category: FormatCategory) -> impl Iterator<Item = &CustomFormat> {
        self.formats.iter().filter(move |f| f.category == category)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = FormatCatalog::builtin();
        assert!(catalog.version >= 1);
        assert!(!catalog.is_empty());
        assert!(catalog.contains("cam"));
        assert!(catalog.contains("size-optimized-groups"));
    }

    #[test]
    fn test_builtin_catalog_is_shared() {
        let a = FormatCatalog::builtin();
        let b = FormatCatalog::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_builtin_bans_prerelease_sources() {
        let catalog = FormatCatalog::builtin();
        let banned: Vec<&str> = catalog
            .in_category(FormatCategory::Banned)
            .map(|f| f.id.as_str())
            .collect();
        for id in ["cam", "telesync", "telecine", "screener", "workprint"] {
            assert!(banned.contains(&id), "{} should be banned", id);
        }
        assert!(!banned.contains(&"size-optimized-groups"));
    }

    #[test]
    fn test_every_builtin_format_has_conditions() {
        for format in &FormatCatalog::builtin().formats {
            assert!(!format.conditions.is_empty(), "{} has no conditions", format.id);
            assert!(format.conditions.iter().all(|c| c.required));
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
version: 1
formats:
  - id: dup
    name: One
    category: other
    conditions: [{type: source, value: bluray}]
  - id: dup
    name: Two
    category: other
    conditions: [{type: source, value: remux}]
"#;
        assert_matches!(
            FormatCatalog::from_yaml_str(yaml),
            Err(CatalogError::DuplicateFormat(id)) if id == "dup"
        );
    }

    #[test]
    fn test_bad_pattern_is_a_load_error() {
        let yaml = r#"
formats:
  - id: broken
    name: Broken
    category: other
    conditions: [{type: release_title, value: '(unclosed'}]
"#;
        assert_matches!(FormatCatalog::from_yaml_str(yaml), Err(CatalogError::Yaml(_)));
    }

    #[test]
    fn test_extend_builtin_catalog() {
        let extra = FormatCatalog::from_yaml_str(
            r#"
version: 1
formats:
  - id: my-favourite-group
    name: My Favourite Group
    category: groups
    conditions: [{type: release_group, value: '^FAV$'}]
"#,
        )
        .unwrap();

        let builtin = FormatCatalog::builtin();
        let extended = builtin.extended_with(extra).unwrap();
        assert_eq!(extended.len(), builtin.len() + 1);
        assert_eq!(extended.version, builtin.version);
        assert_eq!(
            extended.formats.last().map(|f| f.id.as_str()),
            Some("my-favourite-group")
        );
    }

    #[test]
    fn test_extend_rejects_collision_with_builtin() {
        let extra = FormatCatalog::from_yaml_str(
            "formats:\n  - id: cam\n    name: Mine\n    category: other\n    conditions: [{type: source, value: dvd}]\n",
        )
        .unwrap();
        assert_matches!(
            FormatCatalog::builtin().extended_with(extra),
            Err(CatalogError::DuplicateFormat(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formats.yaml");
        std::fs::write(
            &path,
            "formats:\n  - id: remaster\n    name: Remaster\n    category: enhancement\n    conditions: [{type: release_title, value: '(?i)remaster'}]\n",
        )
        .unwrap();

        let catalog = FormatCatalog::load(&path).unwrap();
        assert!(catalog.contains("remaster"));
    }

    #[test]
    fn test_load_missing_file() {
        let missing = Path::new("/definitely/not/here/formats.yaml");
        assert_matches!(FormatCatalog::load(missing), Err(CatalogError::Io { .. }));
    }
}
