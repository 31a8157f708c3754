//! Scoring profile catalog
//!
//! Built-in presets are parsed once from embedded YAML. A catalog may be
//! extended with user profiles loaded from disk; user profiles cannot
//! replace a built-in one.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::services::format_catalog::FormatCatalog;
use crate::services::quality_profile::ScoringProfile;

const BUILTIN_PROFILES: &str = include_str!("definitions/quality_profiles.yaml");

static BUILTIN_PROFILE_CATALOG: Lazy<Arc<ProfileCatalog>> = Lazy::new(|| {
    let catalog = ProfileCatalog::from_yaml_str(BUILTIN_PROFILES)
        .expect("built-in quality profiles are valid");
    Arc::new(catalog)
});

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    profiles: Vec<ScoringProfile>,
}

/// An ordered set of validated scoring profiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileCatalog {
    profiles: Vec<ScoringProfile>,
}

impl ProfileCatalog {
    /// The shared built-in presets
    pub fn builtin() -> Arc<ProfileCatalog> {
        Arc::clone(&BUILTIN_PROFILE_CATALOG)
    }

    /// Build a catalog, validating every profile and rejecting duplicate IDs
    pub fn new(profiles: Vec<ScoringProfile>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            profile.validate()?;
            if !seen.insert(profile.id.as_str()) {
                return Err(CatalogError::DuplicateProfile(profile.id.clone()));
            }
        }
        Ok(Self { profiles })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let document: ProfileDocument = serde_yaml::from_str(yaml)?;
        Self::new(document.profiles)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// A new catalog with the user's profiles after this catalog's
    pub fn extended_with(&self, extra: ProfileCatalog) -> Result<Self, CatalogError> {
        let mut profiles = self.profiles.clone();
        profiles.extend(extra.profiles);
        let catalog = Self::new(profiles)?;

        info!(profiles = catalog.profiles.len(), "Extended quality profile catalog");

        Ok(catalog)
    }

    /// Look up a profile by ID, or by name ignoring case
    pub fn get(&self, key: &str) -> Option<&ScoringProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }

    pub fn all(&self) -> &[ScoringProfile] {
        &self.profiles
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.id.as_str())
    }

    /// Warn about format scores that refer to formats the catalog lacks
    pub fn check_against(&self, formats: &FormatCatalog) {
        for profile in &self.profiles {
            profile.warn_unknown_formats(formats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::services::attributes::Resolution;
    use crate::services::quality_profile::Protocol;
    use assert_matches::assert_matches;

    const USER_PROFILE: &str = r#"
profiles:
  - id: anime-1080
    name: Anime 1080p
    resolution_order: [1080p, 720p]
    format_scores:
      ten-bit: 1000
    movie_max_size_gb: 8
"#;

    #[test]
    fn test_builtin_presets() {
        let catalog = ProfileCatalog::builtin();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids, vec!["best", "efficient", "micro", "streaming"]);
    }

    #[test]
    fn test_builtin_profiles_reference_known_formats() {
        let formats = FormatCatalog::builtin();
        for profile in ProfileCatalog::builtin().all() {
            for id in profile.format_scores.keys() {
                assert!(formats.contains(id), "{} scores unknown format {}", profile.id, id);
            }
        }
    }

    #[test]
    fn test_builtin_profiles_allow_torrents() {
        for profile in ProfileCatalog::builtin().all() {
            assert!(profile.allows_protocol(Protocol::Torrent), "{}", profile.id);
        }
    }

    #[test]
    fn test_size_conscious_profiles_rank_1080p_first() {
        let catalog = ProfileCatalog::builtin();
        assert_eq!(catalog.get("best").unwrap().resolution_order[0], Resolution::P2160);
        assert_eq!(catalog.get("efficient").unwrap().resolution_order[0], Resolution::P1080);
        assert_eq!(catalog.get("micro").unwrap().resolution_order[0], Resolution::P720);
    }

    #[test]
    fn test_lookup_by_name_ignores_case() {
        let catalog = ProfileCatalog::builtin();
        assert_eq!(catalog.get("best quality").map(|p| p.id.as_str()), Some("best"));
        assert_eq!(catalog.get("STREAMING").map(|p| p.id.as_str()), Some("streaming"));
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_extend_with_user_profiles() {
        let user = ProfileCatalog::from_yaml_str(USER_PROFILE).unwrap();
        let catalog = ProfileCatalog::builtin().extended_with(user).unwrap();
        assert_eq!(catalog.all().len(), 5);

        let anime = catalog.get("anime-1080").unwrap();
        assert_eq!(anime.format_score("ten-bit"), 1000);
        assert_eq!(anime.movie_max_size_gb, Some(8.0));
    }

    #[test]
    fn test_user_profile_cannot_shadow_builtin() {
        let user = ProfileCatalog::from_yaml_str(
            "profiles:\n  - id: best\n    name: Mine\n    resolution_order: [720p]\n    format_scores: {}\n",
        )
        .unwrap();
        assert_matches!(
            ProfileCatalog::builtin().extended_with(user),
            Err(CatalogError::DuplicateProfile(id)) if id == "best"
        );
    }

    #[test]
    fn test_invalid_profile_fails_to_load() {
        let yaml = "profiles:\n  - id: broken\n    name: Broken\n    resolution_order: []\n    format_scores: {}\n";
        assert_matches!(
            ProfileCatalog::from_yaml_str(yaml),
            Err(CatalogError::InvalidProfile(ProfileError::EmptyResolutionOrder { .. }))
        );
    }

    #[test]
    fn test_load_user_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quality_profiles.yaml");
        std::fs::write(&path, USER_PROFILE).unwrap();

        let catalog = ProfileCatalog::load(&path).unwrap();
        assert!(catalog.get("Anime 1080p").is_some());
    }
}
