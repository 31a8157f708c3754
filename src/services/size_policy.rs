//! File size limits
//!
//! Movies are checked against GB bounds, episodes against MB bounds. A
//! season pack is checked per episode using the average episode size, and
//! skipped entirely when the episode count is unknown.

use serde::{Deserialize, Serialize};

use crate::services::attributes::ReleaseAttributes;
use crate::services::quality_profile::ScoringProfile;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Episode,
}

impl std::str::FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Ok(MediaType::Movie),
            "episode" | "tv" | "series" => Ok(MediaType::Episode),
            _ => Err(anyhow::anyhow!("Unknown media type: {}", s)),
        }
    }
}

/// What a release's size should be measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeContext {
    pub media_type: MediaType,
    #[serde(default)]
    pub is_season_pack: bool,
    #[serde(default)]
    pub episode_count: Option<u32>,
}

impl SizeContext {
    pub fn movie() -> Self {
        Self {
            media_type: MediaType::Movie,
            is_season_pack: false,
            episode_count: None,
        }
    }

    pub fn episode() -> Self {
        Self {
            media_type: MediaType::Episode,
            is_season_pack: false,
            episode_count: None,
        }
    }

    pub fn season_pack(episode_count: Option<u32>) -> Self {
        Self {
            media_type: MediaType::Episode,
            is_season_pack: true,
            episode_count,
        }
    }

    /// Best guess from parsed attributes when the caller gives no context
    pub fn infer(attributes: &ReleaseAttributes) -> Self {
        if attributes.is_season_pack {
            Self::season_pack(None)
        } else if attributes.is_episode || attributes.is_daily {
            Self::episode()
        } else {
            Self::movie()
        }
    }
}

/// Whether a release of `size_bytes` falls outside the profile's limits.
///
/// Returns `false` when no size is known, and for season packs whose episode
/// count is unknown or zero.
pub fn check_size(size_bytes: Option<u64>, profile: &ScoringProfile, context: &SizeContext) -> bool {
    let Some(size_bytes) = size_bytes else {
        return false;
    };
    let size = size_bytes as f64;

    match context.media_type {
        MediaType::Movie if !context.is_season_pack => outside(
            size / BYTES_PER_GB,
            profile.movie_min_size_gb,
            profile.movie_max_size_gb,
        ),
        _ => {
            let per_episode = if context.is_season_pack {
                match context.episode_count {
                    Some(count) if count > 0 => size / f64::from(count),
                    _ => return false,
                }
            } else {
                size
            };
            outside(
                per_episode / BYTES_PER_MB,
                profile.episode_min_size_mb,
                profile.episode_max_size_mb,
            )
        }
    }
}

fn outside(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max)
}
