//! Scoring profiles
//!
//! A profile is pure data: preference orderings, category weights, a
//! format-to-score map, size limits and upgrade policy. One evaluator serves
//! every profile; there is no per-profile scoring code.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ProfileError;
use crate::services::attributes::{AudioCodec, HdrFormat, Resolution, Source, VideoCodec};
use crate::services::format_catalog::FormatCatalog;

/// Transport protocol a release is offered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Torrent,
    Usenet,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Torrent => write!(f, "torrent"),
            Protocol::Usenet => write!(f, "usenet"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "torrent" | "bittorrent" => Ok(Protocol::Torrent),
            "usenet" | "nzb" => Ok(Protocol::Usenet),
            _ => Err(anyhow::anyhow!("Unknown protocol: {}", s)),
        }
    }
}

fn default_protocols() -> Vec<Protocol> {
    vec![Protocol::Torrent, Protocol::Usenet]
}

/// Maximum contribution of each base-quality category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub resolution: u32,
    pub source: u32,
    pub codec: u32,
    pub audio: u32,
    pub hdr: u32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            resolution: 8000,
            source: 4000,
            codec: 1000,
            audio: 1500,
            hdr: 1000,
        }
    }
}

/// Fallback orderings, best first, for categories a profile leaves unset
pub mod default_order {
    use super::*;

    pub const SOURCE: &[Source] = &[
        Source::Remux,
        Source::BluRay,
        Source::WebDl,
        Source::WebRip,
        Source::Hdtv,
        Source::Dvd,
    ];

    pub const CODEC: &[VideoCodec] = &[
        VideoCodec::H265,
        VideoCodec::Av1,
        VideoCodec::H264,
        VideoCodec::Vp9,
        VideoCodec::Mpeg2,
        VideoCodec::Xvid,
    ];

    pub const AUDIO: &[AudioCodec] = &[
        AudioCodec::TrueHdAtmos,
        AudioCodec::TrueHd,
        AudioCodec::DtsX,
        AudioCodec::DtsHdMa,
        AudioCodec::DdPlusAtmos,
        AudioCodec::Flac,
        AudioCodec::Pcm,
        AudioCodec::DdPlus,
        AudioCodec::Dts,
        AudioCodec::Dd,
        AudioCodec::Aac,
        AudioCodec::Opus,
        AudioCodec::Mp3,
    ];

    pub const HDR: &[HdrFormat] = &[
        HdrFormat::DolbyVision,
        HdrFormat::Hdr10Plus,
        HdrFormat::Hdr10,
        HdrFormat::Hlg,
    ];
}

/// User-selectable scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Resolutions best first. Required.
    pub resolution_order: Vec<Resolution>,
    #[serde(default)]
    pub source_order: Option<Vec<Source>>,
    #[serde(default)]
    pub codec_order: Option<Vec<VideoCodec>>,
    #[serde(default)]
    pub audio_order: Option<Vec<AudioCodec>>,
    #[serde(default)]
    pub hdr_order: Option<Vec<HdrFormat>>,
    #[serde(default)]
    pub weights: CategoryWeights,

    /// Signed score per custom format ID; absent IDs are worth 0. Required.
    pub format_scores: BTreeMap<String, i64>,

    #[serde(default = "default_true")]
    pub upgrades_allowed: bool,
    #[serde(default)]
    pub min_score: i64,
    /// Display-only cutoff; never gates upgrades
    #[serde(default)]
    pub upgrade_until_score: i64,
    #[serde(default)]
    pub min_score_increment: Option<i64>,

    #[serde(default)]
    pub movie_min_size_gb: Option<f64>,
    #[serde(default)]
    pub movie_max_size_gb: Option<f64>,
    #[serde(default)]
    pub episode_min_size_mb: Option<f64>,
    #[serde(default)]
    pub episode_max_size_mb: Option<f64>,

    #[serde(default = "default_protocols")]
    pub allowed_protocols: Vec<Protocol>,
}

fn default_true() -> bool {
    true
}

impl ScoringProfile {
    /// Score delta for a custom format under this profile
    pub fn format_score(&self, format_id: &str) -> i64 {
        self.format_scores.get(format_id).copied().unwrap_or(0)
    }

    pub fn allows_protocol(&self, protocol: Protocol) -> bool {
        self.allowed_protocols.contains(&protocol)
    }

    pub fn source_order(&self) -> &[Source] {
        self.source_order.as_deref().unwrap_or(default_order::SOURCE)
    }

    pub fn codec_order(&self) -> &[VideoCodec] {
        self.codec_order.as_deref().unwrap_or(default_order::CODEC)
    }

    pub fn audio_order(&self) -> &[AudioCodec] {
        self.audio_order.as_deref().unwrap_or(default_order::AUDIO)
    }

    pub fn hdr_order(&self) -> &[HdrFormat] {
        self.hdr_order.as_deref().unwrap_or(default_order::HDR)
    }

    /// Reject profiles that cannot produce a well-defined score
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.resolution_order.is_empty() {
            return Err(ProfileError::EmptyResolutionOrder {
                profile: self.id.clone(),
            });
        }

        self.check_order("resolution", &self.resolution_order, Resolution::Unknown, self.weights.resolution)?;
        self.check_order("source", self.source_order(), Source::Unknown, self.weights.source)?;
        self.check_order("codec", self.codec_order(), VideoCodec::Unknown, self.weights.codec)?;
        self.check_order("audio", self.audio_order(), AudioCodec::Unknown, self.weights.audio)?;
        self.check_order("hdr", self.hdr_order(), HdrFormat::None, self.weights.hdr)?;

        self.check_size_bounds("movie", self.movie_min_size_gb, self.movie_max_size_gb)?;
        self.check_size_bounds("episode", self.episode_min_size_mb, self.episode_max_size_mb)?;

        Ok(())
    }

    /// Log format IDs that the catalog does not define
    pub fn warn_unknown_formats(&self, catalog: &FormatCatalog) {
        for id in self.format_scores.keys().filter(|id| !catalog.contains(id)) {
            warn!(profile = %self.id, format = %id, "Profile scores a custom format that is not in the catalog");
        }
    }

    fn check_order<T>(
        &self,
        category: &'static str,
        order: &[T],
        unknown: T,
        weight: u32,
    ) -> Result<(), ProfileError>
    where
        T: Copy + Eq + std::hash::Hash + Display,
    {
        let mut seen = HashSet::new();
        for value in order {
            if *value == unknown {
                return Err(ProfileError::UnknownRanked {
                    profile: self.id.clone(),
                    category,
                });
            }
            if !seen.insert(*value) {
                return Err(ProfileError::DuplicateRanking {
                    profile: self.id.clone(),
                    category,
                    value: value.to_string(),
                });
            }
        }
        if (weight as usize) < order.len() {
            return Err(ProfileError::WeightTooSmall {
                profile: self.id.clone(),
                category,
                weight,
                len: order.len(),
            });
        }
        Ok(())
    }

    fn check_size_bounds(
        &self,
        kind: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), ProfileError> {
        for (bound, value) in [("minimum", min), ("maximum", max)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ProfileError::InvalidSizeBound {
                        profile: self.id.clone(),
                        bound,
                        value: v,
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ProfileError::InvertedSizeBounds {
                    profile: self.id.clone(),
                    kind,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Contribution of `value` within a best-first ordering.
///
/// The top entry earns the full weight and each step down earns strictly
/// less. Values not in the ordering earn 0.
pub fn rank_contribution<T: PartialEq>(order: &[T], value: &T, weight: u32) -> i64 {
    let n = order.len() as i64;
    match order.iter().position(|v| v == value) {
        Some(index) => i64::from(weight) * (n - index as i64) / n,
        None => 0,
    }
}
