//! Release scoring
//!
//! Turns a release name into a [`ScoringResult`] under a profile:
//! parse → overlay stored quality → match custom formats → ban gate →
//! base categories + format scores + bonuses → size and protocol checks →
//! normalize.
//!
//! Used by:
//! - The upgrade comparator, to score the existing file and a candidate
//! - The release ranker, to order search results
//! - The CLI `score` command

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProfileError;
use crate::services::attributes::{ReleaseAttributes, StoredQuality};
use crate::services::custom_formats::{CustomFormat, FormatCategory};
use crate::services::filename_parser::{ReleaseParser, SceneReleaseParser};
use crate::services::format_catalog::FormatCatalog;
use crate::services::format_matcher::match_formats;
use crate::services::quality_profile::{Protocol, ScoringProfile, rank_contribution};
use crate::services::score_normalizer::{Score, normalize};
use crate::services::size_policy::{SizeContext, check_size};

/// Bonus for a PROPER or REPACK release, applied once
pub const PROPER_REPACK_BONUS: i64 = 10;
/// Bonus for a full season pack
pub const SEASON_PACK_BONUS: i64 = 50;
/// Penalty for burned-in subtitles
pub const HARDCODED_SUBS_PENALTY: i64 = -50;

/// Optional inputs to a scoring call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreOptions {
    /// Authoritative quality facts for a file already in the library
    pub stored: Option<StoredQuality>,
    pub size_bytes: Option<u64>,
    /// Size context; inferred from the release name when absent
    pub context: Option<SizeContext>,
    pub protocol: Option<Protocol>,
}

/// Contribution of one base-quality category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    /// The attribute value that was scored
    pub label: String,
    pub score: i64,
}

impl CategoryScore {
    fn new(label: impl Into<String>, score: i64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Per-category base scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub resolution: CategoryScore,
    pub source: CategoryScore,
    pub codec: CategoryScore,
    pub audio: CategoryScore,
    pub hdr: CategoryScore,
}

impl ScoreBreakdown {
    pub fn base_total(&self) -> i64 {
        [
            &self.resolution,
            &self.source,
            &self.codec,
            &self.audio,
            &self.hdr,
        ]
        .iter()
        .fold(0i64, |acc, c| acc.saturating_add(c.score))
    }

    fn zeroed(&self) -> Self {
        let zero = |c: &CategoryScore| CategoryScore::new(c.label.clone(), 0);
        Self {
            resolution: zero(&self.resolution),
            source: zero(&self.source),
            codec: zero(&self.codec),
            audio: zero(&self.audio),
            hdr: zero(&self.hdr),
        }
    }
}

/// A custom format that matched, with the delta the profile applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedFormat {
    pub id: String,
    pub name: String,
    pub category: FormatCategory,
    pub score: i64,
}

/// A fixed bonus or penalty that was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedBonus {
    pub label: &'static str,
    pub score: i64,
}

/// Outcome of scoring one release under one profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub release_name: String,
    pub profile_id: String,
    pub profile_name: String,
    pub attributes: ReleaseAttributes,
    pub breakdown: ScoreBreakdown,
    pub matched_formats: Vec<MatchedFormat>,
    pub bonuses: Vec<AppliedBonus>,
    pub is_banned: bool,
    pub total_score: Score,
    pub meets_minimum: bool,
    pub size_rejected: bool,
    pub protocol_rejected: bool,
    pub normalized_score: u32,
}

impl ScoringResult {
    /// Whether the release may be grabbed at all under its profile
    pub fn is_acceptable(&self) -> bool {
        !self.is_banned && self.meets_minimum && !self.size_rejected && !self.protocol_rejected
    }

    /// Human-readable reasons the release is not acceptable
    pub fn rejection_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.is_banned {
            let banned: Vec<&str> = self
                .matched_formats
                .iter()
                .filter(|f| f.category == FormatCategory::Banned)
                .map(|f| f.name.as_str())
                .collect();
            reasons.push(format!("Banned: {}", banned.join(", ")));
        } else if !self.meets_minimum {
            reasons.push(format!("Score {} below profile minimum", self.total_score));
        }
        if self.size_rejected {
            reasons.push("Size outside profile limits".to_string());
        }
        if self.protocol_rejected {
            reasons.push("Protocol not allowed by profile".to_string());
        }
        reasons
    }
}

/// Scores releases against profiles using a format catalog
#[derive(Clone)]
pub struct QualityEvaluator {
    catalog: Arc<FormatCatalog>,
    parser: Arc<dyn ReleaseParser>,
}

impl Default for QualityEvaluator {
    fn default() -> Self {
        Self::new(FormatCatalog::builtin())
    }
}

impl std::fmt::Debug for QualityEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityEvaluator")
            .field("catalog_version", &self.catalog.version)
            .field("formats", &self.catalog.len())
            .finish()
    }
}

impl QualityEvaluator {
    pub fn new(catalog: Arc<FormatCatalog>) -> Self {
        Self {
            catalog,
            parser: Arc::new(SceneReleaseParser),
        }
    }

    /// Replace the release-name parser
    pub fn with_parser(mut self, parser: Arc<dyn ReleaseParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Score a release by name.
    ///
    /// Stored quality in `options` wins over parsed values field by field.
    /// Fails only when the profile itself is invalid.
    pub fn score_release(
        &self,
        name: &str,
        profile: &ScoringProfile,
        options: &ScoreOptions,
    ) -> Result<ScoringResult, ProfileError> {
        let mut attributes = self.parser.parse(name);
        if let Some(ref stored) = options.stored {
            attributes = attributes.overlay(stored);
        }
        self.score_attributes(name, attributes, profile, options)
    }

    /// Score already-known attributes. `raw_title` feeds title conditions.
    pub fn score_attributes(
        &self,
        raw_title: &str,
        attributes: ReleaseAttributes,
        profile: &ScoringProfile,
        options: &ScoreOptions,
    ) -> Result<ScoringResult, ProfileError> {
        profile.validate()?;

        let matched = match_formats(&attributes, raw_title, &self.catalog.formats);
        let is_banned = is_banned(&matched);
        let breakdown = base_scores(&attributes, profile);

        let context = options
            .context
            .unwrap_or_else(|| SizeContext::infer(&attributes));
        let size_rejected = check_size(options.size_bytes, profile, &context);
        let protocol_rejected = options
            .protocol
            .is_some_and(|protocol| !profile.allows_protocol(protocol));

        let (breakdown, matched_formats, bonuses, total_score) = if is_banned {
            let formats = matched.iter().map(|f| applied(f, 0)).collect();
            (breakdown.zeroed(), formats, Vec::new(), Score::NegInfinity)
        } else {
            let formats: Vec<MatchedFormat> = matched
                .iter()
                .map(|f| applied(f, profile.format_score(&f.id)))
                .collect();
            let bonuses = fixed_bonuses(&attributes);

            let total = formats
                .iter()
                .map(|f| f.score)
                .chain(bonuses.iter().map(|b| b.score))
                .fold(breakdown.base_total(), i64::saturating_add);

            (breakdown, formats, bonuses, Score::Finite(total))
        };

        let meets_minimum = !is_banned && total_score >= profile.min_score;

        debug!(
            release = %raw_title,
            profile = %profile.id,
            total = %total_score,
            banned = is_banned,
            formats = matched_formats.len(),
            "Scored release"
        );

        Ok(ScoringResult {
            release_name: raw_title.to_string(),
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            attributes,
            breakdown,
            matched_formats,
            bonuses,
            is_banned,
            total_score,
            meets_minimum,
            size_rejected,
            protocol_rejected,
            normalized_score: normalize(total_score),
        })
    }
}

/// True iff any matched format is in the banned category
pub fn is_banned(matched: &[&CustomFormat]) -> bool {
    matched.iter().any(|f| f.is_banned())
}

fn applied(format: &CustomFormat, score: i64) -> MatchedFormat {
    MatchedFormat {
        id: format.id.clone(),
        name: format.name.clone(),
        category: format.category,
        score,
    }
}

/// Position-based contribution of each base-quality category
pub fn base_scores(attributes: &ReleaseAttributes, profile: &ScoringProfile) -> ScoreBreakdown {
    let weights = &profile.weights;
    ScoreBreakdown {
        resolution: CategoryScore::new(
            attributes.resolution.as_str(),
            rank_contribution(&profile.resolution_order, &attributes.resolution, weights.resolution),
        ),
        source: CategoryScore::new(
            attributes.source.label(),
            rank_contribution(profile.source_order(), &attributes.source, weights.source),
        ),
        codec: CategoryScore::new(
            attributes.video_codec.label(),
            rank_contribution(profile.codec_order(), &attributes.video_codec, weights.codec),
        ),
        audio: CategoryScore::new(
            attributes.audio_codec.label(),
            rank_contribution(profile.audio_order(), &attributes.audio_codec, weights.audio),
        ),
        hdr: CategoryScore::new(
            attributes.hdr.label(),
            rank_contribution(profile.hdr_order(), &attributes.hdr, weights.hdr),
        ),
    }
}

fn fixed_bonuses(attributes: &ReleaseAttributes) -> Vec<AppliedBonus> {
    let mut bonuses = Vec::new();
    if attributes.is_proper || attributes.is_repack {
        bonuses.push(AppliedBonus {
            label: if attributes.is_repack { "REPACK" } else { "PROPER" },
            score: PROPER_REPACK_BONUS,
        });
    }
    if attributes.is_season_pack {
        bonuses.push(AppliedBonus {
            label: "Season pack",
            score: SEASON_PACK_BONUS,
        });
    }
    if attributes.has_hardcoded_subs {
        bonuses.push(AppliedBonus {
            label: "Hardcoded subtitles",
            score: HARDCODED_SUBS_PENALTY,
        });
    }
    bonuses
}
