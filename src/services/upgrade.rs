//! Upgrade decisions
//!
//! Scores an existing release and a candidate under the same profile and
//! decides whether the candidate is worth grabbing. The profile's
//! `upgrade_until_score` is reported for display only and never stops an
//! upgrade; `min_score_increment` is what prevents frivolous re-grabs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProfileError;
use crate::services::quality_evaluator::{QualityEvaluator, ScoreOptions, ScoringResult};
use crate::services::quality_profile::ScoringProfile;
use crate::services::score_normalizer::Score;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeOptions {
    /// Overrides the profile's `min_score_increment`
    pub minimum_improvement: Option<i64>,
    /// Count an equal score as an upgrade (same-quality re-grab)
    pub allow_sidegrade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeResult {
    pub existing: ScoringResult,
    pub candidate: ScoringResult,
    /// `candidate - existing`; `Infinity` when the existing release is banned
    pub improvement: Score,
    pub effective_minimum: i64,
    pub is_upgrade: bool,
    /// The profile's gate on upgrade searching, reported for the scheduler
    pub upgrades_allowed: bool,
    /// Existing release has reached the profile's display cutoff
    pub is_at_cutoff_for_display: bool,
}

impl UpgradeResult {
    /// An upgrade whose candidate also passes every acceptance check
    pub fn is_acceptable_upgrade(&self) -> bool {
        self.is_upgrade && self.candidate.is_acceptable()
    }
}

/// Whether `score` has reached the profile's informational cutoff
pub fn is_at_cutoff_for_display(profile: &ScoringProfile, score: Score) -> bool {
    profile.upgrade_until_score > 0 && score >= profile.upgrade_until_score
}

/// Decide an upgrade from two results already scored under `profile`
pub fn compare_results(
    existing: ScoringResult,
    candidate: ScoringResult,
    profile: &ScoringProfile,
    options: &UpgradeOptions,
) -> UpgradeResult {
    let effective_minimum = options
        .minimum_improvement
        .or(profile.min_score_increment)
        .unwrap_or(0);

    let improvement = if existing.is_banned {
        Score::PosInfinity
    } else {
        candidate.total_score - existing.total_score
    };

    let is_upgrade = if candidate.is_banned {
        false
    } else if options.allow_sidegrade {
        improvement == Score::ZERO || improvement >= effective_minimum
    } else {
        improvement > effective_minimum
    };

    debug!(
        existing = %existing.release_name,
        candidate = %candidate.release_name,
        profile = %profile.id,
        improvement = %improvement,
        minimum = effective_minimum,
        is_upgrade,
        "Compared releases"
    );

    UpgradeResult {
        is_at_cutoff_for_display: is_at_cutoff_for_display(profile, existing.total_score),
        upgrades_allowed: profile.upgrades_allowed,
        existing,
        candidate,
        improvement,
        effective_minimum,
        is_upgrade,
    }
}

impl QualityEvaluator {
    /// Score both releases by name and decide whether `candidate` is an upgrade
    pub fn is_upgrade(
        &self,
        existing: &str,
        candidate: &str,
        profile: &ScoringProfile,
        options: &UpgradeOptions,
    ) -> Result<UpgradeResult, ProfileError> {
        self.compare(
            existing,
            &ScoreOptions::default(),
            candidate,
            &ScoreOptions::default(),
            profile,
            options,
        )
    }

    /// Like [`is_upgrade`](Self::is_upgrade) with per-release scoring options,
    /// e.g. stored quality for the existing file and a size for the candidate
    pub fn compare(
        &self,
        existing: &str,
        existing_options: &ScoreOptions,
        candidate: &str,
        candidate_options: &ScoreOptions,
        profile: &ScoringProfile,
        options: &UpgradeOptions,
    ) -> Result<UpgradeResult, ProfileError> {
        let existing = self.score_release(existing, profile, existing_options)?;
        let candidate = self.score_release(candidate, profile, candidate_options)?;
        Ok(compare_results(existing, candidate, profile, options))
    }
}
