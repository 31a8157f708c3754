//! Ranking of candidate releases for one item
//!
//! Scores every candidate under a profile, orders the acceptable ones best
//! first, and lists the rejected ones afterwards with their reasons.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::error::ProfileError;
use crate::services::quality_evaluator::{QualityEvaluator, ScoreOptions, ScoringResult};
use crate::services::quality_profile::ScoringProfile;

/// A search result to rank
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub name: String,
    pub options: ScoreOptions,
}

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: ScoreOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScoreOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRelease {
    /// 1-based position among acceptable releases
    pub rank: usize,
    pub result: ScoringResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRelease {
    pub result: ScoringResult,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub profile_id: String,
    pub accepted: Vec<RankedRelease>,
    pub rejected: Vec<RejectedRelease>,
}

impl Ranking {
    pub fn best(&self) -> Option<&ScoringResult> {
        self.accepted.first().map(|r| &r.result)
    }
}

fn by_score_then_name(a: &ScoringResult, b: &ScoringResult) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a.release_name.cmp(&b.release_name))
}

impl QualityEvaluator {
    pub fn rank_releases(
        &self,
        candidates: &[Candidate],
        profile: &ScoringProfile,
    ) -> Result<Ranking, ProfileError> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for candidate in candidates {
            let result = self.score_release(&candidate.name, profile, &candidate.options)?;
            if result.is_acceptable() {
                accepted.push(result);
            } else {
                rejected.push(result);
            }
        }

        accepted.sort_by(by_score_then_name);
        rejected.sort_by(by_score_then_name);

        debug!(
            profile = %profile.id,
            accepted = accepted.len(),
            rejected = rejected.len(),
            "Ranked releases"
        );

        Ok(Ranking {
            profile_id: profile.id.clone(),
            accepted: accepted
                .into_iter()
                .enumerate()
                .map(|(i, result)| RankedRelease { rank: i + 1, result })
                .collect(),
            rejected: rejected
                .into_iter()
                .map(|result| RejectedRelease {
                    reasons: result.rejection_reasons(),
                    result,
                })
                .collect(),
        })
    }
}
