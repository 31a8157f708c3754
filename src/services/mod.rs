//! Release scoring services

pub mod attributes;
pub mod custom_formats;
pub mod filename_parser;
pub mod format_catalog;
pub mod format_matcher;
pub mod profile_catalog;
pub mod quality_evaluator;
pub mod quality_profile;
pub mod release_ranker;
pub mod score_normalizer;
pub mod size_policy;
pub mod upgrade;

pub use attributes::{ReleaseAttributes, StoredQuality};
pub use custom_formats::{Condition, ConditionKind, CustomFormat, FormatCategory};
pub use filename_parser::{ReleaseParser, SceneReleaseParser, parse_release};
pub use format_catalog::FormatCatalog;
pub use format_matcher::{evaluate_condition, format_matches, match_formats};
pub use profile_catalog::ProfileCatalog;
pub use quality_evaluator::{QualityEvaluator, ScoreOptions, ScoringResult};
pub use quality_profile::{Protocol, ScoringProfile};
pub use release_ranker::{Candidate, Ranking};
pub use score_normalizer::{Score, normalize};
pub use size_policy::{MediaType, SizeContext, check_size};
pub use upgrade::{UpgradeOptions, UpgradeResult};
