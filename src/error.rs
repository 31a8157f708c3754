//! Error types for the quality engine
//!
//! Scoring itself never fails on release input. Errors only come from
//! configuration: malformed profiles, bad custom format definitions, or
//! definition files that cannot be read.

use std::path::PathBuf;

use thiserror::Error;

/// A scoring profile that cannot be used
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    /// The profile does not rank any resolution
    #[error("profile '{profile}' has an empty resolution order")]
    EmptyResolutionOrder { profile: String },

    /// A value appears more than once in a preference ordering
    #[error("profile '{profile}' lists {value} more than once in its {category} order")]
    DuplicateRanking {
        profile: String,
        category: &'static str,
        value: String,
    },

    /// `unknown` cannot be ranked
    #[error("profile '{profile}' ranks 'unknown' in its {category} order")]
    UnknownRanked {
        profile: String,
        category: &'static str,
    },

    /// The weight cannot give every ranked value a distinct contribution
    #[error("profile '{profile}' {category} weight {weight} is smaller than its order length {len}")]
    WeightTooSmall {
        profile: String,
        category: &'static str,
        weight: u32,
        len: usize,
    },

    /// A size bound is negative or not a finite number
    #[error("profile '{profile}' has an invalid {bound} size bound: {value}")]
    InvalidSizeBound {
        profile: String,
        bound: &'static str,
        value: f64,
    },

    /// Minimum size is larger than maximum size
    #[error("profile '{profile}' {kind} minimum size {min} exceeds maximum {max}")]
    InvertedSizeBounds {
        profile: String,
        kind: &'static str,
        min: f64,
        max: f64,
    },
}

/// A single custom format condition that cannot be compiled
#[derive(Debug, Error)]
pub enum ConditionError {
    /// Regular expression failed to compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Attribute value is not part of the attribute's domain
    #[error("invalid {kind} value '{value}'")]
    InvalidValue { kind: &'static str, value: String },
}

/// Loading or extending the format catalog or the profile catalog failed
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Definition file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Definition document is not valid YAML for the expected shape
    #[error("invalid definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A custom format ID is defined twice
    #[error("duplicate custom format id '{0}'")]
    DuplicateFormat(String),

    /// A custom format has an empty ID
    #[error("custom format '{0}' has an empty id")]
    EmptyFormatId(String),

    /// A profile ID is defined twice
    #[error("duplicate profile id '{0}'")]
    DuplicateProfile(String),

    /// A loaded profile failed validation
    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),
}
