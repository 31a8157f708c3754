//! Custom format definitions
//!
//! A custom format is a named rule that tags a release with a quality or
//! provenance trait ("Remux tier 1 group", "CAM", "Dolby Vision"). Formats
//! are pure data: a category plus a list of typed conditions. Profiles decide
//! what a matched format is worth.
//!
//! # YAML shape
//!
//! ```yaml
//! - id: size-optimized-groups
//!   name: Size Optimized Groups
//!   category: groups
//!   conditions:
//!     - type: release_group
//!       value: '^(YTS(\.(MX|AM|LT))?|YIFY)$'
//!     - type: resolution
//!       value: 2160p
//!       negate: true
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConditionError;
use crate::services::attributes::{
    AudioChannels, AudioCodec, HdrFormat, ReleaseFlag, Resolution, Source, VideoCodec,
};

/// Grouping of custom formats. Only `Banned` has fixed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    /// Unacceptable under every profile
    Banned,
    ContentToAvoid,
    Enhancement,
    Groups,
    Other,
}

impl std::fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatCategory::Banned => write!(f, "banned"),
            FormatCategory::ContentToAvoid => write!(f, "content_to_avoid"),
            FormatCategory::Enhancement => write!(f, "enhancement"),
            FormatCategory::Groups => write!(f, "groups"),
            FormatCategory::Other => write!(f, "other"),
        }
    }
}

/// A compiled regular expression that remembers its source text
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern. Matching is case-sensitive unless the pattern
    /// opts in with `(?i)`, and is never auto-anchored.
    pub fn new(pattern: &str) -> Result<Self, ConditionError> {
        Regex::new(pattern)
            .map(Pattern)
            .map_err(|source| ConditionError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// What a condition tests, with its typed target
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    ReleaseTitle(Pattern),
    ReleaseGroup(Pattern),
    Resolution(Resolution),
    Source(Source),
    VideoCodec(VideoCodec),
    AudioCodec(AudioCodec),
    AudioChannels(AudioChannels),
    Hdr(HdrFormat),
    /// Bits per colour channel
    BitDepth(u8),
    Flag(ReleaseFlag),
}

/// Condition type tag as written in definition files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    ReleaseTitle,
    ReleaseGroup,
    Resolution,
    Source,
    VideoCodec,
    AudioCodec,
    AudioChannels,
    Hdr,
    BitDepth,
    Flag,
}

/// One predicate of a custom format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionDefinition", into = "ConditionDefinition")]
pub struct Condition {
    pub kind: ConditionKind,
    /// Required conditions gate the format; advisory ones do not
    pub required: bool,
    /// Inverts the raw match before the required gate is applied
    pub negate: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            required: true,
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn advisory(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn condition_type(&self) -> ConditionType {
        match self.kind {
            ConditionKind::ReleaseTitle(_) => ConditionType::ReleaseTitle,
            ConditionKind::ReleaseGroup(_) => ConditionType::ReleaseGroup,
            ConditionKind::Resolution(_) => ConditionType::Resolution,
            ConditionKind::Source(_) => ConditionType::Source,
            ConditionKind::VideoCodec(_) => ConditionType::VideoCodec,
            ConditionKind::AudioCodec(_) => ConditionType::AudioCodec,
            ConditionKind::AudioChannels(_) => ConditionType::AudioChannels,
            ConditionKind::Hdr(_) => ConditionType::Hdr,
            ConditionKind::BitDepth(_) => ConditionType::BitDepth,
            ConditionKind::Flag(_) => ConditionType::Flag,
        }
    }
}

/// Serialized form of a [`Condition`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDefinition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub value: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub negate: bool,
}

fn default_required() -> bool {
    true
}

impl TryFrom<ConditionDefinition> for Condition {
    type Error = ConditionError;

    fn try_from(def: ConditionDefinition) -> Result<Self, Self::Error> {
        let value = def.value.as_str();
        let kind = match def.condition_type {
            ConditionType::ReleaseTitle => ConditionKind::ReleaseTitle(Pattern::new(value)?),
            ConditionType::ReleaseGroup => ConditionKind::ReleaseGroup(Pattern::new(value)?),
            ConditionType::Resolution => ConditionKind::Resolution(value.parse()?),
            ConditionType::Source => ConditionKind::Source(value.parse()?),
            ConditionType::VideoCodec => ConditionKind::VideoCodec(value.parse()?),
            ConditionType::AudioCodec => ConditionKind::AudioCodec(value.parse()?),
            ConditionType::AudioChannels => ConditionKind::AudioChannels(value.parse()?),
            ConditionType::Hdr => ConditionKind::Hdr(value.parse()?),
            ConditionType::BitDepth => ConditionKind::BitDepth(parse_bit_depth(value)?),
            ConditionType::Flag => ConditionKind::Flag(value.parse()?),
        };
        Ok(Condition {
            kind,
            required: def.required,
            negate: def.negate,
        })
    }
}

fn parse_bit_depth(value: &str) -> Result<u8, ConditionError> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|bits| *bits > 0)
        .ok_or_else(|| ConditionError::InvalidValue {
            kind: "bit depth",
            value: value.to_string(),
        })
}

impl From<Condition> for ConditionDefinition {
    fn from(condition: Condition) -> Self {
        let condition_type = condition.condition_type();
        let value = match &condition.kind {
            ConditionKind::ReleaseTitle(p) | ConditionKind::ReleaseGroup(p) => {
                p.as_str().to_string()
            }
            ConditionKind::Resolution(v) => v.to_string(),
            ConditionKind::Source(v) => v.to_string(),
            ConditionKind::VideoCodec(v) => v.to_string(),
            ConditionKind::AudioCodec(v) => v.to_string(),
            ConditionKind::AudioChannels(v) => v.to_string(),
            ConditionKind::Hdr(v) => v.to_string(),
            ConditionKind::BitDepth(v) => v.to_string(),
            ConditionKind::Flag(v) => v.to_string(),
        };
        ConditionDefinition {
            condition_type,
            value,
            required: condition.required,
            negate: condition.negate,
        }
    }
}

/// A named, categorised rule over release attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFormat {
    /// Stable identifier used as the key in profile score maps
    pub id: String,
    pub name: String,
    pub category: FormatCategory,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl CustomFormat {
    pub fn is_banned(&self) -> bool {
        self.category == FormatCategory::Banned
    }
}
