//! Condition evaluation and custom format matching
//!
//! Matching is catalog-wide: every format in the catalog is evaluated for
//! every release. Profiles only decide what a matched format is worth.

use crate::services::attributes::{
    AudioChannels, AudioCodec, ReleaseAttributes, Resolution, Source, VideoCodec,
};
use crate::services::custom_formats::{Condition, ConditionKind, CustomFormat};

/// Evaluate a single condition against a release.
///
/// Attribute conditions use exact equality and never match an unknown
/// attribute. Group conditions never match a release without a group.
/// The negate flag is applied last.
pub fn evaluate_condition(
    condition: &Condition,
    attributes: &ReleaseAttributes,
    raw_title: &str,
) -> bool {
    let raw = match &condition.kind {
        ConditionKind::ReleaseTitle(pattern) => pattern.is_match(raw_title),
        ConditionKind::ReleaseGroup(pattern) => attributes
            .release_group
            .as_deref()
            .is_some_and(|group| pattern.is_match(group)),
        ConditionKind::Resolution(target) => {
            *target != Resolution::Unknown && attributes.resolution == *target
        }
        ConditionKind::Source(target) => *target != Source::Unknown && attributes.source == *target,
        ConditionKind::VideoCodec(target) => {
            *target != VideoCodec::Unknown && attributes.video_codec == *target
        }
        ConditionKind::AudioCodec(target) => {
            *target != AudioCodec::Unknown && attributes.audio_codec == *target
        }
        ConditionKind::AudioChannels(target) => {
            *target != AudioChannels::Unknown && attributes.audio_channels == *target
        }
        ConditionKind::Hdr(target) => attributes.hdr == *target,
        ConditionKind::BitDepth(target) => attributes.bit_depth == Some(*target),
        ConditionKind::Flag(flag) => attributes.has_flag(*flag),
    };

    if condition.negate { !raw } else { raw }
}

/// Whether a custom format matches a release.
///
/// A format with no conditions never matches. Every required condition must
/// pass. A format made only of advisory conditions needs at least one of
/// them to pass; advisory conditions never veto a format that has required ones.
pub fn format_matches(format: &CustomFormat, attributes: &ReleaseAttributes, raw_title: &str) -> bool {
    if format.conditions.is_empty() {
        return false;
    }

    let mut has_required = false;
    let mut any_advisory_passed = false;

    for condition in &format.conditions {
        let passed = evaluate_condition(condition, attributes, raw_title);
        if condition.required {
            has_required = true;
            if !passed {
                return false;
            }
        } else if passed {
            any_advisory_passed = true;
        }
    }

    has_required || any_advisory_passed
}

/// Every format in `formats` that matches, in declaration order
pub fn match_formats<'a>(
    attributes: &ReleaseAttributes,
    raw_title: &str,
    formats: &'a [CustomFormat],
) -> Vec<&'a CustomFormat> {
    formats
        .iter()
        .filter(|format| format_matches(format, attributes, raw_title))
        .collect()
}
