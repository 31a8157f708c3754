//! Release name parser for scene-style names
//!
//! Parses names like:
//! - "Movie.2024.2160p.UHD.BluRay.REMUX.DTS-HD.MA-GROUP"
//! - "Chicago Fire S14E08 1080p WEB h264-ETHEL"
//! - "Corner Gas S06E12 Super Sensitive 1080p AMZN WEB-DL DDP2 0 H 264-QOQ"
//!
//! The parser never fails. Anything it cannot recognise stays `Unknown`,
//! so `"Movie.2024-GROUP"` yields a mostly-unknown attribute set.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::services::attributes::{
    AudioChannels, AudioCodec, HdrFormat, ReleaseAttributes, Resolution, Source, VideoCodec,
};

/// Turns a release name into structured attributes
pub trait ReleaseParser: Send + Sync {
    fn parse(&self, name: &str) -> ReleaseAttributes;
}

/// Regex-based parser for scene and P2P naming conventions
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneReleaseParser;

impl ReleaseParser for SceneReleaseParser {
    fn parse(&self, name: &str) -> ReleaseAttributes {
        parse_release(name)
    }
}

fn compile<T: Copy>(patterns: &[(&str, T)]) -> Vec<(Regex, T)> {
    patterns
        .iter()
        .map(|(p, v)| (Regex::new(p).expect("static release pattern"), *v))
        .collect()
}

static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(mkv|mp4|avi|m4v|ts|m2ts|wmv|mov|webm|mpg)$").expect("static pattern")
});
static TRAILING_TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s*\[[^\]]*\])+$").expect("static pattern"));

static RESOLUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{3,4})[pi]\b").expect("static pattern"));
static UHD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(4K|UHD)\b").expect("static pattern"));

// Pre-release sources come first so a CAM tag wins over anything else in the
// quality region. Scene tags for them are upper-case, so these patterns are
// case-sensitive and title words like "Cam" or "Screener" never hit them.
static SOURCE_PATTERNS: Lazy<Vec<(Regex, Source)>> = Lazy::new(|| {
    compile(&[
        (r"\b(CAM|HDCAM|CAMRip|CAMRIP|CAM-RIP)\b", Source::Cam),
        (r"\b(TS|HDTS|TELESYNC|PDVD|TSRip|TSRIP)\b", Source::Telesync),
        (r"\b(TC|HDTC|TELECINE)\b", Source::Telecine),
        (r"\b(WORKPRINT|WP)\b", Source::Workprint),
        (r"\b(SCR|SCREENER|DVDSCR|DVDScr|DVD-SCR|BDSCR|WEBSCR)\b", Source::Screener),
        (r"(?i)\bREMUX\b", Source::Remux),
        (r"(?i)\b(BLU-?RAY|BDRIP|BRRIP|BDMV|BD25|BD50)\b", Source::BluRay),
        (r"(?i)\bWEB[-. ]?RIP\b", Source::WebRip),
        (r"(?i)\bWEB(?:[-. ]?DL)?\b", Source::WebDl),
        (r"(?i)\b(HDTV|PDTV|SDTV|DSR|TVRIP|HDTVRIP)\b", Source::Hdtv),
        (r"(?i:\b(DVD|DVDRIP|DVDR|DVD5|DVD9)\b)|\b(NTSC|PAL)\b", Source::Dvd),
        // Streaming service tags without an explicit WEB marker
        (r"\b(AMZN|NF|DSNP|ATVP|HMAX|HULU|PCOK|PMTP)\b", Source::WebDl),
    ])
});

// First token that ends the title: a year, a resolution or an episode marker
static QUALITY_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b((19|20)\d{2}|\d{3,4}[pi]|S\d{1,2}(E\d{1,3})?|\d{1,2}x\d{2,3})\b")
        .expect("static pattern")
});

static CODEC_PATTERNS: Lazy<Vec<(Regex, VideoCodec)>> = Lazy::new(|| {
    compile(&[
        (r"(?i)\b(x265|h[ .]?265|HEVC)\b", VideoCodec::H265),
        (r"(?i)\b(x264|h[ .]?264|AVC)\b", VideoCodec::H264),
        (r"(?i)\bAV1\b", VideoCodec::Av1),
        (r"(?i)\bVP9\b", VideoCodec::Vp9),
        (r"(?i)\b(XVID|DIVX)\b", VideoCodec::Xvid),
        (r"(?i)\bMPEG-?2\b", VideoCodec::Mpeg2),
    ])
});

static AUDIO_PATTERNS: Lazy<Vec<(Regex, AudioCodec)>> = Lazy::new(|| {
    compile(&[
        (r"(?i)\bTRUE-?HD", AudioCodec::TrueHd),
        (r"(?i)\bDTS[-. ]?X\b", AudioCodec::DtsX),
        (r"(?i)\bDTS[-. ]?HD(?:[-. ]?MA)?", AudioCodec::DtsHdMa),
        (r"(?i)\bDTS", AudioCodec::Dts),
        (r"(?i)\b(DDPA|DDP|DD\+|EAC3|E-AC-3)", AudioCodec::DdPlus),
        (r"(?i)\b(DD|AC3|AC-3)(?:\d|\b)", AudioCodec::Dd),
        (r"(?i)\bFLAC", AudioCodec::Flac),
        (r"(?i)\bL?PCM\b", AudioCodec::Pcm),
        (r"(?i)\bAAC", AudioCodec::Aac),
        (r"(?i)\bOPUS\b", AudioCodec::Opus),
        (r"(?i)\bMP3\b", AudioCodec::Mp3),
    ])
});

static ATMOS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(ATMOS|DDPA)").expect("static pattern"));
static CHANNELS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)([1-8])[ .]([0-2])(?:\D|$)").expect("static pattern"));

static HDR_PATTERNS: Lazy<Vec<(Regex, HdrFormat)>> = Lazy::new(|| {
    compile(&[
        (r"(?i)\b(DV|DOVI|DOLBY[ .]?VISION)\b", HdrFormat::DolbyVision),
        (r"(?i)\bHDR10(\+|PLUS)", HdrFormat::Hdr10Plus),
        (r"(?i)\bHDR(10)?\b", HdrFormat::Hdr10),
        (r"(?i)\bHLG\b", HdrFormat::Hlg),
    ])
});

static BIT_DEPTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(8|10|12)[ .-]?bits?\b").expect("static pattern"));
static HI10_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bHi10P?\b").expect("static pattern"));

static PROPER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bPROPER\b").expect("static pattern"));
static REPACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(REPACK\d?|RERIP)\b").expect("static pattern"));
static THREE_D_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(3D|HSBS|HOU|H-SBS|H-OU)\b").expect("static pattern"));
static HARDCODED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(HC|HARDSUBS?|HARDCODED|KORSUBS?|HCSUBS?)\b").expect("static pattern")
});
static DAILY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(19|20)\d{2}[ .-](0[1-9]|1[0-2])[ .-](0[1-9]|[12]\d|3[01])\b")
        .expect("static pattern")
});
static EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS\d{1,2}E\d{1,3}|\b\d{1,2}x\d{2,3}\b").expect("static pattern")
});
static SEASON_PACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS\d{1,2}\b|\bS\d{1,2}[-. ]?S\d{1,2}\b|\bSeasons?[ .]\d{1,2}\b|\bComplete[ .]Series\b")
        .expect("static pattern")
});
static ANIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[[^\]]+\].+\s-\s\d{1,4}(?:v\d)?\b|(?i)\banime\b").expect("static pattern")
});

static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([^\s\-\[\]]+)$").expect("static pattern"));
static BRACKET_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]").expect("static pattern"));
// Tokens that follow a dash but are part of a quality tag, not a group
static NOT_A_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(DL|HD|HD\.MA|MA|RIP|DLRIP|X|SBS|OU|SCR|AC3|\d+)$").expect("static pattern")
});

fn first_match<T: Copy>(patterns: &[(Regex, T)], text: &str) -> Option<T> {
    patterns
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, value)| *value)
}

/// Parse a release name into quality attributes
pub fn parse_release(name: &str) -> ReleaseAttributes {
    // Underscores are word characters to the regex engine; treat them as separators
    let stripped = EXTENSION_RE.replace(name.trim(), "");
    let text = stripped.replace('_', ".");

    // Source and HDR tags are only trusted between the title and the group
    let (body, group) = split_dashed_group(&text);
    let quality = quality_region(body);

    let mut attrs = ReleaseAttributes {
        resolution: parse_resolution(&text),
        source: first_match(&SOURCE_PATTERNS, quality).unwrap_or_default(),
        video_codec: first_match(&CODEC_PATTERNS, &text).unwrap_or_default(),
        audio_codec: parse_audio(&text),
        audio_channels: parse_channels(&text),
        hdr: first_match(&HDR_PATTERNS, quality).unwrap_or_default(),
        bit_depth: parse_bit_depth(&text),
        release_group: group
            .map(str::to_string)
            .or_else(|| parse_bracket_group(&text)),
        ..Default::default()
    };

    attrs.is_proper = PROPER_RE.is_match(&text);
    attrs.is_repack = REPACK_RE.is_match(&text);
    attrs.is_3d = THREE_D_RE.is_match(&text);
    attrs.has_hardcoded_subs = HARDCODED_RE.is_match(&text);
    attrs.is_daily = DAILY_RE.is_match(&text);
    attrs.is_episode = EPISODE_RE.is_match(&text) || attrs.is_daily;
    attrs.is_season_pack = !attrs.is_episode && SEASON_PACK_RE.is_match(&text);
    attrs.is_anime = ANIME_RE.is_match(&text);

    debug!(
        release = name,
        resolution = %attrs.resolution,
        source = %attrs.source,
        codec = %attrs.video_codec,
        audio = %attrs.audio_codec,
        hdr = %attrs.hdr,
        group = ?attrs.release_group,
        "Parsed release name"
    );

    attrs
}

fn parse_resolution(text: &str) -> Resolution {
    let explicit = RESOLUTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .map(Resolution::from_height)
        .find(|r| *r != Resolution::Unknown);

    match explicit {
        Some(resolution) => resolution,
        None if UHD_RE.is_match(text) => Resolution::P2160,
        None => Resolution::Unknown,
    }
}

fn parse_audio(text: &str) -> AudioCodec {
    let base = first_match(&AUDIO_PATTERNS, text).unwrap_or_default();
    if !ATMOS_RE.is_match(text) {
        return base;
    }
    match base {
        AudioCodec::TrueHd => AudioCodec::TrueHdAtmos,
        AudioCodec::DdPlus | AudioCodec::Unknown => AudioCodec::DdPlusAtmos,
        other => other,
    }
}

fn parse_channels(text: &str) -> AudioChannels {
    let Some(caps) = CHANNELS_RE.captures(text) else {
        return AudioChannels::Unknown;
    };
    match caps.get(1).map(|m| m.as_str()) {
        Some("7") | Some("8") => AudioChannels::Surround71,
        Some("5") | Some("6") => AudioChannels::Surround51,
        Some("2") | Some("3") | Some("4") => AudioChannels::Stereo,
        Some("1") => AudioChannels::Mono,
        _ => AudioChannels::Unknown,
    }
}

fn parse_bit_depth(text: &str) -> Option<u8> {
    if let Some(caps) = BIT_DEPTH_RE.captures(text) {
        return caps.get(1).and_then(|m| m.as_str().parse().ok());
    }
    HI10_RE.is_match(text).then_some(10)
}

/// Split a trailing `-GROUP` off the name.
///
/// Returns the name without the group (and without trailing `[tag]`s) plus
/// the group itself. Dashes inside quality tags such as `WEB-DL` are not groups.
fn split_dashed_group(text: &str) -> (&str, Option<&str>) {
    let body = TRAILING_TAGS_RE
        .find(text)
        .map_or(text, |m| &text[..m.start()]);

    let Some(caps) = GROUP_RE.captures(body) else {
        return (body, None);
    };
    let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
        return (body, None);
    };

    let group = group.as_str().trim_matches('.');
    if group.is_empty() || NOT_A_GROUP_RE.is_match(group) {
        return (body, None);
    }
    (&body[..whole.start()], Some(group))
}

/// Leading `[Group]` tag of fansub-style names
fn parse_bracket_group(text: &str) -> Option<String> {
    BRACKET_GROUP_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|g| !g.is_empty())
}

/// The part of a name after the title. Names without a year, resolution or
/// episode marker are searched whole.
fn quality_region(body: &str) -> &str {
    QUALITY_START_RE
        .find(body)
        .map_or(body, |m| &body[m.start()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remux() {
        let attrs = parse_release("Movie.2024.2160p.UHD.BluRay.REMUX.DTS-HD.MA-GROUP");
        assert_eq!(attrs.resolution, Resolution::P2160);
        assert_eq!(attrs.source, Source::Remux);
        assert_eq!(attrs.audio_codec, AudioCodec::DtsHdMa);
        assert_eq!(attrs.release_group.as_deref(), Some("GROUP"));
        assert!(!attrs.is_episode);
    }

    #[test]
    fn test_parse_sxxexx() {
        let attrs = parse_release("Chicago Fire S14E08 1080p WEB h264-ETHEL");
        assert_eq!(attrs.resolution, Resolution::P1080);
        assert_eq!(attrs.source, Source::WebDl);
        assert_eq!(attrs.video_codec, VideoCodec::H264);
        assert_eq!(attrs.release_group.as_deref(), Some("ETHEL"));
        assert!(attrs.is_episode);
        assert!(!attrs.is_season_pack);
    }

    #[test]
    fn test_parse_daily_show() {
        let attrs =
            parse_release("The.Daily.Show.2026.01.07.Stephen.J.Dubner.720p.WEB.h264-EDITH");
        assert!(attrs.is_daily);
        assert!(attrs.is_episode);
        assert_eq!(attrs.resolution, Resolution::P720);
        assert_eq!(attrs.release_group.as_deref(), Some("EDITH"));
    }

    #[test]
    fn test_parse_streaming_quality() {
        let attrs = parse_release("Show S01E01 2160p AMZN WEB-DL DDP5 1 Atmos HDR H 265-GROUP");
        assert_eq!(attrs.resolution, Resolution::P2160);
        assert_eq!(attrs.source, Source::WebDl);
        assert_eq!(attrs.video_codec, VideoCodec::H265);
        assert_eq!(attrs.hdr, HdrFormat::Hdr10);
        assert_eq!(attrs.audio_codec, AudioCodec::DdPlusAtmos);
        assert_eq!(attrs.audio_channels, AudioChannels::Surround51);
    }

    #[test]
    fn test_parse_dd_versus_ddp() {
        let dd = parse_release("Movie.2024.1080p.WEB-DL.DD5.1.H.264-GROUP");
        assert_eq!(dd.audio_codec, AudioCodec::Dd);
        assert_eq!(dd.audio_channels, AudioChannels::Surround51);
        assert_eq!(dd.video_codec, VideoCodec::H264);

        let ddp = parse_release("Movie.2024.2160p.WEB-DL.DDP5.1.H.265-GROUP");
        assert_eq!(ddp.audio_codec, AudioCodec::DdPlus);
        assert_eq!(ddp.video_codec, VideoCodec::H265);
        assert_eq!(ddp.release_group.as_deref(), Some("GROUP"));
    }

    #[test]
    fn test_parse_prerelease_sources() {
        assert_eq!(parse_release("Movie.2024.CAM.x264-GROUP").source, Source::Cam);
        assert_eq!(parse_release("Movie.2024.HDTS.x264-GROUP").source, Source::Telesync);
        assert_eq!(parse_release("Movie.2024.TELECINE.XviD-GROUP").source, Source::Telecine);
        assert_eq!(parse_release("Movie.2024.DVDSCR.x264-GROUP").source, Source::Screener);
    }

    #[test]
    fn test_title_words_are_not_prerelease_sources() {
        let attrs = parse_release("The.Cam.Girl.2024.1080p.BluRay.x264-GROUP");
        assert_eq!(attrs.source, Source::BluRay);

        let attrs = parse_release("Screener.2024.1080p.BluRay.x264-GROUP");
        assert_eq!(attrs.source, Source::BluRay);

        let attrs = parse_release("Cam.2018.1080p.NF.WEB-DL.DDP5.1.H.264-GROUP");
        assert_eq!(attrs.source, Source::WebDl);
    }

    #[test]
    fn test_group_named_like_source_tag() {
        let attrs = parse_release("Movie.2024.1080p.WEB-DL.DDP5.1.H.264-TS");
        assert_eq!(attrs.source, Source::WebDl);
        assert_eq!(attrs.release_group.as_deref(), Some("TS"));

        let attrs = parse_release("Movie.2024.1080p.BluRay.x264-DV");
        assert_eq!(attrs.hdr, HdrFormat::None);
        assert_eq!(attrs.release_group.as_deref(), Some("DV"));
    }

    #[test]
    fn test_title_words_are_not_dvd_or_dolby_vision() {
        let attrs = parse_release("Pal.2023.720p.WEBRip.x264-GROUP");
        assert_eq!(attrs.source, Source::WebRip);

        let attrs = parse_release("DV.Diaries.2021.1080p.WEB-DL.x264-GROUP");
        assert_eq!(attrs.hdr, HdrFormat::None);
    }

    #[test]
    fn test_prerelease_tag_without_year() {
        assert_eq!(parse_release("Movie.HDCAM.x264-GROUP").source, Source::Cam);
        assert_eq!(parse_release("Movie.DVD-SCR.XviD-GROUP").source, Source::Screener);
    }

    #[test]
    fn test_dts_is_not_telesync() {
        let attrs = parse_release("Movie.2024.1080p.BluRay.DTS.x264-GROUP");
        assert_eq!(attrs.source, Source::BluRay);
        assert_eq!(attrs.audio_codec, AudioCodec::Dts);
    }

    #[test]
    fn test_dvd_is_not_dolby_vision() {
        let attrs = parse_release("Movie.1999.DVDRip.XviD-GROUP");
        assert_eq!(attrs.source, Source::Dvd);
        assert_eq!(attrs.hdr, HdrFormat::None);
        assert_eq!(attrs.video_codec, VideoCodec::Xvid);
    }

    #[test]
    fn test_parse_dotted_group() {
        let attrs = parse_release("Movie.2024.1080p.BluRay.x264-YTS.MX");
        assert_eq!(attrs.release_group.as_deref(), Some("YTS.MX"));
    }

    #[test]
    fn test_parse_group_ignores_extension_and_tags() {
        let attrs = parse_release("Movie.2024.1080p.WEB-DL.x264-GROUP[rarbg].mkv");
        assert_eq!(attrs.release_group.as_deref(), Some("GROUP"));
    }

    #[test]
    fn test_no_group_from_quality_tag() {
        let attrs = parse_release("Movie.2024.1080p.WEB-DL");
        assert_eq!(attrs.release_group, None);
    }

    #[test]
    fn test_parse_minimal_name() {
        let attrs = parse_release("Movie.2024-GROUP");
        assert_eq!(attrs.resolution, Resolution::Unknown);
        assert_eq!(attrs.source, Source::Unknown);
        assert_eq!(attrs.video_codec, VideoCodec::Unknown);
        assert_eq!(attrs.release_group.as_deref(), Some("GROUP"));
    }

    #[test]
    fn test_parse_empty_name() {
        assert_eq!(parse_release(""), ReleaseAttributes::default());
    }

    #[test]
    fn test_parse_flags() {
        let attrs = parse_release("Movie.2024.PROPER.REPACK.1080p.3D.HSBS.HC.BluRay.x264-GROUP");
        assert!(attrs.is_proper);
        assert!(attrs.is_repack);
        assert!(attrs.is_3d);
        assert!(attrs.has_hardcoded_subs);
    }

    #[test]
    fn test_parse_season_pack() {
        let attrs = parse_release("Show.S02.1080p.BluRay.x265-GROUP");
        assert!(attrs.is_season_pack);
        assert!(!attrs.is_episode);
    }

    #[test]
    fn test_parse_anime() {
        let attrs = parse_release("[SubsPlease] Frieren - 05 [1080p].mkv");
        assert!(attrs.is_anime);
        assert_eq!(attrs.resolution, Resolution::P1080);
        assert_eq!(attrs.release_group.as_deref(), Some("SubsPlease"));
    }

    #[test]
    fn test_parse_bit_depth_and_dolby_vision() {
        let attrs = parse_release("Movie.2024.2160p.WEB-DL.DV.HDR10.10bit.x265-GROUP");
        assert_eq!(attrs.hdr, HdrFormat::DolbyVision);
        assert_eq!(attrs.bit_depth, Some(10));
    }

    #[test]
    fn test_upscale_resolution_rounds_down() {
        // DS9 AI upscales use a non-standard 960p
        let attrs = parse_release("Star Trek- Deep Space Nine - S01E09 960p");
        assert_eq!(attrs.resolution, Resolution::P720);
    }
}
