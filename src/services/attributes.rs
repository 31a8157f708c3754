//! Structured quality attributes of a release
//!
//! Produced by a [`ReleaseParser`](crate::services::filename_parser::ReleaseParser)
//! from a release name, optionally overlaid with stored quality facts for
//! files already in the library. Every enum has an explicit `Unknown` (or
//! `None` for HDR) so that a missing fact is never mistaken for a concrete one.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConditionError;

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Resolution {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "576p")]
    P576,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2160p")]
    P2160,
}

impl Resolution {
    pub const ALL: &'static [Resolution] = &[
        Resolution::Unknown,
        Resolution::P360,
        Resolution::P480,
        Resolution::P576,
        Resolution::P720,
        Resolution::P1080,
        Resolution::P2160,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Unknown => "unknown",
            Resolution::P360 => "360p",
            Resolution::P480 => "480p",
            Resolution::P576 => "576p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
            Resolution::P2160 => "2160p",
        }
    }

    /// Bucket a vertical pixel count into a standard resolution.
    ///
    /// Non-standard heights (e.g. 960p upscales) round down to the
    /// nearest standard step.
    pub fn from_height(height: u32) -> Self {
        if height >= 2160 {
            Resolution::P2160
        } else if height >= 1080 {
            Resolution::P1080
        } else if height >= 720 {
            Resolution::P720
        } else if height >= 576 {
            Resolution::P576
        } else if height >= 480 {
            Resolution::P480
        } else if height >= 240 {
            Resolution::P360
        } else {
            Resolution::Unknown
        }
    }
}

/// Where the video was captured or ripped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Unknown,
    Cam,
    Telesync,
    Telecine,
    Workprint,
    Screener,
    Dvd,
    Hdtv,
    WebRip,
    WebDl,
    BluRay,
    Remux,
}

impl Source {
    pub const ALL: &'static [Source] = &[
        Source::Unknown,
        Source::Cam,
        Source::Telesync,
        Source::Telecine,
        Source::Workprint,
        Source::Screener,
        Source::Dvd,
        Source::Hdtv,
        Source::WebRip,
        Source::WebDl,
        Source::BluRay,
        Source::Remux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Unknown => "unknown",
            Source::Cam => "cam",
            Source::Telesync => "telesync",
            Source::Telecine => "telecine",
            Source::Workprint => "workprint",
            Source::Screener => "screener",
            Source::Dvd => "dvd",
            Source::Hdtv => "hdtv",
            Source::WebRip => "webrip",
            Source::WebDl => "webdl",
            Source::BluRay => "bluray",
            Source::Remux => "remux",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::Unknown => "Unknown",
            Source::Cam => "CAM",
            Source::Telesync => "Telesync",
            Source::Telecine => "Telecine",
            Source::Workprint => "Workprint",
            Source::Screener => "Screener",
            Source::Dvd => "DVD",
            Source::Hdtv => "HDTV",
            Source::WebRip => "WEBRip",
            Source::WebDl => "WEB-DL",
            Source::BluRay => "BluRay",
            Source::Remux => "Remux",
        }
    }
}

/// Video codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Unknown,
    Xvid,
    Mpeg2,
    H264,
    H265,
    Vp9,
    Av1,
}

impl VideoCodec {
    pub const ALL: &'static [VideoCodec] = &[
        VideoCodec::Unknown,
        VideoCodec::Xvid,
        VideoCodec::Mpeg2,
        VideoCodec::H264,
        VideoCodec::H265,
        VideoCodec::Vp9,
        VideoCodec::Av1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::Unknown => "unknown",
            VideoCodec::Xvid => "xvid",
            VideoCodec::Mpeg2 => "mpeg2",
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Av1 => "av1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VideoCodec::Unknown => "Unknown",
            VideoCodec::Xvid => "XviD",
            VideoCodec::Mpeg2 => "MPEG-2",
            VideoCodec::H264 => "H.264",
            VideoCodec::H265 => "HEVC",
            VideoCodec::Vp9 => "VP9",
            VideoCodec::Av1 => "AV1",
        }
    }
}

/// Audio codec, with Atmos carried on the codec it rides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    #[default]
    Unknown,
    Mp3,
    Aac,
    Opus,
    Flac,
    Pcm,
    Dd,
    DdPlus,
    DdPlusAtmos,
    Dts,
    DtsHdMa,
    DtsX,
    TrueHd,
    TrueHdAtmos,
}

impl AudioCodec {
    pub const ALL: &'static [AudioCodec] = &[
        AudioCodec::Unknown,
        AudioCodec::Mp3,
        AudioCodec::Aac,
        AudioCodec::Opus,
        AudioCodec::Flac,
        AudioCodec::Pcm,
        AudioCodec::Dd,
        AudioCodec::DdPlus,
        AudioCodec::DdPlusAtmos,
        AudioCodec::Dts,
        AudioCodec::DtsHdMa,
        AudioCodec::DtsX,
        AudioCodec::TrueHd,
        AudioCodec::TrueHdAtmos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCodec::Unknown => "unknown",
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Aac => "aac",
            AudioCodec::Opus => "opus",
            AudioCodec::Flac => "flac",
            AudioCodec::Pcm => "pcm",
            AudioCodec::Dd => "dd",
            AudioCodec::DdPlus => "dd_plus",
            AudioCodec::DdPlusAtmos => "dd_plus_atmos",
            AudioCodec::Dts => "dts",
            AudioCodec::DtsHdMa => "dts_hd_ma",
            AudioCodec::DtsX => "dts_x",
            AudioCodec::TrueHd => "true_hd",
            AudioCodec::TrueHdAtmos => "true_hd_atmos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudioCodec::Unknown => "Unknown",
            AudioCodec::Mp3 => "MP3",
            AudioCodec::Aac => "AAC",
            AudioCodec::Opus => "Opus",
            AudioCodec::Flac => "FLAC",
            AudioCodec::Pcm => "PCM",
            AudioCodec::Dd => "DD",
            AudioCodec::DdPlus => "DD+",
            AudioCodec::DdPlusAtmos => "DD+ Atmos",
            AudioCodec::Dts => "DTS",
            AudioCodec::DtsHdMa => "DTS-HD MA",
            AudioCodec::DtsX => "DTS:X",
            AudioCodec::TrueHd => "TrueHD",
            AudioCodec::TrueHdAtmos => "TrueHD Atmos",
        }
    }
}

/// Audio channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AudioChannels {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "mono")]
    Mono,
    #[serde(rename = "stereo")]
    Stereo,
    #[serde(rename = "5.1")]
    Surround51,
    #[serde(rename = "7.1")]
    Surround71,
}

impl AudioChannels {
    pub const ALL: &'static [AudioChannels] = &[
        AudioChannels::Unknown,
        AudioChannels::Mono,
        AudioChannels::Stereo,
        AudioChannels::Surround51,
        AudioChannels::Surround71,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioChannels::Unknown => "unknown",
            AudioChannels::Mono => "mono",
            AudioChannels::Stereo => "stereo",
            AudioChannels::Surround51 => "5.1",
            AudioChannels::Surround71 => "7.1",
        }
    }
}

/// High dynamic range format. `None` means no HDR marker was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HdrFormat {
    #[default]
    None,
    Hdr10,
    Hdr10Plus,
    DolbyVision,
    Hlg,
}

impl HdrFormat {
    pub const ALL: &'static [HdrFormat] = &[
        HdrFormat::None,
        HdrFormat::Hdr10,
        HdrFormat::Hdr10Plus,
        HdrFormat::DolbyVision,
        HdrFormat::Hlg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HdrFormat::None => "none",
            HdrFormat::Hdr10 => "hdr10",
            HdrFormat::Hdr10Plus => "hdr10_plus",
            HdrFormat::DolbyVision => "dolby_vision",
            HdrFormat::Hlg => "hlg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HdrFormat::None => "SDR",
            HdrFormat::Hdr10 => "HDR10",
            HdrFormat::Hdr10Plus => "HDR10+",
            HdrFormat::DolbyVision => "Dolby Vision",
            HdrFormat::Hlg => "HLG",
        }
    }
}

/// Boolean release markers that custom formats can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseFlag {
    Proper,
    Repack,
    SeasonPack,
    HardcodedSubs,
    #[serde(rename = "3d")]
    ThreeD,
    Anime,
    Daily,
}

impl ReleaseFlag {
    pub const ALL: &'static [ReleaseFlag] = &[
        ReleaseFlag::Proper,
        ReleaseFlag::Repack,
        ReleaseFlag::SeasonPack,
        ReleaseFlag::HardcodedSubs,
        ReleaseFlag::ThreeD,
        ReleaseFlag::Anime,
        ReleaseFlag::Daily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseFlag::Proper => "proper",
            ReleaseFlag::Repack => "repack",
            ReleaseFlag::SeasonPack => "season_pack",
            ReleaseFlag::HardcodedSubs => "hardcoded_subs",
            ReleaseFlag::ThreeD => "3d",
            ReleaseFlag::Anime => "anime",
            ReleaseFlag::Daily => "daily",
        }
    }
}

macro_rules! impl_display_from_str {
    ($($ty:ident => $kind:literal),* $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = ConditionError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = s.trim();
                    $ty::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                        .ok_or_else(|| ConditionError::InvalidValue {
                            kind: $kind,
                            value: s.to_string(),
                        })
                }
            }
        )*
    };
}

impl_display_from_str! {
    Resolution => "resolution",
    Source => "source",
    VideoCodec => "video codec",
    AudioCodec => "audio codec",
    AudioChannels => "audio channels",
    HdrFormat => "hdr",
    ReleaseFlag => "flag",
}

/// Quality facts about a single release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAttributes {
    pub resolution: Resolution,
    pub source: Source,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub audio_channels: AudioChannels,
    pub hdr: HdrFormat,
    pub bit_depth: Option<u8>,
    pub release_group: Option<String>,
    pub is_proper: bool,
    pub is_repack: bool,
    pub is_season_pack: bool,
    pub has_hardcoded_subs: bool,
    pub is_3d: bool,
    pub is_anime: bool,
    pub is_daily: bool,
    /// Single-episode marker (SxxEyy / 1x02); only used to infer size context
    pub is_episode: bool,
}

impl ReleaseAttributes {
    pub fn has_flag(&self, flag: ReleaseFlag) -> bool {
        match flag {
            ReleaseFlag::Proper => self.is_proper,
            ReleaseFlag::Repack => self.is_repack,
            ReleaseFlag::SeasonPack => self.is_season_pack,
            ReleaseFlag::HardcodedSubs => self.has_hardcoded_subs,
            ReleaseFlag::ThreeD => self.is_3d,
            ReleaseFlag::Anime => self.is_anime,
            ReleaseFlag::Daily => self.is_daily,
        }
    }

    /// Replace parsed values with stored ones wherever the store has a value.
    pub fn overlay(mut self, stored: &StoredQuality) -> Self {
        if let Some(resolution) = stored.resolution.filter(|r| *r != Resolution::Unknown) {
            self.resolution = resolution;
        }
        if let Some(source) = stored.source.filter(|s| *s != Source::Unknown) {
            self.source = source;
        }
        if let Some(codec) = stored.video_codec.filter(|c| *c != VideoCodec::Unknown) {
            self.video_codec = codec;
        }
        if let Some(audio) = stored.audio_codec.filter(|a| *a != AudioCodec::Unknown) {
            self.audio_codec = audio;
        }
        if let Some(channels) = stored.audio_channels.filter(|c| *c != AudioChannels::Unknown) {
            self.audio_channels = channels;
        }
        if let Some(hdr) = stored.hdr {
            self.hdr = hdr;
        }
        if stored.bit_depth.is_some() {
            self.bit_depth = stored.bit_depth;
        }
        if let Some(ref group) = stored.release_group {
            self.release_group = Some(group.clone());
        }
        if let Some(v) = stored.is_proper {
            self.is_proper = v;
        }
        if let Some(v) = stored.is_repack {
            self.is_repack = v;
        }
        if let Some(v) = stored.is_season_pack {
            self.is_season_pack = v;
        }
        if let Some(v) = stored.has_hardcoded_subs {
            self.has_hardcoded_subs = v;
        }
        if let Some(v) = stored.is_3d {
            self.is_3d = v;
        }
        if let Some(v) = stored.is_anime {
            self.is_anime = v;
        }
        if let Some(v) = stored.is_daily {
            self.is_daily = v;
        }
        self
    }
}

/// Authoritative quality facts the library already holds for a file
/// (typically from ffprobe analysis). Absent fields fall back to parsing.
///
/// A stored `Some(Unknown)` counts as absent, so an analysis that could not
/// determine a value never erases what the name says. `hdr` has no unknown
/// state: a stored `Some(HdrFormat::None)` does mean SDR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredQuality {
    pub resolution: Option<Resolution>,
    pub source: Option<Source>,
    pub video_codec: Option<VideoCodec>,
    pub audio_codec: Option<AudioCodec>,
    pub audio_channels: Option<AudioChannels>,
    pub hdr: Option<HdrFormat>,
    pub bit_depth: Option<u8>,
    pub release_group: Option<String>,
    pub is_proper: Option<bool>,
    pub is_repack: Option<bool>,
    pub is_season_pack: Option<bool>,
    pub has_hardcoded_subs: Option<bool>,
    pub is_3d: Option<bool>,
    pub is_anime: Option<bool>,
    pub is_daily: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_height_buckets() {
        assert_eq!(Resolution::from_height(2160), Resolution::P2160);
        assert_eq!(Resolution::from_height(1080), Resolution::P1080);
        assert_eq!(Resolution::from_height(960), Resolution::P720);
        assert_eq!(Resolution::from_height(576), Resolution::P576);
        assert_eq!(Resolution::from_height(480), Resolution::P480);
        assert_eq!(Resolution::from_height(360), Resolution::P360);
        assert_eq!(Resolution::from_height(100), Resolution::Unknown);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("2160P".parse::<Resolution>().unwrap(), Resolution::P2160);
        assert_eq!("WebDl".parse::<Source>().unwrap(), Source::WebDl);
        assert_eq!("dolby_vision".parse::<HdrFormat>().unwrap(), HdrFormat::DolbyVision);
        assert_eq!("3D".parse::<ReleaseFlag>().unwrap(), ReleaseFlag::ThreeD);
    }

    #[test]
    fn test_from_str_rejects_unknown_values() {
        assert!("8k".parse::<Resolution>().is_err());
        assert!("laserdisc".parse::<Source>().is_err());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for res in Resolution::ALL {
            let json = serde_json::to_string(res).unwrap();
            assert_eq!(json, format!("\"{}\"", res.as_str()));
        }
        for source in Source::ALL {
            let json = serde_json::to_string(source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
        }
        for audio in AudioCodec::ALL {
            let json = serde_json::to_string(audio).unwrap();
            assert_eq!(json, format!("\"{}\"", audio.as_str()));
        }
        for hdr in HdrFormat::ALL {
            let json = serde_json::to_string(hdr).unwrap();
            assert_eq!(json, format!("\"{}\"", hdr.as_str()));
        }
        for flag in ReleaseFlag::ALL {
            let json = serde_json::to_string(flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
        }
    }

    #[test]
    fn test_overlay_prefers_stored_fields() {
        let parsed = ReleaseAttributes {
            resolution: Resolution::P720,
            source: Source::WebDl,
            video_codec: VideoCodec::H264,
            release_group: Some("GROUP".to_string()),
            ..Default::default()
        };
        let stored = StoredQuality {
            resolution: Some(Resolution::P1080),
            hdr: Some(HdrFormat::Hdr10),
            ..Default::default()
        };

        let merged = parsed.overlay(&stored);
        assert_eq!(merged.resolution, Resolution::P1080);
        assert_eq!(merged.hdr, HdrFormat::Hdr10);
        // Not present in the store, so the parsed values survive
        assert_eq!(merged.source, Source::WebDl);
        assert_eq!(merged.video_codec, VideoCodec::H264);
        assert_eq!(merged.release_group.as_deref(), Some("GROUP"));
    }

    #[test]
    fn test_overlay_ignores_stored_unknown() {
        let parsed = ReleaseAttributes {
            resolution: Resolution::P1080,
            ..Default::default()
        };
        let stored = StoredQuality {
            resolution: Some(Resolution::Unknown),
            ..Default::default()
        };
        assert_eq!(parsed.overlay(&stored).resolution, Resolution::P1080);
    }

    #[test]
    fn test_overlay_every_flag() {
        let parsed = ReleaseAttributes {
            is_anime: true,
            is_daily: false,
            ..Default::default()
        };
        let stored = StoredQuality {
            is_anime: Some(false),
            is_daily: Some(true),
            ..Default::default()
        };

        let merged = parsed.overlay(&stored);
        assert!(!merged.has_flag(ReleaseFlag::Anime));
        assert!(merged.has_flag(ReleaseFlag::Daily));
    }
}
