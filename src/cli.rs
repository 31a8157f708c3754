//! Command-line arguments

use clap::{Args, Parser, Subcommand};

use librarian_quality::services::quality_profile::Protocol;
use librarian_quality::services::size_policy::{MediaType, SizeContext};

#[derive(Parser, Debug)]
#[command(name = "librarian-quality")]
#[command(about = "Score release names and make upgrade decisions", long_about = None)]
pub struct Cli {
    /// Profile ID or name (defaults to DEFAULT_QUALITY_PROFILE)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Size and transport details for a single release
#[derive(Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Release size in bytes
    #[arg(long)]
    pub size_bytes: Option<u64>,

    /// What the release is (movie or episode); inferred from the name if unset
    #[arg(long, value_parser = parse_media_type)]
    pub media_type: Option<MediaType>,

    /// Treat the release as a season pack
    #[arg(long)]
    pub season_pack: bool,

    /// Episodes in the season pack
    #[arg(long)]
    pub episode_count: Option<u32>,

    /// Transport protocol (torrent or usenet)
    #[arg(long, value_parser = parse_protocol)]
    pub protocol: Option<Protocol>,
}

impl ReleaseArgs {
    /// Explicit size context, if any flag describes one
    pub fn size_context(&self) -> Option<SizeContext> {
        if self.season_pack {
            return Some(SizeContext::season_pack(self.episode_count));
        }
        self.media_type.map(|media_type| SizeContext {
            media_type,
            is_season_pack: false,
            episode_count: None,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a release name
    Score {
        name: String,

        #[command(flatten)]
        release: ReleaseArgs,
    },

    /// Decide whether a candidate release should replace an existing one
    Compare {
        existing: String,
        candidate: String,

        /// Minimum score improvement (overrides the profile)
        #[arg(long, allow_hyphen_values = true)]
        min_improvement: Option<i64>,

        /// Count an equal score as an upgrade
        #[arg(long)]
        allow_sidegrade: bool,
    },

    /// Rank several candidate releases
    Rank {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List available quality profiles
    Profiles,

    /// List the custom format catalog
    Formats,
}

fn parse_media_type(value: &str) -> Result<MediaType, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_protocol(value: &str) -> Result<Protocol, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::try_parse_from([
            "librarian-quality",
            "score",
            "Movie.2024.1080p.BluRay.x264-GROUP",
            "--profile",
            "micro",
            "--size-bytes",
            "2000000000",
            "--protocol",
            "usenet",
        ])
        .unwrap();

        assert_eq!(cli.profile.as_deref(), Some("micro"));
        assert_matches!(
            cli.command,
            Commands::Score { ref name, ref release }
                if name == "Movie.2024.1080p.BluRay.x264-GROUP"
                    && release.size_bytes == Some(2_000_000_000)
                    && release.protocol == Some(Protocol::Usenet)
        );
    }

    #[test]
    fn test_parse_compare_command() {
        let cli = Cli::try_parse_from([
            "librarian-quality",
            "compare",
            "Old.1080p",
            "New.2160p",
            "--min-improvement",
            "500",
            "--allow-sidegrade",
        ])
        .unwrap();

        assert_matches!(
            cli.command,
            Commands::Compare { min_improvement: Some(500), allow_sidegrade: true, .. }
        );
    }

    #[test]
    fn test_rank_requires_names() {
        assert!(Cli::try_parse_from(["librarian-quality", "rank"]).is_err());
    }

    #[test]
    fn test_size_context_from_flags() {
        let pack = ReleaseArgs {
            season_pack: true,
            episode_count: Some(10),
            ..Default::default()
        };
        assert_eq!(pack.size_context(), Some(SizeContext::season_pack(Some(10))));

        let episode = ReleaseArgs {
            media_type: Some(MediaType::Episode),
            ..Default::default()
        };
        assert_eq!(episode.size_context(), Some(SizeContext::episode()));

        assert_eq!(ReleaseArgs::default().size_context(), None);
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        let result = Cli::try_parse_from(["librarian-quality", "score", "x", "--protocol", "ftp"]);
        assert!(result.is_err());
    }
}
