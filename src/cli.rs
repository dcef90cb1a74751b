// src/cli.rs
//! CLI definitions for pom2feed
//!
//! A single command taking the four positional arguments
//! `<REPOSITORY> <GROUP> <ARTIFACT> <FEED_FILE>`. Options override values
//! from the configuration file. The actual work is in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pom2feed")]
#[command(author = "pom2feed Contributors")]
#[command(version)]
#[command(about = "Generate 0install feeds for Maven artifacts", long_about = None)]
pub struct Cli {
    /// Maven repository root (directory, file:// or http(s):// URL)
    pub repository: String,

    /// Group id, dotted (org.slf4j) or slash-separated (org/slf4j)
    pub group: String,

    /// Artifact id
    pub artifact: String,

    /// Feed file to write
    pub feed_file: PathBuf,

    /// Base URL of the pom2feed service publishing dependency feeds
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Manifest digest algorithm (sha1new, sha256)
    #[arg(long, value_name = "ALGORITHM")]
    pub algorithm: Option<String>,

    /// Do not annotate the feed with manifest digests
    #[arg(long)]
    pub no_digests: bool,

    /// GnuPG key to sign the feed with
    #[arg(long, value_name = "KEY")]
    pub sign_key: Option<String>,

    /// gpg executable used for signing
    #[arg(long, value_name = "PROGRAM")]
    pub gpg: Option<String>,

    /// Per-request timeout for remote repositories, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Attempts per request for remote repositories
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<u32>,

    /// Configuration file (default: <config dir>/pom2feed/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from([
            "pom2feed",
            "https://repo1.maven.org/maven2/",
            "org.slf4j",
            "slf4j-api",
            "feeds/slf4j-api.xml",
        ])
        .unwrap();

        assert_eq!(cli.repository, "https://repo1.maven.org/maven2/");
        assert_eq!(cli.group, "org.slf4j");
        assert_eq!(cli.artifact, "slf4j-api");
        assert_eq!(cli.feed_file, PathBuf::from("feeds/slf4j-api.xml"));
        assert!(!cli.no_digests);
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "pom2feed",
            "repo",
            "g",
            "a",
            "out.xml",
            "--algorithm",
            "sha256",
            "--no-digests",
            "--sign-key",
            "ABCD",
            "--timeout",
            "5",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.algorithm.as_deref(), Some("sha256"));
        assert!(cli.no_digests);
        assert_eq!(cli.sign_key.as_deref(), Some("ABCD"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_missing_positional() {
        assert!(Cli::try_parse_from(["pom2feed", "repo", "g", "a"]).is_err());
        assert!(Cli::try_parse_from(["pom2feed", "repo", "g", "a", "out.xml", "-v", "-q"]).is_err());
    }
}
