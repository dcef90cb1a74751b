// src/commands.rs

//! Command implementation
//!
//! Merges configuration file and command-line options, then runs the
//! conversion pipeline and prints a short report.

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use pom2feed_core::{make_feed, Config, FeedOptions, FeedReport, GpgSigner};
use std::time::Duration;
use tracing::{info, warn};

/// Build pipeline options from the configuration file and command line
pub fn resolve_options(cli: &Cli, config: &Config) -> Result<FeedOptions> {
    let mut options = FeedOptions::from_config(config).context("Invalid configuration")?;

    if let Some(service_url) = &cli.service_url {
        options.service_url = service_url.clone();
    }
    if let Some(algorithm) = &cli.algorithm {
        options.algorithm = algorithm
            .parse()
            .with_context(|| format!("Invalid --algorithm '{}'", algorithm))?;
    }
    if cli.no_digests {
        options.digests = false;
    }
    if let Some(timeout) = cli.timeout {
        if timeout == 0 {
            bail!("--timeout must be positive");
        }
        options.repository.timeout = Duration::from_secs(timeout);
    }
    if let Some(retries) = cli.retries {
        options.repository.retries = retries;
    }

    if let Some(key) = &cli.sign_key {
        let mut signer = options.signer.take().unwrap_or_else(|| {
            GpgSigner::new(key.as_str())
                .with_program(config.signing.gpg_program.as_str())
                .with_timeout(Duration::from_secs(config.signing.timeout_secs))
        });
        signer.key = key.clone();
        options.signer = Some(signer);
    }
    if let Some(program) = &cli.gpg {
        match options.signer.as_mut() {
            Some(signer) => signer.program = program.clone(),
            None => warn!("Ignoring --gpg {}: no signing key given", program),
        }
    }

    Ok(options)
}

/// Run the conversion
pub fn cmd_make_feed(cli: &Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    let options = resolve_options(cli, &config)?;

    info!(
        "Converting {}:{} from {} into {}",
        cli.group,
        cli.artifact,
        cli.repository,
        cli.feed_file.display()
    );

    let report = make_feed(&cli.repository, &cli.group, &cli.artifact, &cli.feed_file, &options)
        .with_context(|| format!("Failed to create feed for {}:{}", cli.group, cli.artifact))?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &FeedReport) {
    println!(
        "Wrote {} ({} implementations of {})",
        report.feed_file.display(),
        report.implementations,
        report.artifact
    );
    if let Some(digests) = &report.digests {
        println!("  Digests: {}", digests);
    }
    if let Some(key_file) = &report.key_file {
        println!("  Signed, public key at {}", key_file.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pom2feed_core::ManifestAlgorithm;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["pom2feed", "repo", "org.example", "demo", "demo.xml"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults_from_config() {
        let config = Config::parse("[feed]\nalgorithm = \"sha256\"\n").unwrap();
        let options = resolve_options(&parse(&[]), &config).unwrap();

        assert_eq!(options.algorithm, ManifestAlgorithm::Sha256);
        assert!(options.digests);
        assert!(options.signer.is_none());
    }

    #[test]
    fn test_command_line_overrides() {
        let config = Config::parse("[signing]\nkey = \"FILEKEY\"\ngpg_program = \"gpg2\"\n").unwrap();
        let options = resolve_options(
            &parse(&[
                "--algorithm",
                "sha1",
                "--no-digests",
                "--sign-key",
                "CLIKEY",
                "--gpg",
                "/opt/gpg",
                "--retries",
                "1",
                "--service-url",
                "https://feeds.example.com/",
            ]),
            &config,
        )
        .unwrap();

        assert_eq!(options.algorithm, ManifestAlgorithm::Sha1New);
        assert!(!options.digests);
        assert_eq!(options.repository.retries, 1);
        assert_eq!(options.service_url, "https://feeds.example.com/");

        let signer = options.signer.unwrap();
        assert_eq!(signer.key, "CLIKEY");
        assert_eq!(signer.program, "/opt/gpg");
    }

    #[test]
    fn test_invalid_algorithm() {
        let err = resolve_options(&parse(&["--algorithm", "md5"]), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--algorithm"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = resolve_options(&parse(&["--timeout", "0"]), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--timeout"));

        let options = resolve_options(&parse(&["--timeout", "7"]), &Config::default()).unwrap();
        assert_eq!(options.repository.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_gpg_without_key_is_ignored() {
        let options = resolve_options(&parse(&["--gpg", "/opt/gpg"]), &Config::default()).unwrap();
        assert!(options.signer.is_none());

        let config = Config::parse("[signing]\nkey = \"FILEKEY\"\n").unwrap();
        let options = resolve_options(&parse(&["--gpg", "/opt/gpg"]), &config).unwrap();
        assert_eq!(options.signer.unwrap().program, "/opt/gpg");
    }
}
