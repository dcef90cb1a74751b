// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Option taking a value
fn value_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).value_name(value_name).help(help)
}

/// Boolean flag
fn flag_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("pom2feed")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pom2feed Contributors")
        .about("Generate 0install feeds for Maven artifacts")
        .arg(
            Arg::new("repository")
                .required(true)
                .help("Maven repository root (directory, file:// or http(s):// URL)"),
        )
        .arg(
            Arg::new("group")
                .required(true)
                .help("Group id, dotted (org.slf4j) or slash-separated (org/slf4j)"),
        )
        .arg(Arg::new("artifact").required(true).help("Artifact id"))
        .arg(Arg::new("feed_file").required(true).help("Feed file to write"))
        .arg(value_arg(
            "service-url",
            "URL",
            "Base URL of the pom2feed service publishing dependency feeds",
        ))
        .arg(value_arg("algorithm", "ALGORITHM", "Manifest digest algorithm (sha1new, sha256)"))
        .arg(flag_arg("no-digests", "Do not annotate the feed with manifest digests"))
        .arg(value_arg("sign-key", "KEY", "GnuPG key to sign the feed with"))
        .arg(value_arg("gpg", "PROGRAM", "gpg executable used for signing"))
        .arg(value_arg(
            "timeout",
            "SECONDS",
            "Per-request timeout for remote repositories, in seconds",
        ))
        .arg(value_arg("retries", "COUNT", "Attempts per request for remote repositories"))
        .arg(
            value_arg(
                "config",
                "PATH",
                "Configuration file (default: <config dir>/pom2feed/config.toml)",
            )
            .short('c'),
        )
        .arg(flag_arg("verbose", "Show debug output").short('v'))
        .arg(flag_arg("quiet", "Only show warnings and errors").short('q'))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pom2feed.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
