// src/sign.rs

//! Feed signing with GnuPG
//!
//! 0install feeds carry their signature inline: a detached GPG signature of
//! the document, base64-encoded, inside a trailing XML comment:
//!
//! ```text
//! <?xml version="1.0" ?>
//! <interface ...>
//!   ...
//! </interface>
//! <!-- Base64 Signature
//! iQEcBAABAgAGBQJ...
//! -->
//! ```
//!
//! Clients fetch the signing key from `<KEY>.gpg` beside the feed, so
//! [`sign_feed`] exports the public key there as well.

use crate::digest::write_atomic;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Default gpg executable
pub const DEFAULT_GPG_PROGRAM: &str = "gpg";

/// Default time limit for one gpg invocation (60 seconds)
pub const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(60);

/// Start of the signature comment
const SIGNATURE_HEADER: &str = "<!-- Base64 Signature\n";

/// Width of base64 lines in the signature block
const LINE_WIDTH: usize = 76;

/// Signs data with a GnuPG key
#[derive(Debug, Clone)]
pub struct GpgSigner {
    /// gpg executable
    pub program: String,
    /// Key id, fingerprint or user id passed to `--default-key`
    pub key: String,
    /// Time limit for each gpg invocation
    pub timeout: Duration,
}

impl GpgSigner {
    /// Create a signer using `gpg` from `PATH`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            program: DEFAULT_GPG_PROGRAM.to_string(),
            key: key.into(),
            timeout: DEFAULT_SIGNING_TIMEOUT,
        }
    }

    /// Use a different gpg executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the time limit for gpg invocations
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a detached binary signature of `data`
    pub fn detach_sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.run(
            &["--batch", "--detach-sign", "--default-key", self.key.as_str(), "--output", "-", "-"],
            Some(data),
        )
    }

    /// Export the ASCII-armoured public key
    pub fn export_public_key(&self) -> Result<String> {
        let output = self.run(&["--batch", "-a", "--export", self.key.as_str()], None)?;
        let key = String::from_utf8(output)
            .map_err(|e| Error::SigningError(format!("gpg exported a non-text key: {e}")))?;
        if key.trim().is_empty() {
            return Err(Error::SigningError(format!("No public key found for '{}'", self.key)));
        }
        Ok(key)
    }

    /// Run gpg, feeding `input` on stdin, and return its stdout
    fn run(&self, args: &[&str], input: Option<&[u8]>) -> Result<Vec<u8>> {
        debug!("Executing: {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::SigningError(format!("Failed to spawn '{}': {}", self.program, e)))?;

        if let Some(data) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| Error::SigningError("gpg stdin unavailable".to_string()))?;
            stdin
                .write_all(data)
                .map_err(|e| Error::SigningError(format!("Failed to write to gpg: {e}")))?;
        }

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                let output = child.wait_with_output()?;
                let stderr = String::from_utf8_lossy(&output.stderr);
                for line in stderr.lines() {
                    debug!("[gpg] {}", line);
                }

                if status.success() {
                    Ok(output.stdout)
                } else {
                    let code = status.code().unwrap_or(-1);
                    Err(Error::SigningError(format!(
                        "'{}' failed with exit code {}: {}",
                        self.program,
                        code,
                        stderr.trim()
                    )))
                }
            }
            None => {
                let _ = child.kill();
                Err(Error::SigningError(format!(
                    "'{}' timed out after {} seconds",
                    self.program,
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

/// Append a base64 signature block to a feed document
pub fn append_signature(xml: &str, signature: &[u8]) -> String {
    let encoded = STANDARD.encode(signature);

    let mut signed = String::with_capacity(xml.len() + encoded.len() + 64);
    signed.push_str(xml);
    if !signed.ends_with('\n') {
        signed.push('\n');
    }
    signed.push_str(SIGNATURE_HEADER);
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        signed.push_str(&String::from_utf8_lossy(chunk));
        signed.push('\n');
    }
    signed.push_str("-->\n");
    signed
}

/// Remove an existing signature block, if any
pub fn strip_signature(xml: &str) -> &str {
    match xml.rfind(SIGNATURE_HEADER) {
        Some(position) => &xml[..position],
        None => xml,
    }
}

/// Sign a feed file in place and export the key beside it
///
/// Returns the path of the exported key file. An existing signature is
/// replaced.
pub fn sign_feed(feed_file: &Path, signer: &GpgSigner) -> Result<PathBuf> {
    let xml = fs::read_to_string(feed_file)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", feed_file.display(), e)))?;

    let unsigned = strip_signature(&xml);
    if unsigned.len() != xml.len() {
        warn!("Replacing existing signature of {}", feed_file.display());
    }

    let signature = signer.detach_sign(unsigned.as_bytes())?;
    write_atomic(feed_file, append_signature(unsigned, &signature).as_bytes())?;

    let key_file = feed_file.with_file_name(format!("{}.gpg", signer.key));
    fs::write(&key_file, signer.export_public_key()?)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", key_file.display(), e)))?;

    info!("Signed {} with key {}", feed_file.display(), signer.key);
    Ok(key_file)
}
