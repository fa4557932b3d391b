//! GPG signing key import
//!
//! Commits are signed by git through `gpg`, so the key only needs to be in
//! the bot's keyring. A key that cannot be imported, or an ID with no secret
//! key behind it, downgrades the bot to unsigned commits.

use crate::error::{Error, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

/// Import an armored private key into the default GPG keyring
pub async fn import_signing_key(gpg_program: &str, armored_key: &str) -> Result<()> {
    let mut child = Command::new(gpg_program)
        .args(["--batch", "--yes", "--import"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(armored_key.as_bytes()).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(Error::Config(format!(
            "gpg import failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// Whether `key_id` names a secret key in the default GPG keyring
///
/// A missing `gpg` binary counts as no key.
pub async fn has_secret_key(gpg_program: &str, key_id: &str) -> bool {
    let output = Command::new(gpg_program)
        .args(["--batch", "--list-secret-keys", key_id])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    matches!(output, Ok(status) if status.success())
}

/// Decide which key ID commits are signed with
///
/// An armored key, when given, is imported first. The key ID is then
/// looked up among the secret keys; if the import fails or the key is not
/// there, signing is turned off and commits go out unsigned.
pub async fn prepare_signing(
    gpg_program: &str,
    signing_key_id: Option<String>,
    armored_key: Option<&str>,
) -> Option<String> {
    let key_id = signing_key_id?;

    if let Some(armored) = armored_key {
        info!("Importing signing private key");
        if let Err(e) = import_signing_key(gpg_program, armored).await {
            warn!("{e}");
            warn!("Ignore GPG signing for bot user");
            return None;
        }
    }

    if !has_secret_key(gpg_program, &key_id).await {
        warn!("No secret key {key_id} in the GPG keyring, committing unsigned");
        return None;
    }

    Some(key_id)
}
