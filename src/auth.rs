//! Bitbucket authentication
//!
//! The bot authenticates to Bitbucket Server with HTTP basic auth, both for
//! REST calls and for HTTPS git operations.

use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::fmt;

/// Bitbucket credentials
#[derive(Clone)]
pub struct BitbucketAuth {
    /// User name (or access token owner)
    pub username: String,
    /// Password or HTTP access token
    pub password: String,
}

impl fmt::Debug for BitbucketAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitbucketAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl BitbucketAuth {
    /// Read credentials with a custom variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let username = lookup("BITBUCKET_USERNAME").filter(|v| !v.is_empty());
        let password = lookup("BITBUCKET_PASSWORD").filter(|v| !v.is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(Error::Auth(
                "No Bitbucket credentials found. Set BITBUCKET_USERNAME and BITBUCKET_PASSWORD"
                    .to_string(),
            )),
        }
    }
}

/// Get Bitbucket authentication from `BITBUCKET_USERNAME` / `BITBUCKET_PASSWORD`
pub fn get_bitbucket_auth() -> Result<BitbucketAuth> {
    BitbucketAuth::from_lookup(|key| env::var(key).ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitbucketUser {
    name: String,
    display_name: Option<String>,
}

/// Test Bitbucket authentication against `base_url` (e.g. `https://host`)
///
/// Returns the authenticated user's display name.
pub async fn test_bitbucket_auth(base_url: &str, auth: &BitbucketAuth) -> Result<String> {
    let url = format!(
        "{}/rest/api/latest/users/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&auth.username)
    );

    let user: BitbucketUser = Client::new()
        .get(&url)
        .basic_auth(&auth.username, Some(&auth.password))
        .send()
        .await?
        .error_for_status()
        .map_err(|e| Error::Auth(format!("Invalid credentials: {e}")))?
        .json()
        .await?;

    Ok(user.display_name.unwrap_or(user.name))
}
