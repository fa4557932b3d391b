//! URL helpers for webhook links and clone URLs

use crate::auth::BitbucketAuth;
use crate::error::{Error, Result};
use url::Url;

/// Extract `host[:port]` from a URL such as a pull request's self link
pub fn host_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Parse(format!("invalid URL {url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Parse(format!("URL has no host: {url}")))?;

    Ok(parsed
        .port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
}

/// Build an HTTPS clone URL carrying the bot's credentials
///
/// Bitbucket's `http` clone link usually embeds the viewing user
/// (`https://someone@host/scm/proj/repo.git`); that user is replaced and the
/// password is percent-encoded. URLs with any other scheme than `http` or
/// `https` are returned unchanged.
pub fn authenticated_clone_url(clone_url: &str, auth: &BitbucketAuth) -> Result<String> {
    let mut url = Url::parse(clone_url)
        .map_err(|e| Error::Parse(format!("invalid clone URL {clone_url}: {e}")))?;

    match url.scheme() {
        "https" => {}
        "http" => url
            .set_scheme("https")
            .map_err(|()| Error::Parse(format!("cannot use https for {clone_url}")))?,
        // ssh and file remotes carry no basic-auth credentials
        _ => return Ok(clone_url.to_string()),
    }

    url.set_username(&auth.username)
        .and_then(|()| url.set_password(Some(&auth.password)))
        .map_err(|()| Error::Parse(format!("cannot set credentials on {clone_url}")))?;

    Ok(url.into())
}
