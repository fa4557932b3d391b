//! Auth command - test and explain Bitbucket credentials

use crate::cli::style::{check, Paint};
use anstream::println;
use anyhow::Result;
use submodule_bot::auth::{get_bitbucket_auth, test_bitbucket_auth};

/// Check the configured credentials against `host`
pub async fn run_auth_test(host: &str) -> Result<()> {
    println!("Testing Bitbucket authentication against {}...", host.accent());
    let auth = get_bitbucket_auth()?;
    let display_name = test_bitbucket_auth(&format!("https://{host}"), &auth).await?;
    println!(
        "{} Authenticated as: {} ({})",
        check(),
        display_name.emphasis(),
        auth.username.muted()
    );
    Ok(())
}

/// Print the environment the bot expects
pub fn run_auth_setup() {
    println!("{}", "Bitbucket Authentication Setup".emphasis());
    println!("==============================");
    println!();
    println!("Credentials (REST API and HTTPS git):");
    println!("  BITBUCKET_USERNAME   bot account user name");
    println!("  BITBUCKET_PASSWORD   password or HTTP access token");
    println!();
    println!("Commit author:");
    println!("  GIT_USER_NAME");
    println!("  GIT_USER_EMAIL");
    println!();
    println!("Optional commit signing:");
    println!("  SUBMODULE_BOT_PRIVATE_KEY_ID   GPG key ID");
    println!("  SUBMODULE_BOT_PRIVATE_KEY      armored private key, imported at startup");
    println!();
    println!("Then point a Bitbucket webhook for 'Pull request merged' at");
    println!("  {}", "http://<bot-host>:3000/hook".accent());
}
