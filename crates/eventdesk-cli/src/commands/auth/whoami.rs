//! Whoami command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;

use crate::commands::user_facing;
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Fetch the profile from the backend instead of using the stored copy
    #[arg(long)]
    pub fetch: bool,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let profile = if args.fetch {
        let client = ctx.authenticated_client("/profile")?;
        client
            .account()
            .fetch_profile()
            .await
            .map_err(user_facing)
            .context("Failed to fetch profile")?
    } else {
        let session = ctx.session()?;
        if session.access_token().is_none() {
            bail!("No active session. Run 'eventdesk auth login' first.");
        }
        session.profile().unwrap_or_default()
    };

    if args.json {
        return output::json_pretty(&profile);
    }

    if let Some(name) = profile.display_name() {
        output::field("User", &name);
    }
    if let Some(email) = &profile.email {
        output::field("Email", email);
    }
    output::field(
        "Email confirmed",
        if profile.is_email_confirmed() { "yes" } else { "no" },
    );
    output::field(
        "Payment account",
        if profile.has_payment_account() { "yes" } else { "no" },
    );

    Ok(())
}
