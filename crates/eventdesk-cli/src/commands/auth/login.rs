//! Login command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use eventdesk::Credentials;

use crate::commands::user_facing;
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "EVENTDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client("/login")?;

    eprintln!("{}", "Logging in...".dimmed());

    let profile = client
        .account()
        .login(Credentials::new(&args.email, &args.password))
        .await
        .map_err(user_facing)
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    if let Some(name) = profile.display_name() {
        output::field("User", &name);
    }
    output::field("Backend", client.backend().as_str());
    output::field("API", client.config().base_url.as_str());
    if !profile.is_email_confirmed() {
        eprintln!(
            "{}",
            "Email address is not confirmed yet. Check your inbox for the code.".yellow()
        );
    }

    Ok(())
}
