//! Refresh command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::commands::user_facing;
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client("/dashboard")?;

    client
        .refresh()
        .await
        .map_err(user_facing)
        .context("Failed to refresh session")?;

    output::success("Session refreshed");
    Ok(())
}
