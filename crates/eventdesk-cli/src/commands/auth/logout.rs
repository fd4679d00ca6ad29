//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    if session.access_token().is_none() && session.profile().is_none() {
        output::success("No active session");
        return Ok(());
    }

    session.clear();
    output::success("Logged out");
    Ok(())
}
