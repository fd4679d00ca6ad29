//! Discount code subcommand implementations.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use eventdesk::types::DiscountCodePayload;

use crate::commands::user_facing;
use crate::output;
use crate::session::Context;

const LOCATION: &str = "/discount-codes";

#[derive(Args, Debug)]
pub struct CodesCommand {
    #[command(subcommand)]
    pub command: CodesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CodesSubcommand {
    /// List the discount codes of an event
    List(ListArgs),

    /// Create a discount code
    Create(CreateArgs),

    /// Deactivate a discount code
    Deactivate(IdArgs),

    /// Delete a discount code
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Event id
    #[arg(long)]
    pub event: u64,

    /// Print the codes as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Event id
    #[arg(long)]
    pub event: u64,

    /// The code customers enter
    #[arg(long)]
    pub code: String,

    /// Discount amount
    #[arg(long)]
    pub amount: f64,

    /// Total number of redemptions allowed
    #[arg(long)]
    pub max_uses: u64,

    /// Redemptions allowed per customer
    #[arg(long)]
    pub per_user_limit: Option<u64>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expires_at: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Discount code id
    pub id: u64,
}

pub async fn handle(cmd: CodesCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        CodesSubcommand::List(args) => list(args, ctx).await,
        CodesSubcommand::Create(args) => create(args, ctx).await,
        CodesSubcommand::Deactivate(args) => deactivate(args, ctx).await,
        CodesSubcommand::Delete(args) => delete(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    let codes = client
        .discount_codes()
        .for_event(args.event, true)
        .refetch()
        .await
        .map_err(user_facing)
        .context("Failed to list discount codes")?;

    if args.json {
        return output::json_pretty(&codes);
    }

    if codes.is_empty() {
        eprintln!("{}", "No discount codes found.".dimmed());
        return Ok(());
    }

    for code in &codes {
        let value = code
            .value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {:<16} {:>10}  {} uses  {}",
            code.id,
            code.code,
            value,
            code.uses(),
            code.expiry().unwrap_or("-").dimmed()
        );
    }

    Ok(())
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    let payload = DiscountCodePayload {
        event: args.event,
        code: args.code,
        amount: args.amount,
        max_uses: args.max_uses,
        per_user_limit: args.per_user_limit,
        expires_at: args.expires_at,
    };

    let created = client
        .discount_codes()
        .create(&payload)
        .await
        .map_err(user_facing)
        .context("Failed to create discount code")?;

    output::success("Discount code created");
    output::json_pretty(&created)
}

async fn deactivate(args: IdArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    client
        .discount_codes()
        .deactivate(args.id)
        .await
        .map_err(user_facing)
        .context("Failed to deactivate discount code")?;

    output::success(&format!("Discount code {} deactivated", args.id));
    Ok(())
}

async fn delete(args: IdArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    client
        .discount_codes()
        .delete(args.id)
        .await
        .map_err(user_facing)
        .context("Failed to delete discount code")?;

    output::success(&format!("Discount code {} deleted", args.id));
    Ok(())
}
