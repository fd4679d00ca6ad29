//! Store location subcommand implementations.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use eventdesk::types::LocationForm;

use crate::commands::user_facing;
use crate::output;
use crate::session::Context;

const LOCATION: &str = "/settings/locations";

#[derive(Args, Debug)]
pub struct LocationsCommand {
    #[command(subcommand)]
    pub command: LocationsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum LocationsSubcommand {
    /// List store locations
    List(ListArgs),

    /// Create a store location
    Create(CreateArgs),

    /// Delete a store location
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the locations as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Location name
    #[arg(long)]
    pub name: String,

    /// Street address
    #[arg(long)]
    pub address: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Location id
    pub id: String,
}

pub async fn handle(cmd: LocationsCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        LocationsSubcommand::List(args) => list(args, ctx).await,
        LocationsSubcommand::Create(args) => create(args, ctx).await,
        LocationsSubcommand::Delete(args) => delete(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    let locations = client
        .locations()
        .list()
        .refetch()
        .await
        .map_err(user_facing)
        .context("Failed to list locations")?;

    if args.json {
        return output::json_pretty(&locations);
    }

    if locations.is_empty() {
        eprintln!("{}", "No locations found.".dimmed());
        return Ok(());
    }

    for location in &locations {
        println!(
            "{:>6}  {}  {}",
            location.id,
            location.name,
            location.address.as_deref().unwrap_or("-").dimmed()
        );
    }

    Ok(())
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    let form = LocationForm {
        name: args.name,
        address: args.address,
    };

    client
        .locations()
        .create(&form)
        .await
        .map_err(user_facing)
        .context("Failed to create location")?;

    output::success(&format!("Location '{}' created", form.name));
    Ok(())
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client(LOCATION)?;

    client
        .locations()
        .delete(&args.id)
        .await
        .map_err(user_facing)
        .context("Failed to delete location")?;

    output::success(&format!("Location {} deleted", args.id));
    Ok(())
}
