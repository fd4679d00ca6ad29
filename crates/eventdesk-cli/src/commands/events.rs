//! Events subcommand implementations.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use eventdesk::types::DashboardStats;

use crate::commands::{parse_params, user_facing};
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct EventsCommand {
    #[command(subcommand)]
    pub command: EventsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsSubcommand {
    /// List the organizer's events
    List(ListArgs),

    /// Show one event
    Get(GetArgs),

    /// Show dashboard statistics, overall or for one event
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Extra query parameter (key=value, repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Print each event as pretty JSON
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Event id
    pub id: u64,

    /// Use the public endpoint
    #[arg(long)]
    pub public: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Event id (omit for the whole dashboard)
    #[arg(long)]
    pub id: Option<u64>,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(cmd: EventsCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        EventsSubcommand::List(args) => list(args, ctx).await,
        EventsSubcommand::Get(args) => get(args, ctx).await,
        EventsSubcommand::Stats(args) => stats(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client("/events")?;

    let mut params = parse_params(&args.params)?;
    if let Some(page) = args.page {
        params.insert("page".to_string(), page.to_string());
    }

    let page = client
        .events()
        .organizer_events(params)
        .refetch()
        .await
        .map_err(user_facing)
        .context("Failed to list events")?;

    if page.results.is_empty() {
        eprintln!("{}", "No events found.".dimmed());
        return Ok(());
    }

    for event in &page.results {
        if args.pretty {
            output::json_pretty(event)?;
        } else {
            println!(
                "{:>6}  {}  {}",
                event.id,
                event.title(),
                event.start_date.as_deref().unwrap_or("-").dimmed()
            );
        }
    }

    eprintln!();
    eprintln!("{}: {}", "Total".dimmed(), page.count);
    if page.next.is_some() {
        eprintln!("{}", "More results available, pass --page to continue.".dimmed());
    }

    Ok(())
}

async fn get(args: GetArgs, ctx: &Context) -> Result<()> {
    let location = format!("/events/{}", args.id);
    let client = ctx.authenticated_client(&location)?;

    let api = client.events();
    let query = if args.public {
        api.public_event(args.id)
    } else {
        api.details(args.id)
    };

    let event = query
        .refetch()
        .await
        .map_err(user_facing)
        .context("Failed to fetch event")?;

    output::json_pretty(&event)
}

async fn stats(args: StatsArgs, ctx: &Context) -> Result<()> {
    let location = match args.id {
        Some(id) => format!("/events/{}", id),
        None => "/dashboard".to_string(),
    };
    let client = ctx.authenticated_client(&location)?;

    let api = client.events();
    let query = match args.id {
        Some(id) => api.event_stats(id),
        None => api.dashboard_stats(),
    };

    let stats = query
        .refetch()
        .await
        .map_err(user_facing)
        .context("Failed to fetch statistics")?;

    if args.json {
        return output::json_pretty(&stats);
    }

    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &DashboardStats) {
    let events = &stats.events;
    output::field(
        "Events",
        &format!(
            "{} total, {} active, {} upcoming, {} past",
            events.total, events.active, events.upcoming, events.past
        ),
    );

    let registrations = &stats.registrations;
    output::field(
        "Registrations",
        &format!(
            "{} total, {} successful, {} pending, {} failed",
            registrations.total,
            registrations.successful,
            registrations.pending,
            registrations.failed
        ),
    );

    let revenue = &stats.revenue;
    output::field(
        "Revenue",
        &format!(
            "{} from {} orders ({} customers)",
            revenue.total, revenue.total_orders, revenue.total_customers
        ),
    );
}
