//! # tixr CLI Entry Point
//!
//! Assembles subcommands, loads the snapshot file, dispatches to handler
//! functions, and writes the snapshot back after a successful mutation.

use std::path::PathBuf;

use clap::Parser;

use tixr_cli::command::{self, Outcome};
use tixr_cli::store;

/// Ticket-issuance registry CLI.
///
/// Creators register events, each event is exclusively managed by its
/// creator, and managers issue and revoke fungible ticket tokens for their
/// own event only. State lives in a JSON snapshot file.
#[derive(Parser, Debug)]
#[command(name = "tixr", version, about)]
struct Cli {
    /// Path to the JSON snapshot file (created on first mutation).
    #[arg(long, global = true, default_value = "registry.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Register a new event (one per principal, ever).
    CreateEvent(command::CreateEventArgs),
    /// Mint tickets for an event you manage.
    Mint(command::MintArgs),
    /// Burn a holder's tickets for an event you manage.
    Burn(command::BurnArgs),
    /// Replace an event's metadata URI.
    UpdateUri(command::UpdateUriArgs),
    /// Overwrite an event's descriptive fields.
    UpdateEvent(command::UpdateEventArgs),
    /// Display an event record and its URI.
    Show(command::ShowArgs),
    /// Display an event's metadata URI.
    Uri(command::UriArgs),
    /// Display a holder's ticket balance.
    Balance(command::BalanceArgs),
    /// Display an event's total ticket supply.
    Supply(command::SupplyArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let registry = store::load(&cli.state)?;

    let outcome: Outcome = match &cli.command {
        Commands::CreateEvent(args) => command::create_event(&registry, args)?,
        Commands::Mint(args) => command::mint(&registry, args)?,
        Commands::Burn(args) => command::burn(&registry, args)?,
        Commands::UpdateUri(args) => command::update_uri(&registry, args)?,
        Commands::UpdateEvent(args) => command::update_event(&registry, args)?,
        Commands::Show(args) => command::show(&registry, args)?,
        Commands::Uri(args) => command::uri(&registry, args)?,
        Commands::Balance(args) => command::balance(&registry, args)?,
        Commands::Supply(args) => command::supply(&registry, args)?,
    };

    if outcome.mutated {
        store::save(&cli.state, &registry)?;
    }
    println!("{}", serde_json::to_string_pretty(&outcome.output)?);
    Ok(())
}
