//! # Subcommand Arguments and Handlers
//!
//! One `Args` struct and one handler per registry operation. Handlers
//! return the JSON value to print; mutations report whether the snapshot
//! must be written back via [`Outcome`].

use clap::Args;
use serde_json::json;

use tixr_core::{Principal, Timestamp};
use tixr_registry::{EventId, TicketRegistry};

/// Result of one handler: the JSON to print, and whether state changed.
#[derive(Debug)]
pub struct Outcome {
    /// Printed to stdout.
    pub output: serde_json::Value,
    /// Whether the snapshot file must be rewritten.
    pub mutated: bool,
}

impl Outcome {
    fn read(output: serde_json::Value) -> Self {
        Self {
            output,
            mutated: false,
        }
    }

    fn mutation(output: serde_json::Value) -> Self {
        Self {
            output,
            mutated: true,
        }
    }
}

/// Parse an event date: Unix epoch seconds, or RFC 3339 with Z suffix.
fn parse_date(raw: &str) -> anyhow::Result<Timestamp> {
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(Timestamp::from_epoch_secs(secs)?);
    }
    Ok(Timestamp::parse(raw)?)
}

/// Arguments for `create-event`.
#[derive(Args, Debug)]
pub struct CreateEventArgs {
    /// Acting principal (the event's creator and manager).
    #[arg(long = "as", value_name = "PRINCIPAL")]
    pub caller: String,
    /// Event name.
    #[arg(long)]
    pub name: String,
    /// Where the event takes place.
    #[arg(long)]
    pub place: String,
    /// Organizer display name.
    #[arg(long)]
    pub organizer: String,
    /// Event date: epoch seconds or RFC 3339 with Z suffix.
    #[arg(long)]
    pub date: String,
    /// Initial metadata URI (non-empty).
    #[arg(long)]
    pub uri: String,
}

/// Arguments for `mint`.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// Acting principal (must hold the creator role and manage the event).
    #[arg(long = "as", value_name = "PRINCIPAL")]
    pub caller: String,
    /// Target event id.
    #[arg(long)]
    pub event: u64,
    /// Receiving holder.
    #[arg(long)]
    pub to: String,
    /// Number of tickets to mint.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for `burn`.
#[derive(Args, Debug)]
pub struct BurnArgs {
    /// Acting principal (must manage the event).
    #[arg(long = "as", value_name = "PRINCIPAL")]
    pub caller: String,
    /// Target event id.
    #[arg(long)]
    pub event: u64,
    /// Holder whose tickets are burned.
    #[arg(long)]
    pub account: String,
    /// Number of tickets to burn.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for `update-uri`.
#[derive(Args, Debug)]
pub struct UpdateUriArgs {
    /// Acting principal (must manage the event).
    #[arg(long = "as", value_name = "PRINCIPAL")]
    pub caller: String,
    /// Target event id.
    #[arg(long)]
    pub event: u64,
    /// Replacement metadata URI (non-empty).
    #[arg(long)]
    pub uri: String,
}

/// Arguments for `update-event`.
#[derive(Args, Debug)]
pub struct UpdateEventArgs {
    /// Acting principal (must manage the event).
    #[arg(long = "as", value_name = "PRINCIPAL")]
    pub caller: String,
    /// Target event id.
    #[arg(long)]
    pub event: u64,
    /// Replacement name.
    #[arg(long)]
    pub name: String,
    /// Replacement place.
    #[arg(long)]
    pub place: String,
    /// Replacement organizer name.
    #[arg(long)]
    pub organizer: String,
    /// Replacement date: epoch seconds or RFC 3339 with Z suffix.
    #[arg(long)]
    pub date: String,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Event id to display.
    #[arg(long)]
    pub event: u64,
}

/// Arguments for `uri`.
#[derive(Args, Debug)]
pub struct UriArgs {
    /// Event id whose URI to display.
    #[arg(long)]
    pub event: u64,
}

/// Arguments for `balance`.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Event id.
    #[arg(long)]
    pub event: u64,
    /// Holder to look up.
    #[arg(long)]
    pub holder: String,
}

/// Arguments for `supply`.
#[derive(Args, Debug)]
pub struct SupplyArgs {
    /// Event id.
    #[arg(long)]
    pub event: u64,
}

pub fn create_event(registry: &TicketRegistry, args: &CreateEventArgs) -> anyhow::Result<Outcome> {
    let caller = Principal::new(args.caller.clone());
    let date = parse_date(&args.date)?;
    let id = registry.create_event(
        &caller,
        args.name.clone(),
        args.place.clone(),
        args.organizer.clone(),
        date,
        &args.uri,
    )?;
    Ok(Outcome::mutation(json!({ "event_id": id.as_u64() })))
}

pub fn mint(registry: &TicketRegistry, args: &MintArgs) -> anyhow::Result<Outcome> {
    let caller = Principal::new(args.caller.clone());
    let to = Principal::new(args.to.clone());
    let event = EventId(args.event);
    registry.mint(&caller, &to, event, args.amount, &[])?;
    Ok(Outcome::mutation(json!({
        "event_id": event.as_u64(),
        "balance": registry.balance_of(&to, event),
        "total_supply": registry.total_supply(event),
    })))
}

pub fn burn(registry: &TicketRegistry, args: &BurnArgs) -> anyhow::Result<Outcome> {
    let caller = Principal::new(args.caller.clone());
    let account = Principal::new(args.account.clone());
    let event = EventId(args.event);
    registry.burn(&caller, &account, event, args.amount)?;
    Ok(Outcome::mutation(json!({
        "event_id": event.as_u64(),
        "balance": registry.balance_of(&account, event),
        "total_supply": registry.total_supply(event),
    })))
}

pub fn update_uri(registry: &TicketRegistry, args: &UpdateUriArgs) -> anyhow::Result<Outcome> {
    let caller = Principal::new(args.caller.clone());
    registry.update_uri(&caller, EventId(args.event), &args.uri)?;
    Ok(Outcome::mutation(json!({
        "event_id": args.event,
        "uri": args.uri,
    })))
}

pub fn update_event(registry: &TicketRegistry, args: &UpdateEventArgs) -> anyhow::Result<Outcome> {
    let caller = Principal::new(args.caller.clone());
    let date = parse_date(&args.date)?;
    registry.update_event_details(
        &caller,
        EventId(args.event),
        args.name.clone(),
        args.place.clone(),
        args.organizer.clone(),
        date,
    )?;
    Ok(Outcome::mutation(json!({ "event_id": args.event })))
}

pub fn show(registry: &TicketRegistry, args: &ShowArgs) -> anyhow::Result<Outcome> {
    let (event, uri) = registry.get_event(EventId(args.event))?;
    Ok(Outcome::read(json!({ "event": event, "uri": uri })))
}

pub fn uri(registry: &TicketRegistry, args: &UriArgs) -> anyhow::Result<Outcome> {
    let uri = registry.get_uri(EventId(args.event))?;
    Ok(Outcome::read(json!({ "event_id": args.event, "uri": uri })))
}

pub fn balance(registry: &TicketRegistry, args: &BalanceArgs) -> anyhow::Result<Outcome> {
    let holder = Principal::new(args.holder.clone());
    let amount = registry.balance_of(&holder, EventId(args.event));
    Ok(Outcome::read(json!({
        "event_id": args.event,
        "holder": args.holder,
        "balance": amount,
    })))
}

pub fn supply(registry: &TicketRegistry, args: &SupplyArgs) -> anyhow::Result<Outcome> {
    let total = registry.total_supply(EventId(args.event));
    Ok(Outcome::read(json!({
        "event_id": args.event,
        "total_supply": total,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> TicketRegistry {
        let registry = TicketRegistry::new();
        let args = CreateEventArgs {
            caller: "alice".into(),
            name: "Conf".into(),
            place: "Hall".into(),
            organizer: "Org".into(),
            date: "1700000000".into(),
            uri: "ipfs://a".into(),
        };
        create_event(&registry, &args).unwrap();
        registry
    }

    #[test]
    fn test_parse_date_accepts_epoch_and_rfc3339() {
        let from_epoch = parse_date("1700000000").unwrap();
        let from_string = parse_date("2023-11-14T22:13:20Z").unwrap();
        assert_eq!(from_epoch, from_string);
        assert!(parse_date("2023-11-14T22:13:20+05:00").is_err());
        assert!(parse_date("soon").is_err());
    }

    #[test]
    fn test_create_event_outcome() {
        let registry = TicketRegistry::new();
        let args = CreateEventArgs {
            caller: "alice".into(),
            name: "Conf".into(),
            place: "Hall".into(),
            organizer: "Org".into(),
            date: "1700000000".into(),
            uri: "ipfs://a".into(),
        };
        let outcome = create_event(&registry, &args).unwrap();
        assert!(outcome.mutated);
        assert_eq!(outcome.output, json!({ "event_id": 1 }));
    }

    #[test]
    fn test_mint_then_balance() {
        let registry = seeded();
        let outcome = mint(
            &registry,
            &MintArgs {
                caller: "alice".into(),
                event: 1,
                to: "bob".into(),
                amount: 5,
            },
        )
        .unwrap();
        assert_eq!(outcome.output["total_supply"], 5);

        let outcome = balance(
            &registry,
            &BalanceArgs {
                event: 1,
                holder: "bob".into(),
            },
        )
        .unwrap();
        assert!(!outcome.mutated);
        assert_eq!(outcome.output["balance"], 5);
    }

    #[test]
    fn test_rejections_surface_as_errors() {
        let registry = seeded();
        let result = mint(
            &registry,
            &MintArgs {
                caller: "mallory".into(),
                event: 1,
                to: "bob".into(),
                amount: 1,
            },
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("mallory"), "got: {message}");
    }

    #[test]
    fn test_show_includes_record_and_uri() {
        let registry = seeded();
        let outcome = show(&registry, &ShowArgs { event: 1 }).unwrap();
        assert_eq!(outcome.output["uri"], "ipfs://a");
        assert_eq!(outcome.output["event"]["name"], "Conf");
    }
}
