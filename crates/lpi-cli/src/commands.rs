use std::sync::Arc;

use anyhow::bail;
use chrono::{Duration, Utc};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use lpi_events::{LedgerEvent, LedgerEventHandler};
use lpi_ledger::{SimulatedLedger, TransferHolder, TransferStatus};
use lpi_plugin::MockLedgerPlugin;
use lpi_types::{ErrorCode, Fulfillment, LedgerAddress, RejectionReason, Transfer};

use crate::cli::*;
use crate::config_file::FileConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::CheckConfig(args) => cmd_check_config(args, &cli.format),
        Command::Demo(args) => cmd_demo(args, &cli.format).await,
    }
}

#[derive(Serialize)]
struct ConfigSummary {
    plugin_type: String,
    ledger_prefix: String,
    connector_account: String,
    expected_currency_unit: String,
    timeout_ms: Option<u128>,
    currency_scale: i32,
    min_balance: String,
    max_balance: Option<String>,
    connectors: Vec<String>,
}

fn cmd_check_config(args: CheckConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let file = FileConfig::load(&args.path)?;
    let config = file.plugin_config()?;
    let info = file.ledger_info(&config.base.ledger_prefix, &config.base.expected_currency_unit)?;
    if info.currency_unit() != &config.base.expected_currency_unit {
        bail!(
            "ledger currency {} does not match expected currency {}",
            info.currency_unit(),
            config.base.expected_currency_unit
        );
    }

    let summary = ConfigSummary {
        plugin_type: config.base.plugin_type.to_string(),
        ledger_prefix: config.base.ledger_prefix.to_string(),
        connector_account: config.base.connector_account.to_string(),
        expected_currency_unit: config.base.expected_currency_unit.to_string(),
        timeout_ms: config.base.timeout.map(|t| t.as_millis()),
        currency_scale: info.currency_scale(),
        min_balance: info.min_balance().to_string(),
        max_balance: info.max_balance().map(|m| m.to_string()),
        connectors: info
            .connector_addresses()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("{} {} is valid", "✓".green().bold(), args.path.display());
            println!("  Plugin type: {}", summary.plugin_type.cyan());
            println!("  Ledger prefix: {}", summary.ledger_prefix.yellow());
            println!("  Connector account: {}", summary.connector_account.yellow());
            println!(
                "  Currency: {} (scale {})",
                summary.expected_currency_unit.bold(),
                summary.currency_scale
            );
            match summary.timeout_ms {
                Some(ms) => println!("  Timeout: {ms} ms"),
                None => println!("  Timeout: {}", "none".dimmed()),
            }
            println!(
                "  Balance bounds: {} .. {}",
                summary.min_balance,
                summary.max_balance.as_deref().unwrap_or("unbounded")
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DemoSummary {
    transfer_id: String,
    amount: i64,
    status: String,
    sender: String,
    sender_balance: String,
    receiver: String,
    receiver_balance: String,
}

async fn cmd_demo(args: DemoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::demo(),
    };
    let sender_config = file.plugin_config()?;
    let prefix = sender_config.base.ledger_prefix.clone();
    let info = file.ledger_info(&prefix, &sender_config.base.expected_currency_unit)?;

    let mut ledger = SimulatedLedger::new(info);
    if let Some(secret) = &file.ledger.shared_secret {
        ledger = ledger.with_shared_secret(secret.as_str());
    }
    let ledger = Arc::new(ledger);

    let sender_account = sender_config.base.connector_account.clone();
    let peer = LedgerAddress::new(args.peer.as_str())?;
    if peer == sender_account {
        bail!("peer must differ from the connector account {sender_account}");
    }
    fund(&ledger, &prefix, &sender_account, args.funding)?;

    let mut receiver_config = sender_config.clone();
    receiver_config.base.connector_account = peer.clone();

    let (sender, receiver) = if args.queued {
        (
            MockLedgerPlugin::simulated_queued(sender_config, Arc::clone(&ledger)),
            MockLedgerPlugin::simulated_queued(receiver_config, Arc::clone(&ledger)),
        )
    } else {
        (
            MockLedgerPlugin::simulated(sender_config, Arc::clone(&ledger)),
            MockLedgerPlugin::simulated(receiver_config, Arc::clone(&ledger)),
        )
    };
    if matches!(format, OutputFormat::Text) {
        sender.add_handler(event_printer("sender"));
        receiver.add_handler(event_printer("receiver"));
    }

    sender.connect();
    receiver.connect();
    settle(&sender, &receiver).await?;
    if !sender.is_connected() || !receiver.is_connected() {
        bail!("could not connect both plugins to {prefix}");
    }

    let fulfillment = Fulfillment::random();
    let transfer = Transfer::builder()
        .ledger_prefix(prefix.clone())
        .source_account(sender_account.clone())
        .destination_account(peer.clone())
        .amount(i128::from(args.amount))
        .execution_condition(fulfillment.condition())
        .expires_at(Utc::now() + Duration::seconds(30))
        .build()?;
    let transfer_id = transfer.transfer_id();

    sender.send_transfer(transfer)?;
    if args.reject {
        let reason = RejectionReason::new(ErrorCode::ApplicationError, peer.clone())
            .with_message("rejected by demo receiver");
        receiver.reject_incoming_transfer(&transfer_id, reason)?;
    } else {
        receiver.fulfill_condition(&transfer_id, &fulfillment)?;
    }
    settle(&sender, &receiver).await?;
    debug!(transfer_id = %transfer_id, rejected = args.reject, "demo transfer settled");

    let summary = DemoSummary {
        transfer_id: transfer_id.to_string(),
        amount: args.amount,
        status: ledger
            .transfer_status(&transfer_id)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        sender: sender_account.to_string(),
        sender_balance: sender.connector_balance()?.to_string(),
        receiver: peer.to_string(),
        receiver_balance: receiver.connector_balance()?.to_string(),
    };

    sender.disconnect()?;
    receiver.disconnect()?;
    settle(&sender, &receiver).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!();
            println!(
                "{} Transfer {} {}",
                "✓".green().bold(),
                summary.transfer_id.yellow(),
                summary.status.bold()
            );
            println!("  {}: {}", summary.sender, summary.sender_balance.cyan());
            println!("  {}: {}", summary.receiver, summary.receiver_balance.cyan());
        }
    }
    Ok(())
}

/// Credit `account` with an already executed transfer from the ledger's
/// mint account.
fn fund(
    ledger: &SimulatedLedger,
    prefix: &LedgerAddress,
    account: &LedgerAddress,
    amount: i64,
) -> anyhow::Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let grant = Fulfillment::random();
    let transfer = Transfer::builder()
        .ledger_prefix(prefix.clone())
        .source_account(prefix.with("mint")?)
        .destination_account(account.clone())
        .amount(i128::from(amount))
        .execution_condition(grant.condition())
        .expires_at(Utc::now())
        .build()?;
    ledger.insert_holder(TransferHolder::new(transfer).with_status(TransferStatus::Executed));
    Ok(())
}

async fn settle(sender: &MockLedgerPlugin, receiver: &MockLedgerPlugin) -> anyhow::Result<()> {
    sender.flush().await?;
    receiver.flush().await?;
    Ok(())
}

fn event_printer(label: &'static str) -> Arc<dyn LedgerEventHandler> {
    Arc::new(move |event: &LedgerEvent| -> lpi_events::Result<()> {
        println!("  {} {}", format!("[{label}]").dimmed(), describe(event));
        Ok(())
    })
}

fn describe(event: &LedgerEvent) -> String {
    let kind = event.kind().to_string();
    match event {
        LedgerEvent::Error { error, .. } => format!("{} {}", kind.red(), error),
        LedgerEvent::OutgoingTransferRejected { transfer, reason, .. }
        | LedgerEvent::IncomingTransferRejected { transfer, reason, .. } => format!(
            "{} {} ({})",
            kind.red(),
            transfer.transfer_id().short_id(),
            reason
        ),
        _ => match (event.transfer(), event.message()) {
            (Some(transfer), _) => format!(
                "{} {} {} -> {} amount {}",
                kind.green(),
                transfer.transfer_id().short_id(),
                transfer.source_account(),
                transfer.destination_account(),
                transfer.amount()
            ),
            (None, Some(message)) => format!(
                "{} {} {} -> {}",
                kind.blue(),
                message.id.short_id(),
                message.from_address,
                message.to_address
            ),
            (None, None) => format!("{} {}", kind.cyan(), event.ledger_prefix()),
        },
    }
}
