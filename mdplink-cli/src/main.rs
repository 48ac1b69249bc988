//! Diagnostic CLI for MDP device-management targets.
//!
//! The library is transport-generic; this tool wires it to the built-in
//! simulated target so the addressing, discovery and polling layers can
//! be exercised end to end.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use mdplink::{AmsNetId, MdpClient, MdpDataType, MdpValue, ModuleType, Parameter};

mod config;
mod demo;

use config::WatchConfig;

/// Diagnostic CLI for MDP device-management targets.
#[derive(Parser, Debug)]
#[command(name = "mdplink-cli")]
#[command(about = "Inspects MDP targets: module scan, parameter access, change watching")]
#[command(version)]
struct Args {
    /// Target net id (defaults to the local device)
    #[arg(short, long)]
    target: Option<AmsNetId>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the modules the target reports
    Scan,

    /// Read a single parameter
    Read {
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        data_type: MdpDataType,
        /// 1-based instance index of the module type
        #[arg(long, default_value_t = 1)]
        instance: u32,
    },

    /// Write a single parameter
    Write {
        module_type: ModuleType,
        table_id: u8,
        sub_index: u8,
        data_type: MdpDataType,
        /// Value, parsed according to the data type
        value: String,
        #[arg(long, default_value_t = 1)]
        instance: u32,
    },

    /// Observe parameters from a configuration file and report changes
    Watch {
        /// Path to configuration file (JSON5 format)
        #[arg(short, long, default_value = "watch.json5")]
        config: PathBuf,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Watch mode lets the config file raise the level further.
    let log_level = match &args.command {
        Command::Watch { config } => WatchConfig::load_from_file(config)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| args.log_level.clone()),
        _ => args.log_level.clone(),
    };
    init_tracing(&log_level);

    let target = args.target.unwrap_or(AmsNetId::LOCAL);

    let mut client = MdpClient::new(Box::new(demo::demo_device()));
    client
        .connect(target)
        .await
        .with_context(|| format!("failed to connect to {target}"))?;
    info!(%target, modules = client.module_count(), "connected");

    match args.command {
        Command::Scan => scan(&client),
        Command::Read {
            module_type,
            table_id,
            sub_index,
            data_type,
            instance,
        } => {
            let value = client
                .read_parameter_at(module_type, table_id, sub_index, data_type, instance)
                .await?;
            println!("{value}");
        }
        Command::Write {
            module_type,
            table_id,
            sub_index,
            data_type,
            value,
            instance,
        } => {
            let value = parse_value(data_type, &value)?;
            client
                .write_parameter_at(module_type, table_id, sub_index, &value, instance)
                .await?;
            info!(%module_type, table_id, sub_index, %value, "written");
        }
        Command::Watch { config } => {
            let config = WatchConfig::load_from_file(&config)
                .with_context(|| format!("failed to load config from {config:?}"))?;
            watch(&client, &config).await;
        }
    }

    client.close().await;
    Ok(())
}

fn scan(client: &MdpClient) {
    println!("{:>6}  {}", "id", "module type");
    for module in client.modules() {
        println!("{:>6}  {}", module.id, module.module_type);
    }
    println!("{} module(s)", client.module_count());
}

async fn watch(client: &MdpClient, config: &WatchConfig) {
    let period = Duration::from_millis(config.poll.period_ms);
    info!(
        period_ms = config.poll.period_ms,
        parameters = config.poll.parameters.len(),
        "watching for changes, press ctrl-c to stop"
    );

    let streams = config.poll.parameters.iter().map(|&parameter| {
        let mut changes = client.observe(parameter, period);
        async move {
            while let Some(result) = changes.next().await {
                match result {
                    Ok(value) => info!(
                        module_type = %parameter.module_type,
                        table_id = parameter.table_id,
                        sub_index = parameter.sub_index,
                        %value,
                        "changed"
                    ),
                    Err(e) => warn!(
                        module_type = %parameter.module_type,
                        table_id = parameter.table_id,
                        sub_index = parameter.sub_index,
                        error = %e,
                        "read failed"
                    ),
                }
            }
        }
    });

    tokio::select! {
        _ = futures::future::join_all(streams) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }
}

fn parse_value(data_type: MdpDataType, raw: &str) -> Result<MdpValue> {
    let value = match data_type {
        MdpDataType::Bool => MdpValue::Bool(raw.parse()?),
        MdpDataType::I16 => MdpValue::I16(raw.parse()?),
        MdpDataType::I32 => MdpValue::I32(raw.parse()?),
        MdpDataType::I64 => MdpValue::I64(raw.parse()?),
        MdpDataType::U8 => MdpValue::U8(raw.parse()?),
        MdpDataType::U16 => MdpValue::U16(raw.parse()?),
        MdpDataType::U32 => MdpValue::U32(raw.parse()?),
        MdpDataType::U64 => MdpValue::U64(raw.parse()?),
        MdpDataType::F32 => MdpValue::F32(raw.parse()?),
        MdpDataType::F64 => MdpValue::F64(raw.parse()?),
        MdpDataType::String => {
            if !raw.is_ascii() {
                bail!("string values must be ASCII");
            }
            MdpValue::from(raw)
        }
    };
    Ok(value)
}
