use algo_state_core::{
    application_address, decode_address, decode_state_json, encode_address, BoxEntry,
    DecodedState, NodeConfig, StateDiffer, StateExporter, StateInspector,
};
use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::io::Read;
use tabled::{Table, Tabled};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "algo-state", version)]
#[command(about = "Inspect and decode Algorand application state", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// algod address, overrides config and ALGOD_ADDRESS
    #[arg(long, global = true)]
    algod_address: Option<String>,

    /// algod API token, overrides config and ALGOD_TOKEN
    #[arg(long, global = true)]
    algod_token: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a state document read from a file or stdin
    Decode {
        /// State list, application-info or account-application-info JSON; `-` for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Keep keys and byte values as raw bytes
        #[arg(long)]
        raw: bool,
    },

    /// Fetch and decode the global state of an application
    Global {
        #[arg(long)]
        app_id: u64,

        #[arg(long)]
        raw: bool,

        /// Include creator and fetch time
        #[arg(long)]
        snapshot: bool,
    },

    /// Fetch and decode the local state of an account
    Local {
        #[arg(long)]
        app_id: u64,

        /// Account address
        #[arg(long)]
        address: String,

        #[arg(long)]
        raw: bool,
    },

    /// Fetch a single box
    #[command(group(ArgGroup::new("box_name").required(true).args(["name", "address", "hex"])))]
    Box {
        #[arg(long)]
        app_id: u64,

        /// Box name as UTF-8 text
        #[arg(long)]
        name: Option<String>,

        /// Box named by an account's public key
        #[arg(long)]
        address: Option<String>,

        /// Box name as hex
        #[arg(long)]
        hex: Option<String>,
    },

    /// List box names of an application
    Boxes {
        #[arg(long)]
        app_id: u64,
    },

    /// Compare two state documents
    Diff {
        before: String,
        after: String,

        #[arg(long)]
        raw: bool,
    },

    /// Address helpers
    #[command(group(ArgGroup::new("address_op").required(true).args(["app_id", "decode", "encode"])))]
    Address {
        /// Print the escrow address of an application
        #[arg(long)]
        app_id: Option<u64>,

        /// Print the public key (hex) of an address
        #[arg(long)]
        decode: Option<String>,

        /// Print the address of a hex public key
        #[arg(long)]
        encode: Option<String>,
    },
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algo_state_core=warn,algo_state=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let format = args.format;

    match args.command {
        Commands::Decode { input, raw } => {
            let state = decode_document(&input, raw)?;
            output_state(&state, format)?;
        }
        Commands::Global {
            app_id,
            raw,
            snapshot: true,
        } => {
            let inspector = inspector(&args.config, args.algod_address, args.algod_token)?;
            let snapshot = inspector
                .snapshot(app_id, raw)
                .await
                .with_context(|| format!("Failed to read global state of application {}", app_id))?;
            match format {
                OutputFormat::Json => StateExporter::print_json(&snapshot)?,
                OutputFormat::Human => {
                    println!(
                        "{} {}  {} {}  {} {}",
                        "Application:".bold(),
                        snapshot.app_id,
                        "Creator:".bold(),
                        snapshot.creator,
                        "Fetched:".bold(),
                        snapshot.fetched_at
                    );
                    output_state(&snapshot.global, format)?;
                }
            }
        }
        Commands::Global {
            app_id,
            raw,
            snapshot: false,
        } => {
            let inspector = inspector(&args.config, args.algod_address, args.algod_token)?;
            let state = inspector
                .global_state(app_id, raw)
                .await
                .with_context(|| format!("Failed to read global state of application {}", app_id))?;
            output_state(&state, format)?;
        }
        Commands::Local {
            app_id,
            address,
            raw,
        } => {
            let inspector = inspector(&args.config, args.algod_address, args.algod_token)?;
            let state = inspector
                .local_state(&address, app_id, raw)
                .await
                .with_context(|| format!("Failed to read local state of {}", address))?;
            output_state(&state, format)?;
        }
        Commands::Box {
            app_id,
            name,
            address,
            hex,
        } => {
            let name = box_name(name, address, hex)?;
            let inspector = inspector(&args.config, args.algod_address, args.algod_token)?;
            let entry = inspector
                .box_entry(app_id, &name)
                .await
                .with_context(|| format!("Failed to read box of application {}", app_id))?;
            output_box(&entry, format)?;
        }
        Commands::Boxes { app_id } => {
            let inspector = inspector(&args.config, args.algod_address, args.algod_token)?;
            let names = inspector.box_names(app_id).await?;
            output_box_names(&names, format)?;
        }
        Commands::Diff { before, after, raw } => {
            let before = decode_document(&before, raw)?;
            let after = decode_document(&after, raw)?;
            let diff = StateDiffer::diff(&before, &after);
            match format {
                OutputFormat::Json => StateExporter::print_json(&diff)?,
                OutputFormat::Human => println!("{}", StateDiffer::format_human(&diff)),
            }
        }
        Commands::Address {
            app_id,
            decode,
            encode,
        } => {
            let output = if let Some(app_id) = app_id {
                application_address(app_id)
            } else if let Some(address) = decode {
                hex::encode(decode_address(&address)?)
            } else if let Some(public_key) = encode {
                let bytes = hex::decode(&public_key).context("Public key is not valid hex")?;
                let key: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("Public key must be 32 bytes, got {}", bytes.len()))?;
                encode_address(&key)
            } else {
                bail!("one of --app-id, --decode or --encode is required");
            };
            println!("{}", output);
        }
    }

    Ok(())
}

fn inspector(
    config_path: &Option<String>,
    algod_address: Option<String>,
    algod_token: Option<String>,
) -> Result<StateInspector> {
    let mut config = NodeConfig::load(config_path.as_deref())?;

    // Command-line flags win over file and environment
    if let Some(address) = algod_address {
        config.algod_address = address;
    }
    if let Some(token) = algod_token {
        config.algod_token = token;
    }
    config.validate()?;

    debug!(address = %config.algod_address, "using algod node");
    Ok(StateInspector::from_config(&config))
}

fn decode_document(input: &str, raw: bool) -> Result<DecodedState> {
    let content = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };

    let document: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", input))?;
    let state = decode_state_json(&document, raw)
        .with_context(|| format!("Failed to decode state from {}", input))?;
    Ok(state)
}

fn box_name(name: Option<String>, address: Option<String>, hex: Option<String>) -> Result<Vec<u8>> {
    if let Some(name) = name {
        return Ok(name.into_bytes());
    }
    if let Some(address) = address {
        return Ok(decode_address(&address)?.to_vec());
    }
    if let Some(hex_name) = hex {
        return hex::decode(&hex_name).context("Box name is not valid hex");
    }
    bail!("one of --name, --address or --hex is required")
}

fn output_state(state: &DecodedState, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return StateExporter::print_json(state);
    }

    if state.is_empty() {
        println!("{}", "(empty state)".dimmed());
        return Ok(());
    }

    let rows: Vec<StateRow> = state
        .iter()
        .map(|(key, value)| StateRow {
            key: key.to_string(),
            kind: value.type_name(),
            value: value.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!(
        "{}",
        format!(
            "{} {}",
            state.len(),
            if state.len() == 1 { "entry" } else { "entries" }
        )
        .green()
    );
    Ok(())
}

fn output_box(entry: &BoxEntry, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return StateExporter::print_json(entry);
    }

    println!("{} {}", "Name:".bold(), entry.name_text());
    if let Ok(address) = entry.name_as_address() {
        println!("{} {}", "Address:".bold(), address);
    }
    println!("{} {} bytes", "Size:".bold(), entry.value.len());
    println!("{} 0x{}", "Value:".bold(), hex::encode(&entry.value));
    Ok(())
}

fn output_box_names(names: &[Vec<u8>], format: OutputFormat) -> Result<()> {
    let rendered: Vec<String> = names.iter().map(|n| algo_state_core::str_or_hex(n)).collect();

    if format == OutputFormat::Json {
        return StateExporter::print_json(&rendered);
    }

    for name in &rendered {
        println!("  {}", name);
    }
    println!("\nTotal: {} boxes", rendered.len());
    Ok(())
}
