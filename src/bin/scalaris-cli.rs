use std::process::exit;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{debug, error};
use serde_json::Value;

use scalaris::{ClientConfig, Result, RpcResult, ScalarisClient, ENDPOINT_ENV};

#[derive(Parser)]
#[command(name = "scalaris-cli", version, about = "A Scalaris key-value store client")]
struct Cli {
    /// Store address
    #[arg(long, global = true, env = ENDPOINT_ENV, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Request timeout in milliseconds, 0 to wait forever
    #[arg(long, global = true, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the value of a key
    Read {
        /// The key
        key: String,
    },
    /// Write a value to a key
    Write {
        /// The key
        key: String,
        /// The value, as JSON or a plain string
        value: String,
    },
    /// Replace the value of a key if it still equals OLD
    TestAndSet {
        /// The key
        key: String,
        /// The expected current value
        old: String,
        /// The new value
        new: String,
    },
    /// Delete a key
    Delete {
        /// The key
        key: String,
    },
    /// Read a key inside a transaction
    TxRead {
        /// The key
        key: String,
    },
    /// Write a key inside a transaction
    TxWrite {
        /// The key
        key: String,
        /// The value, as JSON or a plain string
        value: String,
    },
    /// Test-and-set inside a transaction
    TxTestAndSet {
        /// The key
        key: String,
        /// The expected current value
        old: String,
        /// The new value
        new: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(result) => match result.payload() {
            Some(payload) => match serde_json::to_string_pretty(&payload) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("{}", e);
                    exit(1);
                }
            },
            None => println!("ok"),
        },
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<RpcResult> {
    let mut config = ClientConfig::from_endpoint(cli.addr);
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout((ms > 0).then(|| Duration::from_millis(ms)));
    }
    debug!("Using store at {}", config.address);
    let client = ScalarisClient::from_config(&config);

    match cli.command {
        Commands::Read { key } => client.read(key),
        Commands::Write { key, value } => client.write(key, parse_value(value)),
        Commands::TestAndSet { key, old, new } => {
            client.test_and_set(key, parse_value(old), parse_value(new))
        }
        Commands::Delete { key } => client.delete(key),
        Commands::TxRead { key } => client.tx_read(key),
        Commands::TxWrite { key, value } => client.tx_write(key, parse_value(value)),
        Commands::TxTestAndSet { key, old, new } => {
            client.tx_test_and_set(key, parse_value(old), parse_value(new))
        }
    }
}

/// Treats the argument as JSON when it parses, as a string otherwise.
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
