//! witsml-query: Query a WITSML store and print the reply as JSON
//!
//! Usage:
//!   # Identifiers of all wellbores in a well
//!   witsml-query --url https://store/witsml list wellbore -s uidWell=W-1
//!
//!   # Full trajectory, stations framed into columns
//!   witsml-query get trajectory -s uidWell=W-1 -s uidWellbore=B-1 -s uid=T-1 \
//!       --plural trajectoryStation
//!
//!   # Meaning of a store error code
//!   witsml-query base-msg -- -405
//!
//! The connection may also be given through WITSML_URL, WITSML_USERNAME and
//! WITSML_PASSWORD.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use witsml_melt::config::{ClientConfig, Verify};
use witsml_melt::melt::{Flattener, PlainConfig, PlainConverter};
use witsml_melt::model::to_pretty_xml;
use witsml_melt::schema::{ObjectType, SchemaVariant};
use witsml_melt::store::{ReturnElements, StoreClient};
use witsml_melt::find_members;

#[derive(Parser, Debug)]
#[command(name = "witsml-query")]
#[command(about = "Query a WITSML store and print the reply as JSON", long_about = None)]
struct Args {
    /// Store service URL
    #[arg(long, env = "WITSML_URL")]
    url: String,

    #[arg(long, short = 'u', env = "WITSML_USERNAME")]
    username: String,

    #[arg(long, short = 'p', env = "WITSML_PASSWORD", hide_env_values = true)]
    password: String,

    /// Skip TLS certificate verification
    #[arg(long, conflicts_with = "ca_bundle")]
    insecure: bool,

    /// PEM file with additional trusted certificates
    #[arg(long)]
    ca_bundle: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Schema variant used to read replies
    #[arg(long, default_value = "1.4.1.1-read")]
    variant: SchemaVariant,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List matching objects, identifiers only by default
    List {
        object_type: ObjectType,

        /// Selector field, e.g. uidWell=W-1 (repeatable)
        #[arg(short = 's', long = "select", value_parser = parse_selector)]
        select: Vec<(String, String)>,

        #[arg(long, default_value = "id-only")]
        return_elements: ReturnElements,
    },

    /// Fetch matching objects
    Get {
        object_type: ObjectType,

        /// Selector field, e.g. uid=L-1 (repeatable)
        #[arg(short = 's', long = "select", value_parser = parse_selector)]
        select: Vec<(String, String)>,

        #[arg(long, default_value = "all")]
        return_elements: ReturnElements,

        /// Frame this repeated element of each returned object
        #[arg(long)]
        plural: Option<String>,

        /// Pivot repeated elements into a map of lists
        #[arg(long)]
        transpose: bool,

        /// Print the reply as XML instead of JSON
        #[arg(long, conflicts_with_all = ["plural", "transpose"])]
        xml: bool,
    },

    /// Delete matching objects
    Delete {
        object_type: ObjectType,

        /// Selector field, e.g. uid=W-1 (repeatable)
        #[arg(short = 's', long = "select", value_parser = parse_selector)]
        select: Vec<(String, String)>,
    },

    /// Message the store gives for a result code
    BaseMsg {
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },
}

fn parse_selector(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))
}

fn as_selector(select: &[(String, String)]) -> Vec<(&str, &str)> {
    select.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let verify = if args.insecure {
        Verify::Disabled
    } else if let Some(path) = &args.ca_bundle {
        Verify::CaBundle(path.clone())
    } else {
        Verify::Enabled
    };

    let mut config = ClientConfig::new(&args.url, &args.username, &args.password)
        .with_verify(verify)
        .with_variant(args.variant);
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = StoreClient::connect(&config)
        .with_context(|| format!("Failed to set up client for {}", args.url))?;

    match args.command {
        Command::List {
            object_type,
            select,
            return_elements,
        } => {
            let found = client.list(object_type, &as_selector(&select), return_elements)?;
            print_pretty(&PlainConverter::default().convert(&found)?)
        }
        Command::Get {
            object_type,
            select,
            return_elements,
            plural,
            transpose,
            xml,
        } => {
            let selector = as_selector(&select);
            let found = client.get(object_type, &[selector.as_slice()], return_elements)?;
            log::info!("{} {} objects returned", found.len(), object_type);

            if xml {
                let envelope = client.typed_envelope(object_type, found.into_items());
                print!("{}", to_pretty_xml(&envelope)?);
                return Ok(());
            }

            match plural {
                Some(name) => {
                    let flattener = Flattener::default();
                    let frames: Vec<_> = found
                        .iter()
                        .map(|object| flattener.frame(find_members(object, &name)))
                        .collect();
                    print_pretty(&frames)
                }
                None => {
                    let converter = PlainConverter::new(PlainConfig {
                        transpose,
                        ..Default::default()
                    });
                    print_pretty(&converter.convert(&found)?)
                }
            }
        }
        Command::Delete {
            object_type,
            select,
        } => {
            client.delete(object_type, &as_selector(&select))?;
            log::info!("deleted {}", object_type);
            Ok(())
        }
        Command::BaseMsg { code } => {
            println!("{}", client.base_message(code)?);
            Ok(())
        }
    }
}

fn print_pretty<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
