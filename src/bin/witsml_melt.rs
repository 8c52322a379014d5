//! witsml-melt: Flatten WITSML documents into tables
//!
//! Usage:
//!   # Flatten every object of a document, one map per object
//!   witsml-melt wells.xml flatten
//!
//!   # Frame the stations of a trajectory, one JSON object per row
//!   witsml-melt trajectory.xml --plural trajectoryStation --jsonl frame
//!
//!   # Nested maps and lists, repeated elements pivoted into columns
//!   witsml-melt mudlog.xml --transpose plain
//!
//!   # Decode the data rows of every log into per-log files
//!   witsml-melt logs.xml --output-dir ./frames logdata

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use witsml_melt::melt::{
    decode_log, is_log_with_data, FlattenConfig, Flattener, Frame, FrameWriter, PlainConfig,
    PlainConverter, RowWriter,
};
use witsml_melt::model::Element;
use witsml_melt::schema::SchemaVariant;
use witsml_melt::{find_members, read_document};

#[derive(Parser, Debug)]
#[command(name = "witsml-melt")]
#[command(about = "Flatten WITSML documents into tables", long_about = None)]
struct Args {
    /// WITSML document to read
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Schema variant: 1.4.1.1-read, 1.4.1.1-write or 2.0
    #[arg(long, global = true, default_value = "1.4.1.1-read")]
    variant: SchemaVariant,

    /// Also emit attributes
    #[arg(long, global = true)]
    include_attr: bool,

    /// Prefix for attribute keys, e.g. "@"
    #[arg(long, global = true, default_value = "")]
    attr_prefix: String,

    /// Separator between nested element names
    #[arg(long, global = true, default_value = ".")]
    delimiter: String,

    /// First index for members of repeated elements
    #[arg(long, global = true, default_value_t = 0)]
    start_idx: usize,

    /// Don't backfill missing keys with nulls; columns may differ in length
    #[arg(long, global = true)]
    no_fill_missing: bool,

    /// Pivot repeated elements into a map of lists (plain)
    #[arg(long, global = true)]
    transpose: bool,

    /// Repeated element to work on, e.g. trajectoryStation.
    /// Defaults to the objects of the document
    #[arg(long, global = true)]
    plural: Option<String>,

    /// One JSON value per line instead of a pretty document
    #[arg(long, global = true)]
    jsonl: bool,

    /// Write frames to <DIR>/<name>.jsonl instead of stdout
    #[arg(long, short = 'o', global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flattened path -> value map per member
    Flatten,
    /// One column per flattened path across all members
    Frame,
    /// Nested maps and lists of plain values
    Plain,
    /// Typed columns of each log's data rows, keyed by mnemonic
    Logdata,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let root = read_document(&args.input, args.variant)?;
    log::debug!("read <{}> from {}", root.name(), args.input.display());

    match args.command {
        Command::Flatten => flatten(&args, &root),
        Command::Frame => frame(&args, &root),
        Command::Plain => plain(&args, &root),
        Command::Logdata => logdata(&args, &root),
    }
}

fn flatten_config(args: &Args) -> FlattenConfig {
    FlattenConfig {
        include_attr: args.include_attr,
        attr_prefix: args.attr_prefix.clone(),
        delimiter: args.delimiter.clone(),
        start_idx: args.start_idx,
        fill_missing: !args.no_fill_missing,
    }
}

/// Members named by `--plural`, or the objects directly under the root
fn select_members<'a>(args: &Args, root: &'a Element) -> Result<(String, &'a [Element])> {
    match &args.plural {
        Some(name) => {
            let found = find_members(root, name);
            if found.is_empty() {
                bail!("no <{}> elements in {}", name, args.input.display());
            }
            Ok((name.clone(), found))
        }
        None => match root.children().first() {
            Some(child) => Ok((child.name().to_string(), child.items())),
            None => bail!("<{}> has no child objects", root.name()),
        },
    }
}

fn flatten(args: &Args, root: &Element) -> Result<()> {
    let flattener = Flattener::new(flatten_config(args));
    let (_, members) = select_members(args, root)?;
    let flats: Vec<_> = members.iter().map(|m| flattener.flatten(m)).collect();

    if args.jsonl {
        let mut stdout = std::io::stdout().lock();
        for flat in &flats {
            writeln!(stdout, "{}", serde_json::to_string(flat)?)?;
        }
        Ok(())
    } else {
        print_pretty(&flats)
    }
}

fn frame(args: &Args, root: &Element) -> Result<()> {
    let flattener = Flattener::new(flatten_config(args));
    let (name, members) = select_members(args, root)?;
    let frame = flattener.frame(members);
    emit_frames(args, vec![(name, frame)])
}

fn plain(args: &Args, root: &Element) -> Result<()> {
    let converter = PlainConverter::new(PlainConfig {
        include_attr: args.include_attr,
        attr_prefix: args.attr_prefix.clone(),
        delimiter: args.delimiter.clone(),
        transpose: args.transpose,
    });
    let plain = converter.convert(root)?;

    if args.jsonl {
        let mut writer = RowWriter::new(std::io::stdout().lock());
        writer.write_plain(&plain)?;
        writer.flush()?;
        Ok(())
    } else {
        print_pretty(&plain)
    }
}

fn logdata(args: &Args, root: &Element) -> Result<()> {
    let logs = find_members(root, "log");
    let mut frames = Vec::new();
    for (i, object) in logs.iter().enumerate() {
        if !is_log_with_data(object) {
            log::info!("log {} carries no logData, skipping", i);
            continue;
        }
        let name = object
            .attribute("uid")
            .map(|uid| uid.to_string())
            .unwrap_or_else(|| format!("log_{}", i));
        frames.push((name, decode_log(object, !args.no_fill_missing)?));
    }

    if frames.is_empty() {
        bail!("no log with data in {}", args.input.display());
    }
    emit_frames(args, frames)
}

fn emit_frames(args: &Args, frames: Vec<(String, Frame)>) -> Result<()> {
    if let Some(output_dir) = &args.output_dir {
        let mut writer = FrameWriter::new_file_writer(output_dir)?;
        for (name, frame) in &frames {
            writer.write_frame(name, frame)?;
        }
        writer.flush()?;
        return Ok(());
    }

    if args.jsonl {
        let mut writer = RowWriter::new(std::io::stdout().lock());
        for (_, frame) in &frames {
            writer.write_frame(frame)?;
        }
        writer.flush()?;
        Ok(())
    } else if frames.len() == 1 {
        print_pretty(&frames[0].1)
    } else {
        let by_name: indexmap::IndexMap<&str, &Frame> =
            frames.iter().map(|(name, frame)| (name.as_str(), frame)).collect();
        print_pretty(&by_name)
    }
}

fn print_pretty<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
