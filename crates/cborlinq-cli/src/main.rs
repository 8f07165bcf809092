//! `cborlinq` CLI: convert JSON to CBOR and inspect CBOR documents.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to CBOR (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | cborlinq encode > data.cbor
//!
//! # Encode to hex text instead of raw bytes
//! echo '[1,2,3]' | cborlinq encode --hex
//!
//! # Decode CBOR to pretty-printed JSON, rejecting duplicate keys and trailing bytes
//! cborlinq decode --strict -i data.cbor
//!
//! # Decode hex text
//! echo 83010203 | cborlinq decode --hex
//!
//! # Show the node tree
//! cborlinq inspect -i data.cbor
//!
//! # Show size statistics
//! cborlinq stats -i data.json
//! ```
//!
//! Log output goes to stderr and is filtered by `CBORLINQ_LOG` (default `warn`).

use anyhow::{Context, Result};
use cborlinq_core::{ConformanceMode, DecodeOptions, Node};
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CBORLINQ_LOG";

#[derive(Parser)]
#[command(name = "cborlinq", version, about = "CBOR document model CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to CBOR
    Encode {
        #[command(flatten)]
        io: IoArgs,
        /// Write lowercase hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
    /// Decode CBOR to pretty-printed JSON
    Decode {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Print the node tree of a CBOR document
    Inspect {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Show encoding statistics (JSON size, CBOR size, reduction)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Args)]
struct DecodeArgs {
    /// Reject duplicate map keys and trailing bytes
    #[arg(long)]
    strict: bool,
    /// Maximum container nesting depth
    #[arg(long, default_value_t = cborlinq_core::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Read the input as hex text instead of raw bytes
    #[arg(long)]
    hex: bool,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        let conformance = if self.strict {
            ConformanceMode::Strict
        } else {
            ConformanceMode::Lax
        };
        DecodeOptions::default()
            .with_conformance(conformance)
            .with_max_depth(self.max_depth)
    }

    fn read_document(&self, input: Option<&str>) -> Result<Option<Node>> {
        let raw = read_input(input)?;
        let bytes = if self.hex {
            let text = String::from_utf8(raw).context("Hex input is not valid UTF-8")?;
            let digits: String = text.split_whitespace().collect();
            hex::decode(digits).context("Failed to parse hex input")?
        } else {
            raw
        };
        cborlinq_core::decode_with(&bytes, &self.options()).context("Failed to decode CBOR")
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { io, hex } => {
            let node = read_json(io.input.as_deref())?;
            let node = node.unwrap_or(Node::Null);
            let bytes = cborlinq_core::encode(&node).context("Failed to encode JSON to CBOR")?;
            debug!(bytes = bytes.len(), "encoded document");
            if hex {
                let mut text = hex::encode(&bytes);
                text.push('\n');
                write_output(io.output.as_deref(), text.as_bytes())?;
            } else {
                write_output(io.output.as_deref(), &bytes)?;
            }
        }
        Commands::Decode { io, decode } => {
            let node = decode.read_document(io.input.as_deref())?;
            let value = cborlinq_core::json::to_json(node.as_ref())
                .context("Failed to convert CBOR to JSON")?;
            let mut pretty = serde_json::to_string_pretty(&value)?;
            pretty.push('\n');
            write_output(io.output.as_deref(), pretty.as_bytes())?;
        }
        Commands::Inspect { io, decode } => {
            let node = decode.read_document(io.input.as_deref())?;
            let mut tree = String::new();
            render_tree(&mut tree, node.as_ref(), 0).context("Failed to render node tree")?;
            write_output(io.output.as_deref(), tree.as_bytes())?;
        }
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let node = parse_json(&json)?.unwrap_or(Node::Null);
            let cbor = cborlinq_core::encode(&node).context("Failed to encode JSON to CBOR")?;
            let json_bytes = json.len();
            let cbor_bytes = cbor.len();
            let ratio = if json_bytes > 0 {
                (1.0 - (cbor_bytes as f64 / json_bytes as f64)) * 100.0
            } else {
                0.0
            };
            println!("JSON size:  {} bytes", json_bytes);
            println!("CBOR size:  {} bytes", cbor_bytes);
            println!("Reduction:  {:.1}%", ratio);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// One line per node, children indented two spaces under their parent.
fn render_tree(out: &mut impl fmt::Write, node: Option<&Node>, depth: usize) -> fmt::Result {
    let Some(node) = node else {
        return writeln!(out, "absent");
    };
    match node {
        Node::Scalar(_) => writeln!(out, "{} {}", node.kind(), node)?,
        _ => writeln!(out, "{}", node)?,
    }
    let indent = "  ".repeat(depth + 1);
    match node {
        Node::Array(array) => {
            for (i, item) in array.iter().enumerate() {
                write!(out, "{indent}[{i}] ")?;
                render_tree(out, item, depth + 1)?;
            }
        }
        Node::Object(object) => {
            for (key, value) in object.iter() {
                write!(out, "{indent}{key:?} ")?;
                render_tree(out, value, depth + 1)?;
            }
        }
        Node::Null | Node::Scalar(_) => {}
    }
    Ok(())
}


fn parse_json(text: &[u8]) -> Result<Option<Node>> {
    let value: serde_json::Value = serde_json::from_slice(text).context("Failed to parse JSON")?;
    Ok(cborlinq_core::json::from_json(&value))
}

fn read_json(path: Option<&str>) -> Result<Option<Node>> {
    parse_json(&read_input(path)?)
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
