//! protoc-gen-nestjs-microservice
//!
//! Invoked by `protoc` with an encoded `CodeGeneratorRequest` on stdin; writes
//! the encoded `CodeGeneratorResponse` to stdout. Diagnostics go to stderr.
//!
//! ```text
//! protoc --plugin=protoc-gen-nestjs-microservice \
//!   --nestjs-microservice_out=. \
//!   --nestjs-microservice_opt=services_file=services.json,protos_dir=../protos \
//!   orders.proto
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use nestproto_codegen::{plugin, GeneratedFile};
use prost::Message;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NESTPROTO_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-nestjs-microservice")]
#[command(author, version, about = "protoc plugin emitting NestJS microservice contracts")]
struct Cli {
    /// Read the encoded request from a file instead of stdin.
    #[arg(long, value_name = "PATH")]
    request: Option<PathBuf>,

    /// Write generated files to disk instead of emitting a response on stdout.
    #[arg(long)]
    write: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_request(cli: &Cli) -> Result<Vec<u8>> {
    match &cli.request {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read request {}", path.display()))
        }
        None => {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("failed to read request from stdin")?;
            Ok(input)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let input = read_request(cli)?;
    let request = plugin::decode_request(&input)?;
    let response = plugin::generate(&request)?;

    if cli.write {
        for file in response.file {
            let (Some(name), Some(content)) = (file.name, file.content) else {
                continue;
            };
            let path = GeneratedFile { name, content }.write()?;
            tracing::info!(file = %path.display(), "wrote generated file");
        }
        return Ok(());
    }

    let mut output = Vec::with_capacity(response.encoded_len());
    response.encode(&mut output)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&output)
        .context("failed to write response to stdout")?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("FAILED{err:#}");
            ExitCode::FAILURE
        }
    }
}
