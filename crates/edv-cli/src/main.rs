//! EDV CLI: upload documents and produce the metadata QR code.
//!
//! Reads Dropbox credentials from the environment (or `.env`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use edv_cli::{init_tracing, load_documents, write_qr_code, DocArg, UploadReport};
use edv_core::constants::QR_CODE_FILE_NAME;
use edv_core::{AppError, Config, MetadataBatch};
use edv_services::{QrCodeEncoder, SubmissionService, UploadOrchestrator};
use edv_storage::create_storage;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edv", about = "EDV document uploader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload documents and write the metadata QR code
    Upload {
        /// Document to upload, as LABEL=PATH (Aadhaar, PAN, Passport, Other)
        #[arg(long = "doc", required = true)]
        docs: Vec<DocArg>,
        /// Where to write the QR code
        #[arg(long, default_value = QR_CODE_FILE_NAME)]
        output: PathBuf,
    },
    /// Render a QR code from an existing metadata JSON file
    Encode {
        /// Path to a {"files":[...]} document
        metadata: PathBuf,
        /// Where to write the QR code
        #[arg(long, default_value = QR_CODE_FILE_NAME)]
        output: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

async fn upload(docs: Vec<DocArg>, output: PathBuf) -> anyhow::Result<()> {
    let config = Config::from_env()
        .map_err(AppError::from)
        .context("Invalid configuration")?;
    let stack = create_storage(&config).context("Failed to initialize Dropbox storage")?;
    let service = SubmissionService::new(
        UploadOrchestrator::new(stack.storage, stack.refresher),
        QrCodeEncoder::default(),
    );

    let (files, mut failures) = load_documents(&docs).await;

    let mut outcome = service.submit(files).await;
    failures.append(&mut outcome.failures);
    outcome.failures = failures;

    let qr_code_path = match &outcome.qr_code {
        Some(image) => {
            write_qr_code(&output, image).await?;
            Some(output)
        }
        None => None,
    };

    print_json(&UploadReport::new(&outcome, qr_code_path))?;

    if outcome.batch.is_empty() {
        return Err(AppError::NoUploads(format!(
            "all {} documents failed",
            outcome.failures.len()
        ))
        .into());
    }

    Ok(())
}

async fn encode(metadata: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(&metadata)
        .await
        .with_context(|| format!("Failed to read {}", metadata.display()))?;
    let batch: MetadataBatch = serde_json::from_str(&text).map_err(AppError::from)?;

    let image = QrCodeEncoder::default()
        .encode(&batch)
        .map_err(|e| AppError::QrEncoding(e.to_string()))?;
    write_qr_code(&output, &image).await?;

    tracing::info!(records = batch.len(), output = %output.display(), "QR code written");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { docs, output } => upload(docs, output).await?,
        Commands::Encode { metadata, output } => encode(metadata, output).await?,
    }

    Ok(())
}
