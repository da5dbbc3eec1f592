//! preimage-upload
//!
//! Uploads a file's contents to the on-chain preimage registry and waits for
//! the transaction to be included.
//!
//! ```text
//!   file ──▶ hash + addPreimage calldata ──▶ fresh nonce ──▶ sign (EIP-155)
//!                                                             │
//!   exit status ◀── classify receipt ◀── poll receipt ◀── broadcast
//! ```
//!
//! The private key is read from `PREIMAGE_UPLOAD_PRIVATE_KEY`.

use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use preimage_upload::blockchain::{Account, RpcClient};
use preimage_upload::config::{self, UploadConfig};
use preimage_upload::lifecycle::{signals, Shutdown};
use preimage_upload::observability::init_logging;
use preimage_upload::upload::{Completion, UploadError, UploadReport, UploadResult, Uploader};

#[derive(Parser)]
#[command(name = "preimage-upload")]
#[command(about = "Upload a file as a preimage to the on-chain registry", long_about = None)]
struct Cli {
    /// File whose full contents are uploaded
    file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the JSON-RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the chain id used for signing
    #[arg(long)]
    chain_id: Option<u64>,

    /// Read the preimage size back from the registry after success.
    ///
    /// The lookup uses a flat keccak256 of the file, so it only matches
    /// registries that key preimages the same way.
    #[arg(long)]
    verify: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(file) = cli.file.clone() else {
        println!("{}", Cli::command().render_usage());
        return;
    };

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    init_logging(&config.observability);
    tracing::info!(
        rpc_url = %config.network.rpc_url,
        chain_id = config.network.chain_id,
        registry = %config.transaction.registry_address,
        "Configuration loaded"
    );

    let result = run(&cli, &file, config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Upload failed");
    }

    let completion = Completion::from_result(&result, cli.json);
    completion.emit();
    if !completion.succeeded() {
        std::process::exit(completion.exit_code);
    }
}

/// Load the config file (if any), apply CLI overrides, validate the result.
fn resolve_config(cli: &Cli) -> UploadResult<UploadConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .map_err(|e| UploadError::Input(format!("{}: {}", path.display(), e)))?,
        None => UploadConfig::default(),
    };

    if let Some(rpc_url) = &cli.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(chain_id) = cli.chain_id {
        config.network.chain_id = chain_id;
    }

    config::validate_config(&config)
        .map_err(|errors| UploadError::Input(config::ConfigError::Validation(errors).to_string()))?;

    Ok(config)
}

async fn run(cli: &Cli, file: &Path, config: UploadConfig) -> UploadResult<UploadReport> {
    let account = Account::from_env().map_err(UploadError::Construction)?;

    let preimage = tokio::fs::read(file).await.map_err(|e| {
        UploadError::Input(format!("Error reading file {}: {}", file.display(), e))
    })?;

    let client = Arc::new(
        RpcClient::new(config.network.clone()).map_err(|e| UploadError::Input(e.to_string()))?,
    );
    let uploader = Uploader::new(client.clone(), account, &config)?;

    println!("Preimage hash: {}", uploader.preimage_hash(&preimage));

    client
        .verify_chain_id()
        .await
        .map_err(UploadError::from_chain_check)?;

    let prepared = uploader.prepare(&preimage).await?;

    uploader.submit(&prepared).await?;
    println!("Transaction hash: {}", prepared.transaction.hash());
    println!("Waiting for receipt...");

    let shutdown = Arc::new(Shutdown::new());
    let cancel = shutdown.subscribe();
    let ctrl_c = signals::cancel_on_ctrl_c(shutdown.clone());
    let result = uploader.confirm(&prepared, cancel).await;
    ctrl_c.abort();
    let report = result?;

    if cli.verify {
        uploader.verify(&report).await?;
        println!("Preimage verified.");
    }

    Ok(report)
}
