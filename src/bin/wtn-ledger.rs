use std::fs::File;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wtn_ledger::{
    bin_utils::{RowError, Service},
    config::LedgerConfig,
    processor::OperationError,
    tenant::TenantCode,
    wallet::WalletError,
};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("wtn_ledger=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let filename = args
        .next()
        .context("Expected a file name as the first argument")?;
    let mut config = LedgerConfig::from_env().context("Invalid WTN_* configuration")?;
    if let Some(tenant) = args.next() {
        config.tenant = TenantCode::parse(&tenant)?;
    }
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config,
        error_printer: Box::new(|line, err| {
            match err {
                RowError::Operation(OperationError::WalletErr(
                    WalletError::OverdraftExceeded { .. },
                )) => {
                    // refused orders are business outcomes, already logged by the processor
                }
                err => eprintln!("Error at line {line}: {err}"),
            }
        }),
    };
    service.run()
}
