use std::io::Write;

use crate::processor::AgentId;
use csv::Writer;
use serde::Serialize;

/// Output row; money columns are already rendered for display.
#[derive(Debug, Serialize)]
pub struct WalletRow {
    pub agent: AgentId,
    pub uuid: String,
    pub balance: String,
    pub overdraft_limit: String,
    pub available: String,
    pub recent_orders: usize,
}

pub fn print_wallets<W>(output: &mut W, wallets: impl Iterator<Item = WalletRow>) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for wallet in wallets {
        if let Err(err) = writer.serialize(wallet) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
