//! Batch runner wiring the wallet processor to CSV input and output.

use std::io::{Read, Write};

use crate::{
    config::LedgerConfig,
    display::format_decimal_with,
    processor::{
        OperationError, OperationProcessor, in_memory_processor::InMemoryOperationProcessor,
    },
};
use anyhow::Result;
use chrono::Utc;
use csv_parser::CsvOperationParser;
use csv_printer::{WalletRow, print_wallets};
use thiserror::Error;
use tracing::info;

pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("Malformed row: {0}")]
    Parse(#[from] csv::Error),
    #[error(transparent)]
    Operation(#[from] OperationError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOperationParser::new(self.input);

        let mut processor = InMemoryOperationProcessor::new(&self.config);

        let mut rows = 0_u64;
        for (line, row) in parser {
            rows += 1;
            let result = row.map_err(RowError::from).and_then(|op| {
                processor
                    .process_operation(op.agent, op.kind, op.amount, op.rate, Utc::now())
                    .map_err(RowError::from)
            });
            if let Err(err) = result {
                (self.error_printer)(line, err);
            }
        }
        info!(rows, tenant = %processor.tenant(), "operations processed");

        let min_decimals = self.config.min_display_decimals;
        let render = |amount| format_decimal_with(Some(amount), min_decimals);
        let summaries = processor.summaries(Utc::now(), self.config.recent_window());
        print_wallets(
            self.output,
            summaries.into_iter().map(|summary| WalletRow {
                agent: summary.agent_id,
                uuid: summary.uuid,
                balance: render(summary.balance),
                overdraft_limit: render(summary.overdraft_limit.value()),
                available: render(summary.available),
                recent_orders: summary.recent_orders,
            }),
        )
    }
}
