use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    command::{CommandError, OperationKind},
    store::StoreError,
    tasks::DispatchError,
    wallet::WalletError,
};

pub mod in_memory_processor;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    WalletErr(#[from] WalletError),
    #[error(transparent)]
    StoreErr(#[from] StoreError),
    #[error(transparent)]
    DispatchErr(#[from] DispatchError),
}

pub type AgentId = u16;

pub trait OperationProcessor {
    fn process_operation(
        &mut self,
        agent_id: AgentId,
        kind: OperationKind,
        amount: Option<Decimal>,
        rate_to_usd: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), OperationError>;
}
