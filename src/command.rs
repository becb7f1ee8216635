use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    balance::{BalanceError, OverdraftLimit, local_to_usd},
    display::to_storage,
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Topup,
    Order,
    Overdraft,
}

/// Wallet operation with every amount already expressed in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletCommand {
    TopUp { amount_usd: Decimal },
    PlaceOrder { price_usd: Decimal },
    SetOverdraft { limit: OverdraftLimit },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: OperationKind },
    #[error("Amount must not be negative for {kind:?}")]
    NegativeAmount { kind: OperationKind },
    #[error("Amount {amount} for {kind:?} does not fit 18 digits with 3 decimals")]
    OutOfRange {
        kind: OperationKind,
        amount: Decimal,
    },
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

impl WalletCommand {
    /// Builds a command from a raw operation.
    ///
    /// When `rate_to_usd` is present the amount is in local currency and is
    /// converted to USD first. The USD amount is rounded to the stored
    /// precision; amounts with too many integer digits are rejected.
    pub fn parse_command(
        kind: OperationKind,
        amount: Option<Decimal>,
        rate_to_usd: Option<Decimal>,
    ) -> Result<Self, CommandError> {
        let Some(amount) = amount else {
            return Err(CommandError::AmountRequired { kind });
        };
        let amount_usd = match rate_to_usd {
            Some(rate) => local_to_usd(amount, rate)?,
            None => amount,
        };
        let amount_usd =
            to_storage(amount_usd).ok_or(CommandError::OutOfRange { kind, amount })?;

        match kind {
            OperationKind::Topup => Ok(Self::TopUp {
                amount_usd: Self::non_negative(kind, amount_usd)?,
            }),
            OperationKind::Order => Ok(Self::PlaceOrder {
                price_usd: Self::non_negative(kind, amount_usd)?,
            }),
            OperationKind::Overdraft => Ok(Self::SetOverdraft {
                limit: OverdraftLimit::new(amount_usd)?,
            }),
        }
    }

    fn non_negative(kind: OperationKind, amount: Decimal) -> Result<Decimal, CommandError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            Err(CommandError::NegativeAmount { kind })
        } else {
            Ok(amount)
        }
    }
}
