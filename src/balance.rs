use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Exchange rate must be positive, got {rate}")]
    InvalidRate { rate: Decimal },
    #[error("Overdraft limit must not be negative, got {limit}")]
    NegativeOverdraft { limit: Decimal },
    #[error("Currency conversion overflowed the decimal range")]
    Overflow,
}

/// How far a balance may go below zero before new debits are refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct OverdraftLimit(Decimal);

impl OverdraftLimit {
    pub const NONE: Self = Self(Decimal::ZERO);

    pub fn new(limit: Decimal) -> Result<Self, BalanceError> {
        if limit.is_sign_negative() && !limit.is_zero() {
            return Err(BalanceError::NegativeOverdraft { limit });
        }
        Ok(Self(limit))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

/// Effective spending capacity: `balance + overdraft_limit`, saturating at the
/// edges of the decimal range.
pub fn available_balance(balance: Decimal, overdraft_limit: OverdraftLimit) -> Decimal {
    balance.saturating_add(overdraft_limit.0)
}

/// Admits the order iff the balance after the debit stays at or above `-overdraft_limit`.
///
/// Zero or negative prices are credits: they never move the balance towards the floor.
pub fn can_create_order(
    balance: Decimal,
    overdraft_limit: OverdraftLimit,
    order_price: Decimal,
) -> bool {
    let minimum_allowed = -overdraft_limit.0;
    match balance.checked_sub(order_price) {
        Some(balance_after) => balance_after >= minimum_allowed,
        // past the decimal range on the credit side, or far below any floor
        None => order_price.is_sign_negative(),
    }
}

pub fn usd_to_local(amount_usd: Decimal, rate_to_usd: Decimal) -> Result<Decimal, BalanceError> {
    amount_usd
        .checked_mul(rate_to_usd)
        .ok_or(BalanceError::Overflow)
}

pub fn local_to_usd(amount_local: Decimal, rate_to_usd: Decimal) -> Result<Decimal, BalanceError> {
    if rate_to_usd <= Decimal::ZERO {
        return Err(BalanceError::InvalidRate { rate: rate_to_usd });
    }
    amount_local
        .checked_div(rate_to_usd)
        .ok_or(BalanceError::Overflow)
}
