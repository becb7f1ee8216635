use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    balance::{OverdraftLimit, available_balance, can_create_order},
    command::WalletCommand,
    display::is_storable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletEvent {
    ToppedUp { amount: Decimal },
    Debited { amount: Decimal },
    OverdraftChanged { limit: OverdraftLimit },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Order of {price} exceeds available balance {available}")]
    OverdraftExceeded { price: Decimal, available: Decimal },
    #[error("Balance {balance} cannot take a change of {change} and stay storable")]
    BalanceOutOfRange { balance: Decimal, change: Decimal },
}

/// USD balance of a single agent. May go negative down to the overdraft limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    balance: Decimal,
    overdraft_limit: OverdraftLimit,
}

impl Wallet {
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn overdraft_limit(&self) -> OverdraftLimit {
        self.overdraft_limit
    }

    pub fn available(&self) -> Decimal {
        available_balance(self.balance, self.overdraft_limit)
    }

    pub fn apply(&mut self, event: &WalletEvent) -> Result<(), WalletError> {
        match *event {
            WalletEvent::ToppedUp { .. } | WalletEvent::Debited { .. } => {
                self.balance = self.balance_after(event)?
            }
            WalletEvent::OverdraftChanged { limit } => self.overdraft_limit = limit,
        }
        Ok(())
    }

    /// Produces the event for `command` without changing the wallet.
    ///
    /// Events returned from here are guaranteed to apply cleanly.
    pub fn handle_command(&self, command: &WalletCommand) -> Result<WalletEvent, WalletError> {
        let event = match *command {
            WalletCommand::TopUp { amount_usd } => WalletEvent::ToppedUp { amount: amount_usd },
            WalletCommand::PlaceOrder { price_usd } => {
                if !can_create_order(self.balance, self.overdraft_limit, price_usd) {
                    return Err(WalletError::OverdraftExceeded {
                        price: price_usd,
                        available: self.available(),
                    });
                }
                WalletEvent::Debited { amount: price_usd }
            }
            WalletCommand::SetOverdraft { limit } => WalletEvent::OverdraftChanged { limit },
        };
        self.balance_after(&event)?;
        Ok(event)
    }

    fn balance_after(&self, event: &WalletEvent) -> Result<Decimal, WalletError> {
        let (balance, change) = match *event {
            WalletEvent::ToppedUp { amount } => (self.balance.checked_add(amount), amount),
            WalletEvent::Debited { amount } => (self.balance.checked_sub(amount), -amount),
            WalletEvent::OverdraftChanged { .. } => return Ok(self.balance),
        };
        balance
            .filter(|balance| is_storable(*balance))
            .ok_or(WalletError::BalanceOutOfRange {
                balance: self.balance,
                change,
            })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn overdraft(limit: Decimal) -> WalletCommand {
        WalletCommand::SetOverdraft {
            limit: OverdraftLimit::new(limit).unwrap(),
        }
    }

    #[test]
    fn apply_events() {
        let mut wallet = Wallet::default();
        wallet.apply(&WalletEvent::ToppedUp { amount: dec!(10) }).unwrap();
        assert_eq!(wallet.balance(), dec!(10));
        assert_eq!(wallet.available(), dec!(10));

        wallet
            .apply(&WalletEvent::OverdraftChanged {
                limit: OverdraftLimit::new(dec!(25)).unwrap(),
            })
            .unwrap();
        assert_eq!(wallet.balance(), dec!(10));
        assert_eq!(wallet.available(), dec!(35));

        // event is the source of truth, no admission check here
        wallet.apply(&WalletEvent::Debited { amount: dec!(40) }).unwrap();
        assert_eq!(wallet.balance(), dec!(-30));
        assert_eq!(wallet.available(), dec!(-5));
    }

    #[test]
    fn orders_run_into_the_overdraft_floor() {
        let mut wallet = Wallet::default();
        let topup = wallet
            .handle_command(&WalletCommand::TopUp {
                amount_usd: dec!(20),
            })
            .unwrap();
        wallet.apply(&topup).unwrap();

        let order = WalletCommand::PlaceOrder {
            price_usd: dec!(30),
        };
        let err = wallet.handle_command(&order).unwrap_err();
        assert_eq!(
            err,
            WalletError::OverdraftExceeded {
                price: dec!(30),
                available: dec!(20)
            }
        );
        assert_eq!(err.to_string(), "Order of 30 exceeds available balance 20");

        let limit = wallet.handle_command(&overdraft(dec!(10))).unwrap();
        wallet.apply(&limit).unwrap();
        let debit = wallet.handle_command(&order).unwrap();
        assert_eq!(debit, WalletEvent::Debited { amount: dec!(30) });
        wallet.apply(&debit).unwrap();
        assert_eq!(wallet.balance(), dec!(-10));
        assert_eq!(wallet.available(), dec!(0));

        // exactly on the floor, only free orders still pass
        assert!(
            wallet
                .handle_command(&WalletCommand::PlaceOrder {
                    price_usd: dec!(0.001)
                })
                .is_err()
        );
        assert!(
            wallet
                .handle_command(&WalletCommand::PlaceOrder {
                    price_usd: dec!(0)
                })
                .is_ok()
        );
    }

    #[test]
    fn lowering_the_limit_does_not_touch_the_balance() {
        let mut wallet = Wallet::default();
        wallet
            .apply(&wallet.handle_command(&overdraft(dec!(50))).unwrap())
            .unwrap();
        wallet
            .apply(
                &wallet
                    .handle_command(&WalletCommand::PlaceOrder {
                        price_usd: dec!(45),
                    })
                    .unwrap(),
            )
            .unwrap();
        wallet
            .apply(&wallet.handle_command(&overdraft(dec!(0))).unwrap())
            .unwrap();
        assert_eq!(wallet.balance(), dec!(-45));
        assert_eq!(wallet.overdraft_limit(), OverdraftLimit::NONE);
        assert_eq!(wallet.available(), dec!(-45));
    }

    #[test]
    fn balance_stays_within_stored_digits() {
        let near_max = dec!(999999999999999);
        let mut wallet = Wallet::default();
        let topup = WalletCommand::TopUp {
            amount_usd: near_max,
        };
        wallet.apply(&wallet.handle_command(&topup).unwrap()).unwrap();

        let err = wallet.handle_command(&topup).unwrap_err();
        assert_eq!(
            err,
            WalletError::BalanceOutOfRange {
                balance: near_max,
                change: near_max
            }
        );
        // replaying a foreign event is refused the same way
        assert_eq!(
            wallet.apply(&WalletEvent::ToppedUp { amount: near_max }),
            Err(err)
        );
        assert_eq!(
            wallet.apply(&WalletEvent::ToppedUp {
                amount: Decimal::MAX
            }),
            Err(WalletError::BalanceOutOfRange {
                balance: near_max,
                change: Decimal::MAX
            })
        );
        assert_eq!(wallet.balance(), near_max);
    }
}
