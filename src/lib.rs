/// Overdraft-aware balance arithmetic and USD/local currency conversion.
pub mod balance;

/// Canonical rendering of stored monetary amounts.
pub mod display;

/// Collision-checked `wtn-<role>-<suffix>` identifiers.
pub mod identifier;

pub mod tenant;

/// Tenant-scoped records, the persistence seam and explicit query filters.
pub mod store;

/// Job routing onto the provider and secondary queues.
pub mod tasks;

pub mod config;

/// Agent wallet state. State is modified using events, which are created by
/// handling commands.
pub mod wallet;

/// Wallet commands built from raw operations, later executed by [`wallet`].
pub mod command;

/// Operation processor interface, plus "in memory" implementation.
/// Coordinates command parsing, wallets, identifier issuance and job dispatch.
pub mod processor;

/// Bootstraps the processor for the binary; kept in the library so the
/// integration tests can drive it too.
pub mod bin_utils;
