//! Entity identifiers of the form `wtn-<role>-<suffix>`.
//!
//! The suffix is six characters drawn from `[a-z0-9]` with a cryptographically
//! secure generator. Candidates are checked against a [`UniquenessOracle`] and
//! redrawn on collision, up to a bounded number of attempts. The oracle check is
//! only an optimization: the store must still reject duplicates on write.

use rand::{CryptoRng, Rng, RngCore, rngs::OsRng};
use thiserror::Error;
use tracing::{debug, warn};

pub const IDENTIFIER_NAMESPACE: &str = "wtn";
pub const SUFFIX_LEN: usize = 6;
pub const IDENTIFIER_MAX_LEN: usize = 20;
/// Longest role prefix that still fits [`IDENTIFIER_MAX_LEN`].
pub const MAX_ROLE_PREFIX_LEN: usize =
    IDENTIFIER_MAX_LEN - IDENTIFIER_NAMESPACE.len() - SUFFIX_LEN - 2;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Storage backend unavailable: {reason}")]
pub struct StorageUnavailable {
    pub reason: String,
}

/// Answers whether an identifier has already been issued.
///
/// Scope is global: the same identifier must not exist under any tenant.
pub trait UniquenessOracle {
    fn exists(&self, identifier: &str) -> Result<bool, StorageUnavailable>;
}

impl<T: UniquenessOracle + ?Sized> UniquenessOracle for &T {
    fn exists(&self, identifier: &str) -> Result<bool, StorageUnavailable> {
        (**self).exists(identifier)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("No free identifier for role `{role_prefix}` after {attempts} attempts")]
    Exhausted { role_prefix: String, attempts: u32 },
    #[error(transparent)]
    StorageUnavailable(#[from] StorageUnavailable),
    #[error("Role prefix must be 1-9 lowercase alphanumeric characters, got `{role_prefix}`")]
    InvalidRolePrefix { role_prefix: String },
}

/// Entity kinds that receive identifiers, and the role token each one uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tenant,
    Agent,
    Wallet,
    Order,
    Transaction,
    Deposit,
    Product,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Tenant,
        EntityKind::Agent,
        EntityKind::Wallet,
        EntityKind::Order,
        EntityKind::Transaction,
        EntityKind::Deposit,
        EntityKind::Product,
        EntityKind::User,
    ];

    pub const fn role_prefix(self) -> &'static str {
        match self {
            EntityKind::Tenant => "tenant",
            EntityKind::Agent => "agent",
            EntityKind::Wallet => "wallet",
            EntityKind::Order => "order",
            EntityKind::Transaction => "txn",
            EntityKind::Deposit => "deposit",
            EntityKind::Product => "product",
            EntityKind::User => "user",
        }
    }
}

pub fn is_valid_role_prefix(role_prefix: &str) -> bool {
    (1..=MAX_ROLE_PREFIX_LEN).contains(&role_prefix.len())
        && role_prefix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Checks the `wtn-<role_prefix>-[a-z0-9]{6}` shape.
pub fn is_well_formed(identifier: &str, role_prefix: &str) -> bool {
    let Some(rest) = identifier
        .strip_prefix(IDENTIFIER_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_prefix(role_prefix))
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    rest.len() == SUFFIX_LEN && rest.bytes().all(|b| ALPHABET.contains(&b))
}

pub struct IdentifierGenerator<R = OsRng> {
    rng: R,
    max_attempts: u32,
}

impl IdentifierGenerator<OsRng> {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_rng(OsRng, max_attempts)
    }
}

impl Default for IdentifierGenerator<OsRng> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl<R> IdentifierGenerator<R>
where
    R: RngCore + CryptoRng,
{
    pub fn with_rng(rng: R, max_attempts: u32) -> Self {
        Self { rng, max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn generate_for<O>(&mut self, kind: EntityKind, oracle: &O) -> Result<String, IdentifierError>
    where
        O: UniquenessOracle + ?Sized,
    {
        self.generate(kind.role_prefix(), oracle)
    }

    /// Draws candidates until the oracle reports one as unused.
    ///
    /// Oracle failures abort immediately and are never counted as collisions.
    pub fn generate<O>(&mut self, role_prefix: &str, oracle: &O) -> Result<String, IdentifierError>
    where
        O: UniquenessOracle + ?Sized,
    {
        if !is_valid_role_prefix(role_prefix) {
            return Err(IdentifierError::InvalidRolePrefix {
                role_prefix: role_prefix.to_string(),
            });
        }

        for attempt in 1..=self.max_attempts {
            let candidate = format!(
                "{IDENTIFIER_NAMESPACE}-{role_prefix}-{}",
                self.draw_suffix()
            );
            if !oracle.exists(&candidate)? {
                return Ok(candidate);
            }
            debug!(%candidate, attempt, "identifier collision, drawing again");
        }

        warn!(
            role_prefix,
            attempts = self.max_attempts,
            "identifier space exhausted"
        );
        Err(IdentifierError::Exhausted {
            role_prefix: role_prefix.to_string(),
            attempts: self.max_attempts,
        })
    }

    fn draw_suffix(&mut self) -> String {
        (0..SUFFIX_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// One-shot generation with the OS random source and the default retry cap.
pub fn generate_identifier<O>(role_prefix: &str, oracle: &O) -> Result<String, IdentifierError>
where
    O: UniquenessOracle + ?Sized,
{
    IdentifierGenerator::<OsRng>::default().generate(role_prefix, oracle)
}
