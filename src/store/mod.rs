use chrono::{DateTime, Utc};
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::{
    identifier::{EntityKind, IdentifierError, IdentifierGenerator, UniquenessOracle},
    tenant::TenantCode,
};

pub mod in_memory_store;
pub mod query;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Identifier `{uuid}` is already taken")]
    DuplicateIdentifier { uuid: String },
    #[error("No record with identifier `{uuid}`")]
    NotFound { uuid: String },
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// A tenant-owned entity together with its identity and bookkeeping fields.
///
/// The identifier is fixed at construction; only `data`, the active flag and
/// `updated_at` change afterwards.
#[derive(Debug, Clone)]
pub struct Record<T> {
    uuid: String,
    tenant: TenantCode,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    data: T,
}

impl<T> Record<T> {
    pub fn new(uuid: String, tenant: TenantCode, data: T, now: DateTime<Utc>) -> Self {
        Self {
            uuid,
            tenant,
            is_active: true,
            created_at: now,
            updated_at: now,
            data,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn tenant(&self) -> &TenantCode {
        &self.tenant
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn modify<F, R>(&mut self, now: DateTime<Utc>, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.updated_at = now;
        f(&mut self.data)
    }

    pub fn set_active(&mut self, is_active: bool, now: DateTime<Utc>) {
        self.is_active = is_active;
        self.updated_at = now;
    }
}

/// Persistence seam for records of one entity kind.
///
/// Implementations answer uniqueness queries globally across tenants and must
/// reject a second record carrying an identifier that is already stored.
pub trait RecordStore<T>: UniquenessOracle {
    fn insert(&mut self, record: Record<T>) -> Result<(), StoreError>;

    fn get(&self, uuid: &str) -> Option<&Record<T>>;

    fn get_mut(&mut self, uuid: &str) -> Option<&mut Record<T>>;

    fn records<'a>(&'a self) -> impl Iterator<Item = &'a Record<T>>
    where
        T: 'a;
}

/// Issues an identifier for `kind` and stores a fresh record under it.
pub fn create_record<S, T, R>(
    store: &mut S,
    generator: &mut IdentifierGenerator<R>,
    kind: EntityKind,
    tenant: TenantCode,
    data: T,
    now: DateTime<Utc>,
) -> Result<String, StoreError>
where
    S: RecordStore<T>,
    R: RngCore + CryptoRng,
{
    let uuid = generator.generate_for(kind, &*store)?;
    store.insert(Record::new(uuid.clone(), tenant, data, now))?;
    Ok(uuid)
}
