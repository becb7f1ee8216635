use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rand::{CryptoRng, RngCore, rngs::OsRng};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    balance::OverdraftLimit,
    command::{OperationKind, WalletCommand},
    config::LedgerConfig,
    identifier::{EntityKind, IdentifierGenerator},
    store::{RecordStore, StoreError, create_record, in_memory_store::InMemoryStore, query},
    tasks::{InMemoryDispatcher, Job, TaskDispatcher, TaskKind},
    tenant::TenantCode,
    wallet::{Wallet, WalletEvent},
};

use super::{AgentId, OperationError, OperationProcessor};

#[derive(Debug)]
pub struct AgentWallet {
    pub agent_id: AgentId,
    pub wallet: Wallet,
}

#[derive(Debug)]
pub struct PlacedOrder {
    pub agent_uuid: String,
    pub price_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSummary {
    pub agent_id: AgentId,
    pub uuid: String,
    pub balance: Decimal,
    pub overdraft_limit: OverdraftLimit,
    pub available: Decimal,
    pub recent_orders: usize,
}

pub struct InMemoryOperationProcessor<D = InMemoryDispatcher, R = OsRng> {
    tenant: TenantCode,
    generator: IdentifierGenerator<R>,
    agents: HashMap<AgentId, String>,
    pub wallets: InMemoryStore<AgentWallet>,
    pub orders: InMemoryStore<PlacedOrder>,
    pub dispatcher: D,
}

impl InMemoryOperationProcessor {
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_parts(
            config.tenant.clone(),
            IdentifierGenerator::new(config.max_identifier_attempts),
            InMemoryDispatcher::default(),
        )
    }
}

impl<D, R> InMemoryOperationProcessor<D, R>
where
    D: TaskDispatcher,
    R: RngCore + CryptoRng,
{
    pub fn with_parts(tenant: TenantCode, generator: IdentifierGenerator<R>, dispatcher: D) -> Self {
        Self {
            tenant,
            generator,
            agents: HashMap::new(),
            wallets: InMemoryStore::default(),
            orders: InMemoryStore::default(),
            dispatcher,
        }
    }

    pub fn tenant(&self) -> &TenantCode {
        &self.tenant
    }

    pub fn agent_uuid(&self, agent_id: AgentId) -> Option<&str> {
        self.agents.get(&agent_id).map(String::as_str)
    }

    /// One row per wallet of this tenant, ordered by agent id.
    ///
    /// `recent_orders` counts active orders created within `window` of `now`.
    pub fn summaries(&self, now: DateTime<Utc>, window: TimeDelta) -> Vec<WalletSummary> {
        let mut recent_orders: HashMap<&str, usize> = HashMap::new();
        let orders = query::active(query::for_tenant(
            query::recent(self.orders.records(), now, window),
            &self.tenant,
        ));
        for order in orders {
            *recent_orders
                .entry(order.data().agent_uuid.as_str())
                .or_default() += 1;
        }

        let mut summaries: Vec<_> = query::for_tenant(self.wallets.records(), &self.tenant)
            .map(|record| {
                let wallet = &record.data().wallet;
                WalletSummary {
                    agent_id: record.data().agent_id,
                    uuid: record.uuid().to_string(),
                    balance: wallet.balance(),
                    overdraft_limit: wallet.overdraft_limit(),
                    available: wallet.available(),
                    recent_orders: recent_orders.get(record.uuid()).copied().unwrap_or(0),
                }
            })
            .collect();
        summaries.sort_by_key(|summary| summary.agent_id);
        summaries
    }

    fn open_wallet(&mut self, agent_id: AgentId, now: DateTime<Utc>) -> Result<String, StoreError> {
        if let Some(uuid) = self.agents.get(&agent_id) {
            return Ok(uuid.clone());
        }
        let uuid = create_record(
            &mut self.wallets,
            &mut self.generator,
            EntityKind::Agent,
            self.tenant.clone(),
            AgentWallet {
                agent_id,
                wallet: Wallet::default(),
            },
            now,
        )?;
        info!(agent_id, %uuid, "wallet opened");
        self.agents.insert(agent_id, uuid.clone());
        Ok(uuid)
    }

    /// Stores the order and hands it to the provider queue.
    ///
    /// If the queue refuses the job the order record is deactivated and the
    /// wallet is left untouched.
    fn place_order(
        &mut self,
        agent_uuid: &str,
        price_usd: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), OperationError> {
        let order_uuid = create_record(
            &mut self.orders,
            &mut self.generator,
            EntityKind::Order,
            self.tenant.clone(),
            PlacedOrder {
                agent_uuid: agent_uuid.to_string(),
                price_usd,
            },
            now,
        )?;

        let job = Job::new(TaskKind::ProviderApiCall, [order_uuid.as_str(), agent_uuid]);
        if let Err(err) = self.dispatcher.dispatch(job) {
            if let Some(order) = self.orders.get_mut(&order_uuid) {
                order.set_active(false, now);
            }
            return Err(err.into());
        }
        info!(%order_uuid, %agent_uuid, %price_usd, "order placed");
        Ok(())
    }
}

impl<D, R> OperationProcessor for InMemoryOperationProcessor<D, R>
where
    D: TaskDispatcher,
    R: RngCore + CryptoRng,
{
    fn process_operation(
        &mut self,
        agent_id: AgentId,
        kind: OperationKind,
        amount: Option<Decimal>,
        rate_to_usd: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), OperationError> {
        let command = WalletCommand::parse_command(kind, amount, rate_to_usd)?;
        let agent_uuid = self.open_wallet(agent_id, now)?;

        let record = self
            .wallets
            .get(&agent_uuid)
            .ok_or_else(|| StoreError::NotFound {
                uuid: agent_uuid.clone(),
            })?;
        let event = record
            .data()
            .wallet
            .handle_command(&command)
            .inspect_err(|err| warn!(agent_id, %err, "operation refused"))?;

        match event {
            WalletEvent::Debited { amount } => self.place_order(&agent_uuid, amount, now)?,
            WalletEvent::OverdraftChanged { limit } => self.dispatcher.dispatch(Job::new(
                TaskKind::Email,
                [
                    agent_uuid.clone(),
                    format!("overdraft_limit={}", limit.value()),
                ],
            ))?,
            WalletEvent::ToppedUp { .. } => {}
        }

        if let Some(record) = self.wallets.get_mut(&agent_uuid) {
            record.modify(now, |agent| agent.wallet.apply(&event))?;
        }
        debug!(agent_id, ?event, "wallet updated");
        Ok(())
    }
}
