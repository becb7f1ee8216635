//! Background job routing.
//!
//! Jobs are named and routed to one of two logical queues: `provider` for
//! everything that talks to upstream providers, `secondary` for notifications,
//! reporting and housekeeping. Delivery is at-least-once, so consumers must
//! tolerate seeing a job twice.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Queue {
    Provider,
    Secondary,
}

impl Queue {
    pub const fn name(self) -> &'static str {
        match self {
            Queue::Provider => "provider",
            Queue::Secondary => "secondary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ProviderWebhook,
    ProviderApiCall,
    StatusUpdate,
    Email,
    Sms,
    Report,
    Cleanup,
}

impl TaskKind {
    pub const fn name(self) -> &'static str {
        match self {
            TaskKind::ProviderWebhook => "provider.webhook",
            TaskKind::ProviderApiCall => "provider.api_call",
            TaskKind::StatusUpdate => "provider.status_update",
            TaskKind::Email => "notify.email",
            TaskKind::Sms => "notify.sms",
            TaskKind::Report => "reports.generate",
            TaskKind::Cleanup => "maintenance.cleanup",
        }
    }

    pub const fn queue(self) -> Queue {
        match self {
            TaskKind::ProviderWebhook | TaskKind::ProviderApiCall | TaskKind::StatusUpdate => {
                Queue::Provider
            }
            TaskKind::Email | TaskKind::Sms | TaskKind::Report | TaskKind::Cleanup => {
                Queue::Secondary
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub kind: TaskKind,
    pub args: Vec<String>,
}

impl Job {
    pub fn new<I, S>(kind: TaskKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn queue(&self) -> Queue {
        self.kind.queue()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Queue `{queue}` rejected job `{job}`: {reason}")]
pub struct DispatchError {
    pub queue: &'static str,
    pub job: &'static str,
    pub reason: String,
}

pub trait TaskDispatcher {
    fn dispatch(&mut self, job: Job) -> Result<(), DispatchError>;
}

/// FIFO queues kept in process, one per [`Queue`].
#[derive(Debug, Default)]
pub struct InMemoryDispatcher {
    provider: VecDeque<Job>,
    secondary: VecDeque<Job>,
}

impl InMemoryDispatcher {
    pub fn pop(&mut self, queue: Queue) -> Option<Job> {
        self.queue_mut(queue).pop_front()
    }

    pub fn pending(&self, queue: Queue) -> usize {
        match queue {
            Queue::Provider => self.provider.len(),
            Queue::Secondary => self.secondary.len(),
        }
    }

    fn queue_mut(&mut self, queue: Queue) -> &mut VecDeque<Job> {
        match queue {
            Queue::Provider => &mut self.provider,
            Queue::Secondary => &mut self.secondary,
        }
    }
}

impl TaskDispatcher for InMemoryDispatcher {
    fn dispatch(&mut self, job: Job) -> Result<(), DispatchError> {
        let queue = job.queue();
        debug!(job = job.kind.name(), queue = queue.name(), "job queued");
        self.queue_mut(queue).push_back(job);
        Ok(())
    }
}
