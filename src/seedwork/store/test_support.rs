//! Minimal aggregate used to exercise the generic store code in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seedwork::core::{
    AggregateRoot, DomainCommand, DomainError, DomainEvent, DomainResult, Entity, EntityMetadata, FieldValue, Queryable,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub meta: EntityMetadata,
    pub name: String,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    Opened { id: Uuid, name: String, at: DateTime<Utc> },
    Deposited { id: Uuid, amount: i64, at: DateTime<Utc> },
    Closed { id: Uuid, at: DateTime<Utc> },
}

pub enum LedgerCommand {
    Deposit(i64),
    Close,
}

impl DomainCommand for LedgerCommand {
    fn name(&self) -> &'static str {
        match self {
            LedgerCommand::Deposit(_) => "deposit",
            LedgerCommand::Close => "close",
        }
    }
}

impl DomainEvent for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::Opened { .. } => "LedgerOpened",
            LedgerEvent::Deposited { .. } => "LedgerDeposited",
            LedgerEvent::Closed { .. } => "LedgerClosed",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            LedgerEvent::Opened { id, .. } | LedgerEvent::Deposited { id, .. } | LedgerEvent::Closed { id, .. } => *id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::Opened { at, .. } | LedgerEvent::Deposited { at, .. } | LedgerEvent::Closed { at, .. } => *at,
        }
    }
}

impl Ledger {
    pub fn open(name: &str) -> (Self, Vec<LedgerEvent>) {
        let now = Utc::now();
        let mut ledger = Self {
            meta: EntityMetadata::new(Uuid::now_v7(), now),
            name: String::new(),
            balance: 0,
        };
        let event = LedgerEvent::Opened {
            id: ledger.id(),
            name: name.to_string(),
            at: now,
        };
        ledger.apply(&event);
        (ledger, vec![event])
    }
}

impl Entity for Ledger {
    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }
}

impl Queryable for Ledger {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(self.name.clone().into()),
            "balance" => Some(self.balance.into()),
            _ => None,
        }
    }
}

impl AggregateRoot for Ledger {
    type Event = LedgerEvent;
    type Command = LedgerCommand;

    const AGGREGATE_TYPE: &'static str = "Ledger";

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }

    fn handle_command(&self, command: &LedgerCommand) -> DomainResult<Vec<LedgerEvent>> {
        if self.is_deleted() {
            return Err(DomainError::invalid_operation("ledger is closed"));
        }
        let at = Utc::now();
        Ok(match command {
            LedgerCommand::Deposit(amount) => vec![LedgerEvent::Deposited { id: self.id(), amount: *amount, at }],
            LedgerCommand::Close => vec![LedgerEvent::Closed { id: self.id(), at }],
        })
    }

    fn apply_event(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Opened { name, .. } => self.name = name.clone(),
            LedgerEvent::Deposited { amount, .. } => self.balance += amount,
            LedgerEvent::Closed { at, .. } => self.meta.mark_deleted("test", *at),
        }
    }
}
