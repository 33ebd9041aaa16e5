//! Toy append-only "chain" of usage transactions.
//!
//! In memory only, rebuilt empty on every start. Blocks are never hashed and
//! proofs are never checked; this is a display log fed by [`UsageRecorded`]
//! notifications, not a ledger anything relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bus::Subscription;
use crate::usage::UsageRecorded;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTransaction {
    pub item_id: String,
    pub user: String,
    pub quantity_changed: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<&UsageRecorded> for ChainTransaction {
    fn from(e: &UsageRecorded) -> Self {
        Self {
            item_id: e.item_id.to_string(),
            user: e.user.clone(),
            quantity_changed: e.quantity_changed,
            timestamp: e.occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub proof: u64,
    pub previous_hash: String,
    pub transactions: Vec<ChainTransaction>,
}

#[derive(Debug, Clone)]
pub struct ChainLog {
    chain: Vec<Block>,
}

impl ChainLog {
    /// A chain holding only the genesis block (proof 1, previous hash "0").
    pub fn new() -> Self {
        let mut log = Self { chain: Vec::new() };
        log.create_block(1, "0");
        log
    }

    /// Append an empty block.
    pub fn create_block(&mut self, proof: u64, previous_hash: impl Into<String>) -> &Block {
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: Utc::now(),
            proof,
            previous_hash: previous_hash.into(),
            transactions: Vec::new(),
        };
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Add a transaction to the newest block.
    pub fn add_transaction(&mut self, transaction: ChainTransaction) -> &Block {
        if self.chain.is_empty() {
            self.create_block(1, "0");
        }
        let last = self.chain.len() - 1;
        self.chain[last].transactions.push(transaction);
        &self.chain[last]
    }

    pub fn record(&mut self, event: &UsageRecorded) -> &Block {
        self.add_transaction(ChainTransaction::from(event))
    }

    /// Record every notification already waiting on `subscription`.
    ///
    /// Returns how many were absorbed.
    pub fn absorb(&mut self, subscription: &Subscription<UsageRecorded>) -> usize {
        let events = subscription.drain();
        for event in &events {
            self.record(event);
        }
        events.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn transaction_count(&self) -> usize {
        self.chain.iter().map(|b| b.transactions.len()).sum()
    }
}

impl Default for ChainLog {
    fn default() -> Self {
        Self::new()
    }
}
