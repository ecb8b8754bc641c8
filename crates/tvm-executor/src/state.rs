//! In-memory persistent world state with nested-call rollback

use std::collections::HashMap;
use tvm_evm::{Checkpoint, JournaledMap};
use tvm_primitives::{Address, H256};

/// Checkpoint over every journaled part of the world state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCheckpoint {
    storage: Checkpoint,
    balances: Checkpoint,
}

/// Persistent account state: code, storage and balances.
///
/// Storage and balances are journaled so a failing call can be rolled back.
/// Code is fixed once installed; there is no contract creation.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    code: HashMap<Address, Vec<u8>>,
    storage: JournaledMap<(Address, H256), H256>,
    balances: JournaledMap<Address, u128>,
}

impl WorldState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Install code at an address
    pub fn set_code(&mut self, address: Address, code: Vec<u8>) {
        self.code.insert(address, code);
    }

    /// Code at an address (empty for plain accounts)
    pub fn code(&self, address: &Address) -> &[u8] {
        self.code.get(address).map(Vec::as_slice).unwrap_or_default()
    }

    /// Get storage
    pub fn get_storage(&self, address: &Address, key: &H256) -> H256 {
        self.storage
            .get(&(*address, *key))
            .copied()
            .unwrap_or(H256::ZERO)
    }

    /// Set storage
    pub fn set_storage(&mut self, address: Address, key: H256, value: H256) {
        self.storage.insert((address, key), value);
    }

    /// Non-zero storage slots of one account
    pub fn storage_of(&self, address: &Address) -> HashMap<H256, H256> {
        self.storage
            .iter()
            .filter(|((owner, _), value)| owner == address && !value.is_zero())
            .map(|((_, key), value)| (*key, *value))
            .collect()
    }

    /// Get balance
    pub fn balance(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Set balance
    pub fn set_balance(&mut self, address: Address, balance: u128) {
        self.balances.insert(address, balance);
    }

    /// Move `value` from `from` to `to`. Returns `false`, changing nothing,
    /// if `from` cannot cover it.
    pub fn transfer(&mut self, from: Address, to: Address, value: u128) -> bool {
        if value == 0 {
            return true;
        }
        let from_balance = self.balance(&from);
        if from_balance < value {
            return false;
        }
        self.set_balance(from, from_balance - value);
        let to_balance = self.balance(&to);
        self.set_balance(to, to_balance.saturating_add(value));
        true
    }

    /// Open a checkpoint on storage and balances
    pub fn snapshot(&mut self) -> StateCheckpoint {
        StateCheckpoint {
            storage: self.storage.snapshot(),
            balances: self.balances.snapshot(),
        }
    }

    /// Undo every change since `checkpoint`
    pub fn revert(&mut self, checkpoint: StateCheckpoint) {
        self.balances.revert(checkpoint.balances);
        self.storage.revert(checkpoint.storage);
    }

    /// Keep every change since `checkpoint`
    pub fn commit(&mut self, checkpoint: StateCheckpoint) {
        self.balances.commit(checkpoint.balances);
        self.storage.commit(checkpoint.storage);
    }
}
