//! Fixture file format
//!
//! A fixture file maps test names to cases. Each case installs accounts,
//! runs transactions in order against one executor and checks receipts and
//! the final persistent storage. Byte strings, words and quantities are hex
//! with an optional `0x` prefix.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use tvm_executor::{ExecutorConfig, Transaction, WorldState};
use tvm_primitives::{Address, H256};

/// Hex-encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        if s.is_empty() {
            return Ok(HexBytes(Vec::new()));
        }
        hex::decode(s)
            .map(HexBytes)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded u64
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU64(pub u64);

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        if s.is_empty() {
            return Ok(HexU64(0));
        }
        u64::from_str_radix(s, 16)
            .map(HexU64)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded u128, used for balances and call values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU128(pub u128);

impl<'de> Deserialize<'de> for HexU128 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        if s.is_empty() {
            return Ok(HexU128(0));
        }
        u128::from_str_radix(s, 16)
            .map(HexU128)
            .map_err(serde::de::Error::custom)
    }
}

/// Fixture file structure (test name -> case), iterated in name order
pub type FixtureFile = BTreeMap<String, FixtureCase>;

/// Single fixture case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureCase {
    /// Executor configuration (defaults when absent)
    #[serde(default)]
    pub config: Option<ExecutorConfig>,
    /// Accounts installed before the first transaction
    #[serde(default)]
    pub pre: HashMap<Address, PreAccount>,
    /// Transactions, run in order against the same executor
    pub transactions: Vec<FixtureTransaction>,
    /// Expected persistent state after the last transaction
    #[serde(default)]
    pub post: HashMap<Address, PostAccount>,
}

impl FixtureCase {
    /// Executor configuration for this case
    pub fn executor_config(&self) -> ExecutorConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Build the world state described by `pre`
    pub fn pre_state(&self) -> WorldState {
        let mut state = WorldState::new();
        for (address, account) in &self.pre {
            if !account.code.0.is_empty() {
                state.set_code(*address, account.code.0.clone());
            }
            if account.balance.0 != 0 {
                state.set_balance(*address, account.balance.0);
            }
            for (slot, value) in &account.storage {
                state.set_storage(*address, *slot, *value);
            }
        }
        state
    }
}

/// Account in the pre-state
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreAccount {
    /// Contract code
    #[serde(default)]
    pub code: HexBytes,
    /// Balance
    #[serde(default)]
    pub balance: HexU128,
    /// Persistent storage
    #[serde(default)]
    pub storage: HashMap<H256, H256>,
}

/// Expected account in the post-state
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostAccount {
    /// Exact non-zero persistent storage
    #[serde(default)]
    pub storage: HashMap<H256, H256>,
    /// Balance, checked when present
    #[serde(default)]
    pub balance: Option<HexU128>,
}

impl PostAccount {
    /// Expected storage with zero-valued slots dropped
    pub fn non_zero_storage(&self) -> HashMap<H256, H256> {
        self.storage
            .iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(slot, value)| (*slot, *value))
            .collect()
    }
}

/// Transaction step of a fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureTransaction {
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Gas limit, intrinsic cost included
    pub gas_limit: HexU64,
    /// Value
    #[serde(default)]
    pub value: HexU128,
    /// Call data
    #[serde(default)]
    pub data: HexBytes,
    /// Expected outcome
    pub expect: Expectation,
}

impl FixtureTransaction {
    /// Convert into an executor transaction
    pub fn to_transaction(&self) -> Transaction {
        Transaction {
            from: self.from,
            to: self.to,
            value: self.value.0,
            data: self.data.0.clone(),
            gas_limit: self.gas_limit.0,
        }
    }
}

/// Expected outcome of one transaction
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// The executor refuses the transaction before running it
    #[serde(default)]
    pub rejected: bool,
    /// Top-level call succeeded
    #[serde(default)]
    pub success: bool,
    /// Gas used, intrinsic cost included
    #[serde(default)]
    pub gas_used: Option<HexU64>,
    /// Return or revert data
    #[serde(default)]
    pub output: Option<HexBytes>,
}
