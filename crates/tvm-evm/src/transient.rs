//! Transaction-scoped transient storage and the TLOAD/TSTORE instructions.
//!
//! Transient values are keyed by `(account, slot)` and live until the
//! transaction ends. Inside the transaction they follow the call tree: a
//! call that fails has its writes undone through the journal, and the
//! executor clears the whole store before the next transaction starts.
//! Nothing here ever touches refunds or persistent storage.

use crate::error::{EvmError, EvmResult};
use crate::frame::Frame;
use crate::gas::cost;
use crate::host::Host;
use crate::journal::{Checkpoint, JournaledMap};
use tvm_primitives::{Address, H256};
use tracing::debug;

/// Transient storage for one transaction
#[derive(Debug, Clone, Default)]
pub struct TransientStorage {
    slots: JournaledMap<(Address, H256), H256>,
}

impl TransientStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot. Absent slots read zero and are not created.
    pub fn get(&self, address: Address, slot: H256) -> H256 {
        self.slots
            .get(&(address, slot))
            .copied()
            .unwrap_or(H256::ZERO)
    }

    /// Overwrite a slot. Writing zero keeps the entry; it reads the same as
    /// an absent one.
    pub fn set(&mut self, address: Address, slot: H256, value: H256) {
        self.slots.insert((address, slot), value);
    }

    /// Open a checkpoint on entry to a message call
    pub fn snapshot(&mut self) -> Checkpoint {
        self.slots.snapshot()
    }

    /// Undo every write since `checkpoint`.
    ///
    /// # Panics
    ///
    /// Panics on a stale or out-of-order checkpoint.
    pub fn revert(&mut self, checkpoint: Checkpoint) {
        debug!(
            depth = checkpoint.depth(),
            undone = self.slots.journal_len().saturating_sub(checkpoint.journal_len()),
            "reverting transient storage"
        );
        self.slots.revert(checkpoint);
    }

    /// Keep every write since `checkpoint`.
    ///
    /// # Panics
    ///
    /// Panics on a stale or out-of-order checkpoint.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.slots.commit(checkpoint);
    }

    /// Drop every entry and the journal. Called once between transactions.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of stored entries (zero-valued writes included)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no entry is stored
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of undo records
    pub fn journal_len(&self) -> usize {
        self.slots.journal_len()
    }

    /// Number of open checkpoints
    pub fn depth(&self) -> usize {
        self.slots.depth()
    }
}

/// TLOAD: push the transient value of `(frame.address, slot)`.
///
/// Charges [`cost::WARM_STORAGE_READ`], then pops the slot.
pub fn tload<H: Host + ?Sized>(frame: &mut Frame, host: &mut H) -> EvmResult<()> {
    frame.gas.charge(cost::WARM_STORAGE_READ)?;
    let slot = H256::from_bytes(frame.stack.pop()?);

    let value = host.tload(frame.address(), slot);
    frame.stack.push(value.into_bytes())?;
    frame.pc += 1;
    Ok(())
}

/// TSTORE: write `value` to `(frame.address, slot)`.
///
/// Charges [`cost::WARM_STORAGE_READ`], pops the slot and then the value,
/// and only then rejects static frames. The charged gas is never refunded.
pub fn tstore<H: Host + ?Sized>(frame: &mut Frame, host: &mut H) -> EvmResult<()> {
    frame.gas.charge(cost::WARM_STORAGE_READ)?;
    let slot = H256::from_bytes(frame.stack.pop()?);
    let value = H256::from_bytes(frame.stack.pop()?);

    if frame.is_static() {
        return Err(EvmError::WriteInStaticContext);
    }

    host.tstore(frame.address(), slot, value);
    frame.pc += 1;
    Ok(())
}
