//! By-reference marshalling of caller-owned records.
//!
//! Records are copied into a per-call `HandleTable` when the call starts; the
//! callee sees only opaque handles and writes through `apply_mutation`. When the
//! call ends the dispatcher copies every slot back into the caller's record and
//! drops the table, so no copy outlives the call.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::common::buf::{WireBuf, WireReader};
use crate::common::error::{BoundaryError, BoundaryResult};

use super::domain::{Record, WireKind, WireValue};

static NEXT_TABLE: AtomicU32 = AtomicU32::new(1);

/// Opaque reference to a record lent for the duration of one call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn raw(self) -> u64 {
        self.0
    }

    fn table(self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn slot(self) -> usize {
        (self.0 & u64::from(u32::MAX)) as usize
    }
}

/// Field writes requested by the callee. `None` leaves a field untouched.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RecordPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl RecordPatch {
    pub fn both(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn apply_to(&self, record: &mut Record) {
        if let Some(x) = self.x {
            record.x = x;
        }
        if let Some(y) = self.y {
            record.y = y;
        }
    }
}

/// Records lent to a single in-flight call.
#[derive(Debug)]
pub struct HandleTable {
    id: u32,
    slots: Vec<Record>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            id: NEXT_TABLE.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
        }
    }

    /// Lend a copy of `record` and return its handle.
    pub fn encode_by_ref(&mut self, record: &Record) -> Handle {
        let slot = self.slots.len() as u64;
        self.slots.push(*record);
        Handle((u64::from(self.id) << 32) | slot)
    }

    /// Current callee-side view of the record.
    pub fn get(&self, handle: Handle) -> BoundaryResult<Record> {
        self.resolve(handle).map(|idx| self.slots[idx])
    }

    /// Write new field values; they reach the caller's record when the call returns.
    pub fn apply_mutation(&mut self, handle: Handle, patch: RecordPatch) -> BoundaryResult<()> {
        let idx = self.resolve(handle)?;
        patch.apply_to(&mut self.slots[idx]);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Copy-out: final record values in lending order.
    pub fn into_records(self) -> Vec<Record> {
        self.slots
    }

    fn resolve(&self, handle: Handle) -> BoundaryResult<usize> {
        let idx = handle.slot();
        if handle.table() != self.id || idx >= self.slots.len() {
            return Err(BoundaryError::UnknownHandle(handle.raw()));
        }
        Ok(idx)
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode(value: &WireValue) -> BoundaryResult<Record> {
    match value {
        WireValue::Record(record) => Ok(*record),
        other => Err(BoundaryError::mismatch(WireKind::Record, other.kind())),
    }
}

pub fn write_record(record: &Record, buf: &mut WireBuf) {
    buf.put_f64(record.x);
    buf.put_f64(record.y);
}

pub fn read_record(reader: &mut WireReader<'_>) -> BoundaryResult<Record> {
    let x = reader.get_f64()?;
    let y = reader.get_f64()?;
    Ok(Record { x, y })
}
