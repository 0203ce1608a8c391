//! Transaction index: txid -> ordered entry list with spent bitvectors.
//!
//! A txid maps to a *list* because the chain historically committed the same
//! txid twice (mainnet heights 91842 and 91880); entries are kept in
//! insertion order and each carries its own spent bits.

use cjdcoind_consensus::Hash256;
use cjdcoind_primitives::encoding::{DecodeError, Decoder, Encoder};
use cjdcoind_storage::{Column, KeyValueStore, StoreError, WriteBatch};

/// One committed occurrence of a txid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxIndexEntry {
    pub block_hash: Hash256,
    pub height: i64,
    /// Byte offset of the transaction within its serialized block.
    pub block_offset: u32,
    pub num_outputs: u32,
    /// One bit per output, set when spent. Length is
    /// `num_outputs.div_ceil(8)` bytes.
    pub spent: Vec<u8>,
}

impl TxIndexEntry {
    pub fn new(block_hash: Hash256, height: i64, block_offset: u32, num_outputs: u32) -> Self {
        Self {
            block_hash,
            height,
            block_offset,
            num_outputs,
            spent: vec![0u8; (num_outputs as usize).div_ceil(8)],
        }
    }

    pub fn bit_is_set(&self, output: u32) -> bool {
        let byte = (output / 8) as usize;
        byte < self.spent.len() && self.spent[byte] & (1 << (output % 8)) != 0
    }

    pub fn set_bit(&mut self, output: u32) {
        let byte = (output / 8) as usize;
        if byte < self.spent.len() {
            self.spent[byte] |= 1 << (output % 8);
        }
    }

    pub fn clear_bit(&mut self, output: u32) {
        let byte = (output / 8) as usize;
        if byte < self.spent.len() {
            self.spent[byte] &= !(1 << (output % 8));
        }
    }

    pub fn fully_spent(&self) -> bool {
        (0..self.num_outputs).all(|output| self.bit_is_set(output))
    }

    /// Per-output spent flags in output order.
    pub fn spent_flags(&self) -> Vec<bool> {
        (0..self.num_outputs)
            .map(|output| self.bit_is_set(output))
            .collect()
    }

    fn encode_into(&self, encoder: &mut Encoder) {
        encoder.write_hash(&self.block_hash);
        encoder.write_i64_le(self.height);
        encoder.write_u32_le(self.block_offset);
        encoder.write_u32_le(self.num_outputs);
        encoder.write_var_bytes(&self.spent);
    }

    fn decode_from(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let block_hash = decoder.read_hash()?;
        let height = decoder.read_i64_le()?;
        let block_offset = decoder.read_u32_le()?;
        let num_outputs = decoder.read_u32_le()?;
        let spent = decoder.read_var_bytes()?;
        if spent.len() != (num_outputs as usize).div_ceil(8) {
            return Err(DecodeError::InvalidValue("spent bitvector length mismatch"));
        }
        Ok(Self {
            block_hash,
            height,
            block_offset,
            num_outputs,
            spent,
        })
    }
}

pub fn encode_entries(entries: &[TxIndexEntry]) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.write_var_int(entries.len() as u64);
    for entry in entries {
        entry.encode_into(&mut encoder);
    }
    encoder.into_inner()
}

pub fn decode_entries(bytes: &[u8]) -> Result<Vec<TxIndexEntry>, DecodeError> {
    let mut decoder = Decoder::new(bytes);
    let count = decoder.read_var_int()?;
    if count > decoder.remaining() as u64 {
        return Err(DecodeError::UnexpectedEnd);
    }
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        entries.push(TxIndexEntry::decode_from(&mut decoder)?);
    }
    if !decoder.is_empty() {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(entries)
}

pub struct TxIndex<S> {
    store: S,
}

impl<S> TxIndex<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TxIndex<S> {
    pub fn get(&self, txid: &Hash256) -> Result<Vec<TxIndexEntry>, StoreError> {
        match self.store.get(Column::TxIndex, txid)? {
            Some(bytes) => {
                decode_entries(&bytes).map_err(|err| StoreError::Backend(err.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn contains(&self, txid: &Hash256) -> Result<bool, StoreError> {
        Ok(self.store.get(Column::TxIndex, txid)?.is_some())
    }

    pub fn put(&self, batch: &mut WriteBatch, txid: &Hash256, entries: &[TxIndexEntry]) {
        if entries.is_empty() {
            batch.delete(Column::TxIndex, *txid);
        } else {
            batch.put(Column::TxIndex, *txid, encode_entries(entries));
        }
    }
}
