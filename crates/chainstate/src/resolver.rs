//! Durable checkpointing hook offered to the contract-resolution layer.
//!
//! A resolver hands over its serialized state plus any report blobs; once
//! the call returns Ok the checkpoint has reached durable storage, so the
//! resolver may act on external side effects.

use cjdcoind_primitives::encoding::{Decoder, Encoder};
use cjdcoind_storage::{Column, KeyValueStore, WriteBatch};

use crate::db::ChainDb;
use crate::error::ChainDbError;

const STATE_TAG: u8 = 0x00;
const REPORTS_TAG: u8 = 0x01;

fn tagged_key(tag: u8, resolver_key: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + resolver_key.len());
    key.push(tag);
    key.extend_from_slice(resolver_key);
    key
}

impl<S: KeyValueStore> ChainDb<S> {
    /// Atomically persists a resolver's state and reports, replacing any
    /// earlier checkpoint under the same key, and flushes before returning.
    pub fn checkpoint_resolver(
        &self,
        resolver_key: &[u8],
        state: &[u8],
        reports: &[&[u8]],
    ) -> Result<(), ChainDbError> {
        let mut batch = WriteBatch::new();
        batch.put(Column::Resolver, tagged_key(STATE_TAG, resolver_key), state);

        let mut encoder = Encoder::new();
        encoder.write_var_int(reports.len() as u64);
        for report in reports {
            encoder.write_var_bytes(report);
        }
        batch.put(
            Column::Resolver,
            tagged_key(REPORTS_TAG, resolver_key),
            encoder.into_inner(),
        );

        let store = self.resolver_store();
        store.write_batch(&batch)?;
        store.persist()?;
        Ok(())
    }

    /// The last checkpoint written under the key, if any: (state, reports).
    pub fn resolver_checkpoint(
        &self,
        resolver_key: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<Vec<u8>>)>, ChainDbError> {
        let store = self.resolver_store();
        let Some(state) = store.get(Column::Resolver, &tagged_key(STATE_TAG, resolver_key))?
        else {
            return Ok(None);
        };

        let mut reports = Vec::new();
        if let Some(bytes) =
            store.get(Column::Resolver, &tagged_key(REPORTS_TAG, resolver_key))?
        {
            let mut decoder = Decoder::new(&bytes);
            let count = decoder
                .read_var_int()
                .map_err(|_| ChainDbError::CorruptIndex("invalid resolver reports"))?;
            for _ in 0..count {
                reports.push(
                    decoder
                        .read_var_bytes()
                        .map_err(|_| ChainDbError::CorruptIndex("invalid resolver reports"))?,
                );
            }
        }
        Ok(Some((state, reports)))
    }
}
