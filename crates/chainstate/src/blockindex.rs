//! Block index rows: hash -> (height, flat-file location, tx count).

use cjdcoind_consensus::Hash256;
use cjdcoind_primitives::encoding::{DecodeError, Decoder, Encoder};
use cjdcoind_storage::{Column, KeyValueStore, StoreError, WriteBatch};

use crate::flatfiles::FileLocation;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockIndexEntry {
    pub height: i64,
    pub location: FileLocation,
    pub tx_count: u32,
}

impl BlockIndexEntry {
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::with_capacity(28);
        encoder.write_i64_le(self.height);
        encoder.write_u32_le(self.location.file_id);
        encoder.write_u64_le(self.location.offset);
        encoder.write_u32_le(self.location.len);
        encoder.write_u32_le(self.tx_count);
        encoder.into_inner()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let height = decoder.read_i64_le()?;
        let file_id = decoder.read_u32_le()?;
        let offset = decoder.read_u64_le()?;
        let len = decoder.read_u32_le()?;
        let tx_count = decoder.read_u32_le()?;
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(Self {
            height,
            location: FileLocation {
                file_id,
                offset,
                len,
            },
            tx_count,
        })
    }
}

/// Big-endian heights so the height index scans in chain order.
pub fn height_key(height: i64) -> [u8; 8] {
    (height as u64).to_be_bytes()
}

pub struct BlockIndex<S> {
    store: S,
}

impl<S> BlockIndex<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> BlockIndex<S> {
    pub fn get(&self, hash: &Hash256) -> Result<Option<BlockIndexEntry>, StoreError> {
        match self.store.get(Column::BlockIndex, hash)? {
            Some(bytes) => BlockIndexEntry::decode(&bytes)
                .map(Some)
                .map_err(|err| StoreError::Backend(err.to_string())),
            None => Ok(None),
        }
    }

    pub fn contains(&self, hash: &Hash256) -> Result<bool, StoreError> {
        Ok(self.store.get(Column::BlockIndex, hash)?.is_some())
    }

    pub fn put(&self, batch: &mut WriteBatch, hash: &Hash256, entry: &BlockIndexEntry) {
        batch.put(Column::BlockIndex, *hash, entry.encode());
        batch.put(Column::HeightIndex, height_key(entry.height), hash.to_vec());
    }

    pub fn delete(&self, batch: &mut WriteBatch, hash: &Hash256, height: i64) {
        batch.delete(Column::BlockIndex, *hash);
        batch.delete(Column::HeightIndex, height_key(height));
    }

    pub fn hash_at_height(&self, height: i64) -> Result<Option<Hash256>, StoreError> {
        if height < 0 {
            return Ok(None);
        }
        match self.store.get(Column::HeightIndex, &height_key(height))? {
            Some(bytes) => {
                let hash: Hash256 = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Backend("invalid height index row".to_string()))?;
                Ok(Some(hash))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{height_key, BlockIndexEntry};
    use crate::flatfiles::FileLocation;

    #[test]
    fn entry_roundtrip() {
        let entry = BlockIndexEntry {
            height: 123_456,
            location: FileLocation {
                file_id: 7,
                offset: 0xdead_beef,
                len: 2_000,
            },
            tx_count: 42,
        };
        let decoded = BlockIndexEntry::decode(&entry.encode()).expect("decode");
        assert_eq!(decoded, entry);
    }

    #[test]
    fn height_keys_sort_in_chain_order() {
        let mut keys: Vec<[u8; 8]> = [0i64, 1, 255, 256, 65_536, i64::MAX]
            .iter()
            .map(|height| height_key(*height))
            .collect();
        let ordered = keys.clone();
        keys.sort_unstable();
        assert_eq!(keys, ordered);
    }
}
