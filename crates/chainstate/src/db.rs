//! The block database: single-writer engine over a key-value store and
//! append-only block files.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use cjdcoind_consensus::{hash256_to_hex, Hash256, Params};
use cjdcoind_primitives::encoding::Decoder;
use cjdcoind_primitives::{Block, Transaction};
use cjdcoind_storage::{Column, KeyValueStore, WriteBatch};
use log::{debug, warn};
use rayon::prelude::*;

use crate::blockindex::{BlockIndex, BlockIndexEntry};
use crate::error::ChainDbError;
use crate::flatfiles::{FlatFileError, FlatFileStore};
use crate::iter::BlockIterator;
use crate::metrics::{InsertMetrics, InsertMetricsSnapshot};
use crate::txindex::{TxIndex, TxIndexEntry};
use crate::undo::{BlockUndo, SpentRef};
use crate::validation::{check_block_sanity, check_checkpoint, ValidationFlags};

/// Sentinel end height meaning "through the current tip".
pub const TO_TIP: i64 = i64::MAX;

const TIP_KEY: &[u8] = b"tip";
const TX_CACHE_CAPACITY: usize = 100_000;

/// The best committed block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChainTip {
    pub hash: Hash256,
    pub height: i64,
}

impl ChainTip {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(40);
        out.extend_from_slice(&self.hash);
        out.extend_from_slice(&self.height.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 40 {
            return None;
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[..32]);
        let height = i64::from_le_bytes(bytes[32..40].try_into().ok()?);
        Some(Self { hash, height })
    }
}

/// One committed occurrence of a transaction, as returned to callers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxRecord {
    pub txid: Hash256,
    pub tx: Transaction,
    pub block_hash: Hash256,
    pub height: i64,
    /// Per-output spent flags, one per output.
    pub spent: Vec<bool>,
}

/// Per-id result of a batched lookup; the list always matches the request
/// in length and order.
#[derive(Debug)]
pub struct TxListEntry {
    pub txid: Hash256,
    pub result: Result<TxRecord, ChainDbError>,
}

struct TxCacheEntry {
    entries: Vec<TxIndexEntry>,
    stamp: u64,
}

// LRU keyed by txid, stamp-based eviction.
struct TxEntryCache {
    entries: HashMap<Hash256, TxCacheEntry>,
    order: VecDeque<(Hash256, u64)>,
    capacity: usize,
    clock: u64,
}

impl TxEntryCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            clock: 0,
        }
    }

    fn get(&mut self, txid: &Hash256) -> Option<Vec<TxIndexEntry>> {
        if self.capacity == 0 {
            return None;
        }
        let stamp = self.bump_stamp();
        let entry = self.entries.get_mut(txid)?;
        entry.stamp = stamp;
        self.order.push_back((*txid, stamp));
        Some(entry.entries.clone())
    }

    fn insert(&mut self, txid: Hash256, entries: Vec<TxIndexEntry>) {
        if self.capacity == 0 {
            return;
        }
        let stamp = self.bump_stamp();
        self.entries.insert(txid, TxCacheEntry { entries, stamp });
        self.order.push_back((txid, stamp));
        self.evict();
    }

    fn remove(&mut self, txid: &Hash256) {
        self.entries.remove(txid);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn bump_stamp(&mut self) -> u64 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let Some((txid, stamp)) = self.order.pop_front() else {
                break;
            };
            let Some(entry) = self.entries.get(&txid) else {
                continue;
            };
            if entry.stamp != stamp {
                continue;
            }
            self.entries.remove(&txid);
        }
    }
}

// Mutable copies of the tx entry lists one write operation touches, loaded
// from committed state on first use and flushed into the write batch at the
// end.
struct WorkingSet {
    lists: HashMap<Hash256, Vec<TxIndexEntry>>,
}

impl WorkingSet {
    fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    fn load<'a, S: KeyValueStore>(
        &'a mut self,
        db: &ChainDb<S>,
        txid: &Hash256,
    ) -> Result<&'a mut Vec<TxIndexEntry>, ChainDbError> {
        if !self.lists.contains_key(txid) {
            let entries = db.tx_entries(txid)?;
            self.lists.insert(*txid, entries);
        }
        self.lists
            .get_mut(txid)
            .ok_or(ChainDbError::CorruptIndex("working set lookup failed"))
    }

    fn iter(&self) -> impl Iterator<Item = (&Hash256, &Vec<TxIndexEntry>)> {
        self.lists.iter()
    }

    fn keys(&self) -> impl Iterator<Item = &Hash256> {
        self.lists.keys()
    }
}

pub struct ChainDb<S> {
    store: Arc<S>,
    blocks: FlatFileStore,
    block_index: BlockIndex<Arc<S>>,
    tx_index: TxIndex<Arc<S>>,
    // Writers serialize here; readers go straight to the committed state.
    write_lock: Mutex<()>,
    tip_cache: Mutex<Option<Option<ChainTip>>>,
    tx_cache: Mutex<TxEntryCache>,
    metrics: InsertMetrics,
    degraded: AtomicBool,
}

impl<S: KeyValueStore> ChainDb<S> {
    pub fn new(store: Arc<S>, blocks: FlatFileStore) -> Self {
        Self {
            block_index: BlockIndex::new(Arc::clone(&store)),
            tx_index: TxIndex::new(Arc::clone(&store)),
            store,
            blocks,
            write_lock: Mutex::new(()),
            tip_cache: Mutex::new(None),
            tx_cache: Mutex::new(TxEntryCache::new(TX_CACHE_CAPACITY)),
            metrics: InsertMetrics::default(),
            degraded: AtomicBool::new(false),
        }
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ChainDbError> {
        self.write_lock
            .lock()
            .map_err(|_| ChainDbError::CorruptIndex("write lock poisoned"))
    }

    fn mark_degraded(&self) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!("block database degraded by an i/o fault");
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn metrics(&self) -> InsertMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The current tip, or `None` on an empty database.
    pub fn newest(&self) -> Result<Option<ChainTip>, ChainDbError> {
        if let Ok(cache) = self.tip_cache.lock() {
            if let Some(tip) = *cache {
                return Ok(tip);
            }
        }
        let tip = match self.store.get(Column::Meta, TIP_KEY)? {
            Some(bytes) => Some(
                ChainTip::decode(&bytes)
                    .ok_or(ChainDbError::CorruptIndex("invalid tip metadata"))?,
            ),
            None => None,
        };
        if let Ok(mut cache) = self.tip_cache.lock() {
            *cache = Some(tip);
        }
        Ok(tip)
    }

    /// Connects a block on top of the current tip and returns its height.
    /// All index rows, spent-bit mutations, and the tip advance commit
    /// atomically; any failure leaves the database unchanged.
    pub fn insert_block(
        &self,
        block: &Block,
        params: &Params,
        flags: &ValidationFlags,
    ) -> Result<i64, ChainDbError> {
        let _guard = self.write_guard()?;

        let hash = block.block_hash();
        if self.block_index.contains(&hash)? {
            return Err(ChainDbError::DuplicateBlock);
        }

        let tip = self.newest()?;
        let height = match &tip {
            Some(tip) => {
                if block.header.prev_block != tip.hash {
                    return Err(ChainDbError::PrevHashMismatch);
                }
                tip.height + 1
            }
            None => 0,
        };

        if flags.check_sanity {
            check_block_sanity(block, params, flags)?;
        }
        check_checkpoint(params, height, &hash).map_err(|_| ChainDbError::BadCheckpoint)?;

        let spend_start = Instant::now();
        let txids: Vec<Hash256> = block
            .transactions
            .par_iter()
            .map(|tx| tx.txid())
            .collect();
        let offsets = block.tx_offsets();

        // Working copies of every tx entry list this block touches; spent
        // bits and fresh entries land here before the batch is built.
        let mut working = WorkingSet::new();
        let mut undo = BlockUndo::default();
        for (index, tx) in block.transactions.iter().enumerate() {
            if index > 0 {
                for input in &tx.vin {
                    let prev_txid = input.prevout.hash;
                    let output = input.prevout.index;
                    let entries = working.load(self, &prev_txid)?;
                    // Duplicate txids: the most recent occurrence with the
                    // output still unspent is the one being consumed.
                    let position = entries.iter().rposition(|entry| {
                        output < entry.num_outputs && !entry.bit_is_set(output)
                    });
                    let Some(position) = position else {
                        return Err(ChainDbError::DoubleSpend);
                    };
                    entries[position].set_bit(output);
                    undo.spent.push(SpentRef {
                        txid: prev_txid,
                        entry_index: position as u32,
                        output,
                    });
                }
            }

            let txid = txids[index];
            let entries = working.load(self, &txid)?;
            if !entries.is_empty() {
                warn!(
                    "duplicate txid {} committed at height {height}",
                    hash256_to_hex(&txid)
                );
            }
            entries.push(TxIndexEntry::new(
                hash,
                height,
                offsets[index],
                tx.vout.len() as u32,
            ));
        }
        self.metrics.record_spend(spend_start.elapsed());

        let flatfile_start = Instant::now();
        let block_bytes = block.consensus_encode();
        let location = self.blocks.append(&block_bytes).map_err(|err| {
            self.mark_degraded();
            ChainDbError::FlatFile(err)
        })?;
        self.metrics.record_flatfile(flatfile_start.elapsed());

        let index_start = Instant::now();
        let mut batch = WriteBatch::new();
        self.block_index.put(
            &mut batch,
            &hash,
            &BlockIndexEntry {
                height,
                location,
                tx_count: block.transactions.len() as u32,
            },
        );
        for (txid, entries) in working.iter() {
            self.tx_index.put(&mut batch, txid, entries);
        }
        batch.put(Column::BlockUndo, hash, undo.encode());
        batch.put(Column::Meta, TIP_KEY, ChainTip { hash, height }.encode());
        self.commit(batch)?;
        self.metrics.record_index(index_start.elapsed());

        if let Ok(mut cache) = self.tip_cache.lock() {
            *cache = Some(Some(ChainTip { hash, height }));
        }
        if let Ok(mut cache) = self.tx_cache.lock() {
            for txid in working.keys() {
                cache.remove(txid);
            }
        }
        Ok(height)
    }

    /// Rolls the chain back so the given block becomes the tip. Everything
    /// committed after it is undone in one atomic batch, including the
    /// spent bits its blocks set on earlier transactions.
    pub fn drop_after_block(&self, hash: &Hash256) -> Result<(), ChainDbError> {
        let _guard = self.write_guard()?;

        let target = self
            .block_index
            .get(hash)?
            .ok_or(ChainDbError::BlockNotFound)?;
        if self.block_index.hash_at_height(target.height)? != Some(*hash) {
            return Err(ChainDbError::BlockNotFound);
        }
        let tip = self.newest()?.ok_or(ChainDbError::BlockNotFound)?;

        let mut batch = WriteBatch::new();
        let mut working = WorkingSet::new();
        for height in (target.height + 1..=tip.height).rev() {
            let block_hash = self
                .block_index
                .hash_at_height(height)?
                .ok_or(ChainDbError::CorruptIndex("missing height index row"))?;
            let entry = self
                .block_index
                .get(&block_hash)?
                .ok_or(ChainDbError::CorruptIndex("missing block index row"))?;
            let bytes = self.read_block_bytes(&entry)?;
            let block = Block::consensus_decode(&bytes)
                .map_err(|_| ChainDbError::CorruptIndex("invalid stored block bytes"))?;
            let undo_bytes = self
                .store
                .get(Column::BlockUndo, &block_hash)?
                .ok_or(ChainDbError::CorruptIndex("missing block undo entry"))?;
            let undo = BlockUndo::decode(&undo_bytes)
                .map_err(|_| ChainDbError::CorruptIndex("invalid block undo entry"))?;

            let txids: Vec<Hash256> = block
                .transactions
                .par_iter()
                .map(|tx| tx.txid())
                .collect();

            // Reverse of insertion: per transaction, newest first, drop the
            // entry it appended, then clear the bits its inputs set.
            let mut journal = undo.spent;
            for (tx_index, tx) in block.transactions.iter().enumerate().rev() {
                let txid = txids[tx_index];
                let entries = working.load(self, &txid)?;
                match entries.pop() {
                    Some(last) if last.block_hash == block_hash => {}
                    _ => {
                        return Err(ChainDbError::CorruptIndex(
                            "tx index does not match discarded block",
                        ))
                    }
                }

                if tx_index > 0 {
                    for _ in 0..tx.vin.len() {
                        let spent = journal.pop().ok_or(ChainDbError::CorruptIndex(
                            "block undo input mismatch",
                        ))?;
                        let entries = working.load(self, &spent.txid)?;
                        let entry = entries
                            .get_mut(spent.entry_index as usize)
                            .ok_or(ChainDbError::CorruptIndex("undo entry out of range"))?;
                        if !entry.bit_is_set(spent.output) {
                            return Err(ChainDbError::CorruptIndex(
                                "undo references an unset spent bit",
                            ));
                        }
                        entry.clear_bit(spent.output);
                    }
                }
            }
            if !journal.is_empty() {
                return Err(ChainDbError::CorruptIndex(
                    "block undo has extra spent entries",
                ));
            }

            self.block_index.delete(&mut batch, &block_hash, height);
            batch.delete(Column::BlockUndo, block_hash);
            debug!(
                "rolling back block {} at height {height}",
                hash256_to_hex(&block_hash)
            );
        }

        for (txid, entries) in working.iter() {
            self.tx_index.put(&mut batch, txid, entries);
        }
        batch.put(
            Column::Meta,
            TIP_KEY,
            ChainTip {
                hash: *hash,
                height: target.height,
            }
            .encode(),
        );
        self.commit(batch)?;

        if let Ok(mut cache) = self.tip_cache.lock() {
            *cache = Some(Some(ChainTip {
                hash: *hash,
                height: target.height,
            }));
        }
        if let Ok(mut cache) = self.tx_cache.lock() {
            for txid in working.keys() {
                cache.remove(txid);
            }
        }
        Ok(())
    }

    pub fn contains_block(&self, hash: &Hash256) -> Result<bool, ChainDbError> {
        Ok(self.block_index.contains(hash)?)
    }

    pub fn fetch_block_bytes(&self, hash: &Hash256) -> Result<Vec<u8>, ChainDbError> {
        let entry = self
            .block_index
            .get(hash)?
            .ok_or(ChainDbError::BlockNotFound)?;
        self.read_block_bytes(&entry)
    }

    pub fn fetch_block(&self, hash: &Hash256) -> Result<Block, ChainDbError> {
        let bytes = self.fetch_block_bytes(hash)?;
        Block::consensus_decode(&bytes)
            .map_err(|_| ChainDbError::CorruptIndex("invalid stored block bytes"))
    }

    /// Height of a committed block.
    pub fn block_height(&self, hash: &Hash256) -> Result<i64, ChainDbError> {
        Ok(self
            .block_index
            .get(hash)?
            .ok_or(ChainDbError::BlockNotFound)?
            .height)
    }

    /// Hash at a main-chain height; heights outside [0, tip] fail.
    pub fn hash_at_height(&self, height: i64) -> Result<Hash256, ChainDbError> {
        self.block_index
            .hash_at_height(height)?
            .ok_or(ChainDbError::HeightNotFound)
    }

    pub(crate) fn hash_at_height_opt(
        &self,
        height: i64,
    ) -> Result<Option<Hash256>, ChainDbError> {
        Ok(self.block_index.hash_at_height(height)?)
    }

    /// Hashes for heights in [start, end); pass [`TO_TIP`] to run through
    /// the tip.
    pub fn fetch_height_range(
        &self,
        start: i64,
        end: i64,
    ) -> Result<Vec<Hash256>, ChainDbError> {
        if start < 0 || end < start {
            return Err(ChainDbError::HeightNotFound);
        }
        let Some(tip) = self.newest()? else {
            return Ok(Vec::new());
        };
        let end = if end == TO_TIP {
            tip.height + 1
        } else {
            end.min(tip.height + 1)
        };
        let mut hashes = Vec::with_capacity(end.saturating_sub(start).max(0) as usize);
        for height in start..end {
            hashes.push(self.hash_at_height(height)?);
        }
        Ok(hashes)
    }

    pub fn contains_tx(&self, txid: &Hash256) -> Result<bool, ChainDbError> {
        Ok(self.tx_index.contains(txid)?)
    }

    fn tx_entries(&self, txid: &Hash256) -> Result<Vec<TxIndexEntry>, ChainDbError> {
        if let Ok(mut cache) = self.tx_cache.lock() {
            if let Some(entries) = cache.get(txid) {
                return Ok(entries);
            }
        }
        let entries = self.tx_index.get(txid)?;
        if !entries.is_empty() {
            if let Ok(mut cache) = self.tx_cache.lock() {
                cache.insert(*txid, entries.clone());
            }
        }
        Ok(entries)
    }

    fn read_block_bytes(&self, entry: &BlockIndexEntry) -> Result<Vec<u8>, ChainDbError> {
        self.blocks.read(entry.location).map_err(|err| {
            if matches!(err, FlatFileError::Io(_)) {
                self.mark_degraded();
            }
            ChainDbError::FlatFile(err)
        })
    }

    // Materializes a caller-facing record by slicing the transaction out of
    // its block's bytes.
    fn tx_record(&self, txid: &Hash256, entry: &TxIndexEntry) -> Result<TxRecord, ChainDbError> {
        let block_entry = self
            .block_index
            .get(&entry.block_hash)?
            .ok_or(ChainDbError::CorruptIndex("tx references a missing block"))?;
        let block_bytes = self.read_block_bytes(&block_entry)?;
        let offset = entry.block_offset as usize;
        if offset >= block_bytes.len() {
            return Err(ChainDbError::CorruptIndex("tx offset beyond block bytes"));
        }
        let mut decoder = Decoder::new(&block_bytes[offset..]);
        let tx = Transaction::decode_from(&mut decoder)
            .map_err(|_| ChainDbError::CorruptIndex("invalid stored transaction bytes"))?;
        Ok(TxRecord {
            txid: *txid,
            tx,
            block_hash: entry.block_hash,
            height: entry.height,
            spent: entry.spent_flags(),
        })
    }

    /// Every committed occurrence of the txid, oldest first.
    pub fn fetch_tx(&self, txid: &Hash256) -> Result<Vec<TxRecord>, ChainDbError> {
        let entries = self.tx_entries(txid)?;
        if entries.is_empty() {
            return Err(ChainDbError::TxNotFound);
        }
        entries
            .iter()
            .map(|entry| self.tx_record(txid, entry))
            .collect()
    }

    /// Batched lookup returning the most recent occurrence per id. The
    /// result always has one element per requested id, in request order.
    pub fn fetch_tx_list(&self, txids: &[Hash256]) -> Vec<TxListEntry> {
        txids
            .iter()
            .map(|txid| TxListEntry {
                txid: *txid,
                result: self.lookup_newest(txid, false),
            })
            .collect()
    }

    /// Like [`Self::fetch_tx_list`] but only returns occurrences with at
    /// least one unspent output; fully spent ids report `NoUnspentTx`.
    pub fn fetch_unspent_tx_list(&self, txids: &[Hash256]) -> Vec<TxListEntry> {
        txids
            .iter()
            .map(|txid| TxListEntry {
                txid: *txid,
                result: self.lookup_newest(txid, true),
            })
            .collect()
    }

    fn lookup_newest(
        &self,
        txid: &Hash256,
        unspent_only: bool,
    ) -> Result<TxRecord, ChainDbError> {
        let entries = self.tx_entries(txid)?;
        if entries.is_empty() {
            return Err(ChainDbError::TxNotFound);
        }
        let entry = if unspent_only {
            entries
                .iter()
                .rev()
                .find(|entry| !entry.fully_spent())
                .ok_or(ChainDbError::NoUnspentTx)?
        } else {
            &entries[entries.len() - 1]
        };
        self.tx_record(txid, entry)
    }

    /// A restartable iterator over committed blocks in height order.
    pub fn iterate_blocks(&self) -> BlockIterator<'_, S> {
        BlockIterator::new(self)
    }

    /// Flushes block files and the key-value store, then reports a fault
    /// recorded earlier, if any.
    pub fn sync(&self) -> Result<(), ChainDbError> {
        self.blocks.flush().map_err(|err| {
            self.mark_degraded();
            ChainDbError::FlatFile(err)
        })?;
        self.store.persist().map_err(|err| {
            self.mark_degraded();
            ChainDbError::Store(err)
        })?;
        if self.is_degraded() {
            return Err(ChainDbError::Degraded);
        }
        Ok(())
    }

    /// Drops in-memory lookup caches; the next access reloads from disk.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.tip_cache.lock() {
            *cache = None;
        }
        if let Ok(mut cache) = self.tx_cache.lock() {
            cache.clear();
        }
    }

    /// Flushes and releases the database.
    pub fn close(self) -> Result<(), ChainDbError> {
        self.sync()
    }

    /// Releases the database without flushing buffered state.
    pub fn rollback_close(self) -> Result<(), ChainDbError> {
        self.invalidate_cache();
        if self.is_degraded() {
            return Err(ChainDbError::Degraded);
        }
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), ChainDbError> {
        self.store.write_batch(&batch).map_err(|err| {
            self.mark_degraded();
            ChainDbError::Store(err)
        })
    }

    pub(crate) fn resolver_store(&self) -> &Arc<S> {
        &self.store
    }
}
