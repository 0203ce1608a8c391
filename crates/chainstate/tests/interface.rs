//! Database contract tests: insert a chain, verify every query per block,
//! then exercise spending, duplicates, and rollback.

use std::collections::BTreeMap;
use std::sync::Arc;

use cjdcoind_chainstate::{
    ChainDb, ChainDbError, ChainTip, FlatFileStore, ValidationFlags, TO_TIP,
};
use cjdcoind_consensus::{chain_params, hash256_to_hex, Hash256, Network, Params};
use cjdcoind_primitives::{Block, BlockHeader, OutPoint, Transaction, TxIn, TxOut};
use cjdcoind_storage::memory::MemoryStore;
use tempfile::TempDir;

fn test_db() -> (ChainDb<MemoryStore>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocks = FlatFileStore::open(dir.path(), "blk", 1 << 20).expect("flat files");
    (ChainDb::new(Arc::new(MemoryStore::new()), blocks), dir)
}

fn flags() -> ValidationFlags {
    // Headers in these fixtures are not mined, so proof of work stays off.
    let mut flags = ValidationFlags::trusted();
    flags.check_merkle = true;
    flags
}

fn params() -> &'static Params {
    chain_params(Network::RegressionNet)
}

fn coinbase(height: i64, outputs: &[i64]) -> Transaction {
    Transaction {
        version: 1,
        vin: vec![TxIn::new(OutPoint::null(), height.to_le_bytes().to_vec())],
        vout: outputs
            .iter()
            .map(|value| TxOut {
                value: *value,
                script_pubkey: vec![0x51],
            })
            .collect(),
        lock_time: 0,
    }
}

fn spend(prevs: &[(Hash256, u32)], outputs: &[i64]) -> Transaction {
    Transaction {
        version: 1,
        vin: prevs
            .iter()
            .map(|(txid, index)| {
                TxIn::new(
                    OutPoint {
                        hash: *txid,
                        index: *index,
                    },
                    vec![0x00],
                )
            })
            .collect(),
        vout: outputs
            .iter()
            .map(|value| TxOut {
                value: *value,
                script_pubkey: vec![0x52],
            })
            .collect(),
        lock_time: 0,
    }
}

fn build_block(prev: Hash256, time_tag: u32, transactions: Vec<Transaction>) -> Block {
    let mut block = Block {
        header: BlockHeader {
            version: 1,
            prev_block: prev,
            merkle_root: [0u8; 32],
            time: 1_600_000_000 + time_tag,
            bits: 0x207fffff,
            nonce: 0,
        },
        transactions,
    };
    block.header.merkle_root = block.compute_merkle_root();
    block
}

/// A plain chain of `count` blocks, each a lone coinbase with two outputs.
fn build_chain(count: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(count);
    let mut prev = [0u8; 32];
    for height in 0..count {
        let block = build_block(prev, height as u32, vec![coinbase(height as i64, &[50, 10])]);
        prev = block.block_hash();
        blocks.push(block);
    }
    blocks
}

/// Everything a caller can observe, for before/after comparisons.
#[derive(Debug, PartialEq)]
struct Snapshot {
    tip: Option<ChainTip>,
    blocks: Vec<(i64, String, Vec<u8>)>,
    txs: BTreeMap<String, Vec<(String, i64, Vec<bool>)>>,
}

fn snapshot(db: &ChainDb<MemoryStore>) -> Snapshot {
    let tip = db.newest().expect("newest");
    let mut blocks = Vec::new();
    let mut txs = BTreeMap::new();
    for item in db.iterate_blocks() {
        let (height, block) = item.expect("iterate");
        let hash = block.block_hash();
        blocks.push((
            height,
            hash256_to_hex(&hash),
            db.fetch_block_bytes(&hash).expect("block bytes"),
        ));
        for tx in &block.transactions {
            let txid = tx.txid();
            let records = db.fetch_tx(&txid).expect("fetch tx");
            txs.insert(
                hash256_to_hex(&txid),
                records
                    .iter()
                    .map(|record| {
                        (
                            hash256_to_hex(&record.block_hash),
                            record.height,
                            record.spent.clone(),
                        )
                    })
                    .collect(),
            );
        }
    }
    Snapshot { tip, blocks, txs }
}

#[test]
fn insert_and_query_each_block() {
    let (db, _dir) = test_db();
    let blocks = build_chain(6);

    for (height, block) in blocks.iter().enumerate() {
        let height = height as i64;
        let hash = block.block_hash();

        let got = db.insert_block(block, params(), &flags()).expect("insert");
        assert_eq!(got, height);

        assert!(db.contains_block(&hash).expect("contains"));
        assert_eq!(
            db.fetch_block_bytes(&hash).expect("bytes"),
            block.consensus_encode()
        );
        assert_eq!(db.fetch_block(&hash).expect("block"), *block);
        assert_eq!(db.hash_at_height(height).expect("hash"), hash);
        assert_eq!(db.block_height(&hash).expect("height"), height);
        assert_eq!(
            db.newest().expect("newest"),
            Some(ChainTip { hash, height })
        );

        // Heights outside [0, tip] must fail.
        for bad in [-1, height + 1, height + 2] {
            assert!(matches!(
                db.hash_at_height(bad),
                Err(ChainDbError::HeightNotFound)
            ));
        }

        // Every transaction is indexed with this block's hash and height
        // and starts with an all-unspent bitvector.
        for tx in &block.transactions {
            let txid = tx.txid();
            assert!(db.contains_tx(&txid).expect("contains tx"));
            let records = db.fetch_tx(&txid).expect("fetch tx");
            let record = records.last().expect("record");
            assert_eq!(record.tx, *tx);
            assert_eq!(record.block_hash, hash);
            assert_eq!(record.height, height);
            assert_eq!(record.spent, vec![false; tx.vout.len()]);
        }
    }
}

#[test]
fn batched_lookups_preserve_order_and_report_misses() {
    let (db, _dir) = test_db();
    let blocks = build_chain(6);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }

    let known = blocks[5].transactions[0].txid();
    let unknown = [0xab; 32];
    let results = db.fetch_tx_list(&[known, unknown]);
    assert_eq!(results.len(), 2);

    let record = results[0].result.as_ref().expect("known txid");
    assert_eq!(record.block_hash, blocks[5].block_hash());
    assert_eq!(record.spent, vec![false, false]);
    assert!(matches!(
        results[1].result,
        Err(ChainDbError::TxNotFound)
    ));

    let results = db.fetch_unspent_tx_list(&[unknown, known]);
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0].result, Err(ChainDbError::TxNotFound)));
    assert!(results[1].result.is_ok());
}

#[test]
fn insert_rejects_broken_linkage() {
    let (db, _dir) = test_db();
    let blocks = build_chain(3);
    db.insert_block(&blocks[0], params(), &flags()).expect("genesis");

    // Skipping a block breaks the prev-hash rule.
    assert!(matches!(
        db.insert_block(&blocks[2], params(), &flags()),
        Err(ChainDbError::PrevHashMismatch)
    ));

    db.insert_block(&blocks[1], params(), &flags()).expect("insert");

    // Re-inserting a committed block is rejected outright.
    for block in &blocks[..2] {
        assert!(matches!(
            db.insert_block(block, params(), &flags()),
            Err(ChainDbError::DuplicateBlock)
        ));
    }

    // Failures leave the tip untouched.
    assert_eq!(
        db.newest().expect("newest"),
        Some(ChainTip {
            hash: blocks[1].block_hash(),
            height: 1
        })
    );
}

#[test]
fn checkpoint_heights_constrain_block_hashes() {
    let mut custom = params().clone();
    custom.checkpoints = Box::leak(Box::new([cjdcoind_consensus::Checkpoint {
        height: 1,
        hash: [0xcc; 32],
    }]));

    let (db, _dir) = test_db();
    let blocks = build_chain(2);
    db.insert_block(&blocks[0], &custom, &flags()).expect("genesis");
    assert!(matches!(
        db.insert_block(&blocks[1], &custom, &flags()),
        Err(ChainDbError::BadCheckpoint)
    ));
    assert_eq!(db.newest().expect("newest").expect("tip").height, 0);
}

#[test]
fn spending_sets_bits_and_rejects_double_spends() {
    let (db, _dir) = test_db();
    let blocks = build_chain(3);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    let funding = blocks[1].transactions[0].txid();

    // Block 3 spends output 0 of block 1's coinbase.
    let spender = spend(&[(funding, 0)], &[40]);
    let block3 = build_block(
        blocks[2].block_hash(),
        100,
        vec![coinbase(3, &[50]), spender.clone()],
    );
    db.insert_block(&block3, params(), &flags()).expect("insert");

    let records = db.fetch_tx(&funding).expect("fetch");
    assert_eq!(records[0].spent, vec![true, false]);

    // Output 1 is still unspent, so the unspent lookup returns it.
    let results = db.fetch_unspent_tx_list(&[funding]);
    assert!(results[0].result.is_ok());

    // Spending output 0 again must fail and change nothing.
    let double = spend(&[(funding, 0)], &[40]);
    let block4 = build_block(
        block3.block_hash(),
        101,
        vec![coinbase(4, &[50]), double],
    );
    let before = snapshot(&db);
    assert!(matches!(
        db.insert_block(&block4, params(), &flags()),
        Err(ChainDbError::DoubleSpend)
    ));
    assert_eq!(snapshot(&db), before);

    // Consuming the last output makes the txid fully spent.
    let block4 = build_block(
        block3.block_hash(),
        102,
        vec![coinbase(4, &[50]), spend(&[(funding, 1)], &[9])],
    );
    db.insert_block(&block4, params(), &flags()).expect("insert");
    let results = db.fetch_unspent_tx_list(&[funding]);
    assert!(matches!(
        results[0].result,
        Err(ChainDbError::NoUnspentTx)
    ));
    // The plain lookup still sees every occurrence.
    assert_eq!(
        db.fetch_tx(&funding).expect("fetch")[0].spent,
        vec![true, true]
    );
}

#[test]
fn chained_spend_within_one_block() {
    let (db, _dir) = test_db();
    let blocks = build_chain(2);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    let funding = blocks[1].transactions[0].txid();

    let first = spend(&[(funding, 0)], &[45, 4]);
    let second = spend(&[(first.txid(), 1)], &[3]);
    let block2 = build_block(
        blocks[1].block_hash(),
        100,
        vec![coinbase(2, &[50]), first.clone(), second.clone()],
    );
    db.insert_block(&block2, params(), &flags()).expect("insert");

    let records = db.fetch_tx(&first.txid()).expect("fetch");
    assert_eq!(records[0].spent, vec![false, true]);
    let records = db.fetch_tx(&second.txid()).expect("fetch");
    assert_eq!(records[0].spent, vec![false]);
}

#[test]
fn duplicate_txids_keep_separate_entries() {
    let (db, _dir) = test_db();
    // Two blocks carrying byte-identical coinbases, the old miner quirk.
    let dup_coinbase = coinbase(0, &[50]);
    let block0 = build_block([0u8; 32], 0, vec![dup_coinbase.clone()]);
    let block1 = build_block(block0.block_hash(), 1, vec![dup_coinbase.clone()]);
    let txid = dup_coinbase.txid();

    db.insert_block(&block0, params(), &flags()).expect("insert");
    db.insert_block(&block1, params(), &flags()).expect("insert");

    let records = db.fetch_tx(&txid).expect("fetch");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].height, 0);
    assert_eq!(records[1].height, 1);

    // Spending picks the most recent unspent occurrence first.
    let block2 = build_block(
        block1.block_hash(),
        2,
        vec![coinbase(2, &[50]), spend(&[(txid, 0)], &[49])],
    );
    db.insert_block(&block2, params(), &flags()).expect("insert");
    let records = db.fetch_tx(&txid).expect("fetch");
    assert_eq!(records[0].spent, vec![false]);
    assert_eq!(records[1].spent, vec![true]);

    // A second spend falls back to the older occurrence.
    let block3 = build_block(
        block2.block_hash(),
        3,
        vec![coinbase(3, &[50]), spend(&[(txid, 0)], &[48])],
    );
    db.insert_block(&block3, params(), &flags()).expect("insert");
    let records = db.fetch_tx(&txid).expect("fetch");
    assert_eq!(records[0].spent, vec![true]);
    assert_eq!(records[1].spent, vec![true]);

    // A third is a double spend.
    let block4 = build_block(
        block3.block_hash(),
        4,
        vec![coinbase(4, &[50]), spend(&[(txid, 0)], &[47])],
    );
    assert!(matches!(
        db.insert_block(&block4, params(), &flags()),
        Err(ChainDbError::DoubleSpend)
    ));
}

#[test]
fn rollback_restores_prior_state_exactly() {
    let (db, _dir) = test_db();
    let mut blocks = build_chain(5);

    // Block 5 spends from block 2's coinbase so rollback has bits to clear.
    let funding = blocks[2].transactions[0].txid();
    let block5 = build_block(
        blocks[4].block_hash(),
        5,
        vec![coinbase(5, &[50, 10]), spend(&[(funding, 0)], &[49])],
    );
    let block6 = build_block(block5.block_hash(), 6, vec![coinbase(6, &[50, 10])]);
    let block7 = build_block(block6.block_hash(), 7, vec![coinbase(7, &[50, 10])]);
    blocks.extend([block5, block6, block7]);

    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    let full = snapshot(&db);
    assert!(db.fetch_tx(&funding).expect("fetch")[0].spent[0]);

    // Roll back to height 4: the spend from block 5 must be forgotten.
    let keep = blocks[4].block_hash();
    db.drop_after_block(&keep).expect("rollback");

    assert_eq!(db.newest().expect("newest").expect("tip").height, 4);
    assert_eq!(db.hash_at_height(4).expect("hash"), keep);
    for bad in [5i64, 6, 7] {
        assert!(matches!(
            db.hash_at_height(bad),
            Err(ChainDbError::HeightNotFound)
        ));
    }
    for block in &blocks[5..] {
        assert!(!db.contains_block(&block.block_hash()).expect("contains"));
        for tx in &block.transactions {
            assert!(matches!(
                db.fetch_tx(&tx.txid()),
                Err(ChainDbError::TxNotFound)
            ));
        }
    }
    assert_eq!(
        db.fetch_tx(&funding).expect("fetch")[0].spent,
        vec![false, false]
    );

    // Replaying the same blocks reproduces the exact observable state.
    for block in &blocks[5..] {
        db.insert_block(block, params(), &flags()).expect("reinsert");
    }
    assert_eq!(snapshot(&db), full);

    // Unknown hashes cannot anchor a rollback.
    assert!(matches!(
        db.drop_after_block(&[0x42; 32]),
        Err(ChainDbError::BlockNotFound)
    ));
}

#[test]
fn rollback_handles_duplicate_txids() {
    let (db, _dir) = test_db();
    let dup_coinbase = coinbase(0, &[50]);
    let block0 = build_block([0u8; 32], 0, vec![dup_coinbase.clone()]);
    let block1 = build_block(block0.block_hash(), 1, vec![dup_coinbase.clone()]);
    let txid = dup_coinbase.txid();

    db.insert_block(&block0, params(), &flags()).expect("insert");
    db.insert_block(&block1, params(), &flags()).expect("insert");
    let block2 = build_block(
        block1.block_hash(),
        2,
        vec![coinbase(2, &[50]), spend(&[(txid, 0)], &[49])],
    );
    db.insert_block(&block2, params(), &flags()).expect("insert");

    // Dropping block 2 clears the bit on the newer occurrence and dropping
    // block 1 removes that occurrence entirely.
    db.drop_after_block(&block1.block_hash()).expect("rollback");
    let records = db.fetch_tx(&txid).expect("fetch");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].spent, vec![false]);

    db.drop_after_block(&block0.block_hash()).expect("rollback");
    let records = db.fetch_tx(&txid).expect("fetch");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].height, 0);
}

#[test]
fn height_ranges_and_iteration() {
    let (db, _dir) = test_db();
    let blocks = build_chain(5);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    let hashes: Vec<_> = blocks.iter().map(|block| block.block_hash()).collect();

    assert_eq!(db.fetch_height_range(0, 3).expect("range"), hashes[0..3]);
    assert_eq!(db.fetch_height_range(2, TO_TIP).expect("range"), hashes[2..]);
    assert_eq!(db.fetch_height_range(3, 100).expect("range"), hashes[3..]);
    assert!(db.fetch_height_range(7, TO_TIP).expect("range").is_empty());
    assert!(matches!(
        db.fetch_height_range(-1, TO_TIP),
        Err(ChainDbError::HeightNotFound)
    ));

    let mut iter = db.iterate_blocks();
    for (height, block) in blocks.iter().enumerate() {
        let (got_height, got_block) = iter.next().expect("item").expect("block");
        assert_eq!(got_height, height as i64);
        assert_eq!(got_block, *block);
    }
    assert!(iter.next().is_none());

    // Restartable from the top.
    iter.rewind();
    let (height, block) = iter.next().expect("item").expect("block");
    assert_eq!(height, 0);
    assert_eq!(block, blocks[0]);
}

#[test]
fn caches_can_be_dropped_at_any_time() {
    let (db, _dir) = test_db();
    let blocks = build_chain(4);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    let before = snapshot(&db);
    db.invalidate_cache();
    assert_eq!(snapshot(&db), before);
    db.sync().expect("sync");
    assert!(!db.is_degraded());
}

#[test]
fn resolver_checkpoints_are_replayable() {
    let (db, _dir) = test_db();
    assert!(db.resolver_checkpoint(b"htlc-1").expect("lookup").is_none());

    db.checkpoint_resolver(b"htlc-1", b"state-v1", &[b"report-a", b"report-b"])
        .expect("checkpoint");
    let (state, reports) = db
        .resolver_checkpoint(b"htlc-1")
        .expect("lookup")
        .expect("present");
    assert_eq!(state, b"state-v1");
    assert_eq!(reports, vec![b"report-a".to_vec(), b"report-b".to_vec()]);

    // A later checkpoint replaces the earlier one wholesale.
    db.checkpoint_resolver(b"htlc-1", b"state-v2", &[])
        .expect("checkpoint");
    let (state, reports) = db
        .resolver_checkpoint(b"htlc-1")
        .expect("lookup")
        .expect("present");
    assert_eq!(state, b"state-v2");
    assert!(reports.is_empty());
}

#[test]
fn close_variants() {
    let (db, _dir) = test_db();
    let blocks = build_chain(2);
    for block in &blocks {
        db.insert_block(block, params(), &flags()).expect("insert");
    }
    db.close().expect("close");

    let (db, _dir) = test_db();
    db.rollback_close().expect("rollback close");
}

// The canonical serialized genesis block; inserting it must reproduce the
// hash the parameters advertise, byte for byte.
const MAINNET_GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    let mut iter = hex.as_bytes().iter().copied();
    while let (Some(high), Some(low)) = (iter.next(), iter.next()) {
        let high = (high as char).to_digit(16).expect("hex digit") as u8;
        let low = (low as char).to_digit(16).expect("hex digit") as u8;
        bytes.push(high << 4 | low);
    }
    bytes
}

#[test]
fn mainnet_genesis_inserts_at_height_zero() {
    let bytes = hex_to_bytes(MAINNET_GENESIS_HEX);
    let genesis = Block::consensus_decode(&bytes).expect("decode");
    let mainnet = chain_params(Network::MainNet);
    assert_eq!(genesis.block_hash(), mainnet.genesis_hash);

    let (db, _dir) = test_db();
    // The real block withstands the full check set.
    let height = db
        .insert_block(&genesis, mainnet, &ValidationFlags::full())
        .expect("insert genesis");
    assert_eq!(height, 0);
    assert_eq!(
        db.newest().expect("newest"),
        Some(ChainTip {
            hash: mainnet.genesis_hash,
            height: 0
        })
    );
    assert_eq!(
        db.fetch_block_bytes(&mainnet.genesis_hash).expect("bytes"),
        bytes
    );
}
