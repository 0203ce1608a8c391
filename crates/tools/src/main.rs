//! Developer utility over the block database.
//!
//! `chaintool compact <hex>` expands a compact target.
//! `chaintool db-info <datadir>` prints a JSON summary of a data directory.

use std::path::Path;
use std::sync::Arc;

use cjdcoind_chainstate::{ChainDb, FlatFileStore};
use cjdcoind_consensus::hash256_to_hex;
use cjdcoind_pow::difficulty::{block_proof, compact_to_target};
use cjdcoind_storage::fjall::FjallStore;
use cjdcoind_storage::{Column, KeyValueStore};
use serde_json::json;

const MAX_FLATFILE_SIZE: u64 = 128 * 1024 * 1024;

fn usage() {
    eprintln!("Usage: chaintool compact <hex-target>");
    eprintln!("       chaintool db-info <datadir>");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.as_slice() {
        [command, value] if command == "compact" => compact(value),
        [command, datadir] if command == "db-info" => db_info(datadir),
        _ => {
            usage();
            std::process::exit(2);
        }
    };
    if let Err(message) = result {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn compact(value: &str) -> Result<(), String> {
    let trimmed = value.trim_start_matches("0x");
    let compact = u32::from_str_radix(trimmed, 16)
        .map_err(|_| format!("expected hex number, got [{value}]"))?;
    let expanded = compact_to_target(compact);
    println!("target:   {:x}", expanded.value);
    if expanded.negative {
        println!("negative: true");
    }
    if expanded.overflow {
        println!("overflow: true");
    }
    println!("work:     {:x}", block_proof(compact));
    Ok(())
}

fn db_info(datadir: &str) -> Result<(), String> {
    let datadir = Path::new(datadir);
    if !datadir.is_dir() {
        return Err(format!("no data directory at {}", datadir.display()));
    }

    let store = FjallStore::open(datadir.join("index"))
        .map_err(|err| format!("open index: {err}"))?;
    let blocks = FlatFileStore::open(datadir.join("blocks"), "blk", MAX_FLATFILE_SIZE)
        .map_err(|err| format!("open block files: {err}"))?;
    let store = Arc::new(store);
    let db = ChainDb::new(Arc::clone(&store), blocks);

    let tip = db.newest().map_err(|err| format!("read tip: {err}"))?;
    let mut columns = serde_json::Map::new();
    for column in Column::ALL {
        let mut rows = 0u64;
        store
            .for_each_prefix(column, &[], &mut |_, _| {
                rows += 1;
                Ok(())
            })
            .map_err(|err| format!("scan {}: {err}", column.as_str()))?;
        columns.insert(column.as_str().to_string(), json!(rows));
    }

    let info = json!({
        "path": datadir.display().to_string(),
        "tip": tip.map(|tip| json!({
            "hash": hash256_to_hex(&tip.hash),
            "height": tip.height,
        })),
        "columns": columns,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&info).map_err(|err| err.to_string())?
    );
    Ok(())
}
