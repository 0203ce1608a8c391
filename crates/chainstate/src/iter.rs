//! Height-ordered block iteration.

use cjdcoind_primitives::Block;
use cjdcoind_storage::KeyValueStore;

use crate::db::ChainDb;
use crate::error::ChainDbError;

/// Walks committed blocks from genesis to the tip. The tip is re-read on
/// every step, so blocks connected mid-iteration are included; `rewind`
/// restarts from genesis.
pub struct BlockIterator<'a, S> {
    db: &'a ChainDb<S>,
    next_height: i64,
}

impl<'a, S: KeyValueStore> BlockIterator<'a, S> {
    pub(crate) fn new(db: &'a ChainDb<S>) -> Self {
        Self { db, next_height: 0 }
    }

    pub fn rewind(&mut self) {
        self.next_height = 0;
    }

    pub fn next_height(&self) -> i64 {
        self.next_height
    }
}

impl<S: KeyValueStore> Iterator for BlockIterator<'_, S> {
    type Item = Result<(i64, Block), ChainDbError>;

    fn next(&mut self) -> Option<Self::Item> {
        let height = self.next_height;
        let hash = match self.db.hash_at_height_opt(height) {
            Ok(Some(hash)) => hash,
            Ok(None) => return None,
            Err(err) => return Some(Err(err)),
        };
        self.next_height += 1;
        Some(self.db.fetch_block(&hash).map(|block| (height, block)))
    }
}
