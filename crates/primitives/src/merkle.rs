//! Merkle tree root over transaction ids.

use cjdcoind_consensus::Hash256;

use crate::hash::sha256d;

/// Root of the pairwise double-sha256 tree; the last node of an odd level is
/// paired with itself. An empty list yields the zero hash.
pub fn merkle_root(txids: &[Hash256]) -> Hash256 {
    if txids.is_empty() {
        return [0u8; 32];
    }
    let mut level: Vec<Hash256> = txids.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let right = pair.get(1).unwrap_or(&pair[0]);
            let mut concat = [0u8; 64];
            concat[..32].copy_from_slice(&pair[0]);
            concat[32..].copy_from_slice(right);
            next.push(sha256d(&concat));
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::merkle_root;
    use crate::hash::sha256d;

    #[test]
    fn single_txid_is_its_own_root() {
        let txid = [7u8; 32];
        assert_eq!(merkle_root(&[txid]), txid);
    }

    #[test]
    fn odd_level_duplicates_last() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let c = [3u8; 32];

        let mut ab = [0u8; 64];
        ab[..32].copy_from_slice(&a);
        ab[32..].copy_from_slice(&b);
        let mut cc = [0u8; 64];
        cc[..32].copy_from_slice(&c);
        cc[32..].copy_from_slice(&c);
        let mut top = [0u8; 64];
        top[..32].copy_from_slice(&sha256d(&ab));
        top[32..].copy_from_slice(&sha256d(&cc));

        assert_eq!(merkle_root(&[a, b, c]), sha256d(&top));
    }
}
