//! Block header and block serialization.

use cjdcoind_consensus::Hash256;

use crate::encoding::{DecodeError, Decoder, Encoder};
use crate::hash::sha256d;
use crate::merkle::merkle_root;
use crate::transaction::Transaction;

pub const BLOCK_HEADER_LEN: usize = 80;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn encode_into(&self, encoder: &mut Encoder) {
        encoder.write_i32_le(self.version);
        encoder.write_hash(&self.prev_block);
        encoder.write_hash(&self.merkle_root);
        encoder.write_u32_le(self.time);
        encoder.write_u32_le(self.bits);
        encoder.write_u32_le(self.nonce);
    }

    pub fn consensus_encode(&self) -> [u8; BLOCK_HEADER_LEN] {
        let mut encoder = Encoder::with_capacity(BLOCK_HEADER_LEN);
        self.encode_into(&mut encoder);
        let bytes = encoder.into_inner();
        let mut out = [0u8; BLOCK_HEADER_LEN];
        out.copy_from_slice(&bytes);
        out
    }

    pub fn decode_from(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            version: decoder.read_i32_le()?,
            prev_block: decoder.read_hash()?,
            merkle_root: decoder.read_hash()?,
            time: decoder.read_u32_le()?,
            bits: decoder.read_u32_le()?,
            nonce: decoder.read_u32_le()?,
        })
    }

    /// Double-sha256 of the 80-byte header.
    pub fn block_hash(&self) -> Hash256 {
        sha256d(&self.consensus_encode())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn block_hash(&self) -> Hash256 {
        self.header.block_hash()
    }

    pub fn consensus_encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        self.header.encode_into(&mut encoder);
        encoder.write_var_int(self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode_into(&mut encoder);
        }
        encoder.into_inner()
    }

    /// Byte offset of each transaction within `consensus_encode` output.
    pub fn tx_offsets(&self) -> Vec<u32> {
        let mut encoder = Encoder::new();
        self.header.encode_into(&mut encoder);
        encoder.write_var_int(self.transactions.len() as u64);
        let mut offsets = Vec::with_capacity(self.transactions.len());
        for tx in &self.transactions {
            offsets.push(encoder.len() as u32);
            tx.encode_into(&mut encoder);
        }
        offsets
    }

    pub fn consensus_decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let header = BlockHeader::decode_from(&mut decoder)?;
        let count = decoder.read_var_int()?;
        if count > decoder.remaining() as u64 {
            return Err(DecodeError::UnexpectedEnd);
        }
        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            transactions.push(Transaction::decode_from(&mut decoder)?);
        }
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(Self {
            header,
            transactions,
        })
    }

    /// Merkle root over the contained transaction ids.
    pub fn compute_merkle_root(&self) -> Hash256 {
        let txids: Vec<Hash256> = self.transactions.iter().map(|tx| tx.txid()).collect();
        merkle_root(&txids)
    }
}
