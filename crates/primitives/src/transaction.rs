//! Transactions and their consensus serialization, with and without witness.

use cjdcoind_consensus::Hash256;

use crate::encoding::{DecodeError, Decoder, Encoder};
use crate::hash::sha256d;
use crate::outpoint::OutPoint;

// Segwit serialization marker and flag, between version and input count.
const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Witness stack for this input; not part of the txid.
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    pub fn new(prevout: OutPoint, script_sig: Vec<u8>) -> Self {
        Self {
            prevout,
            script_sig,
            sequence: u32::MAX,
            witness: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub version: i32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn has_witness(&self) -> bool {
        self.vin.iter().any(|input| !input.witness.is_empty())
    }

    /// A coinbase transaction has exactly one input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].prevout.is_null()
    }

    /// Double-sha256 of the no-witness serialization.
    pub fn txid(&self) -> Hash256 {
        let mut encoder = Encoder::with_capacity(self.base_size());
        self.encode_base(&mut encoder);
        sha256d(&encoder.into_inner())
    }

    pub fn consensus_encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::with_capacity(self.base_size());
        self.encode_into(&mut encoder);
        encoder.into_inner()
    }

    pub fn encode_into(&self, encoder: &mut Encoder) {
        if self.has_witness() {
            encoder.write_i32_le(self.version);
            encoder.write_u8(WITNESS_MARKER);
            encoder.write_u8(WITNESS_FLAG);
            self.encode_ins_outs(encoder);
            for input in &self.vin {
                encoder.write_var_int(input.witness.len() as u64);
                for item in &input.witness {
                    encoder.write_var_bytes(item);
                }
            }
            encoder.write_u32_le(self.lock_time);
        } else {
            self.encode_base(encoder);
        }
    }

    fn encode_base(&self, encoder: &mut Encoder) {
        encoder.write_i32_le(self.version);
        self.encode_ins_outs(encoder);
        encoder.write_u32_le(self.lock_time);
    }

    fn encode_ins_outs(&self, encoder: &mut Encoder) {
        encoder.write_var_int(self.vin.len() as u64);
        for input in &self.vin {
            input.prevout.encode(encoder);
            encoder.write_var_bytes(&input.script_sig);
            encoder.write_u32_le(input.sequence);
        }
        encoder.write_var_int(self.vout.len() as u64);
        for output in &self.vout {
            encoder.write_i64_le(output.value);
            encoder.write_var_bytes(&output.script_pubkey);
        }
    }

    fn base_size(&self) -> usize {
        let ins: usize = self
            .vin
            .iter()
            .map(|input| 40 + 9 + input.script_sig.len())
            .sum();
        let outs: usize = self
            .vout
            .iter()
            .map(|output| 8 + 9 + output.script_pubkey.len())
            .sum();
        4 + 9 + ins + 9 + outs + 4
    }

    pub fn consensus_decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let tx = Self::decode_from(&mut decoder)?;
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(tx)
    }

    pub fn decode_from(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let version = decoder.read_i32_le()?;

        // An input count of zero marks the extended (witness) serialization.
        let mut segwit = false;
        let mut vin_count = decoder.read_var_int()?;
        if vin_count == 0 {
            let flag = decoder.read_u8()?;
            if flag != WITNESS_FLAG {
                return Err(DecodeError::InvalidValue("invalid witness flag"));
            }
            segwit = true;
            vin_count = decoder.read_var_int()?;
            if vin_count == 0 {
                return Err(DecodeError::InvalidValue("witness tx without inputs"));
            }
        }
        if vin_count > decoder.remaining() as u64 {
            return Err(DecodeError::UnexpectedEnd);
        }

        let mut vin = Vec::with_capacity(vin_count as usize);
        for _ in 0..vin_count {
            let prevout = OutPoint::decode(decoder)?;
            let script_sig = decoder.read_var_bytes()?;
            let sequence = decoder.read_u32_le()?;
            vin.push(TxIn {
                prevout,
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let vout_count = decoder.read_var_int()?;
        if vout_count > decoder.remaining() as u64 {
            return Err(DecodeError::UnexpectedEnd);
        }
        let mut vout = Vec::with_capacity(vout_count as usize);
        for _ in 0..vout_count {
            let value = decoder.read_i64_le()?;
            let script_pubkey = decoder.read_var_bytes()?;
            vout.push(TxOut {
                value,
                script_pubkey,
            });
        }

        if segwit {
            let mut any = false;
            for input in &mut vin {
                let items = decoder.read_var_int()?;
                if items > decoder.remaining() as u64 {
                    return Err(DecodeError::UnexpectedEnd);
                }
                let mut witness = Vec::with_capacity(items as usize);
                for _ in 0..items {
                    witness.push(decoder.read_var_bytes()?);
                }
                any = any || !witness.is_empty();
                input.witness = witness;
            }
            if !any {
                return Err(DecodeError::InvalidValue(
                    "witness serialization without witness data",
                ));
            }
        }

        let lock_time = decoder.read_u32_le()?;
        Ok(Self {
            version,
            vin,
            vout,
            lock_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Transaction, TxIn, TxOut};
    use crate::outpoint::OutPoint;

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            vin: vec![TxIn::new(
                OutPoint {
                    hash: [0x11; 32],
                    index: 3,
                },
                vec![0x51],
            )],
            vout: vec![
                TxOut {
                    value: 50_000,
                    script_pubkey: vec![0x76, 0xa9],
                },
                TxOut {
                    value: 1,
                    script_pubkey: Vec::new(),
                },
            ],
            lock_time: 0,
        }
    }

    #[test]
    fn legacy_roundtrip() {
        let tx = sample_tx();
        let bytes = tx.consensus_encode();
        let decoded = Transaction::consensus_decode(&bytes).expect("decode");
        assert_eq!(decoded, tx);
    }

    #[test]
    fn witness_roundtrip_and_txid_ignores_witness() {
        let mut tx = sample_tx();
        let txid_before = tx.txid();
        tx.vin[0].witness = vec![vec![0xaa; 72], vec![0x02, 0x03]];

        let bytes = tx.consensus_encode();
        // Marker byte after the version distinguishes the encodings.
        assert_eq!(bytes[4], 0x00);
        assert_eq!(bytes[5], 0x01);

        let decoded = Transaction::consensus_decode(&bytes).expect("decode");
        assert_eq!(decoded, tx);
        assert_eq!(decoded.txid(), txid_before);
    }

    #[test]
    fn coinbase_detection() {
        let mut tx = sample_tx();
        assert!(!tx.is_coinbase());
        tx.vin = vec![TxIn::new(OutPoint::null(), vec![0x04])];
        assert!(tx.is_coinbase());
    }
}
