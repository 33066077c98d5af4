//! Raw transaction decoding.
//!
//! Parses the serialized transaction wire format (legacy and segwit) into a
//! typed [`Transaction`] bound to the session's [`Network`], so bytes decoded
//! for one network cannot be fed to a session bound to another. The txid is
//! computed over the non-witness serialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::{Amount, AmountError};
use crate::hash::{sha256d, Txid};
use crate::network::Network;

/// Errors from transaction decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TxError {
    #[error("invalid hex in raw transaction: {0}")]
    BadHex(#[from] hex::FromHexError),
    #[error("unexpected end of transaction data at byte {0}")]
    UnexpectedEof(usize),
    #[error("invalid segwit flag byte: {0:#04x}")]
    BadSegwitFlag(u8),
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),
    #[error("output value out of range: {0}")]
    ValueOutOfRange(#[from] AmountError),
}

/// Reference to the output being spent by an input.
///
/// Serializes to the `{"txid": ..., "vout": ...}` shape
/// `createrawtransaction` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction the spent output belongs to.
    pub txid: Txid,
    /// Index of the output within that transaction.
    pub vout: u32,
}

/// One transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Witness stack; empty for legacy inputs.
    pub witness: Vec<Vec<u8>>,
}

/// One transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Vec<u8>,
}

/// A decoded transaction bound to the network it was parsed for.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    version: i32,
    lock_time: u32,
    inputs: Vec<TxIn>,
    outputs: Vec<TxOut>,
    txid: Txid,
    network: Network,
    raw: Vec<u8>,
}

impl Transaction {
    /// Decode raw transaction bytes for `network`.
    pub fn from_raw(raw: Vec<u8>, network: Network) -> Result<Self, TxError> {
        let mut cursor = Cursor::new(&raw);

        let version = cursor.read_u32_le()? as i32;
        let mut count = cursor.read_varint()?;
        let segwit = count == 0;
        if segwit {
            let flag = cursor.read_u8()?;
            if flag != 0x01 {
                return Err(TxError::BadSegwitFlag(flag));
            }
            count = cursor.read_varint()?;
        }
        if count == 0 {
            return Err(TxError::NoInputs);
        }

        let mut inputs = Vec::with_capacity(cursor.bounded_len(count)?);
        for _ in 0..count {
            let mut txid_bytes = [0u8; 32];
            txid_bytes.copy_from_slice(cursor.read_bytes(32)?);
            let vout = cursor.read_u32_le()?;
            let script_sig = cursor.read_var_bytes()?.to_vec();
            let sequence = cursor.read_u32_le()?;
            inputs.push(TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_bytes(txid_bytes),
                    vout,
                },
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let out_count = cursor.read_varint()?;
        let mut outputs = Vec::with_capacity(cursor.bounded_len(out_count)?);
        for _ in 0..out_count {
            let sats = cursor.read_u64_le()?;
            let value = Amount::from_sat(i64::try_from(sats).map_err(|_| {
                TxError::ValueOutOfRange(AmountError::OutOfRange(i64::MAX))
            })?)?;
            let script_pubkey = cursor.read_var_bytes()?.to_vec();
            outputs.push(TxOut {
                value,
                script_pubkey,
            });
        }

        if segwit {
            for input in &mut inputs {
                let items = cursor.read_varint()?;
                let mut witness = Vec::with_capacity(cursor.bounded_len(items)?);
                for _ in 0..items {
                    witness.push(cursor.read_var_bytes()?.to_vec());
                }
                input.witness = witness;
            }
        }

        let lock_time = cursor.read_u32_le()?;
        let remaining = cursor.remaining();
        if remaining != 0 {
            return Err(TxError::TrailingBytes(remaining));
        }

        let txid = if segwit {
            Txid::from_bytes(sha256d(&strip_witness(
                version, lock_time, &inputs, &outputs,
            )))
        } else {
            Txid::from_bytes(sha256d(&raw))
        };

        Ok(Self {
            version,
            lock_time,
            inputs,
            outputs,
            txid,
            network,
            raw,
        })
    }

    /// Decode the hex wire form for `network`.
    pub fn from_hex(s: &str, network: Network) -> Result<Self, TxError> {
        Self::from_raw(hex::decode(s)?, network)
    }

    /// The transaction id, over the non-witness serialization.
    pub const fn txid(&self) -> Txid {
        self.txid
    }

    /// The network the transaction was decoded for.
    pub const fn network(&self) -> Network {
        self.network
    }

    pub const fn version(&self) -> i32 {
        self.version
    }

    pub const fn lock_time(&self) -> u32 {
        self.lock_time
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// The raw bytes the transaction was decoded from.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Hex wire form of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    /// Sum of all output values.
    pub fn total_output_value(&self) -> Result<Amount, AmountError> {
        self.outputs
            .iter()
            .try_fold(Amount::ZERO, |acc, out| acc.checked_add(out.value))
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("txid", &self.txid)
            .field("network", &self.network)
            .field("version", &self.version)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("lock_time", &self.lock_time)
            .finish()
    }
}

/// Re-serialize without the segwit marker, flag and witness data.
fn strip_witness(version: i32, lock_time: u32, inputs: &[TxIn], outputs: &[TxOut]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(version as u32).to_le_bytes());
    write_varint(&mut out, inputs.len() as u64);
    for input in inputs {
        out.extend_from_slice(input.previous_output.txid.as_bytes());
        out.extend_from_slice(&input.previous_output.vout.to_le_bytes());
        write_varint(&mut out, input.script_sig.len() as u64);
        out.extend_from_slice(&input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }
    write_varint(&mut out, outputs.len() as u64);
    for output in outputs {
        out.extend_from_slice(&(output.value.to_sat() as u64).to_le_bytes());
        write_varint(&mut out, output.script_pubkey.len() as u64);
        out.extend_from_slice(&output.script_pubkey);
    }
    out.extend_from_slice(&lock_time.to_le_bytes());
    out
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Sanity-check an element count against the bytes left to parse.
    fn bounded_len(&self, count: u64) -> Result<usize, TxError> {
        if count > self.remaining() as u64 {
            return Err(TxError::UnexpectedEof(self.pos));
        }
        Ok(count as usize)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], TxError> {
        if self.remaining() < len {
            return Err(TxError::UnexpectedEof(self.pos));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, TxError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32_le(&mut self) -> Result<u32, TxError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_u64_le(&mut self) -> Result<u64, TxError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.read_bytes(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_varint(&mut self) -> Result<u64, TxError> {
        match self.read_u8()? {
            0xfd => {
                let mut bytes = [0u8; 2];
                bytes.copy_from_slice(self.read_bytes(2)?);
                Ok(u16::from_le_bytes(bytes) as u64)
            }
            0xfe => Ok(self.read_u32_le()? as u64),
            0xff => self.read_u64_le(),
            small => Ok(small as u64),
        }
    }

    fn read_var_bytes(&mut self) -> Result<&'a [u8], TxError> {
        let len = self.read_varint()?;
        let len = self.bounded_len(len)?;
        self.read_bytes(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize a single-input, single-output transaction for tests.
    fn build_legacy(value_sat: u64) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes()); // version
        raw.push(1); // one input
        raw.extend_from_slice(&[0x11; 32]); // prev txid
        raw.extend_from_slice(&0u32.to_le_bytes()); // prev vout
        raw.push(2); // script_sig len
        raw.extend_from_slice(&[0x00, 0x51]);
        raw.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // sequence
        raw.push(1); // one output
        raw.extend_from_slice(&value_sat.to_le_bytes());
        raw.push(1); // script_pubkey len
        raw.push(0x51);
        raw.extend_from_slice(&0u32.to_le_bytes()); // lock time
        raw
    }

    /// Same transaction with a marker/flag and one witness item.
    fn build_segwit(value_sat: u64) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.push(0x00); // marker
        raw.push(0x01); // flag
        raw.push(1);
        raw.extend_from_slice(&[0x11; 32]);
        raw.extend_from_slice(&0u32.to_le_bytes());
        raw.push(0); // empty script_sig
        raw.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
        raw.push(1);
        raw.extend_from_slice(&value_sat.to_le_bytes());
        raw.push(1);
        raw.push(0x51);
        raw.push(1); // one witness item
        raw.push(3);
        raw.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        raw.extend_from_slice(&0u32.to_le_bytes());
        raw
    }

    #[test]
    fn decodes_legacy_transaction() {
        let raw = build_legacy(50 * 100_000_000);
        let tx = Transaction::from_raw(raw.clone(), Network::Regtest).unwrap();
        assert_eq!(tx.version(), 1);
        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.outputs().len(), 1);
        assert_eq!(tx.outputs()[0].value.to_sat(), 5_000_000_000);
        assert_eq!(tx.inputs()[0].previous_output.txid, Txid::from_bytes([0x11; 32]));
        assert!(!tx.has_witness());
        assert_eq!(tx.txid(), Txid::from_bytes(sha256d(&raw)));
        assert_eq!(tx.network(), Network::Regtest);
    }

    #[test]
    fn hex_roundtrip() {
        let raw = build_legacy(1000);
        let hex_form = hex::encode(&raw);
        let tx = Transaction::from_hex(&hex_form, Network::Mainnet).unwrap();
        assert_eq!(tx.to_hex(), hex_form);
    }

    #[test]
    fn segwit_txid_excludes_witness() {
        let segwit = Transaction::from_raw(build_segwit(1000), Network::Regtest).unwrap();
        assert!(segwit.has_witness());
        assert_eq!(segwit.inputs()[0].witness, vec![vec![0xaa, 0xbb, 0xcc]]);

        // The legacy twin (same fields, no script_sig difference aside) built
        // without witness data must hash to the segwit txid when script_sig
        // matches; compare against the stripped serialization directly.
        let stripped = strip_witness(
            segwit.version(),
            segwit.lock_time(),
            segwit.inputs(),
            segwit.outputs(),
        );
        assert_eq!(segwit.txid(), Txid::from_bytes(sha256d(&stripped)));
        assert_ne!(segwit.txid(), Txid::from_bytes(sha256d(segwit.raw())));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut raw = build_legacy(1000);
        raw.push(0x00);
        assert_eq!(
            Transaction::from_raw(raw, Network::Regtest),
            Err(TxError::TrailingBytes(1))
        );
    }

    #[test]
    fn rejects_truncated_input() {
        let raw = build_legacy(1000);
        let truncated = raw[..raw.len() - 6].to_vec();
        assert!(matches!(
            Transaction::from_raw(truncated, Network::Regtest),
            Err(TxError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn rejects_oversized_output_value() {
        let raw = build_legacy(21_000_001 * 100_000_000);
        assert!(matches!(
            Transaction::from_raw(raw, Network::Regtest),
            Err(TxError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_bad_segwit_flag() {
        let mut raw = build_segwit(1000);
        raw[5] = 0x02; // flag byte
        assert_eq!(
            Transaction::from_raw(raw, Network::Regtest),
            Err(TxError::BadSegwitFlag(0x02))
        );
    }
}
