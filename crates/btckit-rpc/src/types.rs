//! Typed response records for node commands.
//!
//! Field names mirror the wire JSON. Amounts and hashes deserialize through
//! the exact domain types; a field the node may omit is an `Option`. The
//! positional `listaddressgroupings` shape gets its own record with a
//! sequence visitor instead of an untyped tree, and genuinely undocumented
//! replies are wrapped in the distinct [`UntypedReply`] so they cannot be
//! mistaken for a typed result.

use std::fmt;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use btckit_core::{Address, Amount, BlockHash, Txid};

/// Reply from `getblockchaininfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockchainInfo {
    /// Chain name as the node reports it: "main", "test" or "regtest".
    pub chain: String,
    pub blocks: u64,
    pub headers: Option<u64>,
    pub bestblockhash: BlockHash,
    pub difficulty: f64,
    pub mediantime: Option<u64>,
    pub verificationprogress: Option<f64>,
    pub initialblockdownload: Option<bool>,
    pub pruned: Option<bool>,
}

/// Reply from `getnetworkinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInfo {
    /// Node software version, e.g. 230000. This is the capability number
    /// the version-gated command selection keys on.
    pub version: u32,
    pub subversion: String,
    pub protocolversion: u32,
    pub localservices: Option<String>,
    pub timeoffset: Option<i64>,
    pub connections: Option<u32>,
    pub networkactive: Option<bool>,
    pub relayfee: Option<Amount>,
}

/// Reply from `getwalletinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletInfo {
    pub walletname: Option<String>,
    pub walletversion: u32,
    pub balance: Amount,
    pub unconfirmed_balance: Amount,
    pub immature_balance: Amount,
    pub txcount: u64,
    pub keypoololdest: Option<u64>,
    pub keypoolsize: Option<u64>,
    pub keypoolsize_hd_internal: Option<u64>,
    pub paytxfee: Option<Amount>,
    pub hdmasterkeyid: Option<String>,
}

/// Reply from `getblock` with verbose output.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockInfo {
    pub hash: BlockHash,
    /// -1 for blocks off the active chain.
    pub confirmations: i64,
    pub size: u64,
    pub height: u64,
    pub version: i64,
    pub merkleroot: Txid,
    pub tx: Vec<Txid>,
    pub time: u64,
    pub mediantime: Option<u64>,
    pub nonce: u64,
    pub bits: String,
    pub difficulty: f64,
    pub chainwork: Option<String>,
    pub previousblockhash: Option<BlockHash>,
    pub nextblockhash: Option<BlockHash>,
}

/// One entry from `getchaintips`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: BlockHash,
    pub branchlen: u64,
    /// "active", "valid-fork", "headers-only", ...
    pub status: String,
}

/// One entry from `listunspent`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnspentOutput {
    pub txid: Txid,
    pub vout: u32,
    /// Encoded address; validate against the session network before use.
    pub address: Option<String>,
    pub account: Option<String>,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    #[serde(rename = "redeemScript")]
    pub redeem_script: Option<String>,
    pub amount: Amount,
    pub confirmations: u64,
    pub spendable: Option<bool>,
    pub solvable: Option<bool>,
}

/// Script details inside `gettxout` and verbose transaction replies.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptPubKeyInfo {
    pub asm: String,
    pub hex: String,
    #[serde(rename = "reqSigs")]
    pub req_sigs: Option<u32>,
    #[serde(rename = "type")]
    pub script_type: String,
    pub addresses: Option<Vec<String>>,
}

/// Reply from `gettxout`; the node answers null for a spent output, which
/// the client surfaces as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct TxOutInfo {
    pub bestblock: BlockHash,
    pub confirmations: u64,
    pub value: Amount,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyInfo,
    pub coinbase: bool,
}

/// One movement inside a wallet transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletTxDetail {
    pub account: Option<String>,
    pub address: Option<String>,
    /// "send", "receive", "generate", "immature", "orphan"
    pub category: String,
    pub amount: Amount,
    pub vout: Option<u32>,
    pub fee: Option<Amount>,
}

/// Reply from `gettransaction`.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletTransactionInfo {
    pub amount: Amount,
    /// Negative: the debit paid by this wallet.
    pub fee: Option<Amount>,
    pub confirmations: i64,
    pub generated: Option<bool>,
    pub blockhash: Option<BlockHash>,
    pub blockindex: Option<u64>,
    pub blocktime: Option<u64>,
    pub txid: Txid,
    pub time: u64,
    pub timereceived: Option<u64>,
    #[serde(default)]
    pub details: Vec<WalletTxDetail>,
    pub hex: Option<String>,
}

/// One input of a verbose raw transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTxIn {
    /// Absent on coinbase inputs.
    pub txid: Option<Txid>,
    pub vout: Option<u32>,
    pub coinbase: Option<String>,
    #[serde(rename = "scriptSig")]
    pub script_sig: Option<ScriptSigInfo>,
    pub sequence: u32,
}

/// Signature script of a verbose input.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSigInfo {
    pub asm: String,
    pub hex: String,
}

/// One output of a verbose raw transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTxOut {
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyInfo,
}

/// Reply from `getrawtransaction` with verbose output.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionInfo {
    pub hex: Option<String>,
    pub txid: Txid,
    pub version: u32,
    pub locktime: u32,
    pub vin: Vec<RawTxIn>,
    pub vout: Vec<RawTxOut>,
    pub blockhash: Option<BlockHash>,
    pub confirmations: Option<u64>,
    pub time: Option<u64>,
    pub blocktime: Option<u64>,
}

/// Reply from `signrawtransaction`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedRawTransaction {
    pub hex: String,
    pub complete: bool,
}

/// One `listaddressgroupings` element as it appears on the wire: a
/// positional array of address, amount and optional account label.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAddressGrouping {
    pub address: String,
    pub amount: Amount,
    pub account: Option<String>,
}

impl<'de> Deserialize<'de> for RawAddressGrouping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupingVisitor;

        impl<'de> Visitor<'de> for GroupingVisitor {
            type Value = RawAddressGrouping;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an [address, amount, account?] array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let address: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let amount: Amount = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let account: Option<String> = seq.next_element()?;
                // Drain anything a newer node might append.
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(RawAddressGrouping {
                    address,
                    amount,
                    account,
                })
            }
        }

        deserializer.deserialize_seq(GroupingVisitor)
    }
}

/// A `listaddressgroupings` entry with the address validated against the
/// session network.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressGroupingItem {
    pub address: Address,
    pub amount: Amount,
    pub account: Option<String>,
}

/// A reply shape this client does not model.
///
/// Deliberately distinct from every typed record so a caller can never
/// mistake an unparsed tree for a typed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UntypedReply(pub Value);
