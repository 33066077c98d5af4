//! Typed client for a node's JSON-RPC control interface.
//!
//! [`NodeClient`] owns one server session: the transport, the network the
//! session is bound to, and the lazily resolved server version. Every
//! operation funnels through [`NodeClient::call`], which serializes the
//! ordered parameter list, posts it over the transport and strictly
//! deserializes the result. The dispatcher itself never retries; waiting is
//! the pollers' job (see [`crate::poll`]).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use btckit_core::tx::OutPoint;
use btckit_core::{Address, Amount, BlockHash, Network, RpcConfig, Transaction, Txid};

use crate::envelope::{JsonRpcRequest, JsonRpcResponse};
use crate::error::{RpcError, TransportError};
use crate::poll::{HeightPoller, ReadinessPoller, WaitOutcome};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    AddressGroupingItem, BlockInfo, BlockchainInfo, ChainTip, NetworkInfo, RawAddressGrouping,
    RawTransactionInfo, SignedRawTransaction, TxOutInfo, UnspentOutput, UntypedReply, WalletInfo,
    WalletTransactionInfo,
};

/// First server version whose `generate` command replaced `setgenerate`.
const GENERATE_COMMAND_VERSION: u32 = 110_000;

/// A session against one node's control interface.
///
/// Cheap to share behind `&self`: concurrent calls are safe, and the only
/// mutable state is the write-once version cache (an idempotent atomic
/// store, so two racing first-calls are harmless).
pub struct NodeClient {
    transport: Arc<dyn Transport>,
    network: Network,
    /// Node version; 0 until first resolved.
    server_version: AtomicU32,
    next_id: AtomicU64,
}

impl NodeClient {
    /// Connect to the endpoint described by `config`.
    pub fn new(config: &RpcConfig) -> Result<Self, TransportError> {
        Ok(Self::with_transport(
            Arc::new(HttpTransport::new(config)?),
            config.network,
        ))
    }

    /// Build a session over an existing transport.
    pub fn with_transport(transport: Arc<dyn Transport>, network: Network) -> Self {
        Self {
            transport,
            network,
            server_version: AtomicU32::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// The network this session is bound to.
    pub const fn network(&self) -> Network {
        self.network
    }

    /// Dispatch one command: ordered params in, typed result out.
    ///
    /// Trailing `null` params are trimmed so omitted optionals are absent on
    /// the wire. A structurally mismatched result is a marshalling error,
    /// never a silent null; `R = Option<T>` is the explicit way to accept a
    /// null result.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        let body = serde_json::to_string(&request).map_err(RpcError::marshalling)?;

        debug!("rpc call {} (id {})", method, id);
        let response_body = self.transport.send_request(body).await?;

        let response: JsonRpcResponse = serde_json::from_str(&response_body)
            .map_err(|e| RpcError::Marshalling(format!("invalid response envelope: {e}")))?;
        if let Some(error) = response.error {
            return Err(RpcError::Status {
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| RpcError::Marshalling(format!("{method} result: {e}")))
    }

    // ---- Version-gated command selection ----

    /// The node's version number, resolved once per session via
    /// `getnetworkinfo` and cached immutably thereafter.
    pub async fn server_version(&self) -> Result<u32, RpcError> {
        let cached = self.server_version.load(Ordering::Relaxed);
        if cached != 0 {
            return Ok(cached);
        }
        let version = self.get_network_info().await?.version;
        self.server_version.store(version, Ordering::Relaxed);
        Ok(version)
    }

    /// Mine blocks (regtest), choosing the command variant the node's era
    /// supports. Callers never see the version check.
    pub async fn generate(&self, num_blocks: u32) -> Result<Vec<BlockHash>, RpcError> {
        if self.server_version().await? >= GENERATE_COMMAND_VERSION {
            self.call("generate", vec![arg(num_blocks)?]).await
        } else {
            self.set_generate(true, Some(i64::from(num_blocks))).await
        }
    }

    /// Turn block generation on or off (pre-`generate` nodes).
    pub async fn set_generate(
        &self,
        generate: bool,
        genproclimit: Option<i64>,
    ) -> Result<Vec<BlockHash>, RpcError> {
        let hashes: Option<Vec<BlockHash>> = self
            .call("setgenerate", vec![arg(generate)?, arg(genproclimit)?])
            .await?;
        Ok(hashes.unwrap_or_default())
    }

    // ---- Waiting ----

    /// Wait until the node answers RPC, absorbing the known startup-failure
    /// vocabulary. See [`ReadinessPoller`].
    pub async fn wait_for_server(&self, timeout: Duration) -> Result<WaitOutcome, RpcError> {
        ReadinessPoller::new(self, timeout).run().await
    }

    /// Wait until the chain reaches `height`. See [`HeightPoller`].
    pub async fn wait_for_block(
        &self,
        height: u64,
        timeout: Duration,
    ) -> Result<WaitOutcome, RpcError> {
        HeightPoller::new(self, height, timeout).run().await
    }

    // ---- Chain queries ----

    /// Number of blocks in the longest chain.
    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", vec![]).await
    }

    /// Hash of the block at `height` on the best chain.
    pub async fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError> {
        self.call("getblockhash", vec![arg(height)?]).await
    }

    /// Verbose information about the block with the given hash.
    pub async fn get_block_info(&self, hash: &BlockHash) -> Result<BlockInfo, RpcError> {
        self.call("getblock", vec![arg(hash)?, arg(true)?]).await
    }

    /// Verbose information about the block at `height`.
    pub async fn get_block_info_at(&self, height: u64) -> Result<BlockInfo, RpcError> {
        let hash = self.get_block_hash(height).await?;
        self.get_block_info(&hash).await
    }

    /// Raw serialized block bytes.
    pub async fn get_block_raw(&self, hash: &BlockHash) -> Result<Vec<u8>, RpcError> {
        let encoded: String = self.call("getblock", vec![arg(hash)?, arg(false)?]).await?;
        hex::decode(&encoded).map_err(RpcError::marshalling)
    }

    /// Current state of the block chain.
    pub async fn get_blockchain_info(&self) -> Result<BlockchainInfo, RpcError> {
        self.call("getblockchaininfo", vec![]).await
    }

    /// All known chain tips, including orphaned branches.
    pub async fn get_chain_tips(&self) -> Result<Vec<ChainTip>, RpcError> {
        self.call("getchaintips", vec![]).await
    }

    /// Permanently mark a block as invalid.
    pub async fn invalidate_block(&self, hash: &BlockHash) -> Result<(), RpcError> {
        self.call("invalidateblock", vec![arg(hash)?]).await
    }

    /// Undo [`Self::invalidate_block`] for a block and its descendants.
    pub async fn reconsider_block(&self, hash: &BlockHash) -> Result<(), RpcError> {
        self.call("reconsiderblock", vec![arg(hash)?]).await
    }

    // ---- Node queries ----

    /// The node's connection state and capabilities.
    pub async fn get_network_info(&self) -> Result<NetworkInfo, RpcError> {
        self.call("getnetworkinfo", vec![]).await
    }

    /// Add, remove or probe a peer.
    pub async fn add_node(&self, node: &str, command: &str) -> Result<(), RpcError> {
        self.call("addnode", vec![arg(node)?, arg(command)?]).await
    }

    /// Information about manually added peers. The reply shape is not
    /// documented across eras, so it stays untyped.
    pub async fn get_added_node_info(
        &self,
        details: bool,
        node: Option<&str>,
    ) -> Result<UntypedReply, RpcError> {
        self.call("getaddednodeinfo", vec![arg(details)?, arg(node)?])
            .await
    }

    // ---- Transactions ----

    /// Fetch and decode a transaction, bound to this session's network.
    pub async fn get_raw_transaction(&self, txid: &Txid) -> Result<Transaction, RpcError> {
        let encoded: String = self.call("getrawtransaction", vec![arg(txid)?]).await?;
        Transaction::from_hex(&encoded, self.network).map_err(RpcError::marshalling)
    }

    /// Verbose, already-decoded view of a transaction.
    pub async fn get_raw_transaction_info(
        &self,
        txid: &Txid,
    ) -> Result<RawTransactionInfo, RpcError> {
        self.call("getrawtransaction", vec![arg(txid)?, arg(1)?])
            .await
    }

    /// Assemble an unsigned transaction spending `inputs` to `outputs`.
    pub async fn create_raw_transaction(
        &self,
        inputs: &[OutPoint],
        outputs: &BTreeMap<Address, Amount>,
    ) -> Result<String, RpcError> {
        for address in outputs.keys() {
            self.check_address(address)?;
        }
        self.call("createrawtransaction", vec![arg(inputs)?, arg(outputs)?])
            .await
    }

    /// Sign the inputs of a raw transaction with wallet keys.
    pub async fn sign_raw_transaction(
        &self,
        unsigned_hex: &str,
    ) -> Result<SignedRawTransaction, RpcError> {
        self.call("signrawtransaction", vec![arg(unsigned_hex)?])
            .await
    }

    /// Broadcast a decoded transaction.
    ///
    /// Fails before touching the wire when the transaction was decoded for
    /// a different network than this session.
    pub async fn send_raw_transaction(
        &self,
        tx: &Transaction,
        allow_high_fees: Option<bool>,
    ) -> Result<Txid, RpcError> {
        if tx.network() != self.network {
            return Err(RpcError::Marshalling(format!(
                "transaction {} was decoded for {}, session is bound to {}",
                tx.txid(),
                tx.network(),
                self.network
            )));
        }
        self.send_raw_transaction_hex(&tx.to_hex(), allow_high_fees)
            .await
    }

    /// Broadcast an already-serialized transaction.
    pub async fn send_raw_transaction_hex(
        &self,
        tx_hex: &str,
        allow_high_fees: Option<bool>,
    ) -> Result<Txid, RpcError> {
        self.call(
            "sendrawtransaction",
            vec![arg(tx_hex)?, arg(allow_high_fees)?],
        )
        .await
    }

    /// Wallet view of one of its transactions.
    pub async fn get_transaction(&self, txid: &Txid) -> Result<WalletTransactionInfo, RpcError> {
        self.call("gettransaction", vec![arg(txid)?]).await
    }

    /// Details of an unspent output, or `None` once it is spent.
    pub async fn get_tx_out(
        &self,
        txid: &Txid,
        vout: u32,
        include_mempool: Option<bool>,
    ) -> Result<Option<TxOutInfo>, RpcError> {
        self.call(
            "gettxout",
            vec![arg(txid)?, arg(vout)?, arg(include_mempool)?],
        )
        .await
    }

    // ---- Wallet ----

    /// A fresh receiving address, validated against the session network.
    pub async fn get_new_address(&self, account: Option<&str>) -> Result<Address, RpcError> {
        let encoded: String = self.call("getnewaddress", vec![arg(account)?]).await?;
        self.parse_address(&encoded)
    }

    /// Wallet balance; `account`/`min_conf` are optional trailing params.
    pub async fn get_balance(
        &self,
        account: Option<&str>,
        min_conf: Option<u32>,
    ) -> Result<Amount, RpcError> {
        self.call("getbalance", vec![arg(account)?, arg(min_conf)?])
            .await
    }

    /// Balance not yet confirmed in a block.
    pub async fn get_unconfirmed_balance(&self) -> Result<Amount, RpcError> {
        self.call("getunconfirmedbalance", vec![]).await
    }

    /// Total received by `address`, with at least `min_conf` confirmations
    /// (the node defaults to one).
    pub async fn get_received_by_address(
        &self,
        address: &Address,
        min_conf: Option<u32>,
    ) -> Result<Amount, RpcError> {
        self.check_address(address)?;
        self.call(
            "getreceivedbyaddress",
            vec![arg(address)?, arg(min_conf)?],
        )
        .await
    }

    /// Send `amount` to `address` from the wallet.
    pub async fn send_to_address(
        &self,
        address: &Address,
        amount: Amount,
        comment: Option<&str>,
        comment_to: Option<&str>,
    ) -> Result<Txid, RpcError> {
        self.check_address(address)?;
        self.call(
            "sendtoaddress",
            vec![arg(address)?, arg(amount)?, arg(comment)?, arg(comment_to)?],
        )
        .await
    }

    /// Send to several recipients in one transaction.
    pub async fn send_many(
        &self,
        account: &str,
        amounts: &BTreeMap<Address, Amount>,
    ) -> Result<Txid, RpcError> {
        for address in amounts.keys() {
            self.check_address(address)?;
        }
        self.call("sendmany", vec![arg(account)?, arg(amounts)?])
            .await
    }

    /// Set the wallet's transaction fee per kB.
    pub async fn set_tx_fee(&self, amount: Amount) -> Result<bool, RpcError> {
        self.call("settxfee", vec![arg(amount)?]).await
    }

    /// Unspent outputs, optionally bounded by confirmations and filtered by
    /// address.
    pub async fn list_unspent(
        &self,
        min_conf: Option<u32>,
        max_conf: Option<u32>,
        addresses: Option<&[Address]>,
    ) -> Result<Vec<UnspentOutput>, RpcError> {
        if let Some(filter) = addresses {
            for address in filter {
                self.check_address(address)?;
            }
        }
        self.call(
            "listunspent",
            vec![arg(min_conf)?, arg(max_conf)?, arg(addresses)?],
        )
        .await
    }

    /// Account balances known to the wallet.
    pub async fn list_accounts(&self) -> Result<BTreeMap<String, Amount>, RpcError> {
        self.call("listaccounts", vec![]).await
    }

    /// Address groupings the wallet has linked through common ownership.
    ///
    /// The wire shape is positional nested arrays; each entry is decoded
    /// into a typed record and its address validated for this network.
    pub async fn list_address_groupings(
        &self,
    ) -> Result<Vec<Vec<AddressGroupingItem>>, RpcError> {
        let raw: Vec<Vec<RawAddressGrouping>> =
            self.call("listaddressgroupings", vec![]).await?;
        raw.into_iter()
            .map(|grouping| {
                grouping
                    .into_iter()
                    .map(|item| {
                        Ok(AddressGroupingItem {
                            address: self.parse_address(&item.address)?,
                            amount: item.amount,
                            account: item.account,
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Wallet state summary.
    pub async fn get_wallet_info(&self) -> Result<WalletInfo, RpcError> {
        self.call("getwalletinfo", vec![]).await
    }

    // ---- Help ----

    /// Human-readable help, for one command or the full list.
    pub async fn help(&self, command: Option<&str>) -> Result<String, RpcError> {
        self.call("help", vec![arg(command)?]).await
    }

    /// Command names parsed out of the node's help listing.
    pub async fn list_commands(&self) -> Result<Vec<String>, RpcError> {
        let listing = self.help(None).await?;
        Ok(listing
            .lines()
            .filter(|line| !line.is_empty() && !is_category_header(line))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }

    /// Whether the node knows `command`, judged from its help output.
    pub async fn command_exists(&self, command: &str) -> Result<bool, RpcError> {
        let help = self.help(Some(command)).await?;
        Ok(!help.contains("help: unknown command"))
    }

    // ---- Internal helpers ----

    fn parse_address(&self, encoded: &str) -> Result<Address, RpcError> {
        Address::from_base58(encoded, self.network).map_err(RpcError::marshalling)
    }

    fn check_address(&self, address: &Address) -> Result<(), RpcError> {
        if !address.network().base58_matches(self.network) {
            return Err(RpcError::Marshalling(format!(
                "address {} belongs to {}, session is bound to {}",
                address,
                address.network(),
                self.network
            )));
        }
        Ok(())
    }
}

/// Serialize one positional parameter. `None` becomes `null` and is trimmed
/// later if it turns out to be trailing.
fn arg<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::marshalling)
}

/// Matches the `== Category ==` section headers in help output.
fn is_category_header(line: &str) -> bool {
    line.len() > 6 && line.starts_with("== ") && line.ends_with(" ==")
}
