//! Wire-shape tests over the public API: realistic node replies
//! deserialized into the typed records.

use btckit_core::{Amount, BlockHash, Txid};
use btckit_rpc::types::{
    BlockInfo, ChainTip, RawTransactionInfo, SignedRawTransaction, UnspentOutput, UntypedReply,
    WalletTransactionInfo,
};

fn block_info_json(previousblockhash: &str) -> String {
    format!(
        r#"{{
        "hash": "00000000011725cd2c05ca49474aca2c56d6d14849119cf87ef2a111482d705b",
        "confirmations": 12,
        "size": 285,
        "height": 1325894,
        "version": 536870912,
        "merkleroot": "dd4bf1feb8187be1b389a387b66d5410ebf3d39af83f1cefa95e9ab633e95305",
        "tx": ["dd4bf1feb8187be1b389a387b66d5410ebf3d39af83f1cefa95e9ab633e95305"],
        "time": 1518728999,
        "mediantime": 1518725029,
        "nonce": 3604864536,
        "bits": "1d00ffff",
        "difficulty": 1,
        "chainwork": "000000000000000000000000000000000000000000000029b61b9b6d2cf7f1ae",
        "previousblockhash": "{previousblockhash}"
    }}"#
    )
}

#[test]
fn truncated_hash_is_a_marshalling_error() {
    // A hash cut short must fail deserialization, not pass as a silent null.
    let json = block_info_json("000000000005c3cee2a0b2dbeb604a2b");
    assert!(serde_json::from_str::<BlockInfo>(&json).is_err());
}

#[test]
fn block_info_from_node_reply() {
    let json =
        block_info_json("000000000005c3cee2a0b2dbeb604a2b3ab9b27b681070a4e358a912ff247c8a");
    let block: BlockInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(block.height, 1_325_894);
    assert_eq!(block.tx.len(), 1);
    assert_eq!(block.tx[0], block.merkleroot);
    assert_eq!(
        block.previousblockhash,
        Some(
            BlockHash::from_hex("000000000005c3cee2a0b2dbeb604a2b3ab9b27b681070a4e358a912ff247c8a")
                .unwrap()
        )
    );
    assert_eq!(block.nextblockhash, None);
}

#[test]
fn chain_tips_list() {
    let json = r#"[
        {
            "height": 1325894,
            "hash": "00000000011725cd2c05ca49474aca2c56d6d14849119cf87ef2a111482d705b",
            "branchlen": 0,
            "status": "active"
        },
        {
            "height": 1325800,
            "hash": "000000000005c3cee2a0b2dbeb604a2b3ab9b27b681070a4e358a912ff247c8a",
            "branchlen": 3,
            "status": "valid-fork"
        }
    ]"#;
    let tips: Vec<ChainTip> = serde_json::from_str(json).unwrap();
    assert_eq!(tips.len(), 2);
    assert_eq!(tips[0].status, "active");
    assert_eq!(tips[1].branchlen, 3);
}

#[test]
fn unspent_output_amount_is_exact() {
    let json = r#"{
        "txid": "51f5fc604bce4a50815b1e4c90ac267702883b0ac09a5a95b25be3c208620c81",
        "vout": 1,
        "address": "2N3kYabjh6THxGUcgfnHBxwqmFiYfmyaND4",
        "scriptPubKey": "a91472495b0a24a08676b81a2d0d07bbb7864a29e98487",
        "amount": 0.03579871,
        "confirmations": 6421,
        "spendable": true,
        "solvable": true
    }"#;
    let output: UnspentOutput = serde_json::from_str(json).unwrap();
    assert_eq!(output.amount.to_sat(), 3_579_871);
    assert_eq!(output.vout, 1);
    assert_eq!(output.redeem_script, None);
}

#[test]
fn wallet_transaction_with_negative_fee() {
    let json = r#"{
        "amount": -0.10000000,
        "fee": -0.00002260,
        "confirmations": 2,
        "blockhash": "00000000011725cd2c05ca49474aca2c56d6d14849119cf87ef2a111482d705b",
        "blockindex": 1,
        "blocktime": 1518728999,
        "txid": "d092a2217bac43c5d735ac048aa957ae683eb94727a3bdcdda2ffa75cc65d8c3",
        "time": 1518728563,
        "timereceived": 1518728563,
        "details": [
            {
                "account": "",
                "address": "2N8jx97VfGX3vVPWM74vYMiCwebc5kwemY8",
                "category": "send",
                "amount": -0.10000000,
                "vout": 0,
                "fee": -0.00002260
            }
        ],
        "hex": "0100000001"
    }"#;
    let tx: WalletTransactionInfo = serde_json::from_str(json).unwrap();
    assert_eq!(tx.amount.to_sat(), -10_000_000);
    assert_eq!(tx.fee.unwrap().to_sat(), -2_260);
    assert_eq!(tx.details.len(), 1);
    assert_eq!(tx.details[0].category, "send");
}

#[test]
fn raw_transaction_info_with_coinbase_input() {
    let json = r#"{
        "txid": "dd4bf1feb8187be1b389a387b66d5410ebf3d39af83f1cefa95e9ab633e95305",
        "version": 1,
        "locktime": 0,
        "vin": [
            {
                "coinbase": "0346391400",
                "sequence": 4294967295
            }
        ],
        "vout": [
            {
                "value": 50.00000000,
                "n": 0,
                "scriptPubKey": {
                    "asm": "OP_DUP OP_HASH160",
                    "hex": "76a914",
                    "reqSigs": 1,
                    "type": "pubkeyhash",
                    "addresses": ["mfWxJ45yp2SFn7UciZyNpvDKrzbhyfKrY8"]
                }
            }
        ],
        "confirmations": 10
    }"#;
    let info: RawTransactionInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.vin[0].txid, None);
    assert_eq!(info.vin[0].coinbase.as_deref(), Some("0346391400"));
    assert_eq!(info.vout[0].value, Amount::from_btc_str("50").unwrap());
    assert_eq!(info.vout[0].script_pub_key.script_type, "pubkeyhash");
    assert_eq!(
        info.txid,
        Txid::from_hex("dd4bf1feb8187be1b389a387b66d5410ebf3d39af83f1cefa95e9ab633e95305").unwrap()
    );
}

#[test]
fn signed_transaction_reply() {
    let json = r#"{"hex": "01000000000102", "complete": false}"#;
    let signed: SignedRawTransaction = serde_json::from_str(json).unwrap();
    assert!(!signed.complete);
    assert_eq!(signed.hex, "01000000000102");
}

#[test]
fn untyped_reply_carries_the_raw_tree() {
    let json = r#"[{"addednode": "10.0.1.175:18333", "connected": true}]"#;
    let reply: UntypedReply = serde_json::from_str(json).unwrap();
    assert!(reply.0.is_array());
    assert_eq!(reply.0[0]["addednode"], "10.0.1.175:18333");
}
