use crate::error::{Error, Result};
use crate::types::{Commitment, Lamports};
use log::{debug, info};
use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSimulateTransactionAccountsConfig, RpcSimulateTransactionConfig};
use solana_client::rpc_response::RpcSimulateTransactionResult;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

/// Account state reported by a simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedAccount {
    pub lamports: u64,
}

/// Ledger answer to a simulation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationResponse {
    /// Present when the ledger rejected the transaction
    pub err: Option<String>,
    pub logs: Option<Vec<String>>,
    /// Post-simulation state of the requested accounts, same order
    pub accounts: Option<Vec<Option<SimulatedAccount>>>,
}

impl From<RpcSimulateTransactionResult> for SimulationResponse {
    fn from(result: RpcSimulateTransactionResult) -> Self {
        SimulationResponse {
            err: result.err.map(|e| e.to_string()),
            logs: result.logs,
            accounts: result.accounts.map(|accounts| {
                accounts
                    .into_iter()
                    .map(|account| account.map(|a| SimulatedAccount { lamports: a.lamports }))
                    .collect()
            }),
        }
    }
}

/// Ledger operations the provisioning and issuance flows depend on.
/// Every call is a blocking round trip.
pub trait Ledger {
    fn get_balance(&self, address: &Pubkey) -> Result<Lamports>;

    fn get_latest_blockhash(&self) -> Result<Hash>;

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<Lamports>;

    /// Execute without committing or verifying signatures. `accounts`
    /// selects which post-state accounts are returned.
    fn simulate_transaction(&self, tx: &Transaction, accounts: &[Pubkey]) -> Result<SimulationResponse>;

    /// Submit once and block until `commitment` is reached
    fn send_and_confirm(&self, tx: &Transaction, commitment: Commitment) -> Result<Signature>;
}

/// Blocking JSON-RPC client for a ledger node
pub struct LedgerClient {
    rpc: RpcClient,
}

impl LedgerClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_client(RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()))
    }

    /// Wrap an already configured RPC client
    pub fn with_client(rpc: RpcClient) -> Self {
        LedgerClient { rpc }
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

impl Ledger for LedgerClient {
    fn get_balance(&self, address: &Pubkey) -> Result<Lamports> {
        Ok(Lamports(self.rpc.get_balance(address)?))
    }

    fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash()?)
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<Lamports> {
        Ok(Lamports(self.rpc.get_minimum_balance_for_rent_exemption(data_len)?))
    }

    fn simulate_transaction(&self, tx: &Transaction, accounts: &[Pubkey]) -> Result<SimulationResponse> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::confirmed()),
            accounts: Some(RpcSimulateTransactionAccountsConfig {
                encoding: Some(UiAccountEncoding::Base64),
                addresses: accounts.iter().map(Pubkey::to_string).collect(),
            }),
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .rpc
            .simulate_transaction_with_config(tx, config)
            .map_err(|e| Error::Simulation(e.to_string()))?;
        debug!("simulation ran at slot {}", response.context.slot);
        Ok(response.value.into())
    }

    fn send_and_confirm(&self, tx: &Transaction, commitment: Commitment) -> Result<Signature> {
        if !tx.is_signed() {
            return Err(Error::Transaction("refusing to submit an unsigned transaction".into()));
        }

        info!("submitting transaction, awaiting {}", commitment);
        let signature = self
            .rpc
            .send_and_confirm_transaction_with_spinner_and_commitment(tx, commitment.into())
            .map_err(|e| Error::Transaction(e.to_string()))?;
        info!("transaction {} reached {}", signature, commitment);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use solana_sdk::signature::{Keypair, Signer};
    use solana_sdk::system_instruction;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned JSON-RPC `result` per request, in order, returning
    /// the request bodies received. `getVersion` calls are answered on the side.
    fn rpc_node(results: Vec<Value>) -> (String, thread::JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let total = results.len();
            let mut results = results.into_iter();
            let mut requests = Vec::new();
            while requests.len() < total {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    if let Some(value) = lower.strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).unwrap();
                let request: Value = serde_json::from_slice(&body).unwrap();

                let result = if request["method"] == "getVersion" {
                    json!({"solana-core": "1.18.26", "feature-set": 0})
                } else {
                    requests.push(request.clone());
                    results.next().unwrap()
                };

                let reply = json!({"jsonrpc": "2.0", "id": request["id"], "result": result}).to_string();
                let mut stream = reader.into_inner();
                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                )
                .unwrap();
            }
            requests
        });

        (url, handle)
    }

    #[test]
    fn test_balance_is_a_json_rpc_call() {
        let (url, node) = rpc_node(vec![json!({"context": {"slot": 7}, "value": 42})]);
        let payer = Pubkey::new_unique();

        let balance = LedgerClient::new(url).get_balance(&payer).unwrap();
        assert_eq!(balance, Lamports(42));

        let requests = node.join().unwrap();
        assert_eq!(requests[0]["method"], "getBalance");
        assert_eq!(requests[0]["params"][0], payer.to_string());
    }

    #[test]
    fn test_simulation_requests_payer_state_without_sig_verify() {
        let (url, node) = rpc_node(vec![json!({
            "context": {"slot": 7},
            "value": {
                "err": null,
                "logs": ["Program log: ok"],
                "accounts": [{
                    "lamports": 900,
                    "data": ["", "base64"],
                    "owner": "11111111111111111111111111111111",
                    "executable": false,
                    "rentEpoch": 0,
                    "space": 0
                }],
                "unitsConsumed": 150,
                "returnData": null
            }
        })]);

        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 100);
        let tx = crate::transaction::unsigned_transaction(&[ix], payer.pubkey(), Hash::new_unique());

        let response = LedgerClient::new(url)
            .simulate_transaction(&tx, &[payer.pubkey()])
            .unwrap();
        assert!(response.err.is_none());
        assert_eq!(response.logs, Some(vec!["Program log: ok".to_string()]));
        assert_eq!(response.accounts, Some(vec![Some(SimulatedAccount { lamports: 900 })]));

        let requests = node.join().unwrap();
        let request = &requests[0];
        assert_eq!(request["method"], "simulateTransaction");
        assert_eq!(request["params"][1]["sigVerify"], false);
        assert_eq!(request["params"][1]["replaceRecentBlockhash"], true);
        assert_eq!(request["params"][1]["accounts"]["addresses"][0], payer.pubkey().to_string());
    }

    #[test]
    fn test_unreachable_node_fails_simulation() {
        // port 9 (discard) on localhost is not expected to serve HTTP
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = crate::transaction::unsigned_transaction(&[ix], payer.pubkey(), Hash::new_unique());

        let result = LedgerClient::new("http://127.0.0.1:9").simulate_transaction(&tx, &[payer.pubkey()]);
        assert!(matches!(result, Err(Error::Simulation(_))));
    }

    #[test]
    fn test_unsigned_submission_refused() {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = crate::transaction::unsigned_transaction(&[ix], payer.pubkey(), Hash::new_unique());

        let result = LedgerClient::new("http://127.0.0.1:9").send_and_confirm(&tx, Commitment::Finalized);
        assert!(matches!(result, Err(Error::Transaction(_))));
    }

    #[test]
    fn test_simulation_result_conversion() {
        let result: RpcSimulateTransactionResult = serde_json::from_value(json!({
            "err": "AccountNotFound",
            "logs": ["Program failed"],
            "accounts": [null]
        }))
        .unwrap();

        let response = SimulationResponse::from(result);
        assert!(response.err.is_some());
        assert_eq!(response.accounts, Some(vec![None]));
    }
}
