// tests/common/mod.rs
// In-memory ledger and uploader that record every call
#![allow(dead_code)]

use leafmint_sdk::client::{SimulatedAccount, SimulationResponse};
use leafmint_sdk::metadata::GenericFile;
use leafmint_sdk::{Commitment, Error, Lamports, Ledger, Result, Uploader};
use serde_json::Value;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    Balance,
    Blockhash,
    Rent(usize),
    Simulate,
    Submit(Commitment),
}

pub struct MockLedger {
    pub balance: u64,
    /// Rent-exempt minimum returned for any size
    pub rent: u64,
    /// Balance the payer is left with after simulation
    pub simulated_balance: Option<u64>,
    pub simulation_error: Option<String>,
    pub simulation_logs: Vec<String>,
    /// Fail the simulate call itself
    pub simulation_unreachable: bool,
    /// Submission number (1-based) that fails
    pub fail_submission: Option<usize>,
    pub calls: RefCell<Vec<LedgerCall>>,
    pub submitted: RefCell<Vec<Transaction>>,
}

impl MockLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            rent: 222_000_000,
            simulated_balance: None,
            simulation_error: None,
            simulation_logs: Vec::new(),
            simulation_unreachable: false,
            fail_submission: None,
            calls: RefCell::new(Vec::new()),
            submitted: RefCell::new(Vec::new()),
        }
    }

    pub fn count(&self, call: &LedgerCall) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn submissions(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, LedgerCall::Submit(_)))
            .count()
    }
}

impl Ledger for MockLedger {
    fn get_balance(&self, _address: &Pubkey) -> Result<Lamports> {
        self.calls.borrow_mut().push(LedgerCall::Balance);
        Ok(Lamports(self.balance))
    }

    fn get_latest_blockhash(&self) -> Result<Hash> {
        self.calls.borrow_mut().push(LedgerCall::Blockhash);
        Ok(BLOCKHASH)
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<Lamports> {
        self.calls.borrow_mut().push(LedgerCall::Rent(data_len));
        Ok(Lamports(self.rent))
    }

    fn simulate_transaction(&self, tx: &Transaction, accounts: &[Pubkey]) -> Result<SimulationResponse> {
        self.calls.borrow_mut().push(LedgerCall::Simulate);
        assert!(!tx.is_signed(), "simulation must use an unsigned transaction");
        assert_eq!(accounts.len(), 1);

        if self.simulation_unreachable {
            return Err(Error::Simulation("503 Service Unavailable".into()));
        }

        Ok(SimulationResponse {
            err: self.simulation_error.clone(),
            logs: Some(self.simulation_logs.clone()),
            accounts: Some(vec![self.simulated_balance.map(|lamports| SimulatedAccount { lamports })]),
        })
    }

    fn send_and_confirm(&self, tx: &Transaction, commitment: Commitment) -> Result<Signature> {
        self.calls.borrow_mut().push(LedgerCall::Submit(commitment));
        let n = self.submissions();
        if self.fail_submission == Some(n) {
            return Err(Error::Transaction(format!("submission {} rejected", n)));
        }

        assert!(tx.is_signed(), "submitted transactions must be signed");
        assert_eq!(tx.message.recent_blockhash, BLOCKHASH);
        self.submitted.borrow_mut().push(tx.clone());
        Ok(tx.signatures[0])
    }
}

pub const BLOCKHASH: Hash = Hash::new_from_array([7u8; 32]);

/// Instructions in `tx` addressed to `program`
pub fn instructions_for<'a>(tx: &'a Transaction, program: &Pubkey) -> Vec<&'a CompiledInstruction> {
    tx.message
        .instructions
        .iter()
        .filter(|ix| tx.message.account_keys[ix.program_id_index as usize] == *program)
        .collect()
}

/// Accounts referenced by `ix`, resolved against the message keys
pub fn instruction_accounts(tx: &Transaction, ix: &CompiledInstruction) -> Vec<Pubkey> {
    ix.accounts
        .iter()
        .map(|i| tx.message.account_keys[*i as usize])
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadCall {
    File(String),
    Json(Value),
}

#[derive(Default)]
pub struct MockUploader {
    pub calls: RefCell<Vec<UploadCall>>,
    /// Upload number (1-based, files and JSON together) that fails
    pub fail_upload: Option<usize>,
    counter: Cell<usize>,
}

impl MockUploader {
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_upload: Some(n),
            ..Self::default()
        }
    }

    pub fn json_documents(&self) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                UploadCall::Json(v) => Some(v.clone()),
                UploadCall::File(_) => None,
            })
            .collect()
    }

    fn next(&self) -> Result<usize> {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        if self.fail_upload == Some(n) {
            return Err(Error::Upload(format!("upload {} refused", n)));
        }
        Ok(n)
    }
}

impl Uploader for MockUploader {
    fn upload(&self, file: &GenericFile) -> Result<String> {
        let n = self.next()?;
        self.calls.borrow_mut().push(UploadCall::File(file.file_name.clone()));
        Ok(format!("https://gateway.test/{}/{}", n, file.file_name))
    }

    fn upload_json(&self, document: &Value) -> Result<String> {
        let n = self.next()?;
        self.calls.borrow_mut().push(UploadCall::Json(document.clone()));
        Ok(format!("https://gateway.test/{}.json", n))
    }
}

/// Image and ROM files on disk for a batch template
pub struct AssetFiles {
    pub dir: tempfile::TempDir,
    pub image: PathBuf,
    pub rom: PathBuf,
}

pub fn asset_files() -> AssetFiles {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cart.png");
    let rom = dir.path().join("game.gb");
    std::fs::write(&image, b"\x89PNG fake").unwrap();
    std::fs::write(&rom, b"rom bytes").unwrap();
    AssetFiles { dir, image, rom }
}
