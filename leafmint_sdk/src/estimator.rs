use crate::client::Ledger;
use crate::error::Result;
use crate::planner::TreeSpecification;
use crate::transaction::{create_tree_instructions, tree_account_size, unsigned_transaction};
use crate::types::Lamports;
use log::{info, warn};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

/// Outcome of a simulated tree creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Balance the funding account would spend
    pub predicted_cost: Option<Lamports>,
    /// Ledger diagnostic when the simulation was rejected
    pub error: Option<String>,
    pub logs: Vec<String>,
}

impl SimulationResult {
    fn rejected(error: String, logs: Vec<String>) -> Self {
        Self {
            predicted_cost: None,
            error: Some(error),
            logs,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Rent for the planned tree account, then the instructions creating it
pub fn tree_creation<L: Ledger>(ledger: &L, spec: &TreeSpecification, payer: Pubkey) -> Result<Vec<Instruction>> {
    let space = tree_account_size(&spec.shape());
    let rent = ledger.get_minimum_balance_for_rent_exemption(space as usize)?;
    Ok(create_tree_instructions(spec, payer, rent.0))
}

/// Predicts tree-creation cost by simulating against current ledger state
pub struct CostEstimator<'a, L: Ledger> {
    ledger: &'a L,
}

impl<'a, L: Ledger> CostEstimator<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    /// Simulate creating `spec` paid by `payer`. A rejected simulation is
    /// returned in the result, not raised; only failing to read the
    /// starting balance, the rent or a blockhash is an error.
    pub fn estimate(&self, spec: &TreeSpecification, payer: Pubkey) -> Result<SimulationResult> {
        let before = self.ledger.get_balance(&payer)?;
        let instructions = tree_creation(self.ledger, spec, payer)?;
        let blockhash = self.ledger.get_latest_blockhash()?;
        let tx = unsigned_transaction(&instructions, payer, blockhash);

        let response = match self.ledger.simulate_transaction(&tx, &[payer]) {
            Ok(response) => response,
            Err(e) => {
                warn!("tree creation simulation failed: {}", e);
                return Ok(SimulationResult::rejected(e.to_string(), Vec::new()));
            }
        };

        let logs = response.logs.unwrap_or_default();
        if let Some(err) = response.err {
            warn!("tree creation simulation rejected: {}", err);
            return Ok(SimulationResult::rejected(err, logs));
        }

        let after = response
            .accounts
            .and_then(|accounts| accounts.into_iter().next())
            .flatten();

        match after {
            Some(account) => {
                let cost = before.saturating_sub(Lamports(account.lamports));
                info!("simulated tree creation costs {}", cost);
                Ok(SimulationResult {
                    predicted_cost: Some(cost),
                    error: None,
                    logs,
                })
            }
            None => Ok(SimulationResult::rejected(
                "simulation returned no state for the funding account".to_string(),
                logs,
            )),
        }
    }
}
