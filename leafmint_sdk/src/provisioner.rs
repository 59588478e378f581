use crate::client::Ledger;
use crate::error::{Error, Result};
use crate::estimator::{tree_creation, CostEstimator, SimulationResult};
use crate::planner::TreeSpecification;
use crate::transaction::signed_transaction;
use crate::types::Commitment;
use log::info;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::fmt;

/// Whether a provisioning run may commit funds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    DryRun,
    Production,
}

impl ExecutionMode {
    pub fn from_prod_flag(prod: bool) -> Self {
        if prod {
            ExecutionMode::Production
        } else {
            ExecutionMode::DryRun
        }
    }
}

/// Planned → Simulated → DryRunComplete | Committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Planned,
    Simulated,
    DryRunComplete,
    Committed,
}

impl ProvisioningState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisioningState::DryRunComplete | ProvisioningState::Committed)
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Summary of a finished provisioning run
#[derive(Debug, Clone)]
pub struct ProvisioningReport {
    pub spec: TreeSpecification,
    pub simulation: SimulationResult,
    pub state: ProvisioningState,
    /// Set only when the tree was committed
    pub signature: Option<Signature>,
}

pub struct TreeProvisioner<'a, L: Ledger> {
    ledger: &'a L,
    spec: TreeSpecification,
    mode: ExecutionMode,
    state: ProvisioningState,
    simulation: Option<SimulationResult>,
    signature: Option<Signature>,
}

impl<'a, L: Ledger> TreeProvisioner<'a, L> {
    pub fn new(ledger: &'a L, spec: TreeSpecification, mode: ExecutionMode) -> Self {
        Self {
            ledger,
            spec,
            mode,
            state: ProvisioningState::Planned,
            simulation: None,
            signature: None,
        }
    }

    pub fn state(&self) -> ProvisioningState {
        self.state
    }

    pub fn spec(&self) -> &TreeSpecification {
        &self.spec
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }

    /// Run the cost estimate. Valid once, from Planned.
    pub fn simulate(&mut self, payer: Pubkey) -> Result<&SimulationResult> {
        if self.state != ProvisioningState::Planned {
            return Err(self.invalid("simulate"));
        }

        let result = CostEstimator::new(self.ledger).estimate(&self.spec, payer)?;
        self.state = ProvisioningState::Simulated;
        let result = self.simulation.insert(result);
        Ok(&*result)
    }

    /// Finish a simulated run. Dry runs stop without touching the ledger;
    /// production runs submit the tree and wait for confirmation. A failed
    /// commit leaves the state at Simulated.
    pub fn complete(&mut self, payer: &Keypair, tree: &Keypair) -> Result<ProvisioningState> {
        if self.state != ProvisioningState::Simulated {
            return Err(self.invalid("complete"));
        }

        match self.mode {
            ExecutionMode::DryRun => {
                info!("dry run: skipping creation of tree {}", self.spec.tree_address());
                self.state = ProvisioningState::DryRunComplete;
            }
            ExecutionMode::Production => {
                let signature = self.commit(payer, tree)?;
                self.signature = Some(signature);
                self.state = ProvisioningState::Committed;
            }
        }

        Ok(self.state)
    }

    fn commit(&self, payer: &Keypair, tree: &Keypair) -> Result<Signature> {
        if tree.pubkey() != self.spec.tree_address() {
            return Err(Error::Signing(format!(
                "tree keypair {} does not match planned tree {}",
                tree.pubkey(),
                self.spec.tree_address()
            )));
        }

        info!("creating tree {}", self.spec.tree_address());
        let instructions = tree_creation(self.ledger, &self.spec, payer.pubkey())?;
        let blockhash = self.ledger.get_latest_blockhash()?;
        let tx = signed_transaction(&instructions, &[payer, tree], blockhash)?;

        self.ledger
            .send_and_confirm(&tx, Commitment::Confirmed)
            .map_err(|e| match e {
                Error::Transaction(_) => e,
                other => Error::Transaction(other.to_string()),
            })
    }

    /// Drive the run from Planned to a terminal state
    pub fn provision(mut self, payer: &Keypair, tree: &Keypair) -> Result<ProvisioningReport> {
        self.simulate(payer.pubkey())?;
        self.complete(payer, tree)?;
        self.into_report()
    }

    pub fn into_report(self) -> Result<ProvisioningReport> {
        let state = self.state;
        match self.simulation {
            Some(simulation) if state.is_terminal() => Ok(ProvisioningReport {
                spec: self.spec,
                simulation,
                state,
                signature: self.signature,
            }),
            _ => Err(Error::InvalidTransition {
                action: "report",
                state: state.to_string(),
            }),
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
    }
}
