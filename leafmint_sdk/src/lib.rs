pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod estimator;
pub mod issuer;
pub mod keypair;
pub mod linker;
pub mod metadata;
pub mod planner;
pub mod provisioner;
pub mod transaction;
pub mod types;
pub mod uploader;

pub use client::{Ledger, LedgerClient, SimulationResponse};
pub use collection::{CollectionCreator, CollectionReceipt, CollectionRequest};
pub use config::{Config, ConfigValidation, Workflow};
pub use error::{Error, Result};
pub use estimator::{CostEstimator, SimulationResult};
pub use issuer::{BatchHalted, BatchIssuer, BatchMintRequest, MintRecord};
pub use keypair::load_keypair;
pub use linker::CollectionLinker;
pub use metadata::{metadata_args, parse_traits, AssetTemplate, Trait};
pub use planner::{plan, TreeShape, TreeSpecification};
pub use provisioner::{ExecutionMode, ProvisioningReport, ProvisioningState, TreeProvisioner};
pub use types::{parse_address, Commitment, Lamports};
pub use uploader::{HttpUploader, Uploader};

pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::{Keypair, Signature, Signer};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{Ledger, LedgerClient};
    pub use crate::config::{Config, Workflow};
    pub use crate::error::{Error, Result};
    pub use crate::issuer::{BatchIssuer, BatchMintRequest, MintRecord};
    pub use crate::keypair::load_keypair;
    pub use crate::linker::CollectionLinker;
    pub use crate::planner::TreeSpecification;
    pub use crate::provisioner::{ExecutionMode, TreeProvisioner};
    pub use crate::types::*;
    pub use crate::uploader::{HttpUploader, Uploader};
    pub use solana_sdk::pubkey::Pubkey;
    pub use solana_sdk::signature::{Keypair, Signature, Signer};
}
