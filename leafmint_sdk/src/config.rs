// Process configuration: named settings with eager, per-workflow validation

use crate::error::{Error, Result};
use crate::types::parse_address;
use solana_sdk::pubkey::Pubkey;
use log::{error, info, warn};
use std::path::PathBuf;

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_KEY_PATH: &str = "KEY_PATH";
pub const ENV_UPLOAD_URL: &str = "UPLOAD_URL";
pub const ENV_MERKLE_TREE: &str = "MERKLE_TREE_PUBKEY";
pub const ENV_COLLECTION: &str = "COLLECTION";

/// Command entry points; each has its own required settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    CreateCollection,
    CreateTree,
    MintNfts,
}

impl Workflow {
    fn needs_uploads(self) -> bool {
        matches!(self, Workflow::CreateCollection | Workflow::MintNfts)
    }

    fn needs_collection(self) -> bool {
        matches!(self, Workflow::MintNfts)
    }
}

/// Validation result for configuration checks
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn log_summary(&self) {
        for w in &self.warnings {
            warn!("config: {}", w);
        }
        for e in &self.errors {
            error!("config: {}", e);
        }
        if self.is_valid() && self.warnings.is_empty() {
            info!("configuration validation passed");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Ledger node endpoint
    pub rpc_url: Option<String>,
    /// Keypair file of the paying and issuing identity
    pub key_path: Option<PathBuf>,
    /// Asset upload gateway, see `uploader::HttpUploader`
    pub upload_url: Option<String>,
    /// Previously provisioned tree; prompted for when absent
    pub merkle_tree: Option<String>,
    /// Collection every mint is linked to
    pub collection: Option<String>,
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Config {
            rpc_url: get(ENV_RPC_URL),
            key_path: get(ENV_KEY_PATH).map(PathBuf::from),
            upload_url: get(ENV_UPLOAD_URL),
            merkle_tree: get(ENV_MERKLE_TREE),
            collection: get(ENV_COLLECTION),
        }
    }

    /// Check every setting `workflow` relies on
    pub fn validate(&self, workflow: Workflow) -> ConfigValidation {
        let mut validation = ConfigValidation::default();

        match &self.rpc_url {
            Some(url) => check_endpoint(&mut validation, ENV_RPC_URL, url),
            None => validation.add_error(format!("{} is not set", ENV_RPC_URL)),
        }

        match &self.key_path {
            Some(path) if !path.is_file() => {
                validation.add_error(format!("{} points to a missing file: {}", ENV_KEY_PATH, path.display()))
            }
            Some(_) => {}
            None => validation.add_error(format!("{} is not set", ENV_KEY_PATH)),
        }

        if workflow.needs_uploads() {
            match &self.upload_url {
                Some(url) => check_endpoint(&mut validation, ENV_UPLOAD_URL, url),
                None => validation.add_error(format!("{} is not set", ENV_UPLOAD_URL)),
            }
        }

        if workflow.needs_collection() {
            match &self.collection {
                Some(c) if parse_address(c).is_err() => {
                    validation.add_error(format!("{} is not a valid address: {}", ENV_COLLECTION, c))
                }
                Some(_) => {}
                None => validation.add_error(format!(
                    "{} is not set. Set {} to your collection public key",
                    ENV_COLLECTION, ENV_COLLECTION
                )),
            }
        }

        if workflow == Workflow::MintNfts {
            if let Some(tree) = &self.merkle_tree {
                if parse_address(tree).is_err() {
                    validation.add_error(format!("{} is not a valid address: {}", ENV_MERKLE_TREE, tree));
                }
            }
        }

        validation
    }

    /// Validate and fail with a configuration error naming every problem
    pub fn require(&self, workflow: Workflow) -> Result<()> {
        let validation = self.validate(workflow);
        validation.log_summary();

        if validation.is_valid() {
            Ok(())
        } else {
            Err(Error::Configuration(validation.errors.join("; ")))
        }
    }

    pub fn rpc_url(&self) -> Result<&str> {
        self.rpc_url
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_RPC_URL)))
    }

    pub fn key_path(&self) -> Result<&PathBuf> {
        self.key_path
            .as_ref()
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_KEY_PATH)))
    }

    pub fn upload_url(&self) -> Result<&str> {
        self.upload_url
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_UPLOAD_URL)))
    }

    pub fn merkle_tree(&self) -> Result<Option<Pubkey>> {
        self.merkle_tree.as_deref().map(parse_address).transpose()
    }
}

fn check_endpoint(validation: &mut ConfigValidation, name: &str, url: &str) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        validation.add_error(format!("{} must be an http(s) URL: {}", name, url));
        return;
    }

    let local = url.contains("://localhost") || url.contains("://127.0.0.1");
    if url.starts_with("http://") && !local {
        validation.add_warning(format!("{} uses plain HTTP on a remote host: {}", name, url));
    }
}
