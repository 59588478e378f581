use crate::client::Ledger;
use crate::error::{Error, Result};
use crate::linker::{CollectionLinker, CREATOR_SHARE};
use crate::metadata::{metadata_args, AssetTemplate, FileEntry, GenericFile, MetadataDocument};
use crate::transaction::{mint_to_collection_instruction, signed_transaction};
use crate::types::Commitment;
use crate::uploader::Uploader;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::fmt::Display;
use thiserror::Error;

/// Input for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMintRequest {
    pub tree_address: Pubkey,
    pub collection_address: Pubkey,
    pub count: usize,
    pub asset_template: AssetTemplate,
}

impl BatchMintRequest {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::InvalidRequest("mint count must be at least 1".into()));
        }
        if self.asset_template.name.trim().is_empty() {
            return Err(Error::InvalidRequest("asset name must not be empty".into()));
        }
        Ok(())
    }
}

/// Audit entry for one confirmed mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintRecord {
    pub index: usize,
    #[serde(serialize_with = "as_base58")]
    pub signature: Signature,
    #[serde(serialize_with = "as_base58")]
    pub leaf_owner: Pubkey,
    pub verified_collection: bool,
    pub creator_share: u8,
    pub confirmed_at: DateTime<Utc>,
}

fn as_base58<T: Display, S: Serializer>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A batch stopped at `failed_index`; `records` holds the mints confirmed
/// before it.
#[derive(Error, Debug)]
#[error("batch halted at item {} after {} confirmed mint(s): {source}", .failed_index + 1, .records.len())]
pub struct BatchHalted {
    pub records: Vec<MintRecord>,
    pub failed_index: usize,
    #[source]
    pub source: Error,
}

/// Issues leaves one at a time against a provisioned tree
pub struct BatchIssuer<'a, L: Ledger, U: Uploader> {
    ledger: &'a L,
    uploader: &'a U,
    issuer: &'a Keypair,
    linker: CollectionLinker,
}

impl<'a, L: Ledger, U: Uploader> BatchIssuer<'a, L, U> {
    pub fn new(ledger: &'a L, uploader: &'a U, issuer: &'a Keypair, linker: CollectionLinker) -> Self {
        Self {
            ledger,
            uploader,
            issuer,
            linker,
        }
    }

    pub fn run(&self, request: &BatchMintRequest) -> std::result::Result<Vec<MintRecord>, BatchHalted> {
        self.run_with(request, |_| {})
    }

    /// Like `run`, calling `on_minted` after each confirmation
    pub fn run_with(
        &self,
        request: &BatchMintRequest,
        mut on_minted: impl FnMut(&MintRecord),
    ) -> std::result::Result<Vec<MintRecord>, BatchHalted> {
        let mut records = Vec::with_capacity(request.count);

        if let Err(source) = self.check_request(request) {
            return Err(BatchHalted {
                records,
                failed_index: 0,
                source,
            });
        }

        info!("minting {} leaves into tree {}", request.count, request.tree_address);
        for index in 0..request.count {
            info!("minting leaf {} of {}", index + 1, request.count);
            match self.mint_one(request, index) {
                Ok(record) => {
                    on_minted(&record);
                    records.push(record);
                }
                Err(source) => {
                    warn!("leaf {} of {} failed: {}", index + 1, request.count, source);
                    return Err(BatchHalted {
                        records,
                        failed_index: index,
                        source,
                    });
                }
            }
        }

        Ok(records)
    }

    fn check_request(&self, request: &BatchMintRequest) -> Result<()> {
        request.validate()?;
        if request.collection_address != self.linker.collection() {
            return Err(Error::InvalidRequest(format!(
                "request collection {} differs from configured collection {}",
                request.collection_address,
                self.linker.collection()
            )));
        }
        Ok(())
    }

    fn mint_one(&self, request: &BatchMintRequest, index: usize) -> Result<MintRecord> {
        let template = &request.asset_template;

        let image = self.upload_file(&template.image)?;
        let auxiliary = template
            .auxiliary_files
            .iter()
            .map(|path| self.upload_file(path))
            .collect::<Result<Vec<_>>>()?;

        let document = MetadataDocument::new(
            template.name.as_str(),
            template.description.as_str(),
            image,
            auxiliary,
            &template.traits,
        );
        let metadata_uri = self.uploader.upload_json(&serde_json::to_value(&document)?)?;

        let leaf_owner = self.issuer.pubkey();
        let metadata = self
            .linker
            .attach(metadata_args(template.name.as_str(), metadata_uri), leaf_owner);
        self.linker.verify(&metadata, leaf_owner)?;

        let instruction =
            mint_to_collection_instruction(request.tree_address, self.linker.collection(), leaf_owner, metadata);
        let blockhash = self.ledger.get_latest_blockhash()?;
        let tx = signed_transaction(&[instruction], &[self.issuer], blockhash)?;
        let signature = self.ledger.send_and_confirm(&tx, Commitment::Finalized)?;
        info!("leaf {} minted: {}", index + 1, signature);

        Ok(MintRecord {
            index,
            signature,
            leaf_owner,
            verified_collection: true,
            creator_share: CREATOR_SHARE,
            confirmed_at: Utc::now(),
        })
    }

    fn upload_file(&self, path: &std::path::Path) -> Result<FileEntry> {
        let file = GenericFile::from_path(path)?;
        let uri = self.uploader.upload(&file)?;
        Ok(FileEntry {
            content_type: file.content_type,
            uri,
        })
    }
}
