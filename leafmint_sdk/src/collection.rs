use crate::client::Ledger;
use crate::error::{Error, Result};
use crate::metadata::{CollectionDocument, FileEntry, GenericFile};
use crate::transaction::{create_collection_instruction, signed_transaction};
use crate::types::Commitment;
use crate::uploader::Uploader;
use log::info;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub image: PathBuf,
    pub name: String,
    pub external_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReceipt {
    pub collection_address: Pubkey,
    pub metadata_uri: String,
    pub signature: Signature,
}

/// Creates a sized collection that compressed leaves are verified into
pub struct CollectionCreator<'a, L: Ledger, U: Uploader> {
    ledger: &'a L,
    uploader: &'a U,
    authority: &'a Keypair,
}

impl<'a, L: Ledger, U: Uploader> CollectionCreator<'a, L, U> {
    pub fn new(ledger: &'a L, uploader: &'a U, authority: &'a Keypair) -> Self {
        Self {
            ledger,
            uploader,
            authority,
        }
    }

    pub fn create(&self, request: &CollectionRequest) -> Result<CollectionReceipt> {
        if request.name.trim().is_empty() {
            return Err(Error::InvalidRequest("collection name must not be empty".into()));
        }

        let image = GenericFile::from_path(&request.image)?;
        let image_uri = self.uploader.upload(&image)?;
        let document = CollectionDocument::new(
            request.name.as_str(),
            FileEntry {
                content_type: image.content_type,
                uri: image_uri,
            },
            request.external_url.as_str(),
        );
        let metadata_uri = self.uploader.upload_json(&serde_json::to_value(&document)?)?;

        let collection = Keypair::new();
        info!("creating collection {}", collection.pubkey());

        let instruction = create_collection_instruction(
            collection.pubkey(),
            self.authority.pubkey(),
            request.name.as_str(),
            metadata_uri.as_str(),
        );
        let blockhash = self.ledger.get_latest_blockhash()?;
        let tx = signed_transaction(&[instruction], &[self.authority, &collection], blockhash)?;
        let signature = self.ledger.send_and_confirm(&tx, Commitment::Confirmed)?;

        Ok(CollectionReceipt {
            collection_address: collection.pubkey(),
            metadata_uri,
            signature,
        })
    }
}
