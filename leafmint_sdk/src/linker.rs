use crate::error::{Error, Result};
use crate::types::parse_address;
use mpl_bubblegum::types::{Collection, Creator, MetadataArgs};
use solana_sdk::pubkey::Pubkey;

/// Share assigned to the sole creator
pub const CREATOR_SHARE: u8 = 100;

/// Links every mint to one collection and one verified creator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionLinker {
    collection: Pubkey,
}

impl CollectionLinker {
    pub fn new(collection: Pubkey) -> Self {
        Self { collection }
    }

    /// Build from the configured collection setting. Absent or malformed
    /// values are configuration errors.
    pub fn from_setting(setting: Option<&str>) -> Result<Self> {
        let raw = setting
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Configuration(
                    "COLLECTION is not set. Set COLLECTION to your collection public key".into(),
                )
            })?;

        let collection = parse_address(raw)
            .map_err(|_| Error::Configuration(format!("COLLECTION is not a valid address: {}", raw)))?;
        Ok(Self { collection })
    }

    pub fn collection(&self) -> Pubkey {
        self.collection
    }

    /// Attach the collection and `issuer` as sole creator. The collection
    /// goes in unverified; the mint instruction verifies it on the ledger.
    pub fn attach(&self, mut metadata: MetadataArgs, issuer: Pubkey) -> MetadataArgs {
        metadata.collection = Some(Collection {
            verified: false,
            key: self.collection,
        });
        metadata.creators = vec![Creator {
            address: issuer,
            verified: true,
            share: CREATOR_SHARE,
        }];
        metadata
    }

    /// Check `metadata` carries this collection and exactly one verified
    /// creator equal to `issuer` holding the full share.
    pub fn verify(&self, metadata: &MetadataArgs, issuer: Pubkey) -> Result<()> {
        if metadata.collection.as_ref().map(|c| c.key) != Some(self.collection) {
            return Err(Error::InvalidRequest(format!(
                "mint is not linked to collection {}",
                self.collection
            )));
        }

        match metadata.creators.as_slice() {
            [creator] if creator.address == issuer && creator.verified && creator.share == CREATOR_SHARE => Ok(()),
            creators => Err(Error::InvalidRequest(format!(
                "expected one verified creator {} with share {}, found {:?}",
                issuer, CREATOR_SHARE, creators
            ))),
        }
    }
}
