//! Off-ledger metadata documents and the on-ledger metadata arguments that
//! point at them.

use crate::error::{Error, Result};
use mpl_bubblegum::types::{MetadataArgs, TokenProgramVersion, TokenStandard};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Royalty carried by every mint (5%)
pub const SELLER_FEE_BASIS_POINTS: u16 = 500;

/// Single `trait_type: value` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub trait_type: String,
    pub value: String,
}

impl Trait {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.trait_type.is_empty() && !self.value.is_empty()
    }
}

/// Parse `Key:Value` pairs separated by commas. Entries missing either a
/// key or a value are dropped.
pub fn parse_traits(raw: &str) -> Vec<Trait> {
    raw.split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(':').map(str::trim);
            let trait_type = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            let t = Trait::new(trait_type, value);
            t.is_complete().then_some(t)
        })
        .collect()
}

/// Drop incomplete traits from an already-structured list
pub fn filter_traits(traits: &[Trait]) -> Vec<Trait> {
    traits.iter().filter(|t| t.is_complete()).cloned().collect()
}

/// Guess a MIME type from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        Some("gb") | Some("gbc") => "application/x-gb-rom",
        _ => "application/octet-stream",
    }
}

/// File contents ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl GenericFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| Error::Upload(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

/// Entry of `properties.files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "type")]
    pub content_type: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub files: Vec<FileEntry>,
}

/// JSON document describing one minted leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Trait>,
    pub properties: Properties,
    pub symbol: String,
}

impl MetadataDocument {
    /// `image` is listed first in `properties.files`, followed by the
    /// auxiliary files in order.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: FileEntry,
        auxiliary: Vec<FileEntry>,
        traits: &[Trait],
    ) -> Self {
        let image_uri = image.uri.clone();
        let mut files = Vec::with_capacity(1 + auxiliary.len());
        files.push(image);
        files.extend(auxiliary);

        Self {
            name: name.into(),
            description: description.into(),
            image: image_uri,
            attributes: filter_traits(traits),
            properties: Properties {
                category: Some("image".to_string()),
                files,
            },
            symbol: String::new(),
        }
    }
}

/// JSON document describing a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDocument {
    pub name: String,
    pub image: String,
    pub external_url: String,
    pub properties: Properties,
}

impl CollectionDocument {
    pub fn new(name: impl Into<String>, image: FileEntry, external_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.uri.clone(),
            external_url: external_url.into(),
            properties: Properties {
                category: None,
                files: vec![image],
            },
        }
    }
}

/// On-ledger arguments for a leaf pointing at `uri`, with no collection or
/// creators attached yet
pub fn metadata_args(name: impl Into<String>, uri: impl Into<String>) -> MetadataArgs {
    MetadataArgs {
        name: name.into(),
        symbol: String::new(),
        uri: uri.into(),
        seller_fee_basis_points: SELLER_FEE_BASIS_POINTS,
        primary_sale_happened: false,
        is_mutable: true,
        edition_nonce: None,
        token_standard: Some(TokenStandard::NonFungible),
        collection: None,
        uses: None,
        token_program_version: TokenProgramVersion::Original,
        creators: Vec::new(),
    }
}

/// Inputs shared by every item of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTemplate {
    pub name: String,
    pub description: String,
    pub image: PathBuf,
    pub auxiliary_files: Vec<PathBuf>,
    pub traits: Vec<Trait>,
}
