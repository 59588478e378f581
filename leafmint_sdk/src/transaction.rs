//! Program instructions issued by the provisioning, issuance and collection
//! flows, and the transactions that carry them.

use crate::error::{Error, Result};
use crate::planner::{TreeShape, TreeSpecification};
use mpl_bubblegum::accounts::TreeConfig;
use mpl_bubblegum::instructions::{CreateTreeConfigBuilder, MintToCollectionV1Builder};
use mpl_bubblegum::types::MetadataArgs;
use mpl_token_metadata::accounts::{MasterEdition, Metadata};
use mpl_token_metadata::instructions::CreateV1Builder;
use mpl_token_metadata::types::{CollectionDetails, PrintSupply, TokenStandard};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use solana_sdk::{pubkey, system_instruction};

pub const SPL_ACCOUNT_COMPRESSION_PROGRAM_ID: Pubkey = pubkey!("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK");
pub const SPL_NOOP_PROGRAM_ID: Pubkey = pubkey!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV");
pub const SPL_TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

// Concurrent merkle tree account layout: account type byte plus the
// versioned header, then the tree body, then the canopy.
const TREE_HEADER_SIZE: u64 = 2 + 54;
const TREE_BODY_FIXED_SIZE: u64 = 3 * 8;
const NODE_SIZE: u64 = 32;

/// Bytes the merkle tree account needs for `shape`
pub fn tree_account_size(shape: &TreeShape) -> u64 {
    let depth = u64::from(shape.max_depth);
    let buffer = u64::from(shape.max_buffer_size);

    // each change log holds a root, a path and a u32 index padded to 8
    let change_log = NODE_SIZE + depth * NODE_SIZE + 8;
    // rightmost proof: path, leaf, u32 index padded to 8
    let rightmost_path = depth * NODE_SIZE + NODE_SIZE + 8;
    let canopy = ((1u64 << (shape.canopy_depth + 1)) - 2) * NODE_SIZE;

    TREE_HEADER_SIZE + TREE_BODY_FIXED_SIZE + buffer * change_log + rightmost_path + canopy
}

/// Allocate the tree account and register it with the bubblegum program.
/// `rent` must cover `tree_account_size` of the planned shape.
pub fn create_tree_instructions(spec: &TreeSpecification, payer: Pubkey, rent: u64) -> Vec<Instruction> {
    let tree = spec.tree_address();
    let (tree_config, _) = TreeConfig::find_pda(&tree);

    let allocate = system_instruction::create_account(
        &payer,
        &tree,
        rent,
        tree_account_size(&spec.shape()),
        &SPL_ACCOUNT_COMPRESSION_PROGRAM_ID,
    );
    let create_tree = CreateTreeConfigBuilder::new()
        .tree_config(tree_config)
        .merkle_tree(tree)
        .payer(payer)
        .tree_creator(payer)
        .log_wrapper(SPL_NOOP_PROGRAM_ID)
        .compression_program(SPL_ACCOUNT_COMPRESSION_PROGRAM_ID)
        .max_depth(spec.max_depth())
        .max_buffer_size(spec.max_buffer_size())
        .public(false)
        .instruction();

    vec![allocate, create_tree]
}

/// Mint one leaf owned by `issuer` into `tree`, verified into `collection`.
/// `issuer` pays, created the tree and holds the collection authority.
pub fn mint_to_collection_instruction(
    tree: Pubkey,
    collection: Pubkey,
    issuer: Pubkey,
    metadata: MetadataArgs,
) -> Instruction {
    let (tree_config, _) = TreeConfig::find_pda(&tree);
    let (collection_metadata, _) = Metadata::find_pda(&collection);
    let (collection_edition, _) = MasterEdition::find_pda(&collection);

    MintToCollectionV1Builder::new()
        .tree_config(tree_config)
        .leaf_owner(issuer)
        .leaf_delegate(issuer)
        .merkle_tree(tree)
        .payer(issuer)
        .tree_creator_or_delegate(issuer)
        .collection_authority(issuer)
        .collection_authority_record_pda(None)
        .collection_mint(collection)
        .collection_metadata(collection_metadata)
        .collection_edition(collection_edition)
        .log_wrapper(SPL_NOOP_PROGRAM_ID)
        .compression_program(SPL_ACCOUNT_COMPRESSION_PROGRAM_ID)
        .token_metadata_program(mpl_token_metadata::ID)
        .metadata(metadata)
        .instruction()
}

/// Create a sized collection record at `collection` with `authority` as
/// mint and update authority
pub fn create_collection_instruction(collection: Pubkey, authority: Pubkey, name: &str, uri: &str) -> Instruction {
    let (metadata, _) = Metadata::find_pda(&collection);
    let (master_edition, _) = MasterEdition::find_pda(&collection);

    CreateV1Builder::new()
        .metadata(metadata)
        .master_edition(Some(master_edition))
        .mint(collection, true)
        .authority(authority)
        .payer(authority)
        .update_authority(authority, true)
        .spl_token_program(Some(SPL_TOKEN_PROGRAM_ID))
        .name(name.to_string())
        .uri(uri.to_string())
        .seller_fee_basis_points(0)
        .token_standard(TokenStandard::NonFungible)
        .collection_details(CollectionDetails::V1 { size: 0 })
        .print_supply(PrintSupply::Zero)
        .instruction()
}

/// Transaction carrying no signatures, for simulation only
pub fn unsigned_transaction(instructions: &[Instruction], payer: Pubkey, blockhash: Hash) -> Transaction {
    Transaction::new_unsigned(Message::new_with_blockhash(instructions, Some(&payer), &blockhash))
}

/// Sign with every required signer; the fee payer must be first in
/// `signers`. A missing or unexpected signer is an error.
pub fn signed_transaction(
    instructions: &[Instruction],
    signers: &[&Keypair],
    blockhash: Hash,
) -> Result<Transaction> {
    let payer = signers
        .first()
        .map(|kp| kp.pubkey())
        .ok_or_else(|| Error::Signing("no fee payer".into()))?;

    let mut tx = Transaction::new_with_payer(instructions, Some(&payer));
    tx.try_sign(signers, blockhash)
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(tx)
}
