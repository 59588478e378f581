// tests/collection.rs

mod common;

use common::{asset_files, instruction_accounts, instructions_for, MockLedger, MockUploader, UploadCall};
use leafmint_sdk::{CollectionCreator, CollectionRequest, Commitment, Error, Keypair, Signer};
use mpl_token_metadata::accounts::Metadata;

#[test]
fn creates_sized_collection_signed_by_new_mint() {
    let files = asset_files();
    let ledger = MockLedger::new(0);
    let uploader = MockUploader::default();
    let authority = Keypair::new();

    let receipt = CollectionCreator::new(&ledger, &uploader, &authority)
        .create(&CollectionRequest {
            image: files.image.clone(),
            name: "Carts".into(),
            external_url: "https://carts.example".into(),
        })
        .unwrap();

    assert_eq!(uploader.calls.borrow()[0], UploadCall::File("cart.png".into()));
    let doc = &uploader.json_documents()[0];
    assert_eq!(doc["externalUrl"], "https://carts.example");
    assert_eq!(doc["properties"]["files"][0]["type"], "image/png");

    assert_eq!(ledger.count(&common::LedgerCall::Submit(Commitment::Confirmed)), 1);
    let submitted = ledger.submitted.borrow();
    let tx = &submitted[0];
    assert_eq!(tx.message.account_keys[0], authority.pubkey());

    // authority pays, the fresh collection mint co-signs
    assert_eq!(tx.signatures.len(), 2);
    let signers = &tx.message.account_keys[..tx.message.header.num_required_signatures as usize];
    assert!(signers.contains(&receipt.collection_address));

    let creates = instructions_for(tx, &mpl_token_metadata::ID);
    assert_eq!(creates.len(), 1);
    let accounts = instruction_accounts(tx, creates[0]);
    assert!(accounts.contains(&receipt.collection_address));
    assert!(accounts.contains(&Metadata::find_pda(&receipt.collection_address).0));

    let uri = receipt.metadata_uri.as_bytes();
    assert!(creates[0].data.windows(uri.len()).any(|w| w == uri));
}

#[test]
fn empty_name_is_rejected() {
    let files = asset_files();
    let ledger = MockLedger::new(0);
    let uploader = MockUploader::default();
    let authority = Keypair::new();

    let result = CollectionCreator::new(&ledger, &uploader, &authority).create(&CollectionRequest {
        image: files.image.clone(),
        name: " ".into(),
        external_url: String::new(),
    });

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
    assert!(uploader.calls.borrow().is_empty());
}
