mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use leafmint_sdk::{
    load_keypair, parse_address, parse_traits, plan, AssetTemplate, BatchIssuer, BatchMintRequest,
    CollectionCreator, CollectionLinker, CollectionRequest, Config, ExecutionMode, HttpUploader, Keypair,
    LedgerClient, ProvisioningState, Signer, TreeProvisioner, TreeSpecification, Workflow,
};
use prompt::Prompter;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "leafmint")]
#[command(about = "Provision compressed-leaf trees and batch mint into them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a collection that accepts compressed mints
    CreateCollection,

    /// Plan and create a merkle tree (dry run unless --prod)
    CreateTree {
        /// Submit the tree for real instead of only simulating it
        #[arg(short, long)]
        prod: bool,
    },

    /// Mint compressed NFTs into an existing tree
    MintNfts,
}

fn main() -> ExitCode {
    // RUST_LOG may come from .env
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let workflow = match cli.command {
        Commands::CreateCollection => Workflow::CreateCollection,
        Commands::CreateTree { .. } => Workflow::CreateTree,
        Commands::MintNfts => Workflow::MintNfts,
    };

    if let Err(e) = config.require(workflow) {
        eprintln!("{}", format!("Error: {}", e).red());
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::CreateCollection => create_collection(&config),
        Commands::CreateTree { prod } => create_tree(&config, ExecutionMode::from_prod_flag(prod)),
        Commands::MintNfts => mint_nfts(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

fn load_signer(config: &Config) -> Result<Keypair> {
    let path = config.key_path()?;
    load_keypair(path).with_context(|| format!("Failed to load keypair from {}", path.display()))
}

fn create_collection(config: &Config) -> Result<()> {
    let signer = load_signer(config)?;
    let ledger = LedgerClient::new(config.rpc_url()?);
    let uploader = HttpUploader::new(config.upload_url()?);
    let mut prompter = Prompter::stdio();

    let image = prompter.ask_path("Enter the file path for the collection image: ")?;
    let name = prompter.ask("Enter the collection name: ")?;
    let external_url = prompter.ask("Enter the external URL for the collection: ")?;

    println!("{}", "Creating collection...".cyan());
    let receipt = CollectionCreator::new(&ledger, &uploader, &signer).create(&CollectionRequest {
        image,
        name,
        external_url,
    })?;

    println!("\n{}", "Collection created!".green().bold());
    println!("{}: {}", "Public Key".bright_white(), receipt.collection_address.to_string().cyan());
    println!("{}: {}", "Metadata".bright_white(), receipt.metadata_uri);
    println!("{}: {}", "Signature".bright_white(), receipt.signature.to_string().bright_black());
    println!("{}", "Set COLLECTION to this public key before minting.".yellow());
    Ok(())
}

fn create_tree(config: &Config, mode: ExecutionMode) -> Result<()> {
    let signer = load_signer(config)?;
    let ledger = LedgerClient::new(config.rpc_url()?);
    let mut prompter = Prompter::stdio();

    let tree = Keypair::new();
    println!("{}: {}", "Merkle Tree Public Key".bright_white(), tree.pubkey().to_string().cyan());
    println!("{}", "Store this address as you will need it later.".yellow());

    let requested = prompter.ask_count("How many NFTs do you want to mint? ")?;
    let spec = TreeSpecification::new(tree.pubkey(), plan(requested)?);
    println!(
        "Tree parameters: maxDepth={}, maxBufferSize={}, canopyDepth={}",
        spec.max_depth(),
        spec.max_buffer_size(),
        spec.canopy_depth()
    );

    let mut provisioner = TreeProvisioner::new(&ledger, spec, mode);
    let simulation = provisioner.simulate(signer.pubkey())?;
    match (&simulation.error, simulation.predicted_cost) {
        (Some(err), _) => {
            println!("{}", format!("Simulation error: {}", err).red());
            for line in &simulation.logs {
                println!("  {}", line.bright_black());
            }
        }
        (None, Some(cost)) => {
            println!("{}: {}", "Amount of SOL needed to create merkle tree".bright_white(), cost.to_string().green());
        }
        (None, None) => println!("{}", "Simulation returned no cost estimate".yellow()),
    }

    if mode == ExecutionMode::DryRun {
        println!("\n{}", "=== DRY RUN MODE ===".yellow().bold());
        println!("Skipping actual tree creation.");
        println!("Run with --prod or -p to execute for real.");
    } else {
        println!("\n{}", "=== PRODUCTION MODE ===".red().bold());
        println!("{}", "Creating Merkle tree...".cyan());
    }

    let state = provisioner.complete(&signer, &tree)?;
    let report = provisioner.into_report()?;
    if state == ProvisioningState::Committed {
        println!("\n{}", "Merkle tree created!".green().bold());
        if let Some(signature) = &report.signature {
            println!("{}: {}", "Signature".bright_white(), signature.to_string().bright_black());
        }
    }
    Ok(())
}

fn mint_nfts(config: &Config) -> Result<()> {
    let linker = CollectionLinker::from_setting(config.collection.as_deref())?;
    let signer = load_signer(config)?;
    let ledger = LedgerClient::new(config.rpc_url()?);
    let uploader = HttpUploader::new(config.upload_url()?);
    let mut prompter = Prompter::stdio();

    let tree_address = match config.merkle_tree()? {
        Some(address) => address,
        None => parse_address(&prompter.ask("Enter the Merkle Tree Public Key: ")?)?,
    };

    let count = prompter.ask_count("How many NFTs do you want to mint? ")?;
    let image = prompter.ask_path("Enter the file path for the image: ")?;
    let rom = prompter.ask_path("Enter the file path for the GB ROM: ")?;
    let name = prompter.ask("Enter the NFT name: ")?;
    let description = prompter.ask("Enter the NFT description: ")?;
    let traits = parse_traits(
        &prompter.ask("Enter traits as comma-separated key:value pairs (e.g. Color:Red,Size:Large): ")?,
    );

    let request = BatchMintRequest {
        tree_address,
        collection_address: linker.collection(),
        count: usize::try_from(count).context("mint count is too large")?,
        asset_template: AssetTemplate {
            name,
            description,
            image,
            auxiliary_files: vec![rom],
            traits,
        },
    };

    println!("{}", format!("Minting {} Compressed NFTs...", request.count).cyan());
    println!("{}: {}", "Collection".bright_white(), linker.collection());

    let total = request.count;
    let issuer = BatchIssuer::new(&ledger, &uploader, &signer, linker);
    let outcome = issuer.run_with(&request, |record| {
        println!(
            "{} {} of {}: {}",
            "NFT minted!".green(),
            record.index + 1,
            total,
            record.signature.to_string().bright_black()
        );
    });

    match outcome {
        Ok(records) => {
            println!("\n{}", format!("Minted {} of {} NFTs", records.len(), total).green().bold());
            Ok(())
        }
        Err(halted) => {
            println!(
                "\n{}",
                format!("Stopped after {} of {} NFTs", halted.records.len(), total).yellow().bold()
            );
            Err(halted.into())
        }
    }
}
