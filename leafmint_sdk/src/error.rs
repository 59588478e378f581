use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Simulation rejected: {0}")]
    Simulation(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot {action} while provisioning is {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid keypair: {0}")]
    Keypair(String),

    #[error("Ledger RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error belongs to the configuration class that must stop a
    /// run before any work is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::InvalidAddress(_) | Error::Keypair(_))
    }
}
