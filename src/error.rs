use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExemptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    #[error("Azure CLI (az) not found in PATH: {0}")]
    AzNotFound(String),

    #[error("az {command} failed: {stderr}")]
    AzCommand { command: String, stderr: String },

    #[error("az {command} timed out after {seconds}s")]
    AzTimeout { command: String, seconds: u64 },

    #[error("Unable to parse {what}: {source}")]
    AzOutput {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("az login failed: {0}")]
    Login(String),

    #[error("Could not parse policy name from ID: {0}")]
    PolicyId(String),

    #[error("no subscriptions returned by Azure CLI")]
    NoSubscriptions,

    #[error("no policy assignments were returned for subscription {name} ({short_id})")]
    NoAssignments { name: String, short_id: String },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExemptError>;
