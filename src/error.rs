use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error("No config directory found")]
    NoConfigDir,

    #[error("Deployment cancelled")]
    Aborted,

    #[error("No valid input")]
    InvalidInput(#[from] dialoguer::Error),

    #[error(transparent)]
    KubectlFailed(#[from] KubectlError),

    #[error(transparent)]
    DeployFailed(#[from] DeployError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    CtrlC(#[from] ctrlc::Error),
}

#[derive(Error, Debug)]
pub enum KubectlError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Command failed")]
    CommandFailed,

    #[error(transparent)]
    ParseOutput(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Failure reported while saving a deployment.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Server rejected deployment ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unreadable deployment record")]
    Decode(#[from] serde_json::Error),
}

/// Reasons the namespace dialog ended without a name. The form treats all of them as a
/// dismissal.
#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Namespace prompt failed")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Kubectl(#[from] KubectlError),

    #[error("Namespace prompt task failed")]
    Join(#[from] tokio::task::JoinError),
}
