use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown simulation '{id}'. Available: {available}")]
    UnknownSimulation { id: String, available: String },

    #[error(transparent)]
    Simulation(#[from] anyhow::Error),
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config {
            message: message.into(),
        }
    }

    /// Process exit code: 2 for anything the user can fix in their input,
    /// 1 for failures while simulating or writing output.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } | CliError::Toml(_) | CliError::UnknownSimulation { .. } => 2,
            CliError::Io(_) | CliError::Json(_) | CliError::Simulation(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_input_from_runtime_errors() {
        assert_eq!(CliError::config("bad").exit_code(), 2);
        let unknown = CliError::UnknownSimulation {
            id: "x".into(),
            available: "a, b".into(),
        };
        assert_eq!(unknown.exit_code(), 2);
        assert!(unknown.to_string().contains("a, b"));
        assert_eq!(CliError::from(anyhow::anyhow!("boom")).exit_code(), 1);
    }
}
