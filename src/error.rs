use std::path::PathBuf;
use thiserror::Error;

/// Exit status for store failures
pub const EXIT_STORE: u8 = 1;
/// Exit status for configuration failures (sysexits EX_CONFIG)
pub const EXIT_CONFIG: u8 = 78;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to set busy timeout on store at {}", path.display())]
    BusyTimeout {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create link table")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to prepare {op} statement")]
    Prepare {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{op} failed")]
    Execute {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read {op} results")]
    Scan {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to close store")]
    Close(#[source] rusqlite::Error),
}

#[derive(Debug, Error)]
#[error("invalid configuration in {}: {message}", path.display())]
pub struct ConfigError {
    pub path: PathBuf,
    pub message: String,
}

/// Pick the process exit status for an error that reached `main`
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIG
    } else {
        EXIT_STORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_one() {
        let err = anyhow::Error::new(StoreError::Schema(rusqlite::Error::InvalidQuery));
        assert_eq!(exit_code(&err), EXIT_STORE);
    }

    #[test]
    fn test_config_errors_keep_their_code_through_context() {
        let err = anyhow::Error::new(ConfigError {
            path: PathBuf::from("/tmp/blitlink.toml"),
            message: "expected a table".to_string(),
        })
        .context("loading configuration");
        assert_eq!(exit_code(&err), EXIT_CONFIG);
    }

    #[test]
    fn test_open_error_names_the_path() {
        let err = StoreError::Open {
            path: PathBuf::from("/nope/links.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        assert_eq!(err.to_string(), "failed to open store at /nope/links.db");
    }

    #[test]
    fn test_busy_timeout_error_does_not_read_as_open_failure() {
        let err = StoreError::BusyTimeout {
            path: PathBuf::from("/tmp/links.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        assert_eq!(
            err.to_string(),
            "failed to set busy timeout on store at /tmp/links.db"
        );
    }
}
