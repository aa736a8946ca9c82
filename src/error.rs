use crate::models::ResultCode;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No message to send")]
    NoMessage,

    #[error("Failed to launch {program}: {source}")]
    ChildExec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status})")]
    ExecFailed { program: String, status: ExitStatus },

    #[error("Failed to check status of {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },
}

impl DispatchError {
    /// Collapses the error to its fixed result code.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::NoMessage => ResultCode::NoMessage,
            Self::ChildExec { .. } => ResultCode::ChildExecFailed,
            Self::ExecFailed { .. } | Self::Wait { .. } => ResultCode::ExecFailed,
            Self::TimedOut { .. } => ResultCode::TimedOut,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
    }

    #[test]
    fn variants_map_to_result_codes() {
        assert_eq!(DispatchError::NoMessage.code(), ResultCode::NoMessage);
        let exec = DispatchError::ChildExec {
            program: "/usr/bin/smirc".to_string(),
            source: io_error(),
        };
        assert_eq!(exec.code(), ResultCode::ChildExecFailed);
        let wait = DispatchError::Wait {
            program: "/usr/bin/smirc".to_string(),
            source: io_error(),
        };
        assert_eq!(wait.code(), ResultCode::ExecFailed);
        let timeout = DispatchError::TimedOut {
            program: "/usr/bin/smirc".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(timeout.code(), ResultCode::TimedOut);
    }

    #[test]
    fn messages_name_the_program() {
        let err = DispatchError::ChildExec {
            program: "/opt/smirc".to_string(),
            source: io_error(),
        };
        assert!(err.to_string().contains("/opt/smirc"));

        let err = DispatchError::TimedOut {
            program: "/opt/smirc".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "/opt/smirc did not finish within 1.5s");
    }
}
