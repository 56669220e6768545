//! Biometric prompt backed by an external verifier program

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{BiometricOutcome, BiometricPrompt};

/// Default verifier (fprintd on Linux)
pub const DEFAULT_VERIFIER: &str = "fprintd-verify";

/// Exit status used by shells for SIGINT, treated as a user cancel
const EXIT_INTERRUPTED: i32 = 130;

/// Environment variable carrying the justification string to the verifier
pub const REASON_ENV: &str = "PASSGATE_BIOMETRIC_REASON";

/// Runs a verifier program and maps its exit status to an outcome
///
/// Exit status 0 is a successful match. 130 or death by signal counts as a
/// cancel, anything else as a failed match.
#[derive(Debug, Clone)]
pub struct CommandPrompt {
    program: String,
    args: Vec<String>,
}

impl CommandPrompt {
    /// Create a prompt running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Program that will be executed
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Resolve the program to an executable path
    fn resolve(&self) -> Option<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }

        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(&self.program))
            .find(|path| is_executable(path))
    }
}

impl Default for CommandPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_VERIFIER, Vec::new())
    }
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        metadata.is_file()
    }
}

#[async_trait]
impl BiometricPrompt for CommandPrompt {
    fn can_evaluate(&self) -> bool {
        self.resolve().is_some()
    }

    async fn evaluate(&self, reason: &str) -> BiometricOutcome {
        tracing::debug!("Running biometric verifier {}", self.program);

        let status = Command::new(&self.program)
            .args(&self.args)
            .env(REASON_ENV, reason)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => BiometricOutcome::Success,
            Ok(status) => match status.code() {
                Some(EXIT_INTERRUPTED) | None => BiometricOutcome::Cancelled,
                Some(code) => {
                    tracing::debug!("Biometric verifier exited with {}", code);
                    BiometricOutcome::Failed
                }
            },
            Err(e) => {
                tracing::warn!("Failed to run biometric verifier {}: {}", self.program, e);
                BiometricOutcome::Unavailable
            }
        }
    }
}
