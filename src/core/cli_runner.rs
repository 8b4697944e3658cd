//! Subprocess runner for the git and `claude` calls made by the proxy check.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{AidrError, Result};

/// Default timeout for short commands such as `git rev-parse`.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Output from a CLI command.
#[derive(Debug)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliOutput {
    /// Check if command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A command to run: program, arguments, extra environment and working dir.
#[derive(Debug, Clone)]
pub struct CliCommand {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

impl CliCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
            timeout: CLI_TIMEOUT,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: Option<&Path>) -> Self {
        self.current_dir = dir.map(Path::to_path_buf);
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Command not found (`CliNotFound`)
    /// - Command times out (`Timeout`)
    /// - Command fails to execute (`CommandFailed`)
    pub async fn run(&self) -> Result<CliOutput> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program = %self.program, args = ?self.args, "Running command");
        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AidrError::CliNotFound {
                    name: self.program.clone(),
                }
            } else {
                AidrError::CommandFailed {
                    program: self.program.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let result = timeout(self.timeout, async {
            // Drain both pipes together so a chatty child cannot block on a full buffer.
            let stdout_handle = async {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    out.read_to_string(&mut stdout).await?;
                }
                Ok::<_, std::io::Error>(stdout)
            };

            let stderr_handle = async {
                let mut stderr = String::new();
                if let Some(mut err) = child.stderr.take() {
                    err.read_to_string(&mut stderr).await?;
                }
                Ok::<_, std::io::Error>(stderr)
            };

            let (stdout_result, stderr_result) = tokio::join!(stdout_handle, stderr_handle);
            let stdout = stdout_result?;
            let stderr = stderr_result?;

            let status = child.wait().await?;

            Ok::<_, std::io::Error>(CliOutput {
                stdout,
                stderr,
                exit_code: status.code().unwrap_or(-1),
            })
        })
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AidrError::CommandFailed {
                program: self.program.clone(),
                reason: e.to_string(),
            }),
            Err(_) => {
                let _ = child.kill().await;
                let _ = child.wait().await;
                Err(AidrError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    /// Run and return trimmed stdout, failing on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`], plus `CommandFailed` for a non-zero exit.
    pub async fn stdout(&self) -> Result<String> {
        let output = self.run().await?;
        if !output.success() {
            return Err(AidrError::CommandFailed {
                program: self.program.clone(),
                reason: format!("exit code {}: {}", output.exit_code, output.stderr.trim()),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

/// Run a CLI command with timeout.
///
/// # Errors
///
/// See [`CliCommand::run`].
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout_duration: Duration,
) -> Result<CliOutput> {
    CliCommand::new(program)
        .args(args.iter().copied())
        .timeout(timeout_duration)
        .run()
        .await
}

/// Locate a program on `PATH`.
///
/// # Errors
///
/// `CliNotFound` if it is not installed.
pub fn locate(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| AidrError::CliNotFound {
        name: program.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_cli_not_found() {
        let err = tokio_test::block_on(run_command("aidr-definitely-not-installed", &[], CLI_TIMEOUT))
            .unwrap_err();
        assert!(matches!(err, AidrError::CliNotFound { name } if name == "aidr-definitely-not-installed"));
    }

    #[test]
    fn locate_missing_program() {
        assert!(matches!(
            locate("aidr-definitely-not-installed"),
            Err(AidrError::CliNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_env() {
        let output = CliCommand::new("sh")
            .args(["-c", "printf '%s' \"$AIDR_TEST_VALUE\""])
            .env("AIDR_TEST_VALUE", "hello")
            .run()
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_fails_stdout() {
        let err = CliCommand::new("sh")
            .args(["-c", "echo nope >&2; exit 3"])
            .stdout()
            .await
            .unwrap_err();
        match err {
            AidrError::CommandFailed { program, reason } => {
                assert_eq!(program, "sh");
                assert!(reason.contains("exit code 3"));
                assert!(reason.contains("nope"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let err = CliCommand::new("sleep")
            .args(["5"])
            .timeout(Duration::from_millis(100))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, AidrError::Timeout(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = CliCommand::new("pwd")
            .current_dir(Some(dir.path()))
            .stdout()
            .await
            .unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(&output).canonicalize().unwrap(), expected);
    }
}
