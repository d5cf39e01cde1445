//! External narrative collaborator driven through a shell command
//!
//! The prompt is written to the command's stdin and its stdout is taken as
//! the reply text. The child is killed if the request future is dropped, so
//! a timeout in the assembler also stops the process.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{NarrativeError, NarrativeProvider, NarrativeReply, NarrativeRequest};

#[derive(Debug, Clone)]
pub struct CommandNarrator {
    command: String,
}

impl CommandNarrator {
    /// `command` is run via `sh -c`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl NarrativeProvider for CommandNarrator {
    fn name(&self) -> &str {
        "command"
    }

    async fn narrate(&self, request: &NarrativeRequest) -> Result<NarrativeReply, NarrativeError> {
        if self.command.trim().is_empty() {
            return Err(NarrativeError::Unavailable {
                message: "no narrator command configured".to_string(),
            });
        }

        debug!("Spawning narrator command: {}", self.command);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that ignores its input may close stdin early
            if let Err(err) = stdin.write_all(request.to_prompt().as_bytes()).await {
                debug!("Narrator command closed stdin: {}", err);
            }
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(NarrativeError::Command {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(NarrativeError::EmptyReply);
        }

        Ok(NarrativeReply::Text(text))
    }
}
