//! External tool invocation
//!
//! Every external program (ffmpeg, ffprobe, yt-dlp, ttvdl) is run to completion
//! before the caller continues. A non-zero exit becomes `VodError::ExternalTool`.

use crate::error::{Result, VodError};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// A prepared invocation of one external program
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Name used in logs and errors
    pub fn tool_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .to_string()
    }

    /// Shell-like rendering of the full command line
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Run with captured output and return stdout
    pub async fn output(&self) -> Result<String> {
        debug!("$ {}", self.display());

        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| VodError::ToolLaunch {
                tool: self.tool_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(VodError::tool_failed(
                self.tool_name(),
                output.status.code().unwrap_or(-1),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run attached to the terminal so the tool's own progress output stays visible
    pub async fn run(&self) -> Result<()> {
        info!("⚙️ CMD {}", self.display());

        let status = self
            .command()
            .status()
            .await
            .map_err(|source| VodError::ToolLaunch {
                tool: self.tool_name(),
                source,
            })?;

        if !status.success() {
            return Err(VodError::tool_failed(self.tool_name(), status.code().unwrap_or(-1), ""));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_tool_name() {
        let cmd = ToolCommand::new("/usr/local/bin/ffmpeg")
            .args(["-ss", "0"])
            .arg("-y");

        assert_eq!(cmd.tool_name(), "ffmpeg");
        assert_eq!(cmd.display(), "/usr/local/bin/ffmpeg -ss 0 -y");
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let err = ToolCommand::new("vodtool-definitely-missing-binary")
            .output()
            .await
            .unwrap_err();

        assert!(matches!(err, VodError::ToolLaunch { .. }));
    }
}
