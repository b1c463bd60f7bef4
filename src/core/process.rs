//! Purpose: Run external build tools and turn their outcome into crate errors.
//! Exports: `Tool`.
//! Role: The single place child processes are spawned (git, cmake, protoc).
//! Invariants: Children inherit stdio and run with an explicit working directory.
//! Invariants: A spawn failure or a non-success exit status is always an error.
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::error::{Error, ErrorKind};

/// One invocation of an external program.
#[derive(Clone, Debug)]
pub struct Tool {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: PathBuf,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>, current_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.to_path_buf(),
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
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arg_list(&self) -> &[OsString] {
        &self.args
    }

    /// Shell-like rendering used in logs and error reports.
    pub fn display(&self) -> String {
        let mut tokens = Vec::with_capacity(self.args.len() + 1);
        tokens.push(render_token(self.program.as_os_str()));
        tokens.extend(self.args.iter().map(|arg| render_token(arg)));
        tokens.join(" ")
    }

    /// Runs to completion and requires a success exit status.
    pub fn run(&self) -> Result<(), Error> {
        let rendered = self.display();
        tracing::info!(command = %rendered, "running");

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.current_dir)
            .status()
            .map_err(|err| {
                Error::new(ErrorKind::Tool)
                    .with_message(format!("failed to execute {}", self.program.display()))
                    .with_command(rendered.clone())
                    .with_hint("Check that the tool is installed and on PATH.")
                    .with_source(err)
            })?;

        if status.success() {
            return Ok(());
        }

        let mut err = Error::new(ErrorKind::Tool)
            .with_message(format!(
                "{} exited with a failure status",
                self.program.display()
            ))
            .with_command(rendered);
        if let Some(code) = status.code() {
            err = err.with_status(code);
        }
        Err(err)
    }
}

fn render_token(token: &OsStr) -> String {
    let text = token.to_string_lossy();
    if !text.is_empty() && !text.contains(char::is_whitespace) && !text.contains('"') {
        return text.into_owned();
    }
    format!("\"{}\"", text.replace('"', "\\\""))
}
