use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

use crate::foundation::error::{ParticleError, ParticleResult};

/// What a conversion run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOutput {
    /// The generated asset.
    pub output_path: PathBuf,
    /// Whether the program exited successfully.
    pub exit_ok: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Anything that turns a saved upload into an animation file on disk.
pub trait ConversionBackend {
    /// Convert `input`, returning where the result was written.
    fn convert(&self, input: &Path) -> ParticleResult<ConversionOutput>;
}

/// Runs `interpreter script <input>` and picks up the GIF it writes.
///
/// The call blocks until the program exits. There is no timeout and no retry.
#[derive(Clone, Debug)]
pub struct ExternalScript {
    /// Program used to run the script, e.g. `python3`.
    pub interpreter: PathBuf,
    /// Script path passed as the first argument.
    pub script: PathBuf,
    /// Working directory for the child; the current directory when `None`.
    pub working_dir: Option<PathBuf>,
    /// Directory scanned for new or rewritten output when stdout names no file.
    pub output_dir: Option<PathBuf>,
    /// Extension of the expected output, without the dot.
    pub output_extension: String,
}

impl ExternalScript {
    /// Script run by `interpreter` from the current directory, expecting a GIF.
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            working_dir: None,
            output_dir: None,
            output_extension: "gif".to_string(),
        }
    }

    /// Run the child from `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Also look for output in `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        match (&self.working_dir, p.is_relative()) {
            (Some(wd), true) => wd.join(p),
            _ => p.to_path_buf(),
        }
    }

    fn find_declared_output(&self, stdout: &str) -> Option<PathBuf> {
        let suffix = format!(".{}", self.output_extension);
        stdout
            .lines()
            .rev()
            .flat_map(|line| line.split_whitespace().rev())
            .map(|tok| tok.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ',' | ':' | '!')))
            .filter(|tok| tok.to_ascii_lowercase().ends_with(&suffix))
            .map(|tok| self.resolve(Path::new(tok)))
            .find(|p| p.is_file())
    }

    fn output_scan_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_deref().map(|d| self.resolve(d))
    }

    fn snapshot_outputs(&self) -> OutputSnapshot {
        self.output_scan_dir()
            .map(|dir| list_outputs(&dir, &self.output_extension).collect())
            .unwrap_or_default()
    }

    /// Newest output that did not exist, or differed, when `before` was taken.
    fn find_fresh_output(&self, before: &OutputSnapshot) -> Option<PathBuf> {
        let dir = self.output_scan_dir()?;
        list_outputs(&dir, &self.output_extension)
            .filter(|(path, stamp)| before.get(path) != Some(stamp))
            .max_by_key(|(_, stamp)| stamp.modified)
            .map(|(path, _)| path)
    }
}

/// Modification time and length of one candidate output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

type OutputSnapshot = HashMap<PathBuf, FileStamp>;

fn list_outputs<'a>(
    dir: &Path,
    extension: &'a str,
) -> impl Iterator<Item = (PathBuf, FileStamp)> + 'a {
    std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter_map(move |e| {
            let path = e.path();
            let matches = path
                .extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| x.eq_ignore_ascii_case(extension));
            let meta = e.metadata().ok()?;
            (matches && meta.is_file()).then(|| {
                let stamp = FileStamp {
                    modified: meta.modified().ok(),
                    len: meta.len(),
                };
                (path, stamp)
            })
        })
}

impl ConversionBackend for ExternalScript {
    #[tracing::instrument(skip(self), fields(script = %self.script.display()))]
    fn convert(&self, input: &Path) -> ParticleResult<ConversionOutput> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.script)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(wd) = &self.working_dir {
            cmd.current_dir(wd);
        }

        tracing::info!(interpreter = %self.interpreter.display(), input = %input.display(), "running conversion script");
        let before = self.snapshot_outputs();
        let output = cmd.output().map_err(|e| {
            ParticleError::conversion(format!(
                "failed to launch '{}': {e}",
                self.interpreter.display()
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_ok = output.status.success();

        if !stdout.trim().is_empty() {
            tracing::debug!(stdout = %stdout.trim(), "conversion script stdout");
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "conversion script wrote to stderr");
        }
        if !exit_ok {
            tracing::error!(status = %output.status, "conversion script exited unsuccessfully");
        }

        let found = self
            .find_declared_output(&stdout)
            .or_else(|| self.find_fresh_output(&before));

        match found {
            Some(output_path) => Ok(ConversionOutput {
                output_path,
                exit_ok,
                stdout,
                stderr,
            }),
            None => Err(ParticleError::conversion(format!(
                "conversion script exited with status {} and produced no .{} output",
                output.status, self.output_extension
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/external.rs"]
mod tests;
