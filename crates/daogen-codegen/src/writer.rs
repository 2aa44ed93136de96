//! Source text assembly and output sinks.

use daogen_core::{DaogenError, DaogenResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDENT: &str = "    ";

/// Header placed at the top of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by daogen. Do not edit by hand.";

/// Line-oriented source writer.
///
/// `tab(n)` sets the indentation of the next `println` only.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buffer: String,
    indent: usize,
}

impl SourceWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indents the next line by `level` steps.
    pub fn tab(&mut self, level: usize) -> &mut Self {
        self.indent = level;
        self
    }

    /// Writes one line.
    pub fn println(&mut self, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(line);
        }
        self.buffer.push('\n');
        self.indent = 0;
        self
    }

    /// Writes an empty line.
    pub fn newline(&mut self) -> &mut Self {
        self.println("")
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buffer
    }
}

/// A generated file, path relative to the sink root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// What a write did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Destination of generated files.
pub trait SourceSink {
    /// Writes `contents` to `path`, relative to the sink root.
    fn write(&mut self, path: &Path, contents: &str) -> DaogenResult<WriteOutcome>;

    fn write_artifact(&mut self, artifact: &Artifact) -> DaogenResult<WriteOutcome> {
        self.write(&artifact.path, &artifact.contents)
    }
}

/// Writes files below a root directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceSink for FileSink {
    fn write(&mut self, path: &Path, contents: &str) -> DaogenResult<WriteOutcome> {
        let target = self.root.join(path);
        let io_error = |e: std::io::Error| DaogenError::io(target.display().to_string(), e);

        let outcome = match fs::read_to_string(&target) {
            Ok(existing) if existing == contents => return Ok(WriteOutcome::Unchanged),
            Ok(_) => WriteOutcome::Updated,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WriteOutcome::Created,
            Err(e) => return Err(io_error(e)),
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&target, contents).map_err(io_error)?;
        debug!(path = %target.display(), ?outcome, "Wrote generated file");
        Ok(outcome)
    }
}

/// Keeps generated files in memory, ordered by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceSink for MemorySink {
    fn write(&mut self, path: &Path, contents: &str) -> DaogenResult<WriteOutcome> {
        match self.files.insert(path.to_path_buf(), contents.to_string()) {
            None => Ok(WriteOutcome::Created),
            Some(previous) if previous == contents => Ok(WriteOutcome::Unchanged),
            Some(_) => Ok(WriteOutcome::Updated),
        }
    }
}
