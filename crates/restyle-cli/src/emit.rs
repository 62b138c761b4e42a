//! Writing, checking or diffing the pipeline's output.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use restyle_semantic::Program;
use restyle_syntax::{Formatter, LayoutOptions, TreeSitterSyntacticLock};
use similar::TextDiff;
use tracing::info;

use crate::AppError;
use crate::cli::Mode;
use crate::workspace::Workspace;

/// Files that differ from their source, and files that could not be emitted.
#[derive(Debug, Default)]
pub(crate) struct Summary {
    pub(crate) changed: Vec<PathBuf>,
    pub(crate) errors: Vec<AppError>,
}

pub(crate) struct Emitter {
    mode: Mode,
    indent_width: usize,
    lock: TreeSitterSyntacticLock,
}

impl Emitter {
    pub(crate) fn new(mode: Mode, indent_width: usize) -> Self {
        Self {
            mode,
            indent_width,
            lock: TreeSitterSyntacticLock::new(),
        }
    }

    /// Renders every file of `program` and handles those whose text changed.
    ///
    /// Output is validated before it is written or reported; a file that
    /// fails validation keeps its original text.
    pub(crate) fn emit<W: Write>(
        &self,
        workspace: &Workspace,
        program: &Program,
        stdout: &mut W,
    ) -> Result<Summary, AppError> {
        let mut summary = Summary::default();
        for (_, file) in program.files() {
            let path = file.path();
            let Some(original) = workspace.original(path) else {
                continue;
            };
            let rendered = self.formatter_for(original).apply_layout(file.tree());
            if rendered == original {
                continue;
            }
            if let Err(error) = self.validate(path, &rendered) {
                summary.errors.push(error);
                continue;
            }
            match self.mode {
                Mode::Write => {
                    if let Err(source) = fs::write(path, &rendered) {
                        summary.errors.push(AppError::Write {
                            path: path.to_path_buf(),
                            source,
                        });
                        continue;
                    }
                    info!(path = %path.display(), "rewrote file");
                }
                Mode::Check => writeln!(stdout, "{}", path.display())?,
                Mode::Diff => write_diff(stdout, path, original, &rendered)?,
            }
            summary.changed.push(path.to_path_buf());
        }
        Ok(summary)
    }

    fn formatter_for(&self, original: &str) -> Formatter {
        Formatter::new(LayoutOptions {
            indent_width: self.indent_width,
            newline: newline_of(original).to_owned(),
        })
    }

    fn validate(&self, path: &Path, rendered: &str) -> Result<(), AppError> {
        let failures = self
            .lock
            .validate_file(path, rendered)
            .map_err(|source| AppError::Validate {
                path: path.to_path_buf(),
                source,
            })?;
        match failures.first() {
            None => Ok(()),
            Some(first) => Err(AppError::Rejected {
                path: path.to_path_buf(),
                detail: first.to_string(),
            }),
        }
    }
}

/// Line terminator used by `text`, `\n` unless it uses `\r\n`.
fn newline_of(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

fn write_diff<W: Write>(
    stdout: &mut W,
    path: &Path,
    original: &str,
    rendered: &str,
) -> Result<(), AppError> {
    let shown = diff_label(path);
    let diff = TextDiff::from_lines(original, rendered);
    write!(
        stdout,
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header(&format!("a/{shown}"), &format!("b/{shown}"))
    )?;
    Ok(())
}

/// `path` with `/` separators and no root or drive prefix, so the `a/` and
/// `b/` header prefixes stay well formed for absolute paths.
fn diff_label(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
