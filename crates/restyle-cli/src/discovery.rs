//! Source file discovery.

use std::collections::BTreeSet;
use std::path::PathBuf;

use restyle_rules::FileSelector;
use restyle_syntax::SupportedLanguage;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::AppError;

/// Expands `paths` into the source files to process, sorted and deduplicated.
///
/// Files named directly are always taken. Directories are walked for files
/// with a recognised extension, skipping hidden directories, and each hit is
/// checked against `selector` using its path relative to the walked root.
pub(crate) fn discover(paths: &[PathBuf], selector: &FileSelector) -> Result<Vec<PathBuf>, AppError> {
    let mut found = BTreeSet::new();
    for root in paths {
        if root.is_file() {
            found.insert(root.clone());
            continue;
        }
        if !root.is_dir() {
            return Err(AppError::MissingPath { path: root.clone() });
        }
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        {
            let entry = entry.map_err(|source| AppError::Discover {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() || SupportedLanguage::from_path(entry.path()).is_none() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if selector.included(relative) {
                found.insert(entry.into_path());
            } else {
                debug!(path = %relative.display(), "excluded by folder filter");
            }
        }
    }
    Ok(found.into_iter().collect())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let root = TempDir::new().expect("temp dir");
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(&path, "class A { }").expect("write");
        }
        root
    }

    fn names(root: &Path, found: &[PathBuf]) -> Vec<String> {
        found
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn walks_directories_for_source_files() {
        let root = tree(&["b/B.cs", "A.cs", "notes.txt", "Legacy.vb", ".git/C.cs"]);
        let found = discover(&[root.path().to_path_buf()], &FileSelector::default())
            .expect("discover");
        assert_eq!(names(root.path(), &found), ["A.cs", "Legacy.vb", "b/B.cs"]);
    }

    #[test]
    fn folder_filters_apply_below_the_root() {
        let root = tree(&["Scripts/A.cs", "Plugins/B.cs", "Scripts/Plugins/C.cs"]);
        let selector = FileSelector::new(["scripts"], ["plugins"]);
        let found = discover(&[root.path().to_path_buf()], &selector).expect("discover");
        assert_eq!(names(root.path(), &found), ["Scripts/A.cs"]);
    }

    #[test]
    fn named_files_bypass_the_filters() {
        let root = tree(&["Plugins/B.cs"]);
        let file = root.path().join("Plugins/B.cs");
        let selector = FileSelector::new(Vec::<String>::new(), ["plugins"]);
        let found = discover(std::slice::from_ref(&file), &selector).expect("discover");
        assert_eq!(found, [file]);
    }

    #[test]
    fn missing_paths_are_errors() {
        let root = TempDir::new().expect("temp dir");
        let missing = root.path().join("nowhere");
        let error = discover(&[missing], &FileSelector::default()).expect_err("missing");
        assert!(matches!(error, AppError::MissingPath { .. }));
    }
}
