//! Folder-based file selection.

use std::path::{Component, Path};

/// Admits or rejects files by the names of the folders containing them.
///
/// Folder names are compared case-insensitively against every directory
/// segment of a path (the file name itself is not a segment). Exclusion
/// wins over inclusion, and an empty include list admits every folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelector {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FileSelector {
    /// Creates a selector from include and exclude folder names.
    #[must_use]
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether `path` should be processed.
    #[must_use]
    pub fn included(&self, path: &Path) -> bool {
        let folders: Vec<&str> = path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        let matches = |names: &[String]| {
            names
                .iter()
                .any(|name| folders.iter().any(|folder| folder.eq_ignore_ascii_case(name)))
        };
        if matches(&self.exclude) {
            return false;
        }
        self.include.is_empty() || matches(&self.include)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], &[], "src/App.cs", true)]
    #[case(&[], &["obj"], "src/obj/App.cs", false)]
    #[case(&[], &["OBJ"], "src/obj/App.cs", false)]
    #[case(&[], &["App.cs"], "src/App.cs", true)]
    #[case(&["src"], &[], "src/App.cs", true)]
    #[case(&["src"], &[], "tests/App.cs", false)]
    #[case(&["src"], &["generated"], "src/generated/App.cs", false)]
    fn selects_by_folder(
        #[case] include: &[&str],
        #[case] exclude: &[&str],
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        let selector = FileSelector::new(include.iter().copied(), exclude.iter().copied());
        assert_eq!(selector.included(Path::new(path)), expected);
    }
}
