//! Source language tags.
//!
//! The engine dispatches on [`SupportedLanguage`]. Visual Basic files are
//! recognised so they can be reported, but only C# is parsed, validated and
//! rewritten.

use std::fmt;
use std::path::Path;

/// Language of a source file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// `.cs` files.
    #[default]
    CSharp,
    /// `.vb` files.
    VisualBasic,
}

impl SupportedLanguage {
    /// Detects the language of `path`, ignoring extension case.
    ///
    /// ```
    /// use std::path::Path;
    /// use restyle_syntax::SupportedLanguage;
    ///
    /// assert_eq!(
    ///     SupportedLanguage::from_path(Path::new("Game/Player.CS")),
    ///     Some(SupportedLanguage::CSharp)
    /// );
    /// assert_eq!(SupportedLanguage::from_path(Path::new("Game.csproj")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("cs") {
            Some(Self::CSharp)
        } else if extension.eq_ignore_ascii_case("vb") {
            Some(Self::VisualBasic)
        } else {
            None
        }
    }

    /// Tree-sitter grammar used to validate rendered output, when bundled.
    #[must_use]
    pub fn tree_sitter_language(self) -> Option<tree_sitter::Language> {
        match self {
            Self::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
            Self::VisualBasic => None,
        }
    }

    /// Whether files of this language can be parsed and rewritten.
    #[must_use]
    pub const fn is_processable(self) -> bool {
        matches!(self, Self::CSharp)
    }

    /// Stable lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::VisualBasic => "visualbasic",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("src/Widgets/Button.cs", Some(SupportedLanguage::CSharp))]
    #[case("Button.CS", Some(SupportedLanguage::CSharp))]
    #[case("Legacy/Module1.vb", Some(SupportedLanguage::VisualBasic))]
    #[case("Game.csproj", None)]
    #[case("Makefile", None)]
    fn detects_languages_from_paths(
        #[case] path: &str,
        #[case] expected: Option<SupportedLanguage>,
    ) {
        assert_eq!(SupportedLanguage::from_path(Path::new(path)), expected);
    }

    #[test]
    fn only_csharp_is_processable() {
        assert!(SupportedLanguage::CSharp.is_processable());
        assert!(SupportedLanguage::CSharp.tree_sitter_language().is_some());
        assert!(!SupportedLanguage::VisualBasic.is_processable());
        assert!(SupportedLanguage::VisualBasic.tree_sitter_language().is_none());
    }
}
