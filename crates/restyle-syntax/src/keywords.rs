//! Reserved words and identifier rules of C#.

const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long",
    "ulong", "short", "ushort", "object", "string", "void",
];

/// Returns whether `word` is a reserved keyword that cannot name a symbol
/// without an `@` prefix.
#[must_use]
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// Returns whether `word` is a built-in type keyword such as `int`.
#[must_use]
pub fn is_predefined_type(word: &str) -> bool {
    PREDEFINED_TYPES.contains(&word)
}

/// Returns whether `name` is usable as an identifier: a letter or `_`
/// followed by letters, digits or `_`, optionally behind a single `@`, and
/// not a reserved keyword unless escaped.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let (escaped, bare) = match name.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    let mut chars = bare.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let well_formed = (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    well_formed && (escaped || !is_reserved_keyword(bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("count_", true)]
    #[case("kMax", true)]
    #[case("@class", true)]
    #[case("class", false)]
    #[case("", false)]
    #[case("9lives", false)]
    #[case("a-b", false)]
    fn validates_identifiers(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_valid_identifier(name), expected);
    }

    #[test]
    fn contextual_keywords_are_not_reserved() {
        assert!(!is_reserved_keyword("var"));
        assert!(!is_reserved_keyword("value"));
        assert!(is_predefined_type("string"));
    }
}
