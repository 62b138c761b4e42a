//! Identifier text transforms shared by the naming rules.

/// Character separating words in snake-case names.
pub const SEPARATOR: char = '_';

/// Suffix carried by private instance fields and properties.
pub const TRAILING_MARKER: char = '_';

/// Prefix carried by constants.
pub const CONSTANT_PREFIX: char = 'k';

/// Single letters that, followed by [`SEPARATOR`], form a discardable prefix
/// such as `m_` or `s_`.
pub const SHORT_PREFIXES: [char; 2] = ['m', 's'];

/// Thread-static prefix, matched case-insensitively.
pub const MARKER_PREFIX: &str = "ts_";

/// Attribute exempting a property from renaming.
pub const SERIALIZED_FIELD_ATTRIBUTE: &str = "SerializeField";

/// Converts `name` to camel case, discarding separators and conventional
/// prefixes.
///
/// The conversion is repeated until its output no longer changes, so the
/// function is idempotent.
///
/// # Examples
///
/// ```
/// use restyle_rules::naming::to_identifier_style;
///
/// assert_eq!(to_identifier_style("m_fooBar"), "fooBar");
/// assert_eq!(to_identifier_style("TEST_POWER"), "testPower");
/// ```
#[must_use]
pub fn to_identifier_style(name: &str) -> String {
    let mut current = name.to_owned();
    loop {
        let next = identifier_style_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn identifier_style_pass(name: &str) -> String {
    let mut chars: Vec<char> = name.trim_matches(SEPARATOR).chars().collect();

    if let [first, second, _, ..] = chars.as_slice()
        && SHORT_PREFIXES.contains(first)
        && *second == SEPARATOR
    {
        chars.drain(..2);
    }

    if chars.len() > MARKER_PREFIX.len() && starts_with_marker_prefix(&chars) {
        chars.drain(..MARKER_PREFIX.len());
    }

    if chars.is_empty() {
        return String::new();
    }

    if let [first, second, _, ..] = chars.as_mut_slice()
        && first.is_uppercase()
        && second.is_lowercase()
    {
        *first = first.to_ascii_lowercase();
    }

    lower_uppercase_runs(&mut chars);
    let mut joined = join_separated_words(&chars);
    lowercase_first(&mut joined);
    joined
}

fn starts_with_marker_prefix(chars: &[char]) -> bool {
    chars
        .iter()
        .zip(MARKER_PREFIX.chars())
        .all(|(c, expected)| c.eq_ignore_ascii_case(&expected))
}

/// `TEST_POWER` becomes `Test_Power`: every run of two or more uppercase
/// ASCII letters keeps its first letter and lowercases the rest.
fn lower_uppercase_runs(chars: &mut [char]) {
    let mut previous_upper = false;
    for c in chars.iter_mut() {
        let upper = c.is_ascii_uppercase();
        if upper && previous_upper {
            *c = c.to_ascii_lowercase();
        }
        previous_upper = upper;
    }
}

/// Removes separators, uppercasing the character after each run of them.
fn join_separated_words(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut after_separator = false;
    for &c in chars {
        if c == SEPARATOR {
            after_separator = true;
        } else if after_separator {
            out.extend(c.to_uppercase());
            after_separator = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn lowercase_first(text: &mut String) {
    let mut chars = text.chars();
    if let Some(first) = chars.next()
        && first.is_uppercase()
    {
        *text = first.to_lowercase().chain(chars).collect();
    }
}

/// Uppercases the first character when it is lowercase.
///
/// # Examples
///
/// ```
/// use restyle_rules::naming::capitalize;
///
/// assert_eq!(capitalize("run"), "Run");
/// assert_eq!(capitalize("Run"), "Run");
/// ```
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => name.to_owned(),
    }
}

/// Whether `name` reads as a constant: the constant prefix followed by an
/// uppercase letter.
#[must_use]
pub fn is_constant_styled(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some(CONSTANT_PREFIX) && chars.next().is_some_and(char::is_uppercase)
}

/// Whether `name` still contains a separator once leading and trailing
/// separators are ignored.
#[must_use]
pub fn has_inner_separator(name: &str) -> bool {
    name.trim_matches(SEPARATOR).contains(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("m_fooBar", "fooBar")]
    #[case("s_instance", "instance")]
    #[case("ts_counter", "counter")]
    #[case("TS_Counter", "counter")]
    #[case("TEST_POWER", "testPower")]
    #[case("WHY_wouldYouDoThis", "whyWouldYouDoThis")]
    #[case("_count", "count")]
    #[case("count_", "count")]
    #[case("my__value", "myValue")]
    #[case("Value", "value")]
    #[case("HTMLParser", "htmlparser")]
    #[case("x_position", "xPosition")]
    #[case("_", "")]
    #[case("", "")]
    #[case("ab", "ab")]
    fn converts_to_identifier_style(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_identifier_style(input), expected);
    }

    #[rstest]
    #[case("")]
    #[case("___")]
    #[case("m_m_value")]
    #[case("ts_ts_x")]
    #[case("A_B_C")]
    #[case("kMax_Value")]
    #[case("__Ab__cD__")]
    #[case("ÉLAN_vital")]
    fn identifier_style_is_idempotent(#[case] input: &str) {
        let once = to_identifier_style(input);
        assert_eq!(to_identifier_style(&once), once);
    }

    #[rstest]
    #[case("run", "Run")]
    #[case("Run", "Run")]
    #[case("", "")]
    #[case("_run", "_run")]
    fn capitalizes_the_first_character(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }

    #[rstest]
    #[case("kMax", true)]
    #[case("k_Max", false)]
    #[case("kmax", false)]
    #[case("k", false)]
    fn recognises_constant_style(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_constant_styled(input), expected);
    }
}
