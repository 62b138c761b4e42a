//! Helpers over written type text such as `List<Widget>` or `Widget[]?`.

/// Strips nullability, generic arguments and a `global::` prefix, leaving the
/// possibly dotted type name. Array types yield `None`.
pub(crate) fn type_name(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let unprefixed = compact.strip_prefix("global::").unwrap_or(&compact);
    let bare = unprefixed.trim_end_matches('?');
    if bare.ends_with(']') || bare.is_empty() {
        return None;
    }
    let mut name = String::new();
    let mut depth = 0_usize;
    for c in bare.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => name.push(c),
            _ => {}
        }
    }
    (!name.is_empty()).then_some(name)
}

/// Element type of an array or a generic collection: `T[]` gives `T`, and a
/// generic type gives its last type argument (`Dictionary<K, V>` gives `V`).
pub(crate) fn element_type(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bare = compact.trim_end_matches('?');
    if let Some(element) = bare.strip_suffix("[]") {
        return Some(element.to_owned());
    }
    let open = bare.find('<')?;
    let inner = bare.get(open + 1..bare.len().checked_sub(1)?)?;
    top_level_arguments(inner).pop()
}

fn top_level_arguments(inner: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    for c in inner.chars() {
        match c {
            '<' | '[' | '(' => {
                depth += 1;
                current.push(c);
            }
            '>' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => arguments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        arguments.push(current);
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Widget", Some("Widget"))]
    #[case("Widget?", Some("Widget"))]
    #[case("List<Widget>", Some("List"))]
    #[case("global::Game.Widget", Some("Game.Widget"))]
    #[case("Widget[]", None)]
    fn extracts_type_names(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(type_name(text).as_deref(), expected);
    }

    #[rstest]
    #[case("Widget[]", Some("Widget"))]
    #[case("List<Widget>", Some("Widget"))]
    #[case("Dictionary<string, List<Widget>>", Some("List<Widget>"))]
    #[case("Widget", None)]
    fn extracts_element_types(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(element_type(text).as_deref(), expected);
    }
}
