//! Text helpers shared by option kinds
//!
//! The host text format strips leading whitespace from continuation lines.
//! Values that need to keep it are written with a vertical bar: every line
//! starting with `|` loses the bar plus the indentation found on the first
//! such line.

/// Maximum total length of list items that are still joined on one line
pub(crate) const LINE_LIMIT: usize = 80;

/// Check whether any line of `value` starts with `|`
pub fn has_verticals(value: &str) -> bool {
    value.split('\n').any(|line| line.starts_with('|'))
}

/// Check whether any line of `value` starts with a space
pub fn has_leading_spaces(value: &str) -> bool {
    value.split('\n').any(|line| line.starts_with(' '))
}

/// Remove the vertical bar notation from `value`
///
/// The width removed from every `|` line is fixed by the first one: the
/// bar plus the whitespace that follows it.
///
/// ```
/// use strata_config::text::unindent_verticals;
///
/// let value = "def f():\n|    if ready:\n|        return 1\n";
/// assert_eq!(unindent_verticals(value), "def f():\nif ready:\n    return 1\n");
/// ```
pub fn unindent_verticals(value: &str) -> String {
    let mut indent: Option<usize> = None;
    value
        .split('\n')
        .map(|line| match line.strip_prefix('|') {
            Some(rest) => {
                let width = *indent.get_or_insert_with(|| {
                    rest.chars().count() - rest.trim().chars().count() + 1
                });
                line.chars().skip(width).collect()
            }
            None => line.to_string(),
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// Prefix every line after the first with `prefix`
pub(crate) fn prefix_continuation(value: &str, prefix: &str) -> String {
    if !value.contains('\n') {
        return value.to_string();
    }
    let mut result = String::with_capacity(value.len() + prefix.len() * 4);
    for (index, line) in value.split_inclusive('\n').enumerate() {
        if index > 0 {
            result.push_str(prefix);
        }
        result.push_str(line);
    }
    result
}

/// Split list text into trimmed, non-empty items
///
/// Without an explicit separator, a newline separates items when the text
/// spans several lines and a comma otherwise.
pub(crate) fn split_items<'a>(text: &'a str, separator: Option<&str>) -> Vec<&'a str> {
    let separator = separator.unwrap_or(if text.contains('\n') { "\n" } else { "," });
    text.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Separator used to join items when none was configured
pub(crate) fn pick_separator<'a>(
    items: &[String],
    separator: Option<&'a str>,
    short: &'a str,
) -> &'a str {
    separator.unwrap_or_else(|| {
        let total: usize = items.iter().map(|item| item.chars().count()).sum();
        if total > LINE_LIMIT { "\n" } else { short }
    })
}

/// Join items for the rendered config text
///
/// Newline-separated items go on their own indented lines; any other
/// separator is followed by a space.
pub(crate) fn format_items(items: &[String], separator: Option<&str>) -> String {
    let separator = pick_separator(items, separator, ",");
    if separator == "\n" {
        format!("\n   {}", items.join("\n   "))
    } else {
        items.join(&format!("{separator} "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("plain", false)]
    #[case("first\n| second", true)]
    #[case("first\n second", false)]
    fn detects_verticals(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(has_verticals(value), expected);
    }

    #[test]
    fn detects_leading_spaces() {
        assert!(has_leading_spaces("a\n  b"));
        assert!(!has_leading_spaces("a\nb"));
    }

    #[test]
    fn unindent_uses_first_bar_line_width() {
        let value = "This is\n|  indented\n|    deeper\nplain";
        assert_eq!(unindent_verticals(value), "This is\nindented\n  deeper\nplain");
    }

    #[test]
    fn unindent_without_bars_is_identity() {
        assert_eq!(unindent_verticals("a\n  b\nc"), "a\n  b\nc");
    }

    #[test]
    fn continuation_prefix_skips_first_line() {
        assert_eq!(prefix_continuation("one\ntwo\nthree", "   "), "one\n   two\n   three");
        assert_eq!(prefix_continuation("single", ";"), "single");
    }

    #[rstest]
    #[case("a, b,, c", None, vec!["a", "b", "c"])]
    #[case("a\nb, c\n", None, vec!["a", "b, c"])]
    #[case("a;b", Some(";"), vec!["a", "b"])]
    #[case("   ", None, vec![])]
    fn splits_items(
        #[case] text: &str,
        #[case] separator: Option<&str>,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(split_items(text, separator), expected);
    }

    #[test]
    fn long_lists_go_multiline() {
        let short = vec!["one".to_string(), "two".to_string()];
        assert_eq!(format_items(&short, None), "one, two");

        let long: Vec<String> = (0..10).map(|i| format!("item-number-{i}")).collect();
        let formatted = format_items(&long, None);
        assert!(formatted.starts_with("\n   item-number-0\n   item-number-1"));
    }
}
