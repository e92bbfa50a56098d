// src/utils.rs

/// Collapse every whitespace run into a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case text: the first letter of every alphabetic run is uppercased,
/// the rest lowercased ("senior-dev ops" -> "Senior-Dev Ops")
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            result.push(c);
            previous_is_alpha = false;
        }
    }

    result
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("software engineer"), "Software Engineer");
        assert_eq!(title_case("SENIOR-dev ops"), "Senior-Dev Ops");
        assert_eq!(title_case("3d artist"), "3D Artist");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }
}
