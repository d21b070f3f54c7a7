//! HTML helper functions

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render an HTML element with escaped attribute values
///
/// Attributes with a `None` value are written as bare boolean attributes.
///
/// # Examples
/// ```ignore
/// element("a", &[("href", Some("/x"))], "X") // -> <a href="/x">X</a>
/// ```
pub fn element(name: &str, attrs: &[(&str, Option<&str>)], inner_html: &str) -> String {
    let mut out = format!("<{}", name);
    for (key, value) in attrs {
        match value {
            Some(value) => {
                out.push_str(&format!(r#" {}="{}""#, key, escape_html(value)));
            }
            None => {
                out.push(' ');
                out.push_str(key);
            }
        }
    }
    out.push('>');
    out.push_str(inner_html);
    out.push_str(&format!("</{}>", name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_element() {
        let html = element(
            "iframe",
            &[("src", Some("https://a.test/?x=1&y=\"2\"")), ("allowfullscreen", None)],
            "",
        );
        assert_eq!(
            html,
            r#"<iframe src="https://a.test/?x=1&amp;y=&quot;2&quot;" allowfullscreen></iframe>"#
        );
    }
}
