//! HTML map document output.

mod color;
mod writer;

pub use color::Palette;
pub(crate) use color::*;
pub(crate) use writer::*;

use serde::Serialize;
use serde_json::Error as JsonError;

/// Escape text for HTML element content and quoted attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON literal safe to embed inside a `<script>` element.
pub(crate) fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
        assert_eq!(escape_html("Übertragungskapazität"), "Übertragungskapazität");
    }

    #[test]
    fn script_json_cannot_close_the_script_element() {
        let json = script_json(&vec!["</script><b>"]).unwrap();
        assert!(!json.contains("</script>"));
        assert_eq!(json, r#"["<\/script><b>"]"#);
    }
}
