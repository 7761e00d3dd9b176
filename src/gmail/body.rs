//! Body extraction — turns a message's MIME tree into normalized plain text.
//!
//! Prefers the first `text/plain` part found in pre-order; falls back to the
//! first `text/html` part with tags stripped. Decoding is lossy end to end:
//! malformed base64 and invalid UTF-8 degrade to empty or substituted text,
//! never to an error.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use super::api::MessagePart;

/// First-found `text/plain` and `text/html` payloads from a pre-order walk.
#[derive(Debug, Default)]
struct BodyCandidates<'a> {
    plain: Option<&'a str>,
    html: Option<&'a str>,
}

/// Extract a normalized plain-text body from a message's MIME tree.
///
/// Returns an empty string when the tree carries no usable text part.
pub fn extract_body(root: &MessagePart) -> String {
    let mut found = BodyCandidates::default();
    collect_candidates(root, &mut found);

    let (data, is_html_fallback) = match (found.plain, found.html) {
        (Some(plain), _) => (plain, false),
        (None, Some(html)) => (html, true),
        (None, None) => return String::new(),
    };

    let decoded = decode_base64_lossy(data);
    let text = unescape_entities(&decoded);

    if is_html_fallback {
        strip_tags(&text)
    } else {
        text
    }
}

/// Depth-first pre-order walk keeping the first candidate of each kind.
/// Later matches of an already-filled kind are ignored.
fn collect_candidates<'a>(part: &'a MessagePart, found: &mut BodyCandidates<'a>) {
    let mime = part.mime_type.as_deref().unwrap_or("");

    if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
        if mime == "text/plain" && found.plain.is_none() {
            found.plain = Some(data);
        } else if mime == "text/html" && found.html.is_none() {
            found.html = Some(data);
        }
    }

    if let Some(parts) = &part.parts {
        for sub in parts {
            collect_candidates(sub, found);
        }
    }
}

/// Decode URL-safe base64 whose trailing `=` padding may have been stripped
/// in transit: restore the length to a multiple of four, then decode, reading
/// the bytes as UTF-8 with invalid sequences substituted. Input that still
/// fails to decode yields an empty string.
fn decode_base64_lossy(data: &str) -> String {
    let mut padded = data.to_owned();
    let missing = padded.len() % 4;
    if missing != 0 {
        padded.push_str(&"=".repeat(4 - missing));
    }

    match URL_SAFE.decode(padded.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Unescape the common named HTML entities plus numeric character
/// references. Safe no-op on plain text without entities. Single pass, so
/// double-escaped input stays escaped once (`&amp;lt;` becomes `&lt;`).
fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_entity(rest) {
            Some((decoded, len)) => {
                out.push(decoded);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode one entity at the start of `s` (which begins with `&`), returning
/// the character and the byte length consumed. Unknown names decode to None
/// and pass through literally.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    // Entity names are short; the ';' search is bounded accordingly.
    let end = s
        .as_bytes()
        .iter()
        .take(12)
        .position(|&b| b == b';')?;
    let name = &s[1..end];

    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };

    Some((decoded, end + 1))
}

/// Strip markup tags, converting block-level boundaries to newlines so
/// line-separated textual content survives.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    let mut chars = html.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // A '<' followed by whitespace (or nothing) cannot open a tag;
            // keep it as text instead of swallowing the rest of the input.
            '<' if !in_tag => match chars.peek() {
                Some(next) if !next.is_whitespace() => {
                    in_tag = true;
                    tag.clear();
                }
                _ => out.push('<'),
            },
            '>' if in_tag => {
                in_tag = false;
                if is_block_boundary(&tag) && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ if in_tag => tag.push(ch),
            _ => out.push(ch),
        }
    }

    // Input ended mid-tag: surface the buffered text rather than dropping it.
    if in_tag {
        out.push('<');
        out.push_str(&tag);
    }

    out.trim().to_string()
}

/// Tags that terminate a visual line.
fn is_block_boundary(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "br" | "p"
            | "div"
            | "li"
            | "ul"
            | "ol"
            | "tr"
            | "table"
            | "blockquote"
            | "section"
            | "article"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::MessagePartBody;

    fn encode(text: &str) -> String {
        URL_SAFE.encode(text.as_bytes())
    }

    fn leaf(mime: &str, data: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            body: Some(MessagePartBody {
                size: Some(data.len() as u64),
                data: Some(data.to_string()),
            }),
            ..Default::default()
        }
    }

    fn container(mime: &str, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            parts: Some(parts),
            ..Default::default()
        }
    }

    #[test]
    fn plain_text_preferred_over_html() {
        let root = container(
            "multipart/alternative",
            vec![
                leaf("text/plain", "SGVsbG8="),
                leaf("text/html", &encode("<p>Hello</p>")),
            ],
        );
        assert_eq!(extract_body(&root), "Hello");
    }

    #[test]
    fn html_fallback_strips_tags_and_unescapes_entities() {
        let root = container(
            "multipart/mixed",
            vec![leaf("text/html", &encode("<b>Meet</b>&amp;Greet"))],
        );
        assert_eq!(extract_body(&root), "Meet&Greet");
    }

    #[test]
    fn first_plain_leaf_wins_in_preorder() {
        let root = container(
            "multipart/mixed",
            vec![
                leaf("text/plain", &encode("first")),
                leaf("text/plain", &encode("second")),
                leaf("text/html", &encode("<p>third</p>")),
            ],
        );
        assert_eq!(extract_body(&root), "first");
    }

    #[test]
    fn plain_found_after_html_still_wins() {
        let root = container(
            "multipart/alternative",
            vec![
                leaf("text/html", &encode("<p>markup</p>")),
                leaf("text/plain", &encode("plain wins")),
            ],
        );
        assert_eq!(extract_body(&root), "plain wins");
    }

    #[test]
    fn deeply_nested_multipart_is_searched() {
        let root = container(
            "multipart/mixed",
            vec![container(
                "multipart/mixed",
                vec![container(
                    "multipart/alternative",
                    vec![leaf("text/plain", &encode("deep"))],
                )],
            )],
        );
        assert_eq!(extract_body(&root), "deep");
    }

    #[test]
    fn tree_without_text_parts_yields_empty() {
        let root = container("multipart/mixed", vec![leaf("image/png", "aWdub3JlZA==")]);
        assert_eq!(extract_body(&root), "");
        assert_eq!(extract_body(&MessagePart::default()), "");
    }

    #[test]
    fn empty_body_data_yields_empty() {
        let root = leaf("text/plain", "");
        assert_eq!(extract_body(&root), "");
    }

    #[test]
    fn padding_repair_recovers_original_bytes() {
        // "Hello, World!" encodes to "SGVsbG8sIFdvcmxkIQ==" — drop the padding.
        let root = leaf("text/plain", "SGVsbG8sIFdvcmxkIQ");
        assert_eq!(extract_body(&root), "Hello, World!");
    }

    #[test]
    fn padding_repair_matches_padded_decode() {
        for text in ["a", "ab", "abc", "abcd", "abcde"] {
            let padded = encode(text);
            let stripped = padded.trim_end_matches('=');
            let repaired = decode_base64_lossy(stripped);
            let reference = decode_base64_lossy(&padded);
            assert_eq!(repaired, reference);
            assert_eq!(repaired, text);
        }
    }

    #[test]
    fn invalid_utf8_is_substituted_not_fatal() {
        let root = leaf("text/plain", &URL_SAFE.encode([0xff, 0x48, 0x69]));
        let body = extract_body(&root);
        assert!(body.contains('\u{FFFD}'));
        assert!(body.contains("Hi"));
    }

    #[test]
    fn malformed_base64_yields_empty() {
        let root = leaf("text/plain", "!!!not base64!!!");
        assert_eq!(extract_body(&root), "");
    }

    #[test]
    fn entities_unescaped_on_plain_text_too() {
        let root = leaf("text/plain", &encode("Tom &amp; Jerry"));
        assert_eq!(extract_body(&root), "Tom & Jerry");
    }

    #[test]
    fn numeric_character_references_are_decoded() {
        let root = leaf("text/plain", &encode("It&#8217;s at 3&#x2F;4"));
        assert_eq!(extract_body(&root), "It\u{2019}s at 3/4");
    }

    #[test]
    fn unknown_and_malformed_entities_pass_through() {
        let root = leaf("text/plain", &encode("&unknown; 5 &amp 6 &#notnum;"));
        assert_eq!(extract_body(&root), "&unknown; 5 &amp 6 &#notnum;");
    }

    #[test]
    fn double_escaped_input_unescapes_once() {
        let root = leaf("text/plain", &encode("&amp;lt;tag&amp;gt;"));
        assert_eq!(extract_body(&root), "&lt;tag&gt;");
    }

    #[test]
    fn stray_angle_bracket_does_not_swallow_text() {
        let root = leaf("text/html", &encode("<p>1 < 2 and 2 > 1</p>"));
        assert_eq!(extract_body(&root), "1 < 2 and 2 > 1");
    }

    #[test]
    fn unterminated_tag_keeps_buffered_text() {
        let root = leaf("text/html", &encode("see <a href="));
        assert_eq!(extract_body(&root), "see <a href=");
    }

    #[test]
    fn html_blocks_become_newlines() {
        let root = leaf(
            "text/html",
            &encode("<div><p>Line one</p><p>Line two</p>Line<br/>three</div>"),
        );
        assert_eq!(extract_body(&root), "Line one\nLine two\nLine\nthree");
    }

    #[test]
    fn container_body_data_is_not_extracted_as_text() {
        // A multipart node never matches text/plain or text/html itself.
        let mut root = container("multipart/mixed", vec![leaf("text/plain", &encode("leaf"))]);
        root.body = Some(MessagePartBody {
            size: Some(4),
            data: Some(encode("container")),
        });
        assert_eq!(extract_body(&root), "leaf");
    }
}
