//! Markup to terminal text.
//!
//! Chunks are never split inside a tag, so each chunk can be flattened on its own.
//! Block-level closing tags and `<br>` become line breaks; everything else between
//! `<` and `>` is dropped. `script` and `style` bodies are skipped.

/// Tags whose end starts a new line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "ul", "ol",
    "table", "section", "article",
];

/// Tags whose content is not displayed.
const HIDDEN_TAGS: &[&str] = &["script", "style"];

/// Flatten markup to plain text.
///
/// # Examples
///
/// ```
/// use virtual_content::view::markup::to_plain;
///
/// assert_eq!(to_plain("<p>a &amp; b</p><p>c</p>"), "a & b\nc\n");
/// ```
pub fn to_plain(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        push_text(&mut out, &rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            // Unterminated tag: show it verbatim.
            push_text(&mut out, &rest[open..]);
            return out;
        };
        let tag = Tag::parse(&after[..close]);
        rest = &after[close + 1..];

        if !tag.closing && !tag.self_closing && HIDDEN_TAGS.contains(&tag.name.as_str()) {
            match skip_past_closing(rest, &tag.name) {
                Some(end) => rest = &rest[end..],
                None => return out,
            }
            continue;
        }
        let breaks = tag.name == "br"
            || tag.name == "hr"
            || (tag.closing && BLOCK_TAGS.contains(&tag.name.as_str()));
        if breaks {
            out.push('\n');
        }
    }

    push_text(&mut out, rest);
    out
}

/// Byte offset just past `</name ...>` in `text`.
fn skip_past_closing(text: &str, name: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find(&format!("</{name}"))?;
    let close = lower[start..].find('>')?;
    Some(start + close + 1)
}

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
}

impl Tag {
    fn parse(inner: &str) -> Self {
        let inner = inner.trim();
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let self_closing = body.ends_with('/');
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self {
            name,
            closing,
            self_closing,
        }
    }
}

/// Append `text` with character references decoded.
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';').and_then(|end| {
            decode_entity(&after[..end]).map(|decoded| (decoded, end))
        }) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
