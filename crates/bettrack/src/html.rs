//! Low-level HTML string helpers for the rendered history table.
//!
//! Deliberately naive: no DOM, just ASCII case-insensitive tag scanning
//! tailored to the site's markup. Good enough for `<tr>`/`<td>` tables and
//! the handful of marked elements the extractor needs.

/// Find `needle` in `haystack` (ASCII case-insensitive) at or after `from`.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
        .map(|i| i + from)
}

/// Successive `<tag ...>...</tag>` blocks in document order. Top level only:
/// nested same-name tags are not handled, which this markup never needs.
pub fn blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_ci(s, &open, pos) {
        // Real tag boundary: `<td` must not match `<tdata...>`.
        let after = s.as_bytes().get(start + open.len());
        if !matches!(after, Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')) {
            pos = start + open.len();
            continue;
        }
        let Some(open_end) = s[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let Some(close_start) = find_ci(s, &close, open_end) else {
            break;
        };
        let Some(close_end) = s[close_start..].find('>').map(|i| close_start + i + 1) else {
            break;
        };
        out.push(&s[start..close_end]);
        pos = close_end;
    }
    out
}

/// The opening tag of a block, attributes included.
pub fn open_tag(block: &str) -> &str {
    match block.find('>') {
        Some(i) => &block[..=i],
        None => block,
    }
}

/// Raw inner HTML of a block, between the opening tag and the final closing tag.
pub fn inner(block: &str) -> &str {
    let start = block.find('>').map(|i| i + 1).unwrap_or(0);
    let end = block.rfind("</").unwrap_or(block.len());
    if end >= start { &block[start..end] } else { "" }
}

/// Visible text of a block: tags stripped, common entities decoded,
/// whitespace collapsed and trimmed.
pub fn text(block: &str) -> String {
    let mut flat = String::with_capacity(block.len());
    let mut in_tag = false;
    for ch in inner(block).chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => flat.push(ch),
            _ => {}
        }
    }
    let decoded = decode_entities(&flat);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The entities the site actually emits. `&amp;` goes last so decoded
/// ampersands are not re-expanded.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Inner texts of every element whose opening tag contains `marker`
/// (a class fragment or data attribute), in document order.
pub fn marked_texts(s: &str, marker: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(hit) = find_ci(s, marker, pos) {
        pos = hit + marker.len();

        let Some(tag_start) = s[..hit].rfind('<') else {
            continue;
        };
        let Some(tag_end) = s[tag_start..].find('>').map(|i| tag_start + i) else {
            break;
        };
        // The marker must sit inside an opening tag, not in text content.
        if hit > tag_end || s.as_bytes().get(tag_start + 1) == Some(&b'/') {
            continue;
        }

        let name = tag_name(s, tag_start);
        if name.is_empty() {
            continue;
        }
        let close = format!("</{name}");
        let Some(close_start) = find_ci(s, &close, tag_end + 1) else {
            continue;
        };
        let Some(close_end) = s[close_start..].find('>').map(|i| close_start + i + 1) else {
            break;
        };
        out.push(text(&s[tag_start..close_end]));
        pos = close_end;
    }
    out
}

/// Text of the first `tag` element whose opening tag mentions `class`.
pub fn class_text(s: &str, tag: &str, class: &str) -> Option<String> {
    blocks(s, tag)
        .into_iter()
        .find(|b| open_tag(b).contains(class))
        .map(text)
}

/// Text of the first `tag` element inside `s`.
pub fn first_block_text(s: &str, tag: &str) -> Option<String> {
    blocks(s, tag).first().map(|b| text(b))
}

fn tag_name(s: &str, tag_start: usize) -> &str {
    let rest = &s[tag_start + 1..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_and_text() {
        let html = "<table><tr class=\"a\"><td>one</td><td> two <b>bold</b></td></tr></table>";
        let rows = blocks(html, "tr");
        assert_eq!(rows.len(), 1);
        let cells = blocks(rows[0], "td");
        assert_eq!(cells.len(), 2);
        assert_eq!(text(cells[0]), "one");
        assert_eq!(text(cells[1]), "two bold");
    }

    #[test]
    fn test_tag_boundary() {
        // <td must not swallow a <tdata-like tag
        let html = "<tdata>x</tdata><td>y</td>";
        let cells = blocks(html, "td");
        assert_eq!(cells.len(), 1);
        assert_eq!(text(cells[0]), "y");
    }

    #[test]
    fn test_marked_texts_in_order() {
        let html = concat!(
            "<span data-testid=\"currency-value\"> 25.00</span>",
            "<p>data-testid=\"currency-value\" in prose does not count</p>",
            "<span data-testid=\"currency-value\">45.50</span>",
        );
        let texts = marked_texts(html, "data-testid=\"currency-value\"");
        assert_eq!(texts, vec!["25.00", "45.50"]);
    }

    #[test]
    fn test_class_text() {
        let html = "<h4 class=\"size-large capitalize\">Won</h4><h4 class=\"text-light-1\">Game</h4>";
        assert_eq!(class_text(html, "h4", "capitalize").as_deref(), Some("Won"));
        assert_eq!(class_text(html, "h4", "text-light-1").as_deref(), Some("Game"));
        assert_eq!(class_text(html, "h4", "missing"), None);
    }

    #[test]
    fn test_entities() {
        let html = "<td>A&nbsp;&amp;&nbsp;B</td>";
        assert_eq!(text(html), "A & B");
    }
}
