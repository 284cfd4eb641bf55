//! crates/recap_core/src/markup.rs
//!
//! Helpers for the lightweight markup the summary generator emits
//! (headings, emphasis, links, inline code and bullet lists).
//!
//! These are textual rewrites, not a parser: nested or malformed markup is
//! passed through as-is.

use regex::Regex;
use std::sync::LazyLock;

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)[-*+][ \t]+").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid regex"));
static HTTP_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\((https?://[^)\s]+)\)").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_\n]+)__").expect("valid regex"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").expect("valid regex"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\n]+)_\b").expect("valid regex"));
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(#{1,6})\s+(.*)$").expect("valid regex"));
static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid regex"));

/// Removes markup so the text can be laid out verbatim in a document or a
/// plain-text email body. Link text is kept, the target is dropped.
pub fn strip_markup(text: &str) -> String {
    // Bullets go first so a leading "* " is not mistaken for emphasis.
    let text = BULLET.replace_all(text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BOLD_STARS.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");
    text.into_owned()
}

/// Renders the markup as a small self-contained HTML document for email bodies.
pub fn to_html(title: &str, text: &str) -> String {
    let mut body = String::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in text.lines() {
        if let Some(caps) = BULLET_LINE.captures(line) {
            flush_paragraph(&mut body, &mut paragraph);
            if !in_list {
                body.push_str("<ul>\n");
                in_list = true;
            }
            body.push_str(&format!("<li>{}</li>\n", inline_html(&caps[1])));
            continue;
        }
        if in_list {
            body.push_str("</ul>\n");
            in_list = false;
        }
        if let Some(caps) = HEADING_LINE.captures(line) {
            flush_paragraph(&mut body, &mut paragraph);
            let level = caps[1].len().clamp(1, 6);
            body.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                inline_html(&caps[2])
            ));
        } else if line.trim().is_empty() {
            flush_paragraph(&mut body, &mut paragraph);
        } else {
            paragraph.push(inline_html(line.trim()));
        }
    }
    if in_list {
        body.push_str("</ul>\n");
    }
    flush_paragraph(&mut body, &mut paragraph);

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.5; color: #1f2937;\">\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_html(title),
        body = body
    )
}

fn flush_paragraph(body: &mut String, paragraph: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    body.push_str(&format!("<p>{}</p>\n", paragraph.join("<br>")));
    paragraph.clear();
}

fn inline_html(text: &str) -> String {
    let text = escape_html(text);
    let text = HTTP_LINK.replace_all(&text, "<a href=\"$2\">$1</a>");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "<code>$1</code>");
    let text = BOLD_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "<em>$1</em>");
    text.into_owned()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_markup() {
        let input = "## Action Items\n- **Alice**: send the [deck](https://example.com/deck)\n* run `make release` _today_";
        assert_eq!(
            strip_markup(input),
            "Action Items\nAlice: send the deck\nrun make release today"
        );
    }

    #[test]
    fn keeps_indentation_of_nested_bullets_and_snake_case() {
        let input = "- top\n  - nested item_name";
        assert_eq!(strip_markup(input), "top\n  nested item_name");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let input = "Budget approved.\n\n3 x 4 = 12";
        assert_eq!(strip_markup(input), input);
    }

    #[test]
    fn html_rendering_groups_lists_and_escapes() {
        let html = to_html("Sync <weekly>", "# Decisions\n- ship **v2**\n- drop [legacy](ftp://old)\n\nNotes & follow-ups");
        assert!(html.contains("<title>Sync &lt;weekly&gt;</title>"));
        assert!(html.contains("<h1>Decisions</h1>"));
        assert!(html.contains("<ul>\n<li>ship <strong>v2</strong></li>\n<li>drop legacy</li>\n</ul>"));
        assert!(html.contains("<p>Notes &amp; follow-ups</p>"));
    }

    #[test]
    fn html_rendering_keeps_http_links() {
        let html = to_html("t", "See [the doc](https://example.com/a?b=1&c=2)");
        assert!(html.contains("<a href=\"https://example.com/a?b=1&amp;c=2\">the doc</a>"));
    }
}
