//! Turn the story service's inline HTML into terminal text.
//!
//! Only the handful of tags the service actually emits get special
//! treatment: `<span class="highlight">` is coloured, `<br>` and closing
//! block tags become line breaks. Every other tag is dropped.

use colored::Colorize;

#[derive(Debug, PartialEq)]
enum Tag {
    LineBreak,
    HighlightOpen,
    SpanOpen,
    SpanClose,
    Other,
}

fn classify(raw: &str) -> Tag {
    let body = raw.trim().trim_end_matches('/').trim();
    let lower = body.to_ascii_lowercase();
    let name = lower
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default();
    match name {
        "br" | "/p" | "/div" | "/li" => Tag::LineBreak,
        "span" if lower.contains("highlight") => Tag::HighlightOpen,
        "span" => Tag::SpanOpen,
        "/span" => Tag::SpanClose,
        _ => Tag::Other,
    }
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "#39" | "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// A `<` only starts a tag when a name, `/` or `!` follows it.
fn opens_tag(rest: &str) -> bool {
    rest[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Walk the markup, calling `text` for every run of text together with
/// whether it sits inside a highlight span.
fn walk(html: &str, mut text: impl FnMut(&str, bool)) {
    let mut spans: Vec<bool> = Vec::new();
    let mut run = String::new();
    let mut rest = html;

    let highlighted = |spans: &[bool]| spans.iter().any(|h| *h);

    while let Some(c) = rest.chars().next() {
        match c {
            '<' if opens_tag(rest) => match rest.find('>') {
                Some(end) => {
                    let tag = classify(&rest[1..end]);
                    rest = &rest[end + 1..];
                    let before = highlighted(&spans);
                    match tag {
                        Tag::LineBreak => run.push('\n'),
                        Tag::HighlightOpen => spans.push(true),
                        Tag::SpanOpen => spans.push(false),
                        Tag::SpanClose => {
                            spans.pop();
                        }
                        Tag::Other => {}
                    }
                    if before != highlighted(&spans) && !run.is_empty() {
                        text(&run, before);
                        run.clear();
                    }
                }
                None => {
                    run.push_str(rest);
                    rest = "";
                }
            },
            '&' => {
                let decoded = rest
                    .find(';')
                    .filter(|end| *end <= 6)
                    .and_then(|end| decode_entity(&rest[1..end]).map(|ch| (ch, end)));
                match decoded {
                    Some((ch, end)) => {
                        run.push(ch);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        run.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                run.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    if !run.is_empty() {
        text(&run, highlighted(&spans));
    }
}

/// Render narrative markup for the terminal, colouring highlights.
pub fn render_narrative(html: &str) -> String {
    let mut out = String::new();
    walk(html, |run, highlighted| {
        if highlighted {
            out.push_str(&run.yellow().bold().to_string());
        } else {
            out.push_str(run);
        }
    });
    out
}

/// The text content of narrative markup, without any styling.
pub fn plain_text(html: &str) -> String {
    let mut out = String::new();
    walk(html, |run, _| out.push_str(run));
    out
}
