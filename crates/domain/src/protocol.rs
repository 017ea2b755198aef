//! Text conventions shared by review and comment bodies.

/// A piece of comment text, split on `@mention` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Mention(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Splits `text` into plain runs and `@name` mentions, in order.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut end = at + 1;
        while let Some(&(i, next)) = chars.peek() {
            if !is_name_char(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        if end == at + 1 {
            continue;
        }
        if plain_start < at {
            out.push(Segment::Plain(&text[plain_start..at]));
        }
        out.push(Segment::Mention(&text[at..end]));
        plain_start = end;
    }

    if plain_start < text.len() {
        out.push(Segment::Plain(&text[plain_start..]));
    }
    out
}

/// Mentioned names (without the `@`).
pub fn mentions(text: &str) -> Vec<&str> {
    segments(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Mention(m) => Some(&m[1..]),
            Segment::Plain(_) => None,
        })
        .collect()
}

/// Name used when mentioning the author of a replied-to comment.
pub fn reply_mention_name(author_name: &str) -> String {
    author_name.split_whitespace().collect()
}
