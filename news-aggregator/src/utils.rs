use scraper::Html;

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove markup from a feed field, keeping only its text.
pub fn strip_html(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return collapse_whitespace(text);
    }
    let fragment = Html::parse_fragment(text);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&joined)
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lowercased alphanumeric tokens. Anything else separates tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count occurrences of the token sequence `needle` in `haystack`.
pub fn count_phrase(haystack: &[String], needle: &[String]) -> usize {
    if needle.is_empty() || needle.len() > haystack.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Split prose into sentences.
///
/// A sentence ends at `.`, `!` or `?` when followed by whitespace and then an
/// uppercase letter, a digit or an opening quote. Text after the last boundary
/// is a sentence of its own.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = collapse_whitespace(text);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, &(idx, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let Some(&(_, gap)) = chars.get(i + 1) else { continue };
        let Some(&(_, next)) = chars.get(i + 2) else { continue };
        if gap == ' ' && starts_sentence(next) {
            let end = idx + c.len_utf8();
            sentences.push(text[start..end].trim().to_string());
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '\'' | '\u{201c}' | '\u{2018}')
}

