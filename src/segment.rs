use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.?!]\s+").expect("sentence boundary pattern is valid")
});

/// Split a passage into sentences on the whitespace that follows `.`, `?` or
/// `!`. The punctuation stays attached to the sentence it closes and blank
/// pieces are dropped.
///
/// Abbreviations and decimal numbers are not special-cased, so
/// `"Dr. Watson"` becomes two sentences.
pub fn split_sentences(passage: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for mat in SENTENCE_END.find_iter(passage) {
        // every terminal mark is a single ASCII byte
        push_trimmed(&mut sentences, &passage[start..mat.start() + 1]);
        start = mat.end();
    }
    push_trimmed(&mut sentences, &passage[start..]);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() {
        sentences.push(candidate.to_string());
    }
}
