//! Turning transcript pages into dialogue lines and picking the reply that
//! follows a phrase.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::distance::{char_len, levenshtein, within};
use crate::echo::capitalize_first;
use crate::error::BotError;
use crate::phrases::split_sentences;

static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Invalid break regex"));

/// Narrower candidates holding the script text, tried in order.
const LINE_BREAK_CONTAINERS: &str = "pre, td.scrtext";
const MARKUP_BREAK_CONTAINERS: &str = "div.scrolling-script-container, div.movie_script";

/// How a transcript host lays out dialogue lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptStyle {
    /// One line of dialogue per text line.
    LineBreaks,
    /// Lines separated by `<br>` markup inside one block of text.
    MarkupBreaks,
}

/// One spoken sentence after merging page fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    /// Sentence text with any speaker label removed.
    pub text: String,
    /// Starts with a dash and has at least two words: a new speaker.
    pub new_speaker: bool,
}

/// Split a transcript page into raw text lines according to `style`.
pub fn split_lines(html: &str, style: TranscriptStyle) -> Result<Vec<String>, BotError> {
    match style {
        TranscriptStyle::LineBreaks => {
            let document = Html::parse_document(html);
            let selector = parse_selector(LINE_BREAK_CONTAINERS)?;
            let mut text: String = document
                .select(&selector)
                .flat_map(|el| el.text())
                .collect();
            if text.trim().is_empty() {
                text = document.root_element().text().collect();
            }
            Ok(text.lines().map(|l| l.to_string()).collect())
        }
        TranscriptStyle::MarkupBreaks => {
            let document = Html::parse_document(html);
            let selector = parse_selector(MARKUP_BREAK_CONTAINERS)?;
            let markup = document
                .select(&selector)
                .next()
                .map(|el| el.inner_html())
                .unwrap_or_else(|| html.to_string());
            Ok(BREAK_RE
                .split(&markup)
                .map(|fragment| {
                    Html::parse_fragment(fragment)
                        .root_element()
                        .text()
                        .collect::<String>()
                        .replace('\n', " ")
                })
                .collect())
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector, BotError> {
    Selector::parse(css).map_err(|e| BotError::Parse(format!("selector {}: {}", css, e)))
}

/// Remove a leading speaker marker: a dash, or a label ending in `:` or `]`
/// that appears before the first space.
pub fn strip_speaker_label(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with('-') {
        return line.trim_start_matches('-').trim_start();
    }
    let first_space = line.find(' ').unwrap_or(line.len());
    match line.find([':', ']']) {
        Some(idx) if idx < first_space => line[idx + 1..].trim_start(),
        _ => line,
    }
}

fn ends_sentence(text: &str) -> bool {
    text.trim_end_matches(['"', '\'', ')'])
        .ends_with(['.', '!', '?'])
}

/// Whether a line-break transcript fragment is a character cue: a name on
/// its own line, in capitals, with no sentence terminator.
fn is_speaker_cue(fragment: &str) -> bool {
    fragment.chars().any(char::is_alphabetic)
        && !fragment.chars().any(char::is_lowercase)
        && !ends_sentence(fragment)
}

fn flush(merged: &mut Vec<DialogueLine>, buffer: &mut String, new_speaker: bool) {
    if !buffer.trim().is_empty() {
        merged.push(DialogueLine {
            text: std::mem::take(buffer),
            new_speaker,
        });
    }
    buffer.clear();
}

/// Join fragments until one ends a sentence, producing one line per spoken
/// sentence. Blank lines are dropped.
///
/// In [`TranscriptStyle::LineBreaks`] pages a character cue ends the line in
/// progress and marks the next one as a new speaker; the cue itself is not
/// part of any line.
pub fn merge_sentences(lines: &[String], style: TranscriptStyle) -> Vec<DialogueLine> {
    let mut merged = Vec::new();
    let mut buffer = String::new();
    let mut new_speaker = false;
    let mut cued = false;

    for raw in lines {
        let fragment = raw.trim();
        if fragment.is_empty() {
            continue;
        }
        if style == TranscriptStyle::LineBreaks && is_speaker_cue(fragment) {
            flush(&mut merged, &mut buffer, new_speaker);
            cued = true;
            continue;
        }
        if buffer.is_empty() {
            new_speaker = cued
                || (fragment.starts_with('-') && fragment.split_whitespace().count() >= 2);
            cued = false;
            buffer.push_str(strip_speaker_label(fragment));
        } else {
            buffer.push(' ');
            buffer.push_str(fragment);
        }
        if ends_sentence(&buffer) {
            flush(&mut merged, &mut buffer, new_speaker);
        }
    }
    flush(&mut merged, &mut buffer, new_speaker);
    merged
}

/// Find `phrase` in the dialogue and return the line that answers it.
///
/// A line hits when one of its sentences is within `len(phrase) * ratio`
/// edits of the phrase, ignoring case. The reply is, in order of preference:
/// the next new-speaker line within `lookahead` lines; the sentence after
/// the hit on the same line; the next line, unless it is itself within half
/// the phrase length of the phrase.
pub fn extract_reply(
    lines: &[DialogueLine],
    phrase: &str,
    lookahead: usize,
    ratio: f64,
) -> Option<String> {
    let target = phrase.to_lowercase();
    let target_len = char_len(&target);

    for (i, line) in lines.iter().enumerate() {
        let sentences = split_sentences(&line.text);
        let Some(hit) = sentences.iter().position(|s| {
            within(levenshtein(&s.to_lowercase(), &target), target_len, ratio)
        }) else {
            continue;
        };

        let mut window = lines.iter().skip(i + 1).take(lookahead);
        if let Some(answer) = window.find(|l| l.new_speaker) {
            return Some(answer.text.clone());
        }

        if let Some(rest) = sentences.get(hit + 1) {
            return Some(capitalize_first(rest));
        }

        if let Some(next) = lines.get(i + 1) {
            let echo = levenshtein(&next.text.to_lowercase(), &target);
            if !within(echo, target_len, 0.5) {
                return Some(next.text.clone());
            }
        }
    }
    None
}
