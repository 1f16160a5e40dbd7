//! Plain-text helpers for model replies and Telegram messages

use regex::Regex;
use std::sync::LazyLock;

/// Telegram rejects `sendMessage` texts longer than this many UTF-16 code units
pub const TELEGRAM_MAX_MESSAGE_UNITS: usize = 4096;

static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>.*?</think>").expect("think block pattern is a valid regex")
});

/// Significant digits kept by [`format_number`]
const SIGNIFICANT_DIGITS: i32 = 6;

/// Remove `<think>...</think>` deliberation blocks emitted by reasoning models.
///
/// An opening tag without a closing tag means the model was cut off while
/// thinking; everything from the tag onwards is dropped.
pub fn strip_think(reply: &str) -> String {
    let stripped = THINK_BLOCK.replace_all(reply, "");

    let stripped = match stripped.to_ascii_lowercase().find("<think>") {
        Some(idx) => &stripped[..idx],
        None => &stripped[..],
    };

    stripped.trim().to_string()
}

/// Byte offset where the first `max_units`-long window of `text` ends, if `text` is longer.
/// Always at least one char so an oversized char still makes progress.
fn window_end(text: &str, max_units: usize) -> Option<usize> {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return Some(if idx == 0 { ch.len_utf8() } else { idx });
        }
    }
    None
}

/// Split a message into chunks Telegram will accept, preferring line breaks.
///
/// Lengths are measured in UTF-16 code units, the way the Bot API counts them.
pub fn split_message(text: &str, max_units: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while let Some(end) = window_end(rest, max_units) {
        let cut = match rest[..end].rfind('\n') {
            Some(nl) if nl > 0 => nl,
            _ => end,
        };

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
        rest = rest.strip_prefix('\n').unwrap_or(rest);
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

/// Render a prediction with six significant digits and no float noise:
/// `7`, `2.5`, `0.333333`, `0.00004`
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    if !(-6..15).contains(&magnitude) {
        return format!("{:e}", value);
    }

    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0) as usize;
    let fixed = format!("{:.*}", decimals, value);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}
