//! Inline colour markup
//!
//! `[c=RRGGBBAA]text[/c]` colours the enclosed characters. Tags are matched
//! case-insensitively and removed from the text; span indices refer to the
//! decoded text. Malformed tags (no closing tag or bracket, a value that is
//! not hexadecimal, an empty span) are left in place.

use crate::render::color::Color;

const OPEN_TAG: &str = "[c=";
const CLOSE_TAG: &str = "[/c]";

/// Inclusive character range of decoded text drawn in one colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSpan {
    /// First character index
    pub start: usize,
    /// Last character index
    pub end: usize,
    /// Colour of the range
    pub color: Color,
}

impl ColorSpan {
    /// Whether `index` falls inside the span
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Text with colour tags removed, plus the spans they described
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorCodes {
    /// Text without tags
    pub text: String,
    /// Spans in tag order
    pub spans: Vec<ColorSpan>,
}

impl ColorCodes {
    /// Colour of the first span containing `index`
    pub fn color_at(&self, index: usize) -> Option<Color> {
        self.spans.iter().find(|span| span.contains(index)).map(|span| span.color)
    }
}

fn find_ignore_case(haystack: &[char], needle: &str, from: usize) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.iter().zip(&needle).all(|(a, b)| a.eq_ignore_ascii_case(b)))
        .map(|i| i + from)
}

fn find_char(haystack: &[char], needle: char, from: usize) -> Option<usize> {
    haystack.get(from..)?.iter().position(|c| *c == needle).map(|i| i + from)
}

fn parse_hex(value: &[char]) -> Option<u32> {
    if value.is_empty() || value.len() > 8 || !value.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    u32::from_str_radix(&value.iter().collect::<String>(), 16).ok()
}

/// Strip colour tags from `text`
pub fn parse_color_codes(text: &str) -> ColorCodes {
    let mut chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut next = find_ignore_case(&chars, OPEN_TAG, 0);

    while let Some(code_start) = next {
        if code_start + OPEN_TAG.len() >= chars.len() {
            break;
        }

        let end_bracket = find_char(&chars, ']', code_start);
        let close = find_ignore_case(&chars, CLOSE_TAG, code_start + 1);

        // a nested opening tag before this tag closes ends parsing after this tag
        next = find_ignore_case(&chars, OPEN_TAG, code_start + 1);
        if let (Some(following), Some(close)) = (next, close) {
            if following < close {
                next = None;
            }
        }

        let (Some(end_bracket), Some(close)) = (end_bracket, close) else {
            log::debug!("Ignoring unterminated colour code at {code_start}");
            continue;
        };
        let value_start = code_start + OPEN_TAG.len();
        if end_bracket <= value_start {
            log::debug!("Ignoring empty colour code at {code_start}");
            continue;
        }
        let Some(rgba) = parse_hex(&chars[value_start..end_bracket]) else {
            log::debug!("Ignoring non-hexadecimal colour code at {code_start}");
            continue;
        };
        if close <= end_bracket + 1 {
            log::debug!("Ignoring colour code with no text at {code_start}");
            continue;
        }

        let length = close - end_bracket - 1;
        chars.drain(close..close + CLOSE_TAG.len());
        chars.drain(code_start..=end_bracket);
        spans.push(ColorSpan {
            start: code_start,
            end: code_start + length - 1,
            color: Color::from_rgba(rgba),
        });

        next = find_ignore_case(&chars, OPEN_TAG, code_start);
    }

    ColorCodes {
        text: chars.into_iter().collect(),
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_code_is_stripped() {
        let codes = parse_color_codes("a [c=FF0000FF]b[/c] c");
        assert_eq!(codes.text, "a b c");
        assert_eq!(codes.spans.len(), 1);
        assert_eq!(codes.color_at(2), Some(Color::RED));
        assert_eq!(codes.color_at(0), None);
        assert_eq!(codes.color_at(4), None);
    }

    #[test]
    fn test_malformed_codes_are_left_alone() {
        for input in ["[c=ZZ]x[/c]", "[c=]x[/c]", "[c=FF0000FF]x", "[c=FF0000FF][/c]", "[c=FF"] {
            let codes = parse_color_codes(input);
            assert_eq!(codes.text, input);
            assert!(codes.spans.is_empty());
        }
    }

    #[test]
    fn test_tags_are_case_insensitive_and_sequential() {
        let codes = parse_color_codes("[C=00FF00FF]go[/C] and [c=0000ffff]stop[/c]");
        assert_eq!(codes.text, "go and stop");
        assert_eq!(codes.spans[0].start, 0);
        assert_eq!(codes.spans[0].end, 1);
        assert_eq!(codes.spans[0].color, Color::GREEN);
        assert_eq!(codes.spans[1].start, 7);
        assert_eq!(codes.spans[1].end, 10);
        assert_eq!(codes.spans[1].color, Color::BLUE);
    }

    #[test]
    fn test_plain_text_unchanged() {
        let codes = parse_color_codes("no markup [here]");
        assert_eq!(codes.text, "no markup [here]");
        assert!(codes.spans.is_empty());
    }
}
