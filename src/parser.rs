use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Characters the line heuristic treats as evidence of phonetic notation.
pub const DEFAULT_PHONETIC_MARKERS: &[char] = &['/', '[', ']', 'ˈ', 'ː'];

static LABELED_NUMBERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)1\s*\.\s*text\s*:\s*([\s\S]*?)\s*2\s*\.\s*pronunciation\s*:\s*([\s\S]*?)\s*3\s*\.\s*translation\s*:\s*([\s\S]*)",
    )
    .expect("labeled numbered pattern")
});

static LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)text\s*:\s*([\s\S]*?)\s*pronunciation\s*:\s*([\s\S]*?)\s*translation\s*:\s*([\s\S]*)",
    )
    .expect("labeled pattern")
});

static BARE_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*1\.[ \t]*(.+?)\r?\n[ \t]*2\.[ \t]*(.+?)\r?\n[ \t]*3\.[ \t]*([\s\S]+)")
        .expect("bare ordinal pattern")
});

// Tried in priority order; the first pattern whose captures survive the
// acceptance check wins.
static STRATEGIES: &[&Lazy<Regex>] = &[&LABELED_NUMBERED, &LABELED, &BARE_ORDINAL];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFields {
    pub text: String,
    pub pronunciation: String,
    pub translation: String,
}

#[derive(Debug, Clone)]
pub struct ResponseParser {
    markers: Vec<char>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self {
            markers: DEFAULT_PHONETIC_MARKERS.to_vec(),
        }
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: Vec<char>) -> Self {
        if markers.is_empty() {
            return Self::default();
        }
        Self { markers }
    }

    /// Extracts the three labeled fields from a free-form model reply.
    /// Never fails; unstructured input degrades to a text-only record.
    pub fn parse(&self, raw: &str) -> ParsedFields {
        let normalized = raw.trim();

        for pattern in STRATEGIES {
            if let Some(fields) = extract_captures(pattern, normalized) {
                return fields;
            }
        }

        if let Some(fields) = self.split_lines(normalized) {
            return fields;
        }

        warn!(
            "model response did not match any structured layout: {}",
            normalized
        );
        ParsedFields {
            text: normalized.to_string(),
            pronunciation: String::new(),
            translation: String::new(),
        }
    }

    fn split_lines(&self, input: &str) -> Option<ParsedFields> {
        let lines = input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        if lines.len() < 3 {
            return None;
        }

        let text = lines[0].to_string();
        let marker_line = lines[1..]
            .iter()
            .position(|line| line.contains(self.markers.as_slice()));

        Some(match marker_line {
            Some(offset) => {
                let index = offset + 1;
                ParsedFields {
                    text,
                    pronunciation: lines[index].to_string(),
                    translation: lines[index + 1..].join(" "),
                }
            }
            None => ParsedFields {
                text,
                pronunciation: String::new(),
                translation: lines[1..].join(" "),
            },
        })
    }
}

// A syntactic match with any empty group is treated as no match so the next
// strategy gets a chance at a complete extraction.
fn extract_captures(pattern: &Regex, input: &str) -> Option<ParsedFields> {
    let captures = pattern.captures(input)?;
    let text = captures.get(1)?.as_str().trim();
    let pronunciation = captures.get(2)?.as_str().trim();
    let translation = captures.get(3)?.as_str().trim();
    if text.is_empty() || pronunciation.is_empty() || translation.is_empty() {
        return None;
    }
    Some(ParsedFields {
        text: text.to_string(),
        pronunciation: pronunciation.to_string(),
        translation: translation.to_string(),
    })
}
