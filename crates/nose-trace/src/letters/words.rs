use std::collections::BTreeMap;

use crate::core::rng::Rng;
use crate::error::{Error, Result};

/// Default campaign words, grouped by brand.
const BUILTIN: &[(&str, &[&str])] = &[
    ("Skintific", &["GLOWING", "TERAWAT"]),
    ("Scarlett", &["KINCLONG", "WANGI"]),
    ("Vaseline", &["LEMBAB", "HALUS"]),
    ("FAV Beauty", &["CERAH", "NATURAL"]),
    ("Xi Yaopin Zhi", &["HERBAL", "SEHAT"]),
];

/// One playable word and the brand it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// Upper-case, unspaced.
    pub word: String,
    pub brand: String,
}

/// Brand-tagged list of words a round can be played with.
#[derive(Debug, Clone)]
pub struct WordBank {
    entries: Vec<WordEntry>,
}

impl WordBank {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .flat_map(|(brand, words)| {
                words.iter().map(move |w| WordEntry {
                    word: w.to_string(),
                    brand: brand.to_string(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Parse `{ "Brand": ["word", ...], ... }`. Words are trimmed and upper-cased.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut entries = Vec::new();
        for (brand, words) in raw {
            for word in words {
                entries.push(WordEntry {
                    word: normalize(&word)?,
                    brand: brand.clone(),
                });
            }
        }
        if entries.is_empty() {
            return Err(Error::EmptyWordBank);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Choose a word for the next round.
    pub fn pick(&self, rng: &mut Rng) -> Result<&WordEntry> {
        rng.pick(&self.entries).ok_or(Error::EmptyWordBank)
    }
}

fn normalize(word: &str) -> Result<String> {
    let upper = word.trim().to_ascii_uppercase();
    if upper.is_empty() || !upper.chars().all(|c| c.is_ascii_uppercase() || c == ' ') {
        return Err(Error::InvalidWord(word.to_string()));
    }
    Ok(upper)
}

/// Progress through the letters of the word being played.
///
/// The display form may contain spaces; those are never traced. Letters are
/// addressed two ways: `active_letter_index` counts letters only, while an
/// ordinal is the position in the display form.
#[derive(Debug, Clone, PartialEq)]
pub struct WordState {
    display: String,
    brand: String,
    /// `(ordinal, letter)` for every non-space character.
    letters: Vec<(usize, char)>,
    active_letter_index: usize,
}

impl WordState {
    /// Start a word. With `letter_spacing`, "AT" is shown as "A T".
    pub fn new(entry: &WordEntry, letter_spacing: bool) -> Self {
        let display = if letter_spacing {
            let chars: Vec<String> = entry.word.chars().map(String::from).collect();
            chars.join(" ")
        } else {
            entry.word.clone()
        };
        let letters = display
            .chars()
            .enumerate()
            .filter(|(_, c)| *c != ' ')
            .collect();
        Self {
            display,
            brand: entry.brand.clone(),
            letters,
            active_letter_index: 0,
        }
    }

    /// The word as shown, spaces included.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    pub fn active_letter_index(&self) -> usize {
        self.active_letter_index
    }

    /// Display position of the active letter.
    pub fn active_ordinal(&self) -> Option<usize> {
        self.letters.get(self.active_letter_index).map(|(ordinal, _)| *ordinal)
    }

    pub fn active_letter(&self) -> Option<char> {
        self.letters.get(self.active_letter_index).map(|(_, letter)| *letter)
    }

    /// `(ordinal, letter)` pairs in order.
    pub fn letters(&self) -> &[(usize, char)] {
        &self.letters
    }

    pub fn is_complete(&self) -> bool {
        self.active_letter_index >= self.letters.len()
    }

    /// Move on to the next letter; returns the new index.
    pub(crate) fn advance(&mut self) -> usize {
        if !self.is_complete() {
            self.active_letter_index += 1;
        }
        self.active_letter_index
    }
}
