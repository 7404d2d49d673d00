use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Hit state per letter is a `u32` mask that also travels over the wire as
/// an `f32`, so it must stay below 2^24.
pub const MAX_CHECKPOINTS: usize = 24;

/// A point on a glyph the cursor must visit, in letter-box coordinates
/// (0,0 top-left, 1,1 bottom-right).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub label: String,
}

impl Checkpoint {
    pub fn new(x: f32, y: f32, label: &str) -> Self {
        Self {
            x,
            y,
            label: label.to_string(),
        }
    }
}

type Row = (char, &'static [(f32, f32, &'static str)]);

/// Default checkpoint layout for the uppercase Latin alphabet.
const BUILTIN: &[Row] = &[
    ('A', &[(0.5, 0.0, "top"), (0.0, 1.0, "bottom_left"), (1.0, 1.0, "bottom_right"), (0.5, 0.6, "cross_bar")]),
    ('B', &[(0.0, 0.0, "top_left"), (0.0, 0.5, "middle_left"), (0.0, 1.0, "bottom_left"), (0.8, 0.25, "top_bump"), (0.8, 0.75, "bottom_bump")]),
    ('C', &[(1.0, 0.2, "top_right"), (0.2, 0.0, "top"), (0.0, 0.5, "left"), (0.2, 1.0, "bottom"), (1.0, 0.8, "bottom_right")]),
    ('D', &[(0.0, 0.0, "top_left"), (0.0, 0.5, "middle_left"), (0.0, 1.0, "bottom_left"), (0.7, 0.25, "top_curve"), (0.7, 0.75, "bottom_curve")]),
    ('E', &[(0.0, 0.0, "top_left"), (0.8, 0.0, "top_right"), (0.0, 0.5, "middle"), (0.0, 1.0, "bottom_left"), (0.8, 1.0, "bottom_right")]),
    ('F', &[(0.0, 0.0, "top_left"), (1.0, 0.0, "top_right"), (0.0, 0.5, "middle"), (0.7, 0.5, "middle_right"), (0.0, 1.0, "bottom")]),
    ('G', &[(0.8, 0.2, "top_right"), (0.2, 0.0, "top"), (0.0, 0.5, "left"), (0.5, 1.0, "bottom"), (0.8, 0.7, "bottom_right")]),
    ('H', &[(0.0, 0.0, "top_left"), (0.0, 1.0, "bottom_left"), (0.5, 0.5, "middle"), (1.0, 0.0, "top_right"), (1.0, 1.0, "bottom_right")]),
    ('I', &[(0.5, 0.0, "top"), (0.5, 0.5, "middle"), (0.5, 1.0, "bottom")]),
    ('J', &[(0.8, 0.0, "top"), (0.8, 0.7, "middle_right"), (0.5, 1.0, "bottom"), (0.2, 0.8, "bottom_left")]),
    ('K', &[(0.0, 0.0, "top_left"), (0.0, 0.5, "middle"), (0.0, 1.0, "bottom_left"), (1.0, 0.0, "top_right"), (1.0, 1.0, "bottom_right")]),
    ('L', &[(0.0, 0.0, "top"), (0.0, 1.0, "bottom_left"), (1.0, 1.0, "bottom_right")]),
    ('M', &[(0.0, 1.0, "bottom_left"), (0.0, 0.0, "top_left"), (0.5, 0.5, "middle"), (1.0, 0.0, "top_right"), (1.0, 1.0, "bottom_right")]),
    ('N', &[(0.0, 1.0, "bottom_left"), (0.0, 0.0, "top_left"), (0.5, 0.5, "middle"), (1.0, 1.0, "bottom_right"), (1.0, 0.0, "top_right")]),
    ('O', &[(0.5, 0.0, "top"), (0.0, 0.5, "left"), (0.5, 1.0, "bottom"), (1.0, 0.5, "right")]),
    ('P', &[(0.0, 0.0, "top_left"), (0.7, 0.2, "top_right"), (0.0, 0.5, "middle"), (0.7, 0.5, "middle_right"), (0.0, 1.0, "bottom")]),
    ('Q', &[(0.5, 0.0, "top"), (0.0, 0.5, "left"), (0.5, 1.0, "bottom"), (1.0, 0.5, "right"), (1.0, 1.0, "tail")]),
    ('R', &[(0.0, 0.0, "top_left"), (0.7, 0.2, "top_right"), (0.0, 0.5, "middle"), (0.0, 1.0, "bottom_left"), (0.9, 1.0, "bottom_right")]),
    ('S', &[(0.8, 0.2, "top_right"), (0.2, 0.2, "top_left"), (0.5, 0.5, "middle"), (0.2, 0.8, "bottom_left"), (0.8, 0.8, "bottom_right")]),
    ('T', &[(0.2, 0.0, "top_left"), (0.8, 0.0, "top_right"), (0.5, 0.5, "middle"), (0.5, 1.0, "bottom")]),
    ('U', &[(0.0, 0.0, "top_left"), (0.0, 0.8, "bottom_left"), (0.5, 1.0, "bottom"), (1.0, 0.8, "bottom_right"), (1.0, 0.0, "top_right")]),
    ('V', &[(0.0, 0.0, "top_left"), (0.3, 0.5, "middle_left"), (0.5, 1.0, "bottom"), (0.7, 0.5, "middle_right"), (1.0, 0.0, "top_right")]),
    ('W', &[(0.0, 0.0, "top_left"), (0.25, 1.0, "bottom_left"), (0.5, 0.5, "middle"), (0.75, 1.0, "bottom_right"), (1.0, 0.0, "top_right")]),
    ('X', &[(0.0, 0.0, "top_left"), (0.5, 0.5, "center"), (1.0, 1.0, "bottom_right"), (1.0, 0.0, "top_right"), (0.0, 1.0, "bottom_left")]),
    ('Y', &[(0.0, 0.0, "top_left"), (0.5, 0.5, "center"), (1.0, 0.0, "top_right"), (0.5, 1.0, "bottom")]),
    ('Z', &[(0.0, 0.0, "top_left"), (1.0, 0.0, "top_right"), (0.5, 0.5, "middle"), (0.0, 1.0, "bottom_left"), (1.0, 1.0, "bottom_right")]),
];

/// Checkpoints per letter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointTable {
    letters: BTreeMap<char, Vec<Checkpoint>>,
}

impl CheckpointTable {
    /// The built-in A-Z table.
    pub fn builtin() -> Self {
        let letters = BUILTIN
            .iter()
            .map(|(letter, points)| {
                let points = points.iter().map(|&(x, y, label)| Checkpoint::new(x, y, label)).collect();
                (*letter, points)
            })
            .collect();
        Self { letters }
    }

    /// Parse `{ "A": [{ "x": 0.5, "y": 0.0, "label": "top" }, ...], ... }`.
    /// Letters are upper-cased; every entry is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<Checkpoint>> = serde_json::from_str(json)?;
        let mut table = Self::default();
        for (key, points) in raw {
            let mut chars = key.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
                _ => return Err(Error::InvalidLetterKey(key)),
            };
            table.insert(letter, points)?;
        }
        Ok(table)
    }

    /// Add or replace one letter's checkpoints.
    pub fn insert(&mut self, letter: char, points: Vec<Checkpoint>) -> Result<()> {
        validate(letter, &points)?;
        self.letters.insert(letter, points);
        Ok(())
    }

    pub fn get(&self, letter: char) -> Option<&[Checkpoint]> {
        self.letters.get(&letter).map(Vec::as_slice)
    }

    pub fn contains(&self, letter: char) -> bool {
        self.letters.contains_key(&letter)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Fail unless every non-space character of `word` has checkpoints.
    pub fn ensure_covers(&self, word: &str) -> Result<()> {
        match word.chars().find(|c| *c != ' ' && !self.contains(*c)) {
            Some(missing) => Err(Error::MissingCheckpoints(missing)),
            None => Ok(()),
        }
    }
}

fn validate(letter: char, points: &[Checkpoint]) -> Result<()> {
    let invalid = |reason| Err(Error::InvalidCheckpoints { letter, reason });
    if points.is_empty() {
        return invalid("at least one checkpoint is required");
    }
    if points.len() > MAX_CHECKPOINTS {
        return invalid("at most 24 checkpoints are supported");
    }
    let in_unit = |v: f32| (0.0..=1.0).contains(&v);
    if points.iter().any(|p| !in_unit(p.x) || !in_unit(p.y)) {
        return invalid("coordinates must lie within [0, 1]");
    }
    let mut labels = HashSet::new();
    if !points.iter().all(|p| labels.insert(p.label.as_str())) {
        return invalid("labels must be unique");
    }
    Ok(())
}
