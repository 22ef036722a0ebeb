//! Approximate string matching.
//!
//! [`Pattern`] runs a bit-parallel (Bitap, Wu–Manber) search for the best
//! approximate occurrence of a query anywhere in a text. The score of a hit
//! is `errors / pattern_len`: `0.0` is an exact substring, `1.0` shares
//! nothing. Position in the text does not affect the score. Matching is
//! case-insensitive and treats `_` and `-` as spaces, so file stems compare
//! like the titles they spell.
//!
//! [`FuzzyIndex`] scores records over several weighted fields and ranks them.

use std::collections::HashMap;

use crate::media;
use crate::record::{ImageRecord, MatchRange, MatchResult};

/// Width of one Bitap register. Longer patterns are searched in chunks.
const MAX_BITS: usize = 64;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// Best occurrence of a pattern in one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub score:   f64,
    pub indices: Vec<MatchRange>,
}

struct Chunk {
    len:   usize,
    masks: HashMap<char, u64>,
}

impl Chunk {
    fn new(chars: &[char]) -> Self {
        let mut masks: HashMap<char, u64> = HashMap::new();
        for (i, c) in chars.iter().enumerate() {
            *masks.entry(*c).or_insert(0) |= 1 << i;
        }
        Self { len: chars.len(), masks }
    }
}

/// A compiled, case-insensitive search pattern.
pub struct Pattern {
    chars:  Vec<char>,
    chunks: Vec<Chunk>,
}

impl Pattern {
    pub fn new(query: &str) -> Self {
        let chars = fold(query);
        let len = chars.len();

        let mut chunks = Vec::new();
        if len <= MAX_BITS {
            chunks.push(Chunk::new(&chars));
        } else {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            let mut i = 0;
            while i < end {
                chunks.push(Chunk::new(&chars[i..i + MAX_BITS]));
                i += MAX_BITS;
            }
            // Tail chunk overlaps the previous one to stay full width
            if remainder > 0 {
                chunks.push(Chunk::new(&chars[len - MAX_BITS..]));
            }
        }

        Self { chars, chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Best occurrence of this pattern in `text` scoring at most `threshold`.
    pub fn search(&self, text: &str, threshold: f64) -> Option<FieldMatch> {
        if self.chars.is_empty() {
            return None;
        }
        let text = fold(text);

        if let Some(start) = find_exact(&text, &self.chars) {
            return Some(FieldMatch {
                score:   0.0,
                indices: vec![(start, start + self.chars.len() - 1)],
            });
        }

        if self.chunks.len() == 1 {
            return bitap(&self.chunks[0], &text, threshold);
        }

        let mut matched = false;
        let mut total = 0.0;
        let mut indices = Vec::new();
        for chunk in &self.chunks {
            match bitap(chunk, &text, threshold) {
                Some(hit) => {
                    matched = true;
                    total += hit.score;
                    indices.extend(hit.indices);
                }
                None => total += 1.0,
            }
        }
        if !matched {
            return None;
        }
        indices.sort_unstable();
        indices.dedup();
        Some(FieldMatch {
            score: total / self.chunks.len() as f64,
            indices,
        })
    }
}

/// Case- and separator-folded characters of `s`, one per input character so
/// match ranges index the original text.
fn fold(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            c => c.to_lowercase().next().unwrap_or(c),
        })
        .collect()
}

fn find_exact(text: &[char], pattern: &[char]) -> Option<usize> {
    if pattern.len() > text.len() {
        return None;
    }
    text.windows(pattern.len()).position(|w| w == pattern)
}

/// Low `n` bits set.
fn low_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Approximate search of one chunk with at most `floor(threshold * len)` errors.
///
/// `r[d]` bit `i` is set when the chunk's first `i + 1` characters match a
/// substring ending at the current text position with at most `d` edits.
fn bitap(chunk: &Chunk, text: &[char], threshold: f64) -> Option<FieldMatch> {
    let m = chunk.len;
    if m == 0 {
        return None;
    }
    let max_errors = ((threshold * m as f64).floor() as usize).min(m);
    let last = 1u64 << (m - 1);

    let mut r: Vec<u64> = (0..=max_errors).map(low_bits).collect();
    let mut best: Option<(usize, usize)> = None;

    for (j, c) in text.iter().enumerate() {
        let mask = chunk.masks.get(c).copied().unwrap_or(0);

        let mut prev_old = r[0];
        r[0] = ((r[0] << 1) | 1) & mask;
        let mut prev_new = r[0];

        for slot in r.iter_mut().skip(1) {
            let old = *slot;
            *slot = (((old << 1) | 1) & mask) // match
                | ((prev_old << 1) | 1)         // substitution
                | prev_old                      // insertion
                | ((prev_new << 1) | 1);        // deletion
            prev_old = old;
            prev_new = *slot;
        }

        if let Some(errors) = r.iter().position(|bits| bits & last != 0) {
            if best.map_or(true, |(e, _)| errors < e) {
                best = Some((errors, j));
            }
            if errors == 0 {
                break;
            }
        }
    }

    let (errors, end) = best?;
    Some(FieldMatch {
        score:   errors as f64 / m as f64,
        indices: highlight(chunk, text, end, m + errors),
    })
}

/// Ranges of pattern characters in the `width` characters ending at `end`.
fn highlight(chunk: &Chunk, text: &[char], end: usize, width: usize) -> Vec<MatchRange> {
    let start = (end + 1).saturating_sub(width);
    let mut ranges: Vec<MatchRange> = Vec::new();
    for i in start..=end {
        if !chunk.masks.contains_key(&text[i]) {
            continue;
        }
        if let Some(last) = ranges.last_mut() {
            if last.1 + 1 == i {
                last.1 = i;
                continue;
            }
        }
        ranges.push((i, i));
    }
    ranges
}

// ---------------------------------------------------------------------------
// FuzzyIndex
// ---------------------------------------------------------------------------

/// A searchable field of an [`ImageRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Name,
    /// The decoded path.
    Path,
    /// Each tag is tried; the best one counts.
    Tags,
}

/// Weighted multi-field fuzzy index over records.
///
/// A record's score is the product over its matching fields of
/// `field_score ^ weight`, with weights normalized to sum to one. Records
/// scoring above the threshold, or matching on no field, are dropped.
pub struct FuzzyIndex {
    docs:      Vec<ImageRecord>,
    keys:      Vec<(Key, f64)>,
    threshold: f64,
}

impl FuzzyIndex {
    /// Index over equally weighted `keys`.
    pub fn new(keys: &[Key], threshold: f64) -> Self {
        let weight = 1.0 / keys.len().max(1) as f64;
        Self {
            docs:      Vec::new(),
            keys:      keys.iter().map(|k| (*k, weight)).collect(),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn add(&mut self, record: ImageRecord) {
        self.docs.push(record);
    }

    pub fn docs(&self) -> &[ImageRecord] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The first `limit` records in insertion order, unscored.
    pub fn browse(&self, limit: usize) -> Vec<MatchResult> {
        self.docs
            .iter()
            .take(limit)
            .map(|r| MatchResult {
                record:  r.clone(),
                score:   Some(0.0),
                indices: Vec::new(),
            })
            .collect()
    }

    /// Up to `limit` records matching `query`, best first. Equal scores
    /// keep insertion order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MatchResult> {
        let pattern = Pattern::new(query);
        if pattern.is_empty() {
            return self.browse(limit);
        }

        let mut hits: Vec<(f64, usize, Vec<MatchRange>)> = Vec::new();
        for (idx, record) in self.docs.iter().enumerate() {
            if let Some((score, indices)) = self.score(&pattern, record) {
                if score <= self.threshold {
                    hits.push((score, idx, indices));
                }
            }
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter()
            .take(limit)
            .map(|(score, idx, indices)| MatchResult {
                record: self.docs[idx].clone(),
                score: Some(score),
                indices,
            })
            .collect()
    }

    fn score(&self, pattern: &Pattern, record: &ImageRecord) -> Option<(f64, Vec<MatchRange>)> {
        let mut total = 1.0;
        let mut best: Option<FieldMatch> = None;

        for (key, weight) in &self.keys {
            let Some(hit) = self.field(pattern, record, *key) else {
                continue;
            };
            total *= hit.score.powf(*weight);
            if best.as_ref().map_or(true, |b| hit.score < b.score) {
                best = Some(hit);
            }
        }

        best.map(|b| (total, b.indices))
    }

    fn field(&self, pattern: &Pattern, record: &ImageRecord, key: Key) -> Option<FieldMatch> {
        match key {
            Key::Name => pattern.search(&record.name, self.threshold),
            Key::Path => pattern.search(&media::decode(&record.path), self.threshold),
            Key::Tags => record
                .tags
                .iter()
                .filter_map(|tag| pattern.search(tag, self.threshold))
                .min_by(|a, b| a.score.total_cmp(&b.score)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
