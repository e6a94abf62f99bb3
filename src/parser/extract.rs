use std::sync::LazyLock;

use regex::Regex;

use super::record::{Field, FieldValue};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// How the value part of a matched fragment is cut out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Everything after the first `:`, trimmed.
    Simple,
    /// Every `:`-segment after the label, trimmed and re-joined with `:`.
    /// Keeps ratios like `2.35:1` intact.
    MultiColon,
    /// `Land/Jahr: USA 2017` style: first token feeds the spec's own field,
    /// the second token feeds `second`.
    Compound { second: Field },
}

/// Which fragment sequence a spec is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Every line of every `<p>`.
    General,
    /// Only emphasized text inside paragraphs (`p strong`).
    Quality,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    /// Tried in order; the first phrase with any matching fragment wins.
    pub phrases: &'static [&'static str],
    pub strategy: Strategy,
    pub source: Source,
}

impl FieldSpec {
    pub const fn simple(field: Field, phrases: &'static [&'static str]) -> Self {
        FieldSpec {
            field,
            phrases,
            strategy: Strategy::Simple,
            source: Source::General,
        }
    }

    /// Fields this spec fills in, in output order.
    pub fn targets(&self) -> Vec<Field> {
        match self.strategy {
            Strategy::Compound { second } => vec![self.field, second],
            _ => vec![self.field],
        }
    }
}

/// Result of running one spec: one entry per targeted field.
pub type Extraction = Vec<(Field, FieldValue)>;

/// Find the fragment holding one of `phrases`.
///
/// Phrase order dominates fragment order: every fragment is checked against
/// the first phrase before the second phrase is considered at all.
pub fn find_fragment<'a, S: AsRef<str>>(fragments: &'a [S], phrases: &[&str]) -> Option<&'a str> {
    phrases.iter().find_map(|phrase| {
        fragments
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|fragment| fragment.contains(phrase))
    })
}

/// Run one spec against a fragment sequence. Never fails; misses come back
/// as [`FieldValue::Missing`].
pub fn extract<S: AsRef<str>>(fragments: &[S], spec: &FieldSpec) -> Extraction {
    match find_fragment(fragments, spec.phrases) {
        Some(fragment) => split_value(fragment, spec),
        None => spec
            .targets()
            .into_iter()
            .map(|field| (field, FieldValue::Missing))
            .collect(),
    }
}

fn split_value(fragment: &str, spec: &FieldSpec) -> Extraction {
    match spec.strategy {
        Strategy::Simple => vec![(spec.field, simple(fragment))],
        Strategy::MultiColon => vec![(spec.field, multi_colon(fragment))],
        Strategy::Compound { second } => {
            let (first_value, second_value) = compound(fragment);
            vec![(spec.field, first_value), (second, second_value)]
        }
    }
}

fn simple(fragment: &str) -> FieldValue {
    match fragment.split_once(':') {
        Some((_, rest)) => FieldValue::from_raw(rest),
        None => FieldValue::Missing,
    }
}

fn multi_colon(fragment: &str) -> FieldValue {
    let mut segments = fragment.split(':');
    // label
    segments.next();
    let joined = segments.map(str::trim).collect::<Vec<_>>().join(":");
    // "Label:" alone would otherwise come back as ""
    if joined.chars().all(|c| c == ':') {
        return FieldValue::Missing;
    }
    FieldValue::from_raw(&joined)
}

fn compound(fragment: &str) -> (FieldValue, FieldValue) {
    let Some((_, rest)) = fragment.split_once(':') else {
        return (FieldValue::Missing, FieldValue::Missing);
    };
    // Only the first two tokens count; trailing notes like "(Extended Cut)" are dropped.
    let mut parts = WHITESPACE_RE.split(rest.trim());
    let first = parts.next().map(FieldValue::from_raw).unwrap_or(FieldValue::Missing);
    let second = parts.next().map(FieldValue::from_raw).unwrap_or(FieldValue::Missing);
    (first, second)
}

// ── Tests ──
