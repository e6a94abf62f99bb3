use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::extract::{self, FieldSpec, Source, Strategy};

/// Marker printed for fields no fragment could supply.
pub const SENTINEL: &str = "?";

static MISSING: FieldValue = FieldValue::Missing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Real4k,
    Hdr,
    Director,
    Studio,
    Runtime,
    Screen,
    Country,
    Year,
    Cast,
    Codec,
    Audio,
    PictureQuality,
}

impl Field {
    /// Print order.
    pub const ALL: [Field; 12] = [
        Field::Real4k,
        Field::Director,
        Field::Studio,
        Field::Runtime,
        Field::Screen,
        Field::Country,
        Field::Year,
        Field::Cast,
        Field::Hdr,
        Field::Codec,
        Field::Audio,
        Field::PictureQuality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Real4k => "Real 4K",
            Field::Hdr => "HDR",
            Field::Director => "Director",
            Field::Studio => "Production Studio",
            Field::Runtime => "Runtime",
            Field::Screen => "Screen",
            Field::Country => "Country",
            Field::Year => "Year",
            Field::Cast => "Actors",
            Field::Codec => "Video Codec",
            Field::Audio => "Audio Format",
            Field::PictureQuality => "Picture Quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Found(String),
    Missing,
}

impl FieldValue {
    /// Trim `raw`; blank input counts as a miss.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::Found(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Found(v) => v,
            FieldValue::Missing => SENTINEL,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One review page's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub title: String,
    pub url: String,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl Record {
    pub fn get(&self, field: Field) -> &FieldValue {
        self.fields.get(&field).unwrap_or(&MISSING)
    }

    pub fn found_count(&self) -> usize {
        self.fields.values().filter(|v| v.is_found()).count()
    }
}

/// The two fragment sequences pulled from one review page.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub general: Vec<String>,
    pub quality: Vec<String>,
}

impl Sources {
    fn get(&self, source: Source) -> &[String] {
        match source {
            Source::General => &self.general,
            Source::Quality => &self.quality,
        }
    }
}

// Older reviews use different label spellings; new ones go at the end of a
// list unless they must win over an existing spelling.
pub const FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec::simple(Field::Real4k, &["Real 4K:"]),
    FieldSpec::simple(Field::Hdr, &["High Dynamic Range:"]),
    FieldSpec::simple(Field::Director, &["Regie:"]),
    FieldSpec::simple(Field::Studio, &["Anbieter:"]),
    FieldSpec::simple(Field::Runtime, &["Laufzeit:"]),
    FieldSpec {
        field: Field::Screen,
        phrases: &["Bildformat:"],
        strategy: Strategy::MultiColon,
        source: Source::General,
    },
    FieldSpec {
        field: Field::Country,
        phrases: &["Land/", "/Jahr"],
        strategy: Strategy::Compound { second: Field::Year },
        source: Source::General,
    },
    FieldSpec::simple(Field::Cast, &["Darsteller:", "Sprecher:"]),
    FieldSpec::simple(
        Field::Codec,
        &["Codec UHD:", "Code UHD:", "Codec (UHD):", "Codec:"],
    ),
    FieldSpec::simple(
        Field::Audio,
        &[
            "Tonformate UHD:",
            "Tonformate BD/UHD:",
            "Tonformate Blu-ray/UHD:",
            "Tonformate (UHD):",
            "UHD-Fassung:",
            "UHD-Fassung",
            "Tonformate:",
            "Tonformate BD:",
        ],
    ),
    FieldSpec {
        field: Field::PictureQuality,
        phrases: &[
            "Bildqualität UHD (HDR10)",
            "Bildqualität UHD (DV)",
            "Bildqualität UHD:",
        ],
        strategy: Strategy::Simple,
        source: Source::Quality,
    },
];

/// Build a record with the default spec table.
pub fn assemble(title: &str, url: &str, sources: &Sources) -> Record {
    assemble_with(FIELD_SPECS, title, url, sources)
}

/// Run every spec against its source. A miss only affects its own fields.
pub fn assemble_with(specs: &[FieldSpec], title: &str, url: &str, sources: &Sources) -> Record {
    let mut fields = BTreeMap::new();

    for spec in specs {
        for (field, value) in extract::extract(sources.get(spec.source), spec) {
            if !value.is_found() {
                debug!(url, field = field.label(), phrases = ?spec.phrases, "field not found");
            }
            fields.insert(field, value);
        }
    }

    for field in Field::ALL {
        fields.entry(field).or_insert(FieldValue::Missing);
    }

    Record {
        title: title.trim().to_string(),
        url: url.to_string(),
        fields,
    }
}

// ── Tests ──
