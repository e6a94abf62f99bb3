pub mod extract;
pub mod fragments;
pub mod record;

use fragments::{Document, EMPHASIS_SEL, PARAGRAPH_SEL};
use record::{Record, Sources};

/// Two-pass pipeline: html → paragraph / emphasis fragments → record.
pub fn process_page(url: &str, doc: &Document) -> Record {
    let sources = Sources {
        general: doc.fragments(&PARAGRAPH_SEL),
        quality: doc.fragments(&EMPHASIS_SEL),
    };
    record::assemble(&doc.title(), url, &sources)
}

// ── Tests ──
