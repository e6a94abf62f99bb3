use std::io::Write;

use anyhow::Result;

use crate::fetcher::PageOutcome;
use crate::parser::record::{Field, Record};

const VALUE_WIDTH: usize = 100;

/// Labeled block per record, one line per failed page.
pub fn print_records(outcomes: &[PageOutcome]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    write_records(&mut out, outcomes)?;
    out.flush()
}

pub fn write_records(out: &mut impl Write, outcomes: &[PageOutcome]) -> std::io::Result<()> {
    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            PageOutcome::Parsed { record } => {
                writeln!(out, "{:>4} : {}", i, record.title)?;
                write_record(out, record)?;
            }
            PageOutcome::Failed { url, reason } => {
                writeln!(out, "{:>4} : FAILED {} ({})", i, url, reason)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_record(out: &mut impl Write, record: &Record) -> std::io::Result<()> {
    writeln!(out, "       {:<17} {}", "Link:", record.url)?;
    writeln!(out, "       {:<17} {}", "Title:", record.title)?;
    for field in Field::ALL {
        let label = format!("{}:", field.label());
        writeln!(out, "       {:<17} {}", label, truncate(record.get(field).as_str(), VALUE_WIDTH))?;
    }
    Ok(())
}

/// Compact, one row per parsed record.
pub fn write_table(out: &mut impl Write, outcomes: &[PageOutcome]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>3} | {:<32} | {:<6} | {:<5} | {:<8} | {:<12} | {:<24} | {:>5}",
        "#", "Title", "Land", "Year", "HDR", "Codec", "Audio", "PQ"
    )?;
    writeln!(out, "{}", "-".repeat(120))?;

    let records = outcomes.iter().filter_map(|o| match o {
        PageOutcome::Parsed { record } => Some(record),
        PageOutcome::Failed { .. } => None,
    });
    for (i, r) in records.enumerate() {
        writeln!(
            out,
            "{:>3} | {:<32} | {:<6} | {:<5} | {:<8} | {:<12} | {:<24} | {:>5}",
            i + 1,
            truncate(&r.title, 32),
            truncate(r.get(Field::Country).as_str(), 6),
            r.get(Field::Year),
            truncate(r.get(Field::Hdr).as_str(), 8),
            truncate(r.get(Field::Codec).as_str(), 12),
            truncate(r.get(Field::Audio).as_str(), 24),
            r.get(Field::PictureQuality),
        )?;
    }
    Ok(())
}

pub fn print_table(outcomes: &[PageOutcome]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    write_table(&mut out, outcomes)?;
    out.flush()
}

/// One JSON object per line.
pub fn print_json(outcomes: &[PageOutcome]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for outcome in outcomes {
        serde_json::to_writer(&mut out, outcome)?;
        writeln!(out)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
