// src/record.rs

use crate::error::{RecordParseError, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Column names of the ten-field tab-separated form, in order
pub const HEADERS: [&str; 10] = [
    "BISha1",
    "oldPath",
    "Path",
    "FixSha1",
    "BIDate",
    "FixDate",
    "LineNumInBI",
    "LineNumInPreFix",
    "isAddedLine",
    "Line",
];

/// Header written by earlier versions, still skipped on read
const LEGACY_HEADERS: [&str; 10] = [
    "origin_commit_id",
    "origin_path",
    "current_path",
    "fix_commit_id",
    "origin_date",
    "fix_date",
    "line_in_origin",
    "line_in_pre_fix",
    "is_substantive_edit",
    "line_text",
];

fn is_header(line: &str) -> bool {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    fields == HEADERS || fields == LEGACY_HEADERS
}

/// Literal tabs inside a line's text come back as this many spaces.
const TAB_REPLACEMENT: &str = "     ";

/// A line removed or rewritten by a fix, attributed to the commit that introduced it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BicRecord {
    /// Commit that introduced the line
    pub origin_commit_id: String,
    /// Path of the file in the introducing commit
    pub origin_path: String,
    /// Path of the file in the fix commit
    pub current_path: String,
    pub fix_commit_id: String,
    pub origin_date: String,
    pub fix_date: String,
    /// 1-based line number in the introducing commit
    pub line_in_origin: usize,
    /// 1-based line number in the fix commit's parent
    pub line_in_pre_fix: usize,
    /// True when the line was deleted or replaced rather than purely inserted
    pub is_substantive_edit: bool,
    /// Trimmed source text of the line
    pub line_text: String,
}

impl BicRecord {
    /// Ten tab-separated fields, no trailing newline.
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.origin_commit_id,
            self.origin_path,
            self.current_path,
            self.fix_commit_id,
            self.origin_date,
            self.fix_date,
            self.line_in_origin,
            self.line_in_pre_fix,
            self.is_substantive_edit,
            self.line_text
        )
    }
}

fn parse_line_number(field: &'static str, value: &str) -> Result<usize, RecordParseError> {
    value.trim().parse().map_err(|_| RecordParseError::LineNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, RecordParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" => Ok(true),
        "f" | "false" => Ok(false),
        _ => Err(RecordParseError::Flag { field, value: value.to_string() }),
    }
}

impl FromStr for BicRecord {
    type Err = RecordParseError;

    /// Accepts the two-field `(origin id, current path)` form, the nine-field
    /// form without `line_in_pre_fix`, and the ten-field form. In the last,
    /// any fields past the tenth are pieces of a line that contained tabs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('\t').collect();
        match fields.len() {
            2 => Ok(BicRecord {
                origin_commit_id: fields[0].to_string(),
                current_path: fields[1].to_string(),
                ..BicRecord::default()
            }),
            9 => {
                let line_in_origin = parse_line_number("line_in_origin", fields[6])?;
                Ok(BicRecord {
                    origin_commit_id: fields[0].to_string(),
                    origin_path: fields[1].to_string(),
                    current_path: fields[2].to_string(),
                    fix_commit_id: fields[3].to_string(),
                    origin_date: fields[4].to_string(),
                    fix_date: fields[5].to_string(),
                    line_in_origin,
                    line_in_pre_fix: line_in_origin,
                    is_substantive_edit: parse_flag("is_substantive_edit", fields[7])?,
                    line_text: fields[8].trim().to_string(),
                })
            }
            n if n >= 10 => Ok(BicRecord {
                origin_commit_id: fields[0].to_string(),
                origin_path: fields[1].to_string(),
                current_path: fields[2].to_string(),
                fix_commit_id: fields[3].to_string(),
                origin_date: fields[4].to_string(),
                fix_date: fields[5].to_string(),
                line_in_origin: parse_line_number("line_in_origin", fields[6])?,
                line_in_pre_fix: parse_line_number("line_in_pre_fix", fields[7])?,
                is_substantive_edit: parse_flag("is_substantive_edit", fields[8])?,
                line_text: fields[9..].join(TAB_REPLACEMENT).trim().to_string(),
            }),
            n => Err(RecordParseError::FieldCount(n)),
        }
    }
}

/// Output layout for a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Header line followed by one tab-separated record per line
    #[default]
    Tsv,
    /// One JSON object per line
    JsonLines,
}

pub fn write_records<W: Write>(out: &mut W, records: &[BicRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Tsv => {
            writeln!(out, "{}", HEADERS.join("\t"))?;
            for record in records {
                writeln!(out, "{}", record.to_tsv())?;
            }
        }
        OutputFormat::JsonLines => {
            for record in records {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Reads tab-separated records, skipping a header line and blank lines.
///
/// A line that fits no supported layout fails the whole read.
pub fn read_records<R: BufRead>(input: R) -> Result<Vec<BicRecord>> {
    let mut records = Vec::new();
    for line in input.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || is_header(line) {
            continue;
        }
        records.push(line.parse::<BicRecord>()?);
    }
    Ok(records)
}
