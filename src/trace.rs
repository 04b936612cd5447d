//! Reading and writing text traces of branch records.
//!
//! Each line of a trace describes one executed branch. Two layouts are
//! accepted:
//!
//! ```text
//! # pc       target     outcome conditional call return direct
//! 0x004005a0 0x004005c8 1 1 0 0 1
//! # pc       outcome
//! 4005a0 0
//! ```
//!
//! The short layout describes a direct conditional branch. Blank lines and
//! lines starting with '#' are ignored.

pub mod synthetic;

pub use synthetic::*;

use std::fs::File;
use std::io::{ BufRead, BufReader, Write };
use std::path::Path;

use crate::branch::*;
use crate::error::TraceError;

fn parse_address(line: usize, field: &str) -> Result<u32, TraceError> {
    let digits = field.strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u32::from_str_radix(digits, 16).map_err(|_| TraceError::Address {
        line, field: field.to_string()
    })
}

fn parse_flag(line: usize, field: &str) -> Result<bool, TraceError> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(TraceError::Flag { line, field: field.to_string() }),
    }
}

/// Parse a single line of a trace.
///
/// Returns `Ok(None)` for blank lines and comments. `line` is the 1-based
/// line number used in error messages.
pub fn parse_line(line: usize, text: &str)
    -> Result<Option<BranchRecord>, TraceError>
{
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let fields: Vec<&str> = text.split_whitespace().collect();
    match fields.as_slice() {
        [pc, outcome] => {
            let pc = parse_address(line, pc)?;
            let outcome = Outcome::from(parse_flag(line, outcome)?);
            Ok(Some(BranchRecord::conditional(pc, 0, outcome)))
        },
        [pc, tgt, outcome, conditional, call, ret, direct] => {
            let pc  = parse_address(line, pc)?;
            let tgt = parse_address(line, tgt)?;
            let outcome = Outcome::from(parse_flag(line, outcome)?);
            let flags = BranchFlags::from_parts(
                parse_flag(line, conditional)?,
                parse_flag(line, call)?,
                parse_flag(line, ret)?,
                parse_flag(line, direct)?,
                outcome,
            );
            Ok(Some(BranchRecord { pc, tgt, flags }))
        },
        _ => Err(TraceError::FieldCount { line, got: fields.len() }),
    }
}

/// Iterator over the records in a text trace.
pub struct TraceReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line: usize,
}
impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line: 0 }
    }
}
impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<BranchRecord, TraceError>;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let res = self.lines.next()?;
            self.line += 1;
            let text = match res {
                Ok(text) => text,
                Err(source) => {
                    return Some(Err(TraceError::Read { line: self.line, source }));
                },
            };
            match parse_line(self.line, &text) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Read every record from some trace.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<BranchRecord>, TraceError> {
    TraceReader::new(reader).collect()
}

/// Read every record from a trace file.
pub fn read_trace_file(path: impl AsRef<Path>)
    -> Result<Vec<BranchRecord>, TraceError>
{
    let f = File::open(path)?;
    read_trace(BufReader::new(f))
}

/// Write a record using the 7-field layout.
pub fn write_record(w: &mut impl Write, record: &BranchRecord)
    -> std::io::Result<()>
{
    writeln!(w, "{:#010x} {:#010x} {} {} {} {} {}",
        record.pc,
        record.tgt,
        record.outcome().bit(),
        record.is_conditional() as u8,
        record.is_call() as u8,
        record.is_return() as u8,
        record.is_direct() as u8,
    )
}
