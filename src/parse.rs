//! Command-line references to diff lines: `FILE:REFS`.
//!
//! `REFS` is a comma-separated list of:
//! - `N`: added line N (new side)
//! - `-N`: removed line N (old side)
//! - `N..M`: added lines N through M
//! - `-N..-M`: removed lines N through M
//!
//! ```
//! use hunk_select::diff::LineId;
//! use hunk_select::parse::{LineRef, parse_file_refs};
//! use std::num::NonZeroU32;
//!
//! let refs = parse_file_refs("config.nix:-10,12..13").unwrap();
//! assert_eq!(refs.file, "config.nix");
//! assert_eq!(refs.refs[0], LineRef::Removed(NonZeroU32::new(10).unwrap()));
//! assert!(refs.matches(&LineId::added(13)));
//! assert!(!refs.matches(&LineId::added(10)));
//! ```

use error_set::error_set;
use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
};
use std::num::NonZeroU32;

use crate::diff::LineId;

error_set! {
    /// Errors from parsing `FILE:REFS` references
    ParseError := {
        /// Input has no colon between file and references
        #[display("Invalid format '{input}': expected 'file:refs'")]
        InvalidFormat { input: String },
        /// Nothing but whitespace before the colon
        #[display("Invalid format '{input}': file name cannot be empty")]
        EmptyFileName { input: String },
        #[display("No line references provided")]
        EmptyRefs,
        /// Not of the form `N`, `-N`, `N..M` or `-N..-M`
        #[display("Invalid line reference '{value}'")]
        InvalidRef { value: String },
        /// Line numbers start at 1
        #[display("Invalid line number '{value}'")]
        InvalidLineNumber { value: String },
        #[display("Invalid range {start}..{end}: start must be <= end")]
        InvalidRange { start: u32, end: u32 },
        /// One end removed, the other added
        #[display("Range '{value}' mixes removed and added lines")]
        MixedRange { value: String },
    }
}

/// A reference to one or more lines of a diff.
///
/// Added lines are named by their new line number, removed lines by their
/// old line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRef {
    Added(NonZeroU32),
    /// Inclusive range of added lines
    AddedRange(NonZeroU32, NonZeroU32),
    Removed(NonZeroU32),
    /// Inclusive range of removed lines
    RemovedRange(NonZeroU32, NonZeroU32),
}

impl LineRef {
    /// True if `line` is an added or removed line this reference names.
    pub fn matches(&self, line: &LineId) -> bool {
        match (*self, line.old_line, line.new_line) {
            (LineRef::Added(n), None, Some(new)) => new == n.get(),
            (LineRef::AddedRange(start, end), None, Some(new)) => (start.get()..=end.get()).contains(&new),
            (LineRef::Removed(n), Some(old), None) => old == n.get(),
            (LineRef::RemovedRange(start, end), Some(old), None) => (start.get()..=end.get()).contains(&old),
            _ => false,
        }
    }
}

/// A file name with the line references given for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLineRefs {
    pub file: String,
    pub refs: Vec<LineRef>,
}

impl FileLineRefs {
    pub fn matches(&self, line: &LineId) -> bool {
        self.refs.iter().any(|r| r.matches(line))
    }

    /// The `candidates` named by any reference, in their original order.
    pub fn select(&self, candidates: &[LineId]) -> Vec<LineId> {
        candidates
            .iter()
            .filter(|line| self.matches(line))
            .copied()
            .collect()
    }
}

/// Parse `FILE:REFS`.
///
/// The file name is everything before the first colon, trimmed.
///
/// # Errors
///
/// Returns [`ParseError`] if:
/// - Input doesn't contain `:` separator
/// - File name is empty or whitespace
/// - No line references provided
/// - A reference is malformed, names line 0, or is an inverted or mixed range
pub fn parse_file_refs(input: &str) -> Result<FileLineRefs, ParseError> {
    let Some((file, refs)) = input.split_once(':') else {
        return Err(ParseError::InvalidFormat {
            input: input.to_string(),
        });
    };

    let file = file.trim();
    if file.is_empty() {
        return Err(ParseError::EmptyFileName {
            input: input.to_string(),
        });
    }

    Ok(FileLineRefs {
        file: file.to_string(),
        refs: parse_line_refs(refs)?,
    })
}

/// Parse the comma-separated references after the colon.
pub fn parse_line_refs(input: &str) -> Result<Vec<LineRef>, ParseError> {
    let refs = input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_single_ref)
        .collect::<Result<Vec<_>, _>>()?;

    if refs.is_empty() {
        return Err(ParseError::EmptyRefs);
    }
    Ok(refs)
}

/// One end of a reference: whether it is removed, and its number.
type Endpoint = (bool, u32);

fn endpoint(input: &str) -> IResult<&str, Endpoint> {
    (
        opt(char('-')).map(|sign| sign.is_some()),
        map_res(digit1, str::parse::<u32>),
    )
        .parse(input)
}

fn reference(input: &str) -> IResult<&str, (Endpoint, Option<Endpoint>)> {
    all_consuming((endpoint, opt(preceded(tag(".."), endpoint)))).parse(input)
}

fn parse_single_ref(input: &str) -> Result<LineRef, ParseError> {
    let Ok((_, (start, end))) = reference(input) else {
        return Err(ParseError::InvalidRef {
            value: input.to_string(),
        });
    };

    let line_number = |n: u32| {
        NonZeroU32::new(n).ok_or_else(|| ParseError::InvalidLineNumber {
            value: input.to_string(),
        })
    };

    let (removed, first) = start;
    let first = line_number(first)?;
    let Some((end_removed, last)) = end else {
        return Ok(if removed {
            LineRef::Removed(first)
        } else {
            LineRef::Added(first)
        });
    };

    let last = line_number(last)?;
    if removed != end_removed {
        return Err(ParseError::MixedRange {
            value: input.to_string(),
        });
    }
    if first > last {
        return Err(ParseError::InvalidRange {
            start: first.get(),
            end: last.get(),
        });
    }

    Ok(if removed {
        LineRef::RemovedRange(first, last)
    } else {
        LineRef::AddedRange(first, last)
    })
}
