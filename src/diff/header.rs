//! Hunk headers: the `@@ -oldStart,oldLines +newStart,newLines @@` line.
//!
//! Parsing never fails. Anything that does not look like a header degrades
//! to [`HunkHeader::default`], the all-zero header.

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of, space1},
    combinator::{map_res, opt},
    sequence::preceded,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::hunk::LineId;

/// Line ranges of a hunk on both sides of a diff.
///
/// Either length may be zero, for a pure insertion or a pure deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

impl HunkHeader {
    pub const fn new(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> Self {
        Self {
            old_start,
            old_lines,
            new_start,
            new_lines,
        }
    }

    /// Parse a header line, tolerating missing or malformed input.
    ///
    /// A length left out of a range (`@@ -3 +4 @@`) is taken as 0. Numbers are
    /// read as absolute values, so a stray sign inside a range is ignored.
    ///
    /// ```
    /// use hunk_select::diff::HunkHeader;
    ///
    /// assert_eq!(HunkHeader::parse(None), HunkHeader::default());
    /// assert_eq!(
    ///     HunkHeader::parse(Some("@@ -1,3 +1,2 @@")),
    ///     HunkHeader::new(1, 3, 1, 2)
    /// );
    /// ```
    #[must_use]
    pub fn parse(line: Option<&str>) -> Self {
        let Some(line) = line else {
            return Self::default();
        };

        match header(line.trim_start()) {
            Ok((_, parsed)) => parsed,
            Err(_) => {
                log::debug!("unparseable hunk header {line:?}, using zeroed header");
                Self::default()
            }
        }
    }

    /// Position used to order headers: the old start when it is set, the new
    /// start otherwise.
    fn sort_key(&self) -> u32 {
        if self.old_start != 0 {
            self.old_start
        } else {
            self.new_start
        }
    }

    /// One past the last old line.
    fn old_end(&self) -> u32 {
        self.old_start.saturating_add(self.old_lines)
    }

    /// One past the last new line.
    fn new_end(&self) -> u32 {
        self.new_start.saturating_add(self.new_lines)
    }

    /// True if `other`'s old and new ranges both lie inside this header's.
    pub fn contains_hunk(&self, other: &HunkHeader) -> bool {
        other.old_start >= self.old_start
            && other.old_end() <= self.old_end()
            && other.new_start >= self.new_start
            && other.new_end() <= self.new_end()
    }

    /// True if every line number `line` carries falls inside this header.
    ///
    /// A line with neither number set is never contained.
    pub fn contains_line(&self, line: &LineId) -> bool {
        if line.old_line.is_none() && line.new_line.is_none() {
            return false;
        }

        let old_ok = line
            .old_line
            .is_none_or(|n| n >= self.old_start && n < self.old_end());
        let new_ok = line
            .new_line
            .is_none_or(|n| n >= self.new_start && n < self.new_end());

        old_ok && new_ok
    }
}

/// Comparator for emitted headers, usable with a stable `sort_by`.
///
/// Headers are ordered by position in the file, where a header zeroed on
/// its old side is positioned by its new start.
pub fn order_headers(a: &HunkHeader, b: &HunkHeader) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Free-function form of [`HunkHeader::contains_hunk`].
pub fn hunk_contains_hunk(a: &HunkHeader, b: &HunkHeader) -> bool {
    a.contains_hunk(b)
}

/// Free-function form of [`HunkHeader::contains_line`].
pub fn hunk_contains_line(hunk: &HunkHeader, line: &LineId) -> bool {
    hunk.contains_line(line)
}

impl fmt::Display for HunkHeader {
    /// Always spells out both lengths so the output parses back unchanged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Unsigned number, skipping one stray sign.
fn number(input: &str) -> IResult<&str, u32> {
    preceded(opt(one_of("+-")), map_res(digit1, str::parse::<u32>)).parse(input)
}

/// `start[,length]`
fn range(input: &str) -> IResult<&str, (u32, u32)> {
    (number, opt(preceded(char(','), number)))
        .map(|(start, len)| (start, len.unwrap_or(0)))
        .parse(input)
}

fn header(input: &str) -> IResult<&str, HunkHeader> {
    (
        tag("@@"),
        space1,
        char('-'),
        range,
        space1,
        char('+'),
        range,
        space1,
        tag("@@"),
    )
        .map(
            |(_, _, _, (old_start, old_lines), _, _, (new_start, new_lines), _, _)| HunkHeader {
                old_start,
                old_lines,
                new_start,
                new_lines,
            },
        )
        .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn parse_missing_header() {
        assert_eq!(HunkHeader::parse(None), HunkHeader::new(0, 0, 0, 0));
    }

    #[test]
    fn parse_full_header() {
        assert_eq!(
            HunkHeader::parse(Some("@@ -1,3 +1,2 @@")),
            HunkHeader::new(1, 3, 1, 2)
        );
    }

    #[test]
    fn parse_header_with_section_text() {
        assert_eq!(
            HunkHeader::parse(Some("@@ -10,7 +10,8 @@ fn main() {")),
            HunkHeader::new(10, 7, 10, 8)
        );
    }

    #[test]
    fn parse_elided_lengths_default_to_zero() {
        assert_eq!(
            HunkHeader::parse(Some("@@ -136,0 +137 @@")),
            HunkHeader::new(136, 0, 137, 0)
        );
        assert_eq!(
            HunkHeader::parse(Some("@@ -15 +14,0 @@")),
            HunkHeader::new(15, 0, 14, 0)
        );
    }

    #[test]
    fn parse_stray_sign_is_absolute() {
        assert_eq!(
            HunkHeader::parse(Some("@@ --4,-2 ++7,+3 @@")),
            HunkHeader::new(4, 2, 7, 3)
        );
    }

    #[test]
    fn parse_single_delimiter_is_zeroed() {
        assert_eq!(HunkHeader::parse(Some("@@ -1,3 +1,2")), HunkHeader::default());
    }

    #[test]
    fn parse_missing_side_is_zeroed() {
        assert_eq!(HunkHeader::parse(Some("@@ -1,3 @@")), HunkHeader::default());
        assert_eq!(HunkHeader::parse(Some("@@ +1,3 @@")), HunkHeader::default());
    }

    #[test]
    fn parse_garbage_is_zeroed() {
        assert_eq!(HunkHeader::parse(Some("")), HunkHeader::default());
        assert_eq!(HunkHeader::parse(Some("+ added line")), HunkHeader::default());
        assert_eq!(
            HunkHeader::parse(Some("@@ -99999999999,1 +1,1 @@")),
            HunkHeader::default()
        );
    }

    #[test]
    fn render_spells_out_lengths() {
        insta::assert_snapshot!(HunkHeader::new(4, 1, 0, 0).to_string(), @"@@ -4,1 +0,0 @@");
        insta::assert_snapshot!(HunkHeader::new(1, 10, 6, 2).to_string(), @"@@ -1,10 +6,2 @@");
    }

    #[test]
    fn render_parses_back() {
        let header = HunkHeader::new(136, 0, 137, 1);
        assert_eq!(HunkHeader::parse(Some(&header.to_string())), header);
    }

    #[test]
    fn order_interleaves_zeroed_sides() {
        let mut headers = vec![
            HunkHeader::new(0, 0, 3, 1),
            HunkHeader::new(0, 0, 5, 1),
            HunkHeader::new(3, 1, 0, 0),
            HunkHeader::new(5, 1, 0, 0),
        ];
        headers.sort_by(order_headers);
        assert_eq!(
            headers,
            vec![
                HunkHeader::new(0, 0, 3, 1),
                HunkHeader::new(3, 1, 0, 0),
                HunkHeader::new(0, 0, 5, 1),
                HunkHeader::new(5, 1, 0, 0),
            ]
        );
    }

    #[test]
    fn order_mixed_starts() {
        let mut headers = vec![
            HunkHeader::new(0, 0, 10, 2),
            HunkHeader::new(2, 1, 0, 0),
            HunkHeader::new(0, 0, 1, 1),
            HunkHeader::new(5, 2, 0, 0),
        ];
        headers.sort_by(order_headers);
        assert_eq!(
            headers,
            vec![
                HunkHeader::new(0, 0, 1, 1),
                HunkHeader::new(2, 1, 0, 0),
                HunkHeader::new(5, 2, 0, 0),
                HunkHeader::new(0, 0, 10, 2),
            ]
        );
    }

    #[test]
    fn order_single_side() {
        let mut headers = vec![
            HunkHeader::new(7, 1, 0, 0),
            HunkHeader::new(2, 1, 0, 0),
            HunkHeader::new(5, 1, 0, 0),
        ];
        headers.sort_by(order_headers);
        assert_eq!(
            headers,
            vec![
                HunkHeader::new(2, 1, 0, 0),
                HunkHeader::new(5, 1, 0, 0),
                HunkHeader::new(7, 1, 0, 0),
            ]
        );
    }

    #[test]
    fn order_all_zero_is_stable() {
        let mut headers = vec![HunkHeader::default(), HunkHeader::default()];
        headers.sort_by(order_headers);
        assert_eq!(headers, vec![HunkHeader::default(), HunkHeader::default()]);
    }

    #[test]
    fn contains_hunk_bounds() {
        let base = HunkHeader::new(10, 10, 20, 10);
        assert!(hunk_contains_hunk(&base, &HunkHeader::new(12, 5, 22, 5)));
        assert!(hunk_contains_hunk(&base, &HunkHeader::new(15, 5, 25, 5)));
        assert!(hunk_contains_hunk(&base, &base));
        assert!(!hunk_contains_hunk(&base, &HunkHeader::new(5, 20, 15, 20)));
        assert!(!hunk_contains_hunk(&base, &HunkHeader::new(15, 6, 25, 6)));
    }

    #[test]
    fn contains_line_bounds() {
        let hunk = HunkHeader::new(5, 5, 10, 5);
        assert!(hunk_contains_line(&hunk, &LineId::removed(7)));
        assert!(hunk_contains_line(&hunk, &LineId::added(12)));
        assert!(hunk_contains_line(&hunk, &LineId::context(6, 11)));
        assert!(!hunk_contains_line(&hunk, &LineId::removed(20)));
        assert!(!hunk_contains_line(&hunk, &LineId::context(1, 1)));
        assert!(!hunk_contains_line(&hunk, &LineId::default()));
    }
}
