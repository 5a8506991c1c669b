// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Custom EDNS option lists and their text format

use std::{fs::File, io::Read, path::Path, slice, str, str::FromStr};

use tracing::{debug, info};

use crate::{
    error::OptionsError,
    proto::rr::rdata::opt::{EdnsCode, EdnsOption},
};

/// First EDNS0 option code reserved for local or experimental use, RFC 6891 section 9
pub const LOCAL_START: u16 = 0xFDE9;

/// Last EDNS0 option code reserved for local or experimental use, RFC 6891 section 9
pub const LOCAL_END: u16 = 0xFFFE;

/// Starts a comment when it begins a line or follows whitespace
pub const COMMENT_MARKER: u8 = b'#';

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Returns true if `code` is in the EDNS0 local use range
pub fn is_local_code(code: u16) -> bool {
    (LOCAL_START..=LOCAL_END).contains(&code)
}

/// A single EDNS0 local option to attach to queries
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OptionEntry {
    code: u16,
    data: Vec<u8>,
}

impl OptionEntry {
    /// Creates a new entry, returns `None` if `code` is not a local use code.
    ///
    /// The data is opaque and is attached to queries exactly as given.
    pub fn new(code: u16, data: impl Into<Vec<u8>>) -> Option<Self> {
        is_local_code(code).then(|| Self {
            code,
            data: data.into(),
        })
    }

    /// The EDNS0 option code, always within [`LOCAL_START`]..=[`LOCAL_END`]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The raw option payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Builds the EDNS option carrying this entry's code and data
    pub fn to_edns_option(&self) -> EdnsOption {
        EdnsOption::Unknown(self.code, self.data.clone())
    }

    /// The EDNS code of this entry
    pub fn edns_code(&self) -> EdnsCode {
        EdnsCode::from(self.code)
    }
}

/// An ordered, immutable list of [`OptionEntry`]
///
/// Entries keep the order of the lines they were read from. Duplicate codes are kept, each of
/// them is attached to queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<OptionEntry>,
}

impl OptionSet {
    /// An empty set, attaches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads an option list from the file at `path`
    pub fn read_file(path: &Path) -> Result<Self, OptionsError> {
        info!("reading custom edns options from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads an option list from `handle`
    ///
    /// # Expected format
    ///
    /// * One entry per line: a hexadecimal code, whitespace, then the data, e.g. `FDE9 foo`.
    /// * The code has no `0x` prefix, is case-insensitive and must lie within
    ///   [`LOCAL_START`]..=[`LOCAL_END`].
    /// * The data is the rest of the line with surrounding whitespace removed; it may contain
    ///   spaces and is used as raw bytes without any unescaping. It does not need to be UTF-8.
    /// * A '\#' at the start of a line or after whitespace starts a comment that runs to the end
    ///   of the line. Blank and comment-only lines are skipped.
    ///
    /// The first invalid line fails the whole list.
    pub fn from_reader(mut handle: impl Read) -> Result<Self, OptionsError> {
        let mut contents = Vec::new();
        handle.read_to_end(&mut contents)?;
        Self::from_bytes(&contents)
    }

    /// Parses an option list from raw bytes, see [`OptionSet::from_reader`] for the format
    pub fn from_bytes(contents: &[u8]) -> Result<Self, OptionsError> {
        let contents = contents.strip_prefix(BYTE_ORDER_MARK).unwrap_or(contents);

        let mut builder = Builder::default();
        for (idx, line) in contents.split(|b| *b == b'\n').enumerate() {
            let line_no = idx + 1;

            let line = trim(strip_comment(trim(line)));
            if line.is_empty() {
                continue;
            }

            let (code, data) = split_fields(line).ok_or(OptionsError::Syntax { line: line_no })?;
            let code = parse_code(code).ok_or(OptionsError::CodeParse { line: line_no })?;
            let entry = OptionEntry::new(code, data)
                .ok_or_else(|| OptionsError::out_of_range(line_no, code))?;

            debug!("adding custom edns option {code:#06X} from line {line_no}");
            builder.push(entry);
        }

        let options = builder.build();
        info!("loaded {} custom edns options", options.len());
        Ok(options)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in file order
    pub fn iter(&self) -> slice::Iter<'_, OptionEntry> {
        self.entries.iter()
    }

    /// The entries in file order
    pub fn as_slice(&self) -> &[OptionEntry] {
        &self.entries
    }
}

impl FromStr for OptionSet {
    type Err = OptionsError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(contents.as_bytes())
    }
}

impl FromIterator<OptionEntry> for OptionSet {
    fn from_iter<I: IntoIterator<Item = OptionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a OptionEntry;
    type IntoIter = slice::Iter<'a, OptionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Append-only accumulator, only a complete list is turned into an [`OptionSet`]
#[derive(Default)]
struct Builder {
    entries: Vec<OptionEntry>,
}

impl Builder {
    fn push(&mut self, entry: OptionEntry) {
        self.entries.push(entry);
    }

    fn build(self) -> OptionSet {
        OptionSet {
            entries: self.entries,
        }
    }
}

/// Removes leading and trailing ASCII whitespace, `\r` included
fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |idx| idx + 1);

    &bytes[start..end]
}

/// Cuts the line at the first comment marker that starts the line or follows whitespace
fn strip_comment(line: &[u8]) -> &[u8] {
    let mut after_space = true;
    for (idx, b) in line.iter().enumerate() {
        if *b == COMMENT_MARKER && after_space {
            return &line[..idx];
        }
        after_space = b.is_ascii_whitespace();
    }

    line
}

/// Splits at the first whitespace run, the second field is everything after it
fn split_fields(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let split = line.iter().position(u8::is_ascii_whitespace)?;
    let (code, data) = line.split_at(split);
    let data = trim(data);
    if code.is_empty() || data.is_empty() {
        return None;
    }

    Some((code, data))
}

fn parse_code(token: &[u8]) -> Option<u16> {
    // from_str_radix would accept a leading '+'
    if !token.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }

    u16::from_str_radix(str::from_utf8(token).ok()?, 16).ok()
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use test_support::subscribe;

    fn codes(options: &OptionSet) -> Vec<u16> {
        options.iter().map(OptionEntry::code).collect()
    }

    fn data(options: &OptionSet) -> Vec<String> {
        options
            .iter()
            .map(|entry| String::from_utf8(entry.data().to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_two_entries_in_order() {
        subscribe();
        let options = OptionSet::from_str("FDE9 foo\nFFF0 bar\n").unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(codes(&options), vec![0xFDE9, 0xFFF0]);
        assert_eq!(options.as_slice()[0].data(), b"foo");
        assert_eq!(options.as_slice()[1].data(), b"bar");
    }

    #[test]
    fn test_code_below_range() {
        subscribe();
        let err = OptionSet::from_str("FDE9 foo\n0001 bar\n").unwrap_err();

        assert!(matches!(
            err,
            OptionsError::CodeRange {
                line: 2,
                code: 0x0001,
                lower_bound: LOCAL_START,
                upper_bound: LOCAL_END,
            }
        ));
    }

    #[test]
    fn test_code_above_range() {
        subscribe();
        let err = OptionSet::from_str("FFFF reserved").unwrap_err();

        assert!(matches!(err, OptionsError::CodeRange { line: 1, code: 0xFFFF, .. }));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        subscribe();
        let options = OptionSet::from_str("fde9 low\nfffe high").unwrap();

        assert_eq!(codes(&options), vec![LOCAL_START, LOCAL_END]);
        assert!(OptionSet::from_str("FDE8 x").is_err());
    }

    #[test]
    fn test_invalid_hex() {
        subscribe();
        let err = OptionSet::from_str("\n\nZZZZ foo").unwrap_err();

        assert!(matches!(err, OptionsError::CodeParse { line: 3 }));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_code_forms_rejected() {
        subscribe();
        for line in ["+FDE9 foo", "0xFDE9 foo", "10000 foo", "-1 foo"] {
            let err = OptionSet::from_str(line).unwrap_err();
            assert!(
                matches!(err, OptionsError::CodeParse { line: 1 }),
                "{line}: {err}"
            );
        }
    }

    #[test]
    fn test_leading_zeros_accepted() {
        subscribe();
        let options = OptionSet::from_str("0FDE9 foo").unwrap();
        assert_eq!(codes(&options), vec![0xFDE9]);
    }

    #[test]
    fn test_missing_data() {
        subscribe();
        let err = OptionSet::from_str("# header\nFDE9\n").unwrap_err();

        assert!(matches!(err, OptionsError::Syntax { line: 2 }));
    }

    #[test]
    fn test_data_only_comment() {
        subscribe();
        let err = OptionSet::from_str("FDE9 # no data here").unwrap_err();

        assert!(matches!(err, OptionsError::Syntax { line: 1 }));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        subscribe();
        let options = OptionSet::from_str("\n   \n# one\n\t# two\n\n").unwrap();

        assert!(options.is_empty());
        assert_eq!(options, OptionSet::empty());
    }

    #[test]
    fn test_empty_source() {
        subscribe();
        assert!(OptionSet::from_str("").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        subscribe();
        let options = OptionSet::from_str("FDE9 a\nFFF0 b\nFDE9 c\nFDE9 a").unwrap();

        assert_eq!(codes(&options), vec![0xFDE9, 0xFFF0, 0xFDE9, 0xFDE9]);
        assert_eq!(data(&options), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_data_kept_verbatim() {
        subscribe();
        let options =
            OptionSet::from_str("FDE9   hello  world\t \nFDEA a#b\nFDEB \\x00 %20 # comment")
                .unwrap();

        assert_eq!(data(&options), vec!["hello  world", "a#b", "\\x00 %20"]);
    }

    #[test]
    fn test_first_comment_marker_wins() {
        subscribe();
        let options = OptionSet::from_str("FDE9 a #b #c
FDEA a#b #c
FDEB a#b#c").unwrap();

        assert_eq!(data(&options), vec!["a", "a#b", "a#b#c"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        subscribe();
        let options = OptionSet::from_str("\u{feff}FDE9 foo\r\n# x\r\nFFF0 bar\r\n").unwrap();

        assert_eq!(codes(&options), vec![0xFDE9, 0xFFF0]);
        assert_eq!(options.as_slice()[0].data(), b"foo");
    }

    #[test]
    fn test_first_error_wins() {
        subscribe();
        let err = OptionSet::from_str("FDE9 ok\nFDE9\nZZZZ bad\n0001 low").unwrap_err();

        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_from_reader() {
        subscribe();
        let options = OptionSet::from_reader(&b"FFFE payload"[..]).unwrap();

        assert_eq!(codes(&options), vec![0xFFFE]);
    }

    #[test]
    fn test_non_utf8_data_kept() {
        subscribe();
        let options = OptionSet::from_reader(&b"FDE9 ab\xff\xfecd\n"[..]).unwrap();

        assert_eq!(codes(&options), vec![0xFDE9]);
        assert_eq!(options.as_slice()[0].data(), b"ab\xff\xfecd");
    }

    #[test]
    fn test_non_utf8_code() {
        subscribe();
        let err = OptionSet::from_bytes(b"FDE9 ok\n\xffDE9 bad").unwrap_err();

        assert!(matches!(err, OptionsError::CodeParse { line: 2 }));
    }

    #[test]
    fn test_read_error() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
            }
        }

        let err = OptionSet::from_reader(Broken).unwrap_err();
        assert!(matches!(err, OptionsError::SourceRead(_)));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_entry_constructor_enforces_range() {
        assert!(OptionEntry::new(0x0008, vec![]).is_none());
        let entry = OptionEntry::new(0xFDE9, Vec::new()).unwrap();
        assert!(entry.data().is_empty());
        assert_eq!(entry.to_edns_option(), EdnsOption::Unknown(0xFDE9, vec![]));
        assert_eq!(entry.edns_code(), EdnsCode::Unknown(0xFDE9));
    }

    #[test]
    fn test_error_messages() {
        let err = OptionSet::from_str("0001 foo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "edns custom code 0x0001 out of range at line 1, code should be between 0xFDE9 and 0xFFFE"
        );

        let err = OptionSet::from_str("FDE9").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error for a custom edns option at line 1, expected syntax: FDE9 something"
        );
    }
}
