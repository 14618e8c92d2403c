//! `[[tag:NAME]]` annotations in slide notes.
//!
//! NAME is one or more ASCII letters, digits or underscores. Matches are
//! found left to right and never overlap; duplicates are reported as often
//! as they appear.

use memchr::memmem;

const OPEN: &str = "[[tag:";
const CLOSE: &str = "]]";

/// Iterator over the tag names in a notes text.
#[derive(Debug, Clone)]
pub struct Tags<'a> {
    rest: &'a str,
}

/// Tag names declared in `notes`, in order of appearance.
pub fn tags(notes: &str) -> Tags<'_> {
    Tags { rest: notes }
}

/// Collect [`tags`] into owned names.
pub fn extract_tags(notes: &str) -> Vec<String> {
    tags(notes).map(str::to_string).collect()
}

impl<'a> Iterator for Tags<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let rest = self.rest;
            let found = memmem::find(rest.as_bytes(), OPEN.as_bytes())?;
            let after = &rest[found + OPEN.len()..];
            let name_len = after
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();

            if name_len > 0 && after[name_len..].starts_with(CLOSE) {
                self.rest = &after[name_len + CLOSE.len()..];
                return Some(&after[..name_len]);
            }
            // Retry one byte further; `[` is ASCII so this is a char boundary
            self.rest = &rest[found + 1..];
        }
    }
}
