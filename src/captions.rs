//! Parsing of the `raw` caption column
//!
//! The column holds a bracketed list of quoted strings, e.g.
//! `['A dog runs .', "A man's hat ."]`. Elements may use single or double
//! quotes, an `r` or `u` prefix, and backslash escapes. Adjacent literals in
//! one element are joined, and a trailing comma is allowed.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Syntax error in a caption list, with the byte offset where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionListError {
    pub offset: usize,
    pub message: String,
}

impl CaptionListError {
    fn new<S: Into<String>>(offset: usize, message: S) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for CaptionListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for CaptionListError {}

/// Parse a caption list literal into its strings
pub fn parse_caption_list(raw: &str) -> Result<Vec<String>, CaptionListError> {
    let mut parser = Parser {
        chars: raw.char_indices().peekable(),
        len: raw.len(),
    };
    parser.list()
}

/// First caption of the list, whitespace-trimmed; empty when the list is empty
pub fn first_caption(raw: &str) -> Result<String, CaptionListError> {
    let captions = parse_caption_list(raw)?;
    Ok(captions
        .first()
        .map(|caption| caption.trim().to_string())
        .unwrap_or_default())
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl Parser<'_> {
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |&(i, _)| i)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn expect(&mut self, wanted: char) -> Result<(), CaptionListError> {
        let offset = self.offset();
        match self.chars.next() {
            Some((_, c)) if c == wanted => Ok(()),
            Some((_, c)) => Err(CaptionListError::new(
                offset,
                format!("expected '{wanted}', found '{c}'"),
            )),
            None => Err(CaptionListError::new(
                offset,
                format!("expected '{wanted}', found end of input"),
            )),
        }
    }

    fn list(&mut self) -> Result<Vec<String>, CaptionListError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        self.expect('[')?;

        loop {
            self.skip_whitespace();
            if self.chars.next_if(|&(_, c)| c == ']').is_some() {
                break;
            }

            items.push(self.element()?);

            self.skip_whitespace();
            let offset = self.offset();
            match self.chars.next() {
                Some((_, ',')) => {},
                Some((_, ']')) => break,
                Some((_, c)) => {
                    return Err(CaptionListError::new(
                        offset,
                        format!("expected ',' or ']', found '{c}'"),
                    ))
                },
                None => return Err(CaptionListError::new(offset, "unterminated list")),
            }
        }

        self.skip_whitespace();
        if let Some(&(offset, c)) = self.chars.peek() {
            return Err(CaptionListError::new(
                offset,
                format!("unexpected '{c}' after list"),
            ));
        }
        Ok(items)
    }

    /// One list element: a string literal followed by any adjacent ones
    fn element(&mut self) -> Result<String, CaptionListError> {
        let mut out = self.string()?;
        loop {
            self.skip_whitespace();
            if !self.at_string_start() {
                return Ok(out);
            }
            out.push_str(&self.string()?);
        }
    }

    fn at_string_start(&self) -> bool {
        let mut ahead = self.chars.clone();
        match ahead.next() {
            Some((_, '\'' | '"')) => true,
            Some((_, 'r' | 'R' | 'u' | 'U')) => {
                matches!(ahead.next(), Some((_, '\'' | '"')))
            },
            _ => false,
        }
    }

    fn string(&mut self) -> Result<String, CaptionListError> {
        let start = self.offset();
        let raw = match self.chars.next_if(|&(_, c)| matches!(c, 'r' | 'R' | 'u' | 'U')) {
            Some((_, prefix)) => matches!(prefix, 'r' | 'R'),
            None => false,
        };
        let quote = match self.chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            Some((_, c)) => {
                return Err(CaptionListError::new(
                    start,
                    format!("expected a quoted string, found '{c}'"),
                ))
            },
            None => {
                return Err(CaptionListError::new(
                    start,
                    "expected a quoted string, found end of input",
                ))
            },
        };

        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((offset, '\\')) if raw => {
                    // Raw literals keep the backslash; it still shields the next character
                    let Some((_, next)) = self.chars.next() else {
                        return Err(CaptionListError::new(offset, "unterminated string literal"));
                    };
                    out.push('\\');
                    out.push(next);
                },
                Some((offset, '\\')) => self.escape(offset, &mut out)?,
                Some((offset, '\n')) => {
                    return Err(CaptionListError::new(offset, "newline in string literal"))
                },
                Some((_, c)) => out.push(c),
                None => return Err(CaptionListError::new(start, "unterminated string literal")),
            }
        }
    }

    fn escape(&mut self, offset: usize, out: &mut String) -> Result<(), CaptionListError> {
        let Some((_, c)) = self.chars.next() else {
            return Err(CaptionListError::new(offset, "dangling escape"));
        };
        match c {
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0'..='7' => out.push(self.octal_escape(c)),
            '\n' => {},
            'x' => out.push(self.hex_escape(offset, 2)?),
            'u' => out.push(self.hex_escape(offset, 4)?),
            'U' => out.push(self.hex_escape(offset, 8)?),
            'N' => {
                return Err(CaptionListError::new(
                    offset,
                    "named unicode escapes are not supported",
                ))
            },
            // Unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            },
        }
        Ok(())
    }

    /// Up to three octal digits, the first already consumed
    fn octal_escape(&mut self, first: char) -> char {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.chars.next_if(|&(_, c)| c.is_digit(8)) {
                Some((_, c)) => value = value * 8 + c.to_digit(8).unwrap_or(0),
                None => break,
            }
        }
        // At most 0o777, always a valid scalar value
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn hex_escape(&mut self, offset: usize, digits: usize) -> Result<char, CaptionListError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| CaptionListError::new(offset, "truncated hex escape"))?;
            value = value * 16 + digit;
        }
        char::from_u32(value)
            .ok_or_else(|| CaptionListError::new(offset, "escape is not a valid character"))
    }
}
