//! Scanning BibTeX source into entries whose field values are kept exactly as written.

use std::collections::HashMap;

use crate::{Error, ErrorKind};

/// An entry as found in the source.
///
/// Field values are the text between the outer delimiters, untouched: LaTeX commands, math and
/// inner braces are all preserved. Concatenated parts are joined and `@string` abbreviations are
/// expanded.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct RawEntry<'s> {
    pub kind: &'s str,
    pub key: &'s str,
    pub fields: Vec<(String, String)>,
    pub line: usize,
}

/// Scans every entry of `src`, in order.
///
/// `@comment` and `@preamble` are skipped, as is any text outside an entry and any line
/// starting with `%`.
///
/// # Errors
///
/// [`ErrorKind::StoreParse`] when an entry is not terminated, its braces or quotes do not
/// balance, or it is otherwise not well formed.
pub(super) fn scan(src: &str) -> Result<Vec<RawEntry<'_>>, Error> {
    let mut scanner = Scanner { src, pos: 0 };
    let mut strings = HashMap::new();
    let mut entries = Vec::new();

    while let Some(start) = scanner.next_entry() {
        let kind = scanner.ident();
        if kind.is_empty() {
            // a stray '@' in free text
            continue;
        }

        scanner.skip_ws();
        let close = match scanner.bump() {
            Some('{') => '}',
            Some('(') => ')',
            _ => return Err(scanner.error(start, &format!("expected '{{' after '@{kind}'"))),
        };

        match kind.to_lowercase().as_str() {
            "comment" | "preamble" => scanner.group(start, close)?,
            "string" => {
                for (name, value) in scanner.fields(start, close, &strings)? {
                    strings.insert(name, value);
                }
            }
            _ => {
                let (key, closed) = scanner.key(start, close)?;
                let fields = if closed {
                    Vec::new()
                } else {
                    scanner.fields(start, close, &strings)?
                };

                entries.push(RawEntry {
                    kind,
                    key,
                    fields,
                    line: scanner.line(start),
                });
            }
        }
    }

    Ok(entries)
}

struct Scanner<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Moves past the next '@' outside a `%` comment line, returning its position.
    fn next_entry(&mut self) -> Option<usize> {
        let mut line_start = true;
        while let Some(c) = self.bump() {
            match c {
                '@' => return Some(self.pos - 1),
                '%' if line_start => {
                    while !matches!(self.bump(), Some('\n') | None) {}
                    continue;
                }
                '\n' => {
                    line_start = true;
                    continue;
                }
                c if c.is_whitespace() => continue,
                _ => {}
            }
            line_start = false;
        }
        None
    }

    fn ident(&mut self) -> &'s str {
        let from = self.pos;
        while matches!(self.peek(), Some(c) if is_ident(c)) {
            self.bump();
        }
        let src = self.src;
        &src[from..self.pos]
    }

    /// Reads the citation key, telling whether the entry closed right after it.
    fn key(&mut self, start: usize, close: char) -> Result<(&'s str, bool), Error> {
        self.skip_ws();
        let from = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == close || c == '{' || c == '}' || c.is_whitespace() {
                break;
            }
            self.bump();
        }
        let src = self.src;
        let key = &src[from..self.pos];
        if key.is_empty() {
            return Err(self.error(start, "entry without a key"));
        }

        self.skip_ws();
        match self.bump() {
            Some(',') => Ok((key, false)),
            Some(c) if c == close => Ok((key, true)),
            None => Err(self.unterminated(start)),
            Some(c) => Err(self.error(self.pos, &format!("unexpected '{c}' after key '{key}'"))),
        }
    }

    fn fields(
        &mut self,
        start: usize,
        close: char,
        strings: &HashMap<String, String>,
    ) -> Result<Vec<(String, String)>, Error> {
        let mut fields = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.unterminated(start)),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(fields);
                }
                _ => {}
            }

            let name = self.ident();
            if name.is_empty() {
                return Err(self.error(self.pos, "expected a field name"));
            }
            self.skip_ws();
            if self.bump() != Some('=') {
                return Err(self.error(self.pos, &format!("expected '=' after '{name}'")));
            }

            let value = self.value(start, strings)?;
            fields.push((name.to_lowercase(), value));

            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(c) if c == close => return Ok(fields),
                None => return Err(self.unterminated(start)),
                Some(c) => {
                    return Err(self.error(
                        self.pos,
                        &format!("unexpected '{c}' after the value of '{name}'"),
                    ))
                }
            }
        }
    }

    fn value(&mut self, start: usize, strings: &HashMap<String, String>) -> Result<String, Error> {
        let mut value = String::new();

        loop {
            self.skip_ws();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    let from = self.pos;
                    self.group(start, '}')?;
                    value.push_str(&self.src[from..self.pos - 1]);
                }
                Some('"') => {
                    self.bump();
                    let from = self.pos;
                    self.quoted(start)?;
                    value.push_str(&self.src[from..self.pos - 1]);
                }
                Some(c) if is_ident(c) => {
                    let token = self.ident();
                    match strings.get(&token.to_lowercase()) {
                        Some(expanded) => value.push_str(expanded),
                        None => value.push_str(token),
                    }
                }
                None => return Err(self.unterminated(start)),
                Some(c) => {
                    return Err(self.error(self.pos, &format!("unexpected '{c}' in a field value")))
                }
            }

            self.skip_ws();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                return Ok(value);
            }
        }
    }

    /// Moves past `close` once every brace opened on the way is closed again.
    fn group(&mut self, start: usize, close: char) -> Result<(), Error> {
        let mut depth = 0_usize;
        loop {
            match self.bump() {
                None => return Err(self.unterminated(start)),
                Some('\\') => self.escaped(),
                Some(c) if c == close && depth == 0 => return Ok(()),
                Some('{') => depth += 1,
                Some('}') if depth == 0 => {
                    return Err(self.error(self.pos - 1, "unbalanced '}'"));
                }
                Some('}') => depth -= 1,
                Some(_) => {}
            }
        }
    }

    /// Moves past the closing quote of a quoted value, which may contain balanced braces.
    fn quoted(&mut self, start: usize) -> Result<(), Error> {
        let mut depth = 0_usize;
        loop {
            match self.bump() {
                None => return Err(self.unterminated(start)),
                Some('\\') => self.escaped(),
                Some('"') if depth == 0 => return Ok(()),
                Some('{') => depth += 1,
                Some('}') if depth == 0 => {
                    return Err(self.error(self.pos - 1, "unbalanced '}'"));
                }
                Some('}') => depth -= 1,
                Some(_) => {}
            }
        }
    }

    // `\{`, `\}` and `\"` are literal characters
    fn escaped(&mut self) {
        if matches!(self.peek(), Some('{' | '}' | '"')) {
            self.bump();
        }
    }

    fn line(&self, at: usize) -> usize {
        self.src[..at].matches('\n').count() + 1
    }

    fn unterminated(&self, start: usize) -> Error {
        Error::new(
            ErrorKind::StoreParse,
            format!("the entry on line {} is not terminated", self.line(start)),
        )
    }

    fn error(&self, at: usize, message: &str) -> Error {
        Error::new(
            ErrorKind::StoreParse,
            format!("{message} on line {}", self.line(at)),
        )
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/')
}
