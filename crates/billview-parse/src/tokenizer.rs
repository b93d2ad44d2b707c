//! Content stream tokenizer.
//!
//! Turns raw content stream bytes into a sequence of [`Operator`]s, each
//! carrying the operands that preceded it. The same lexer reads ToUnicode
//! CMaps, which share the PostScript token syntax.

use crate::error::BackendError;

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer or real number.
    Number(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, as raw bytes.
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Dict(Vec<(String, Operand)>),
    Bool(bool),
    Null,
    /// A bare keyword appearing inside an array or dictionary.
    Keyword(String),
}

impl Operand {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Operand]> {
        match self {
            Operand::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// An operator with its preceding operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// The `i`-th operand as a number, defaulting to 0.
    pub fn num(&self, i: usize) -> f64 {
        self.operands.get(i).and_then(Operand::as_f64).unwrap_or(0.0)
    }
}

enum Token {
    Value(Operand),
    Keyword(String),
    ArrayEnd,
    DictEnd,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn malformed(msg: impl Into<String>) -> BackendError {
    BackendError::Interpreter(msg.into())
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        self.skip_whitespace();
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let token = match b {
            b'(' => Token::Value(Operand::Str(self.literal_string()?)),
            b'<' if self.peek_at(1) == Some(b'<') => {
                self.pos += 2;
                Token::Value(Operand::Dict(self.dict()?))
            }
            b'<' => Token::Value(Operand::Str(self.hex_string()?)),
            b'>' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Token::DictEnd
            }
            b'[' => {
                self.pos += 1;
                Token::Value(Operand::Array(self.array()?))
            }
            b']' => {
                self.pos += 1;
                Token::ArrayEnd
            }
            b'/' => Token::Value(Operand::Name(self.name())),
            b'0'..=b'9' | b'+' | b'-' | b'.' => Token::Value(Operand::Number(self.number()?)),
            b'{' | b'}' | b')' | b'>' => {
                self.pos += 1;
                return self.next_token();
            }
            _ => {
                let word = self.regular_run();
                match word.as_str() {
                    "true" => Token::Value(Operand::Bool(true)),
                    "false" => Token::Value(Operand::Bool(false)),
                    "null" => Token::Value(Operand::Null),
                    _ => Token::Keyword(word),
                }
            }
        };
        Ok(Some(token))
    }

    fn regular_run(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        if self.pos == start {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' {
                let hi = raw.get(i + 1).copied().and_then(hex_value);
                let lo = raw.get(i + 2).copied().and_then(hex_value);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    fn number(&mut self) -> Result<f64, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let token = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();
        match token {
            "+" | "-" | "." | "-." | "+." => Ok(0.0),
            _ => token
                .parse::<f64>()
                .map_err(|_| malformed(format!("invalid number: {token}"))),
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out)?,
                _ => out.push(b),
            }
        }
        Err(malformed("unterminated literal string"))
    }

    fn escape(&mut self, out: &mut Vec<u8>) -> Result<(), BackendError> {
        let Some(e) = self.peek() else {
            return Err(malformed("unterminated escape in literal string"));
        };
        self.pos += 1;
        match e {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(e - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut nibbles = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(malformed("unterminated hex string"));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            nibbles.push(hex_value(b).ok_or_else(|| malformed(format!("invalid hex digit: {:?}", b as char)))?);
        }
        if nibbles.len() % 2 == 1 {
            nibbles.push(0);
        }
        Ok(nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        let mut items = Vec::new();
        loop {
            match self.next_token()? {
                Some(Token::Value(v)) => items.push(v),
                Some(Token::Keyword(k)) => items.push(Operand::Keyword(k)),
                Some(Token::ArrayEnd) => return Ok(items),
                Some(Token::DictEnd) => return Err(malformed("unexpected '>>' in array")),
                None => return Err(malformed("unterminated array")),
            }
        }
    }

    fn dict(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        let mut entries = Vec::new();
        loop {
            let key = match self.next_token()? {
                Some(Token::DictEnd) => return Ok(entries),
                Some(Token::Value(Operand::Name(k))) => k,
                Some(_) => return Err(malformed("expected name key in dictionary")),
                None => return Err(malformed("unterminated dictionary")),
            };
            let value = match self.next_token()? {
                Some(Token::Value(v)) => v,
                Some(Token::Keyword(k)) => Operand::Keyword(k),
                _ => return Err(malformed("missing dictionary value")),
            };
            entries.push((key, value));
        }
    }

    /// Skip inline image data up to and including the `EI` keyword.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        while self.pos + 1 < self.input.len() {
            let at_ei = self.input[self.pos] == b'E'
                && self.input[self.pos + 1] == b'I'
                && self.pos > 0
                && is_whitespace(self.input[self.pos - 1])
                && self
                    .input
                    .get(self.pos + 2)
                    .is_none_or(|&b| !is_regular(b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(malformed("unterminated inline image (missing EI)"))
    }
}

/// Parse content stream bytes into operators.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for malformed streams.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer::new(input);
    let mut ops = Vec::new();
    let mut stack = Vec::new();

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Value(v) => stack.push(v),
            Token::Keyword(k) if k == "BI" => {
                lexer.skip_inline_image()?;
                stack.clear();
                ops.push(Operator {
                    name: k,
                    operands: Vec::new(),
                });
            }
            Token::Keyword(name) => ops.push(Operator {
                name,
                operands: std::mem::take(&mut stack),
            }),
            Token::ArrayEnd => return Err(malformed("unexpected ']' outside array")),
            Token::DictEnd => return Err(malformed("unexpected '>>' outside dictionary")),
        }
    }

    Ok(ops)
}
