//! Tokenizer for prefs.js-style sources.

use super::ParseError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    /// Unsigned digit run; sign and range are checked by the parser.
    Int(String),
    Plus,
    Minus,
    LParen,
    RParen,
    Comma,
    Semi,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(word) => write!(f, "'{}'", word),
            TokenKind::Str(_) => f.write_str("string"),
            TokenKind::Int(digits) => write!(f, "integer {}", digits),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Semi => f.write_str("';'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self { chars: source.chars().peekable(), line: 1 }
    }

    /// Consume one char. `\n`, `\r\n` and a bare `\r` each end one line.
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        match c {
            '\n' => self.line += 1,
            '\r' if self.chars.peek() != Some(&'\n') => self.line += 1,
            _ => {}
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
    }

    /// Skip whitespace and all three comment styles.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.chars.peek().copied() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') => {
                    let start = self.line;
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut prev = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if prev == '*' => break,
                                    Some(c) => prev = c,
                                    None => {
                                        return Err(ParseError::new(
                                            start,
                                            "unterminated block comment",
                                        ))
                                    }
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(c) = self.bump() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '"' | '\'' => TokenKind::Str(self.lex_string(c, line)?),
            c if c.is_ascii_digit() => {
                let mut digits = String::from(c);
                while let Some(&d) = self.chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    self.bump();
                }
                TokenKind::Int(digits)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&d) = self.chars.peek() {
                    if !(d.is_ascii_alphanumeric() || d == '_') {
                        break;
                    }
                    word.push(d);
                    self.bump();
                }
                TokenKind::Ident(word)
            }
            other => {
                return Err(ParseError::new(line, format!("unexpected character '{}'", other)))
            }
        };

        Ok(Some(Token { kind, line }))
    }

    /// Lex a quoted string. The whole literal is consumed even when an escape
    /// is bad so the caller can resume after it.
    fn lex_string(&mut self, quote: char, start: usize) -> Result<String, ParseError> {
        let mut out = String::new();
        let mut error: Option<ParseError> = None;

        loop {
            let Some(c) = self.bump() else {
                return Err(ParseError::new(start, "unterminated string literal"));
            };
            if c == quote {
                break;
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let line = self.line;
            let Some(esc) = self.bump() else {
                return Err(ParseError::new(start, "unterminated string literal"));
            };
            let decoded = match esc {
                '\\' => Ok('\\'),
                '"' => Ok('"'),
                '\'' => Ok('\''),
                'n' => Ok('\n'),
                'r' => Ok('\r'),
                't' => Ok('\t'),
                'x' => self.hex_digits(2, line).and_then(|v| {
                    char::from_u32(v)
                        .ok_or_else(|| ParseError::new(line, "invalid \\x escape value"))
                }),
                'u' => self.unicode_escape(line),
                other => Err(ParseError::new(line, format!("unknown escape sequence '\\{}'", other))),
            };
            match decoded {
                Ok(ch) => out.push(ch),
                Err(e) => {
                    error.get_or_insert(e);
                }
            }
        }

        match error {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    fn hex_digits(&mut self, count: usize, line: usize) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self.chars.peek().and_then(|c| c.to_digit(16)).ok_or_else(|| {
                ParseError::new(line, format!("expected {} hex digits in escape", count))
            })?;
            self.bump();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// `\uHHHH`, combining a following `\uHHHH` low surrogate when present.
    fn unicode_escape(&mut self, line: usize) -> Result<char, ParseError> {
        let high = self.hex_digits(4, line)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high)
                .ok_or_else(|| ParseError::new(line, "lone low surrogate in \\u escape"));
        }

        let mut ahead = self.chars.clone();
        if ahead.next() != Some('\\') || ahead.next() != Some('u') {
            return Err(ParseError::new(line, "high surrogate without low surrogate"));
        }
        self.bump();
        self.bump();
        let low = self.hex_digits(4, line)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(ParseError::new(line, "high surrogate without low surrogate"));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| ParseError::new(line, "invalid surrogate pair"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        while let Some(tok) = lexer.next_token().expect("lex") {
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn skips_all_comment_styles() {
        let toks = kinds("// a\n# b\n/* c\n d */ pref");
        assert_eq!(toks, vec![TokenKind::Ident("pref".into())]);
    }

    #[test]
    fn tracks_lines_across_block_comments() {
        let mut lexer = Lexer::new("/*\n\n*/\n;");
        let tok = lexer.next_token().expect("lex").expect("token");
        assert_eq!(tok.line, 4);
    }

    #[test]
    fn decodes_escapes() {
        let toks = kinds(r#""a\"b\\c\n\x41é😀" 'it\'s'"#);
        assert_eq!(
            toks,
            vec![
                TokenKind::Str("a\"b\\c\nAé\u{1F600}".into()),
                TokenKind::Str("it's".into())
            ]
        );
    }

    #[test]
    fn unknown_escape_is_error_and_consumes_literal() {
        let mut lexer = Lexer::new("\"bad\\q\" ;");
        let err = lexer.next_token().expect_err("bad escape");
        assert!(err.reason.contains("unknown escape"));
        let next = lexer.next_token().expect("lex").expect("token");
        assert_eq!(next.kind, TokenKind::Semi);
    }

    #[test]
    fn unterminated_string_reports_start_line() {
        let mut lexer = Lexer::new("\n\"abc\n\n");
        let err = lexer.next_token().expect_err("unterminated");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn unterminated_block_comment_is_error() {
        let mut lexer = Lexer::new("pref /* never closed");
        lexer.next_token().expect("ident");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn decodes_unicode_escapes() {
        let toks = kinds(r#""caf\u00e9" "\uD83D\uDE00" "\u0041\u00DF""#);
        assert_eq!(
            toks,
            vec![
                TokenKind::Str("caf\u{e9}".into()),
                TokenKind::Str("\u{1F600}".into()),
                TokenKind::Str("A\u{df}".into()),
            ]
        );
    }

    #[test]
    fn lone_low_surrogate_is_error() {
        let mut lexer = Lexer::new(r#""\uDC00" ;"#);
        let err = lexer.next_token().expect_err("lone low surrogate");
        assert!(err.reason.contains("lone low surrogate"));
        let next = lexer.next_token().expect("lex").expect("token");
        assert_eq!(next.kind, TokenKind::Semi);
    }

    #[test]
    fn high_surrogate_needs_low_surrogate() {
        let mut lexer = Lexer::new(r#""\uD800x""#);
        let err = lexer.next_token().expect_err("unpaired high surrogate");
        assert!(err.reason.contains("high surrogate without low surrogate"));

        let mut lexer = Lexer::new(r#""\uD800\u0041""#);
        let err = lexer.next_token().expect_err("high surrogate followed by non-surrogate");
        assert!(err.reason.contains("high surrogate without low surrogate"));
    }

    #[test]
    fn short_hex_escapes_are_errors() {
        let mut lexer = Lexer::new(r#""\x4""#);
        let err = lexer.next_token().expect_err("one hex digit");
        assert!(err.reason.contains("expected 2 hex digits"));

        let mut lexer = Lexer::new(r#""\u12G4""#);
        let err = lexer.next_token().expect_err("bad hex digit");
        assert!(err.reason.contains("expected 4 hex digits"));
    }

    #[test]
    fn counts_bare_carriage_returns_as_line_breaks() {
        let mut lexer = Lexer::new("// one\r// two\r\n\r;");
        let tok = lexer.next_token().expect("lex").expect("token");
        assert_eq!(tok.kind, TokenKind::Semi);
        assert_eq!(tok.line, 4);
    }

    #[test]
    fn bom_is_ignored() {
        assert_eq!(kinds("\u{feff};"), vec![TokenKind::Semi]);
    }
}
