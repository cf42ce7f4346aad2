//! Declaration parser on top of the token stream.

use super::lexer::{Lexer, Token, TokenKind};
use super::ParseError;
use crate::domain::{Declaration, PrefKind, PrefValue, PreferenceEntry};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    /// Line of the most recently consumed token.
    last_line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { lexer: Lexer::new(source), peeked: None, last_line: 1 }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn next(&mut self) -> Result<Option<Token>, ParseError> {
        let tok = match self.peeked.take() {
            Some(tok) => Some(tok),
            None => self.lexer.next_token()?,
        };
        if let Some(tok) = &tok {
            self.last_line = tok.line;
        }
        Ok(tok)
    }

    fn unexpected(&self, expected: &str, found: Option<&Token>) -> ParseError {
        match found {
            Some(tok) => ParseError::new(tok.line, format!("expected {}, found {}", expected, tok.kind)),
            None => {
                ParseError::new(self.last_line, format!("expected {}, found end of input", expected))
            }
        }
    }

    /// Consume a token of kind `want`. A mismatched token is left in place so
    /// recovery can resume at it when it starts the next declaration.
    fn expect(&mut self, want: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.peek()?.cloned() {
            Some(tok) if tok.kind == want => {
                self.next()?;
                Ok(tok)
            }
            other => Err(self.unexpected(expected, other.as_ref())),
        }
    }

    /// Parse the next declaration, or `None` at end of input.
    pub fn parse_declaration(&mut self) -> Result<Option<Declaration>, ParseError> {
        let Some(head) = self.next()? else {
            return Ok(None);
        };
        let declared = match &head.kind {
            TokenKind::Ident(word) => PrefKind::from_keyword(word),
            _ => None,
        }
        .ok_or_else(|| self.unexpected("pref, user_pref, sticky_pref or lockPref", Some(&head)))?;
        let mut kind = declared;

        self.expect(TokenKind::LParen, "'(' after declaration keyword")?;

        let key = match self.next()? {
            Some(Token { kind: TokenKind::Str(key), line }) => {
                if key.is_empty() {
                    return Err(ParseError::new(line, "preference name must not be empty"));
                }
                key
            }
            other => return Err(self.unexpected("preference name string", other.as_ref())),
        };

        self.expect(TokenKind::Comma, "',' after preference name")?;
        let value = self.parse_value()?;

        while matches!(self.peek()?, Some(Token { kind: TokenKind::Comma, .. })) {
            self.next()?;
            let attr = self.next()?;
            let word = match &attr {
                Some(Token { kind: TokenKind::Ident(word), .. }) => word.as_str(),
                _ => return Err(self.unexpected("'locked' or 'sticky'", attr.as_ref())),
            };
            let line = attr.as_ref().map_or(self.last_line, |t| t.line);
            if declared != PrefKind::Default {
                return Err(ParseError::new(line, "attributes are only allowed in pref()"));
            }
            kind = match (word, kind) {
                ("locked", _) => PrefKind::Locked,
                ("sticky", PrefKind::Locked) => PrefKind::Locked,
                ("sticky", _) => PrefKind::Sticky,
                (other, _) => {
                    return Err(ParseError::new(line, format!("unknown attribute '{}'", other)))
                }
            };
        }

        let close = self.expect(TokenKind::RParen, "')' to close declaration")?;

        match self.peek()?.cloned() {
            Some(Token { kind: TokenKind::Semi, .. }) => {
                self.next()?;
            }
            Some(tok) => {
                // Blame the line the declaration ended on, not the next one.
                return Err(ParseError::new(
                    close.line,
                    format!("expected ';' after declaration, found {}", tok.kind),
                ));
            }
            None => return Err(self.unexpected("';' after declaration", None)),
        }

        Ok(Some(Declaration { line: head.line, entry: PreferenceEntry::new(key, value, kind) }))
    }

    fn parse_value(&mut self) -> Result<PrefValue, ParseError> {
        let tok = self.next()?;
        match tok {
            Some(Token { kind: TokenKind::Ident(word), .. }) if word == "true" => {
                Ok(PrefValue::Bool(true))
            }
            Some(Token { kind: TokenKind::Ident(word), .. }) if word == "false" => {
                Ok(PrefValue::Bool(false))
            }
            Some(Token { kind: TokenKind::Str(s), .. }) => Ok(PrefValue::String(s)),
            Some(Token { kind: TokenKind::Int(digits), line }) => int_value("", &digits, line),
            Some(Token { kind: sign @ (TokenKind::Plus | TokenKind::Minus), line }) => {
                match self.next()? {
                    Some(Token { kind: TokenKind::Int(digits), .. }) => {
                        let sign = if sign == TokenKind::Minus { "-" } else { "" };
                        int_value(sign, &digits, line)
                    }
                    other => Err(self.unexpected("integer after sign", other.as_ref())),
                }
            }
            other => {
                Err(self.unexpected("a value (true, false, integer or string)", other.as_ref()))
            }
        }
    }

    /// Skip the rest of a malformed declaration.
    ///
    /// Stops after the next `;` or before the next declaration keyword. Every
    /// declaration consumes its head token, so resuming at a keyword still makes
    /// progress. Lexer errors inside the skipped region are dropped since the
    /// declaration has already been reported.
    pub fn recover(&mut self) {
        loop {
            let tok = match self.peek() {
                Ok(Some(tok)) => tok.clone(),
                Ok(None) => return,
                Err(_) => continue,
            };
            match &tok.kind {
                TokenKind::Semi => {
                    let _ = self.next();
                    return;
                }
                TokenKind::Ident(word) if PrefKind::from_keyword(word).is_some() => return,
                _ => {
                    let _ = self.next();
                }
            }
        }
    }
}

fn int_value(sign: &str, digits: &str, line: usize) -> Result<PrefValue, ParseError> {
    format!("{}{}", sign, digits)
        .parse::<i64>()
        .ok()
        .and_then(|n| i32::try_from(n).ok())
        .map(PrefValue::Int)
        .ok_or_else(|| ParseError::new(line, format!("integer {}{} out of range", sign, digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(source: &str) -> Result<Declaration, ParseError> {
        let mut parser = Parser::new(source);
        Ok(parser.parse_declaration()?.expect("declaration"))
    }

    #[test]
    fn parses_every_value_type() {
        assert_eq!(one("pref(\"a\", true);").expect("bool").entry.value, PrefValue::Bool(true));
        assert_eq!(one("pref(\"a\", -12);").expect("int").entry.value, PrefValue::Int(-12));
        assert_eq!(one("pref(\"a\", +7);").expect("int").entry.value, PrefValue::Int(7));
        assert_eq!(
            one("pref('a', 'x y');").expect("str").entry.value,
            PrefValue::String("x y".into())
        );
    }

    #[test]
    fn integer_range_is_i32() {
        let min = one("pref(\"a\", -2147483648);").expect("min");
        assert_eq!(min.entry.value, PrefValue::Int(i32::MIN));
        let err = one("pref(\"a\", 2147483648);").expect_err("overflow");
        assert!(err.reason.contains("out of range"));
        assert!(one("pref(\"a\", 99999999999999999999999);").is_err());
    }

    #[test]
    fn declaration_kinds() {
        assert_eq!(one("user_pref(\"a\", 1);").expect("user").entry.kind, PrefKind::User);
        assert_eq!(one("lockPref(\"a\", 1);").expect("lock").entry.kind, PrefKind::Locked);
        assert_eq!(one("sticky_pref(\"a\", 1);").expect("sticky").entry.kind, PrefKind::Sticky);
    }

    #[test]
    fn attributes_promote_pref_kind() {
        assert_eq!(one("pref(\"a\", 1, locked);").expect("locked").entry.kind, PrefKind::Locked);
        assert_eq!(one("pref(\"a\", 1, sticky);").expect("sticky").entry.kind, PrefKind::Sticky);
        assert_eq!(
            one("pref(\"a\", 1, locked, sticky);").expect("both").entry.kind,
            PrefKind::Locked
        );
        let err = one("user_pref(\"a\", 1, locked);").expect_err("attr on user_pref");
        assert!(err.reason.contains("only allowed in pref()"));
        assert!(one("pref(\"a\", 1, frozen);").is_err());
    }

    #[test]
    fn declaration_may_span_lines() {
        let decl = one("\n\npref(\n  \"a.b\",\n  false\n);").expect("multiline");
        assert_eq!(decl.line, 3);
        assert_eq!(decl.entry.key, "a.b");
    }

    #[test]
    fn several_declarations_on_one_line() {
        let mut parser = Parser::new("pref(\"a\", 1); pref(\"b\", 2);");
        assert_eq!(parser.parse_declaration().expect("a").expect("a").entry.key, "a");
        assert_eq!(parser.parse_declaration().expect("b").expect("b").entry.key, "b");
        assert!(parser.parse_declaration().expect("eof").is_none());
    }

    #[test]
    fn rejects_malformed_declarations() {
        assert!(one("pref(\"\", 1);").expect_err("empty key").reason.contains("empty"));
        assert!(one("pref(a, 1);").is_err());
        assert!(one("pref(\"a\", 1)").expect_err("no semi").reason.contains("';'"));
        assert!(one("pref(\"a\" 1);").is_err());
        assert!(one("set(\"a\", 1);").expect_err("keyword").reason.contains("user_pref"));
        assert!(one("pref(\"a\", -true);").is_err());
    }

    #[test]
    fn missing_semicolon_blames_declaration_line() {
        let err = one("pref(\"a\", 1)\n\npref(\"b\", 2);").expect_err("no semi");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn truncated_input_reports_last_line() {
        let err = one("pref(\"a\",\n").expect_err("truncated");
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("end of input"));
    }
}
