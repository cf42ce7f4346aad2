//! Overlay parsing
//!
//! Turns prefs.js-style text into an ordered [`OverlaySet`]. Two entry points
//! let the caller pick the error policy: [`parse_overlay`] stops at the first
//! malformed declaration, [`parse_overlay_lenient`] skips it and keeps going.

use crate::domain::OverlaySet;
use thiserror::Error;

pub mod lexer;
pub mod parser;

use parser::Parser;

/// A declaration that could not be decoded into a preference entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self { line, reason: reason.into() }
    }
}

/// Parse `source` strictly, failing on the first malformed declaration.
pub fn parse_overlay(name: &str, source: &str) -> Result<OverlaySet, ParseError> {
    let mut parser = Parser::new(source);
    let mut overlay = OverlaySet::new(name);
    while let Some(decl) = parser.parse_declaration()? {
        overlay.declarations.push(decl);
    }
    Ok(overlay)
}

/// Parse `source`, skipping malformed declarations.
///
/// Every skipped declaration is returned as an error alongside the overlay
/// built from the rest.
pub fn parse_overlay_lenient(name: &str, source: &str) -> (OverlaySet, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let mut overlay = OverlaySet::new(name);
    let mut errors = Vec::new();

    loop {
        match parser.parse_declaration() {
            Ok(Some(decl)) => overlay.declarations.push(decl),
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("{}: skipping malformed declaration at {}", name, err);
                errors.push(err);
                parser.recover();
            }
        }
    }

    (overlay, errors)
}
