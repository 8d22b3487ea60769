#![forbid(unsafe_code)]

//! Ordered, duplicate-free class token set with `DOMTokenList` semantics.

use crate::DomError;

/// The class tokens of one element.
///
/// Tokens keep insertion order so serialized `class` attributes are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Create an empty class list.
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Parse a `class` attribute value (whitespace separated, duplicates dropped).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for token in value.split_ascii_whitespace() {
            if !list.contains(token) {
                list.tokens.push(token.to_owned());
            }
        }
        list
    }

    /// Whether `token` is present.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add `token` if absent.
    pub fn add(&mut self, token: &str) -> Result<(), DomError> {
        validate_token(token)?;
        if !self.contains(token) {
            self.tokens.push(token.to_owned());
        }
        Ok(())
    }

    /// Remove `token` if present.
    pub fn remove(&mut self, token: &str) -> Result<(), DomError> {
        validate_token(token)?;
        self.tokens.retain(|t| t != token);
        Ok(())
    }

    /// Flip `token` and return whether it is present afterwards.
    pub fn toggle(&mut self, token: &str) -> Result<bool, DomError> {
        validate_token(token)?;
        if let Some(pos) = self.tokens.iter().position(|t| t == token) {
            self.tokens.remove(pos);
            Ok(false)
        } else {
            self.tokens.push(token.to_owned());
            Ok(true)
        }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the list has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(String::as_str)
    }
}

impl core::fmt::Display for ClassList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Reject tokens a browser would refuse (`SyntaxError` / `InvalidCharacterError`).
pub fn validate_token(token: &str) -> Result<(), DomError> {
    if token.is_empty() || token.chars().any(|c| c.is_ascii_whitespace()) {
        return Err(DomError::InvalidToken(token.to_owned()));
    }
    Ok(())
}
