//! Text tokenizer.
//!
//! Splits raw text into uppercased letter runs, digit runs and single
//! symbol characters. Whitespace only separates tokens.
//!
//! Digits are general category `Nd`; letters are `Lu`, `Ll`, `Lt`, `Lm` and
//! `Lo`. Other numerals (`²`, `½`, `Ⅻ`) and combining marks are symbols.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Lazy token iterator over borrowed text.
///
/// Each call to [`tokenize`] starts from the beginning of the input, so the
/// same text always yields the same sequence.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: &'a str,
}

/// Tokenize `text`.
///
/// # Example
///
/// ```rust
/// use locseng::tokenizer::tokenize;
///
/// let tokens: Vec<String> = tokenize("This43 is, test").collect();
/// assert_eq!(tokens, ["THIS", "43", "IS", ",", "TEST"]);
/// ```
#[must_use]
pub const fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer { rest: text }
}

impl<'a> Tokenizer<'a> {
    /// Split off the longest prefix whose characters all satisfy `pred`.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end =
            self.rest.char_indices().find(|&(_, c)| !pred(c)).map_or(self.rest.len(), |(i, _)| i);
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        token
    }
}

fn is_decimal_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.rest = self.rest.trim_start();
        let first = self.rest.chars().next()?;

        if is_decimal_digit(first) {
            return Some(self.take_while(is_decimal_digit).to_string());
        }

        if is_letter(first) {
            return Some(self.take_while(is_letter).to_uppercase());
        }

        let (symbol, rest) = self.rest.split_at(first.len_utf8());
        self.rest = rest;
        Some(symbol.to_string())
    }
}
