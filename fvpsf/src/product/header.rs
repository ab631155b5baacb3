//! FITS-style header cards
//!
//! Headers keep insertion order and hold at most one card per keyword;
//! setting an existing keyword replaces its value in place.

use std::fmt;

use serde::Deserialize;

/// Value of a header card.
///
/// Deserialises from plain JSON scalars, so metadata files can write
/// `"NDIT": 12` or `"FILTER": "Ks"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl HeaderValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Bool(v) => write!(f, "{}", if *v { "T" } else { "F" }),
            HeaderValue::Int(v) => write!(f, "{v}"),
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::Str(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        HeaderValue::Bool(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<i32> for HeaderValue {
    fn from(v: i32) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<usize> for HeaderValue {
    fn from(v: usize) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::Str(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        HeaderValue::Str(v)
    }
}

/// A single keyword/value pair with an optional comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub keyword: String,
    pub value: HeaderValue,
    pub comment: Option<String>,
}

/// Ordered collection of header cards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, keyword: &str, value: impl Into<HeaderValue>) {
        self.upsert(keyword, value.into(), None);
    }

    pub fn set_with_comment(&mut self, keyword: &str, value: impl Into<HeaderValue>, comment: &str) {
        self.upsert(keyword, value.into(), Some(comment.to_string()));
    }

    fn upsert(&mut self, keyword: &str, value: HeaderValue, comment: Option<String>) {
        let keyword = keyword.to_ascii_uppercase();
        match self.cards.iter_mut().find(|c| c.keyword == keyword) {
            Some(card) => {
                card.value = value;
                if comment.is_some() {
                    card.comment = comment;
                }
            }
            None => self.cards.push(Card {
                keyword,
                value,
                comment,
            }),
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| c.keyword.eq_ignore_ascii_case(keyword))
            .map(|c| &c.value)
    }

    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderValue::as_int)
    }

    pub fn get_float(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderValue::as_float)
    }

    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_str)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|c| c.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Checks that a keyword only uses the FITS keyword alphabet
/// (`A-Z`, `0-9`, `-`, `_`). Keywords longer than eight characters are
/// allowed and are written with the HIERARCH convention.
pub fn is_valid_keyword(keyword: &str) -> bool {
    !keyword.is_empty()
        && keyword
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut h = Header::new();
        h.set("ECAT", 1i64);
        h.set("EDATA", 2i64);
        h.set("ecat", 5i64);
        assert_eq!(h.len(), 2);
        assert_eq!(h.get_int("ECAT"), Some(5));
        assert_eq!(h.keywords().collect::<Vec<_>>(), vec!["ECAT", "EDATA"]);
    }

    #[test]
    fn test_typed_access() {
        let mut h = Header::new();
        h.set("WAVE0", 2.15);
        h.set("WAVEUNIT", "um");
        h.set("NUMPSFS", 3usize);
        assert_eq!(h.get_float("WAVE0"), Some(2.15));
        assert_eq!(h.get_float("NUMPSFS"), Some(3.0));
        assert_eq!(h.get_str("WAVEUNIT"), Some("um"));
        assert_eq!(h.get_int("WAVEUNIT"), None);
    }

    #[test]
    fn test_comment_kept_when_value_replaced() {
        let mut h = Header::new();
        h.set_with_comment("ECAT", 1i64, "catalogue");
        h.set("ECAT", 2i64);
        let card = h.iter().next().unwrap();
        assert_eq!(card.value, HeaderValue::Int(2));
        assert_eq!(card.comment.as_deref(), Some("catalogue"));
    }

    #[test]
    fn test_value_from_json_scalars() {
        let values: Vec<HeaderValue> = serde_json::from_str(r#"[true, 12, 1.5, "Ks"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                HeaderValue::Bool(true),
                HeaderValue::Int(12),
                HeaderValue::Float(1.5),
                HeaderValue::Str("Ks".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_alphabet() {
        assert!(is_valid_keyword("DATE_CRE"));
        assert!(is_valid_keyword("WAVEEXT10"));
        assert!(!is_valid_keyword(""));
        assert!(!is_valid_keyword("lower"));
        assert!(!is_valid_keyword("HAS SPACE"));
    }

    #[test]
    fn test_display() {
        assert_eq!(HeaderValue::from("um").to_string(), "'um'");
        assert_eq!(HeaderValue::from(true).to_string(), "T");
        assert_eq!(HeaderValue::from(3i32).to_string(), "3");
    }
}
