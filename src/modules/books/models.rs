use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, assigned by the store
    pub id: u64,
    /// Title of the book, never empty
    pub title: String,
    /// Author of the book, empty when unknown
    pub author: String,
    /// Publication year as supplied by the client; `null` when never given
    pub year: Value,
}

impl Book {
    /// Whether this book is addressed by a coerced numeric id.
    pub fn matches(&self, id: f64) -> bool {
        self.id as f64 == id
    }
}

/// Failures raised by the book store. All but `LockPoisoned` describe bad
/// caller input; the display text is the message shown to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("title is required")]
    TitleRequired,

    #[error("id must be a number")]
    InvalidId,

    /// Title missing on a replace.
    #[error("Bad Request")]
    MissingTitle,

    #[error("book collection lock poisoned")]
    LockPoisoned,
}

/// Create or replace payload.
///
/// Keeps `author` and `year` as raw JSON so the store can tell an absent
/// field from an explicit `null`. Neither field is type checked.
#[derive(Debug, Clone, Default)]
pub struct BookPayload {
    title: Option<String>,
    author: Option<Value>,
    year: Option<Value>,
}

impl BookPayload {
    /// Build a payload from a request body. Anything that is not a JSON
    /// object yields an empty payload; a non-string title counts as absent.
    pub fn from_json(body: Option<&Value>) -> Self {
        let Some(Value::Object(fields)) = body else {
            return Self::default();
        };

        Self {
            title: fields
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            author: fields.get("author").cloned(),
            year: fields.get("year").cloned(),
        }
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<Value>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<Value>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// The trimmed title, if one was supplied and is not blank.
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    /// `None` when absent. A falsy value (`null`, `false`, `0`, `""`) becomes
    /// the empty string; any other non-string is rendered as JSON text.
    pub fn author(&self) -> Option<String> {
        self.author.as_ref().map(|author| match author {
            Value::String(author) => author.clone(),
            value if is_falsy(value) => String::new(),
            value => value.to_string(),
        })
    }

    /// `None` when absent, otherwise the value exactly as sent, so `0`, `""`
    /// and `null` are all kept.
    pub fn year(&self) -> Option<Value> {
        self.year.clone()
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Coerce an identifier from its path form to a number, the way a JSON API
/// client would expect `Number("...")` to behave: surrounding whitespace is
/// ignored, a blank string is `0`, and `0x`/`0o`/`0b` prefixes are honoured.
/// `None` means the string is not numeric at all.
pub fn coerce_id(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // Rust also parses "inf"/"nan"; only digits, signs, dots and exponents
    // are numeric here.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }

    trimmed.parse::<f64>().ok()
}

/// The catalogue every process starts with.
pub fn seed_books() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "The Pragmatic Programmer".to_string(),
            author: "Andrew Hunt, David Thomas".to_string(),
            year: Value::from(1999),
        },
        Book {
            id: 2,
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            year: Value::from(2008),
        },
        Book {
            id: 3,
            title: "Designing Data-Intensive Applications".to_string(),
            author: "Martin Kleppmann".to_string(),
            year: Value::from(2017),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_id_accepts_numeric_forms() {
        assert_eq!(coerce_id("3"), Some(3.0));
        assert_eq!(coerce_id(" 42 "), Some(42.0));
        assert_eq!(coerce_id("1.5"), Some(1.5));
        assert_eq!(coerce_id("1e2"), Some(100.0));
        assert_eq!(coerce_id("0x10"), Some(16.0));
        assert_eq!(coerce_id("-7"), Some(-7.0));
        assert_eq!(coerce_id(""), Some(0.0));
    }

    #[test]
    fn coerce_id_rejects_non_numeric() {
        assert_eq!(coerce_id("abc"), None);
        assert_eq!(coerce_id("12abc"), None);
        assert_eq!(coerce_id("nan"), None);
        assert_eq!(coerce_id("inf"), None);
        assert_eq!(coerce_id("0xZZ"), None);
        assert_eq!(coerce_id("1..2"), None);
    }

    #[test]
    fn payload_from_non_object_is_empty() {
        let payload = BookPayload::from_json(Some(&json!(["Refactoring"])));
        assert_eq!(payload.title(), None);
        assert_eq!(payload.author(), None);
        assert_eq!(payload.year(), None);

        assert_eq!(BookPayload::from_json(None).title(), None);
    }

    #[test]
    fn payload_distinguishes_null_from_absent() {
        let payload = BookPayload::from_json(Some(&json!({
            "title": "  Refactoring  ",
            "author": null
        })));
        assert_eq!(payload.title(), Some("Refactoring"));
        assert_eq!(payload.author(), Some(String::new()));
        assert_eq!(payload.year(), None);
    }

    #[test]
    fn falsy_authors_become_empty() {
        for author in [json!(null), json!(false), json!(0), json!("")] {
            let payload = BookPayload::titled("x").with_author(author.clone());
            assert_eq!(payload.author(), Some(String::new()), "author {author}");
        }
        assert_eq!(
            BookPayload::titled("x").with_author(5).author(),
            Some("5".to_string())
        );
        assert_eq!(
            BookPayload::titled("x").with_author(" ").author(),
            Some(" ".to_string())
        );
    }

    #[test]
    fn year_is_kept_as_sent() {
        for year in [json!(0), json!(""), json!(1999.0), json!("1999"), json!(null)] {
            let payload = BookPayload::titled("x").with_year(year.clone());
            assert_eq!(payload.year(), Some(year));
        }
    }

    #[test]
    fn non_string_title_counts_as_missing() {
        let payload = BookPayload::from_json(Some(&json!({ "title": 12 })));
        assert_eq!(payload.title(), None);
    }

    #[test]
    fn book_serializes_null_year() {
        let book = Book {
            id: 9,
            title: "Untitled".to_string(),
            author: String::new(),
            year: Value::Null,
        };
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({ "id": 9, "title": "Untitled", "author": "", "year": null })
        );
    }
}
