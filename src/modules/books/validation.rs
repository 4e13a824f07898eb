//! Book payload validation.
//!
//! The schema is a fixed table of fields, each with a JSON type and an optional
//! string format. Violations are reported in evaluation order: every missing
//! required field first, then type and format failures per field. Keys outside the
//! table are ignored and never reach the projected [`Book`].

use serde_json::{Map, Value};
use url::Url;

use super::models::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Isbn,
    AmazonUrl,
    Author,
    Language,
    Pages,
    Publisher,
    Title,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Uri,
}

enum FieldValue {
    Text(String),
    Integer(i64),
}

impl BookField {
    /// Schema order; also the required list.
    pub const ALL: [BookField; 8] = [
        BookField::Isbn,
        BookField::AmazonUrl,
        BookField::Author,
        BookField::Language,
        BookField::Pages,
        BookField::Publisher,
        BookField::Title,
        BookField::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BookField::Isbn => "isbn",
            BookField::AmazonUrl => "amazon_url",
            BookField::Author => "author",
            BookField::Language => "language",
            BookField::Pages => "pages",
            BookField::Publisher => "publisher",
            BookField::Title => "title",
            BookField::Year => "year",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            BookField::Pages | BookField::Year => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }

    fn format(self) -> Option<Format> {
        match self {
            BookField::AmazonUrl => Some(Format::Uri),
            _ => None,
        }
    }

    fn assign(self, book: &mut Book, value: FieldValue) {
        match (self, value) {
            (BookField::Isbn, FieldValue::Text(v)) => book.isbn = v,
            (BookField::AmazonUrl, FieldValue::Text(v)) => book.amazon_url = v,
            (BookField::Author, FieldValue::Text(v)) => book.author = v,
            (BookField::Language, FieldValue::Text(v)) => book.language = v,
            (BookField::Publisher, FieldValue::Text(v)) => book.publisher = v,
            (BookField::Title, FieldValue::Text(v)) => book.title = v,
            (BookField::Pages, FieldValue::Integer(v)) => book.pages = v,
            (BookField::Year, FieldValue::Integer(v)) => book.year = v,
            // `check` only yields the kind declared for the field
            _ => {}
        }
    }

    /// Type check followed by format check.
    fn check(self, value: &Value) -> Result<FieldValue, String> {
        match self.kind() {
            FieldKind::Integer => as_integer(value)
                .map(FieldValue::Integer)
                .ok_or_else(|| type_violation(self, "integer")),
            FieldKind::Text => {
                let text = value.as_str().ok_or_else(|| type_violation(self, "string"))?;

                match self.format() {
                    Some(format) if !format.accepts(text) => Err(format!(
                        "instance.{} does not conform to the \"{}\" format",
                        self.name(),
                        format.name()
                    )),
                    _ => Ok(FieldValue::Text(text.to_owned())),
                }
            }
        }
    }
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Format::Uri => "uri",
        }
    }

    fn accepts(self, text: &str) -> bool {
        match self {
            // `Url::parse` trims C0 controls, so the raw text is checked first.
            Format::Uri => {
                text.starts_with(|c: char| c.is_ascii_alphabetic())
                    && !text.chars().any(|c| c.is_whitespace() || c.is_control())
                    && Url::parse(text).is_ok()
            }
        }
    }
}

fn type_violation(field: BookField, type_name: &str) -> String {
    format!("instance.{} is not of a type(s) {}", field.name(), type_name)
}

/// JSON numbers with no fractional part count as integers, `2017.0` included.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }

    let float = value.as_f64()?;
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

/// Validate `payload` against the book schema and project it onto a [`Book`].
///
/// On failure returns every violation message, never an empty list.
pub fn validate_book(payload: &Value) -> Result<Book, Vec<String>> {
    let Some(object) = payload.as_object() else {
        return Err(vec!["instance is not of a type(s) object".to_string()]);
    };

    let mut violations = missing_fields(object);
    let mut book = Book::default();

    for field in BookField::ALL {
        let Some(value) = object.get(field.name()) else {
            continue;
        };

        match field.check(value) {
            Ok(value) => field.assign(&mut book, value),
            Err(violation) => violations.push(violation),
        }
    }

    if violations.is_empty() {
        Ok(book)
    } else {
        Err(violations)
    }
}

fn missing_fields(object: &Map<String, Value>) -> Vec<String> {
    BookField::ALL
        .iter()
        .filter(|field| !object.contains_key(field.name()))
        .map(|field| format!("instance requires property \"{}\"", field.name()))
        .collect()
}
