//! Book schema: casting of raw payload values, creation defaults and field rules.
//!
//! Everything here is a pure function. Both stores run [`prepare_new`] before an
//! insert and [`prepare_update`] before an update, so a record that fails these
//! checks is never written.

use crate::error::{FieldError, ValidationError};
use crate::model::{Book, BookDocument, BookPayload};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Schema order; field errors are always reported in this order.
pub const FIELDS: [&str; 7] = [
    "title",
    "authors",
    "pages",
    "isbn",
    "publisher",
    "publicationDate",
    "edition",
];

/// Payload values after a successful cast. `None` means the field was not provided.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookFields {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub pages: Option<i64>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub edition: Option<String>,
}

/// Cast every provided field. A field whose value cannot be cast is left `None`
/// and reported in the returned error list.
pub fn cast(payload: &BookPayload) -> (BookFields, Vec<FieldError>) {
    let mut errors = Vec::new();
    let fields = BookFields {
        title: cast_field("title", "String", payload.title.as_ref(), cast_text, &mut errors),
        authors: cast_field("authors", "Array", payload.authors.as_ref(), cast_authors, &mut errors),
        pages: cast_field("pages", "Number", payload.pages.as_ref(), cast_number, &mut errors),
        isbn: cast_field("isbn", "String", payload.isbn.as_ref(), cast_text, &mut errors),
        publisher: cast_field("publisher", "String", payload.publisher.as_ref(), cast_text, &mut errors),
        publication_date: cast_field(
            "publicationDate",
            "Date",
            payload.publication_date.as_ref(),
            cast_date,
            &mut errors,
        ),
        edition: cast_field("edition", "String", payload.edition.as_ref(), cast_text, &mut errors),
    };
    (fields, errors)
}

/// Field rules that hold for every stored book.
pub fn validate(doc: &BookDocument) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if doc.title.is_empty() {
        errors.push(FieldError::new("title", "Path `title` is required."));
    }
    if doc.authors.is_empty() {
        errors.push(FieldError::new(
            "authors",
            "Path `authors` should have at least one element.",
        ));
    }
    errors
}

/// Cast, apply creation defaults, validate. `now` fills `publicationDate` when omitted.
pub fn prepare_new(payload: &BookPayload, now: DateTime<Utc>) -> Result<BookDocument, ValidationError> {
    let (fields, cast_errors) = cast(payload);
    let doc = BookDocument {
        title: fields.title.unwrap_or_default(),
        authors: fields.authors.unwrap_or_default(),
        pages: fields.pages.unwrap_or(0),
        isbn: fields.isbn.unwrap_or_default(),
        publisher: fields.publisher.unwrap_or_default(),
        publication_date: fields.publication_date.unwrap_or(now),
        edition: fields.edition.unwrap_or_default(),
    };
    check(cast_errors, validate(&doc))?;
    Ok(doc)
}

/// Merge the provided fields into `existing` and revalidate the result.
/// Omitted fields keep their stored values; no defaults are applied. `updatedAt`
/// becomes `updated_at` but never moves behind the stored value.
pub fn prepare_update(
    existing: &Book,
    payload: &BookPayload,
    updated_at: DateTime<Utc>,
) -> Result<Book, ValidationError> {
    let (fields, cast_errors) = cast(payload);
    let mut merged = existing.clone();
    if let Some(title) = fields.title {
        merged.title = title;
    }
    if let Some(authors) = fields.authors {
        merged.authors = authors;
    }
    if let Some(pages) = fields.pages {
        merged.pages = pages;
    }
    if let Some(isbn) = fields.isbn {
        merged.isbn = isbn;
    }
    if let Some(publisher) = fields.publisher {
        merged.publisher = publisher;
    }
    if let Some(publication_date) = fields.publication_date {
        merged.publication_date = publication_date;
    }
    if let Some(edition) = fields.edition {
        merged.edition = edition;
    }
    merged.updated_at = updated_at.max(existing.updated_at);
    check(cast_errors, validate(&merged.document()))?;
    Ok(merged)
}

/// A field with a cast error reports only that error.
fn check(mut errors: Vec<FieldError>, rule_errors: Vec<FieldError>) -> Result<(), ValidationError> {
    for e in rule_errors {
        if !errors.iter().any(|c| c.field == e.field) {
            errors.push(e);
        }
    }
    errors.sort_by_key(|e| FIELDS.iter().position(|f| *f == e.field).unwrap_or(FIELDS.len()));
    match ValidationError::from_errors(errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn cast_field<T>(
    field: &'static str,
    kind: &str,
    raw: Option<&Value>,
    cast_fn: fn(&Value) -> Option<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = raw?;
    let cast = cast_fn(raw);
    if cast.is_none() {
        errors.push(FieldError::new(
            field,
            format!(
                "Cast to {} failed for value \"{}\" at path \"{}\"",
                kind,
                display_raw(raw),
                field
            ),
        ));
    }
    cast
}

fn display_raw(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cast_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cast_authors(v: &Value) -> Option<Vec<String>> {
    match v {
        Value::Array(items) => items.iter().map(cast_text).collect(),
        Value::Object(_) => None,
        scalar => cast_text(scalar).map(|s| vec![s]),
    }
}

fn cast_number(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn cast_date(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
