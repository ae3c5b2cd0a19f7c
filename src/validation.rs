//! Field rules for video submissions.
//!
//! Every rule runs on every submission, so a single response lists all
//! of the problems with it. Each call builds its own [`ErrorReport`].

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::video::{Resolution, VideoFields, VideoInput, VideoUpdate};

pub const MAX_TITLE_LENGTH: usize = 40;
pub const MAX_AUTHOR_LENGTH: usize = 20;

const TITLE_MESSAGE: &str = "The title has incorrect values";
const AUTHOR_MESSAGE: &str = "The author has incorrect values";
const RESOLUTION_MESSAGE: &str = "The available resolution has incorrect values";
const PUBLICATION_DATE_MESSAGE: &str = "The publication date has incorrect values";

const TITLE_FIELD: &str = "title";
const AUTHOR_FIELD: &str = "author";
const RESOLUTION_FIELD: &str = "Available resolution";
const PUBLICATION_DATE_FIELD: &str = "publicationDate";

/// A single violated rule.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub field: String,
}

/// Every rule violated by one submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    errors_messages: Vec<FieldError>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, field: impl Into<String>) {
        self.errors_messages.push(FieldError {
            message: message.into(),
            field: field.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors_messages.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors_messages
    }

    /// Returns the names of the offending fields in the order they were reported.
    pub fn fields(&self) -> Vec<&str> {
        self.errors_messages
            .iter()
            .map(|e| e.field.as_str())
            .collect()
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ErrorReport> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

/// Checks a submission for a new video.
pub fn validate_creation(input: &VideoInput) -> Result<VideoFields, ErrorReport> {
    let mut report = ErrorReport::new();
    let fields = validate_fields(input, &mut report);

    report.finish(fields)
}

/// Checks a submission replacing an existing video. In addition to the
/// creation rules, the publication date must be an RFC 3339 timestamp.
pub fn validate_update(input: &VideoInput) -> Result<VideoUpdate, ErrorReport> {
    let mut report = ErrorReport::new();
    let fields = validate_fields(input, &mut report);
    let publication_date = check_publication_date(input.publication_date.as_ref(), &mut report);

    let update = match (fields, publication_date) {
        (Some(fields), Some(publication_date)) => Some(VideoUpdate {
            fields,
            publication_date,
        }),
        _ => None,
    };

    report.finish(update)
}

fn validate_fields(input: &VideoInput, report: &mut ErrorReport) -> Option<VideoFields> {
    let title = check_text(input.title.as_ref(), MAX_TITLE_LENGTH);
    if title.is_none() {
        report.push(TITLE_MESSAGE, TITLE_FIELD);
    }

    let author = check_text(input.author.as_ref(), MAX_AUTHOR_LENGTH);
    if author.is_none() {
        report.push(AUTHOR_MESSAGE, AUTHOR_FIELD);
    }

    let available_resolutions = check_resolutions(input.available_resolutions.as_ref());
    if available_resolutions.is_none() {
        report.push(RESOLUTION_MESSAGE, RESOLUTION_FIELD);
    }

    Some(VideoFields {
        title: title?,
        author: author?,
        available_resolutions: available_resolutions?,
    })
}

/// Accepts a string that isn't blank and has at most `max_length`
/// characters. The value is kept untrimmed.
fn check_text(value: Option<&Value>, max_length: usize) -> Option<String> {
    let text = value?.as_str()?;

    if text.trim().is_empty() || text.chars().count() > max_length {
        return None;
    }

    Some(text.to_owned())
}

/// Only the first resolution is checked against the known labels; the
/// rest only need to be strings.
fn check_resolutions(value: Option<&Value>) -> Option<Vec<String>> {
    let items = match value {
        None | Some(Value::Null) => return Some(vec![Resolution::DEFAULT.to_string()]),
        Some(Value::Array(items)) => items,
        Some(_) => return None,
    };

    let resolutions = items
        .iter()
        .map(|item| item.as_str().map(str::to_owned))
        .collect::<Option<Vec<String>>>()?;

    match resolutions.first() {
        Some(first) if first.parse::<Resolution>().is_err() => None,
        _ => Some(resolutions),
    }
}

fn check_publication_date(value: Option<&Value>, report: &mut ErrorReport) -> Option<String> {
    let checked = value
        .and_then(Value::as_str)
        .filter(|s| OffsetDateTime::parse(s, &Rfc3339).is_ok())
        .map(str::to_owned);

    if checked.is_none() {
        report.push(PUBLICATION_DATE_MESSAGE, PUBLICATION_DATE_FIELD);
    }

    checked
}
