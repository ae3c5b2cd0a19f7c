use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::errors::BackendError;

/// The ID of a video. Derived from the creation time in milliseconds.
pub type VideoId = i64;

/// The largest request body to accept.
pub const MAX_BODY_LENGTH: usize = 1024 * 1024;

/// How long after creation a new video is published.
const PUBLICATION_DELAY: Duration = Duration::DAY;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// A single video in the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// The ID of the video. Never changes.
    pub(crate) id: VideoId,

    /// The title provided.
    pub(crate) title: String,

    /// The author provided.
    pub(crate) author: String,

    /// Whether the video may be downloaded. Always `false` for now.
    pub(crate) can_be_downloaded: bool,

    /// The minimum age of viewers, if any. Always `None` for now.
    pub(crate) min_age_restriction: Option<i32>,

    /// When the video was created. Never changes.
    pub(crate) created_at: String,

    /// When the video is (or was) published.
    pub(crate) publication_date: String,

    /// The resolutions the video is available in.
    pub(crate) available_resolutions: Vec<String>,
}

impl Video {
    /// Builds a new video from validated fields, created at `now` and
    /// published a day later.
    pub fn create(
        id: VideoId,
        fields: VideoFields,
        now: OffsetDateTime,
    ) -> Result<Self, BackendError> {
        let VideoFields {
            title,
            author,
            available_resolutions,
        } = fields;

        Ok(Video {
            id,
            title,
            author,
            can_be_downloaded: false,
            min_age_restriction: None,
            created_at: format_timestamp(now)?,
            publication_date: format_timestamp(now + PUBLICATION_DELAY)?,
            available_resolutions,
        })
    }

    /// Overwrites every mutable field with the validated update.
    pub fn apply(&mut self, update: VideoUpdate) {
        let VideoUpdate {
            fields,
            publication_date,
        } = update;

        self.title = fields.title;
        self.author = fields.author;
        self.available_resolutions = fields.available_resolutions;
        self.can_be_downloaded = false;
        self.min_age_restriction = None;
        self.publication_date = publication_date;
    }

    pub fn id(&self) -> VideoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn available_resolutions(&self) -> &[String] {
        &self.available_resolutions
    }
}

/// A submission to create or update a video, as received. Every field
/// is kept as raw JSON so type mismatches can be reported per field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    #[serde(default)]
    pub(crate) title: Option<Value>,

    #[serde(default)]
    pub(crate) author: Option<Value>,

    #[serde(default)]
    pub(crate) available_resolutions: Option<Value>,

    #[serde(default)]
    pub(crate) publication_date: Option<Value>,
}

impl VideoInput {
    /// Parses a request body. An empty body counts as an empty object.
    pub fn from_slice(body: &[u8]) -> Result<Self, BackendError> {
        if body.len() > MAX_BODY_LENGTH {
            return Err(BackendError::BodyTooLarge { length: body.len() });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(VideoInput::default());
        }

        serde_json::from_slice(body).map_err(BackendError::MalformedBody)
    }
}

/// The fields shared by creation and update, after validation.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFields {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) available_resolutions: Vec<String>,
}

/// A validated update to an existing video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoUpdate {
    pub(crate) fields: VideoFields,

    /// Stored exactly as submitted.
    pub(crate) publication_date: String,
}

/// The resolutions a video may be offered in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
}

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Resolution::P144,
        Resolution::P240,
        Resolution::P360,
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
        Resolution::P1440,
        Resolution::P2160,
    ];

    /// Used when a submission doesn't list any resolutions.
    pub const DEFAULT: Resolution = Resolution::P144;

    pub fn as_str(self) -> &'static str {
        use Resolution::*;

        match self {
            P144 => "P144",
            P240 => "P240",
            P360 => "P360",
            P480 => "P480",
            P720 => "P720",
            P1080 => "P1080",
            P1440 => "P1440",
            P2160 => "P2160",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownResolution;

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or(UnknownResolution)
    }
}

/// Renders a timestamp in UTC with millisecond precision, e.g.
/// `2021-03-04T05:06:07.089Z`.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, BackendError> {
    Ok(timestamp.to_offset(UtcOffset::UTC).format(TIMESTAMP_FORMAT)?)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn fields() -> VideoFields {
        VideoFields {
            title: "Title".to_owned(),
            author: "Author".to_owned(),
            available_resolutions: vec!["P720".to_owned()],
        }
    }

    #[test]
    fn creation_sets_defaults_and_dates() {
        let now = datetime!(2021-03-04 05:06:07.089 UTC);
        let video = Video::create(7, fields(), now).expect("create video");

        assert_eq!(video.id(), 7);
        assert!(!video.can_be_downloaded);
        assert_eq!(video.min_age_restriction, None);
        assert_eq!(video.created_at(), "2021-03-04T05:06:07.089Z");
        assert_eq!(video.publication_date(), "2021-03-05T05:06:07.089Z");
    }

    #[test]
    fn timestamps_are_rendered_in_utc() {
        let timestamp = datetime!(2021-03-04 23:30:00 -2);

        assert_eq!(
            format_timestamp(timestamp).unwrap(),
            "2021-03-05T01:30:00.000Z"
        );
    }

    #[test]
    fn applying_an_update_keeps_id_and_creation_time() {
        let now = datetime!(2021-03-04 05:06:07 UTC);
        let mut video = Video::create(7, fields(), now).expect("create video");
        video.can_be_downloaded = true;
        video.min_age_restriction = Some(18);

        video.apply(VideoUpdate {
            fields: VideoFields {
                title: "New title".to_owned(),
                author: "New author".to_owned(),
                available_resolutions: vec!["P1080".to_owned(), "P2160".to_owned()],
            },
            publication_date: "2022-01-01T00:00:00Z".to_owned(),
        });

        assert_eq!(video.id(), 7);
        assert_eq!(video.created_at(), "2021-03-04T05:06:07.000Z");
        assert_eq!(video.title(), "New title");
        assert_eq!(video.author(), "New author");
        assert_eq!(video.available_resolutions(), &["P1080", "P2160"]);
        assert_eq!(video.publication_date(), "2022-01-01T00:00:00Z");
        assert!(!video.can_be_downloaded);
        assert_eq!(video.min_age_restriction, None);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let now = datetime!(2021-03-04 05:06:07 UTC);
        let video = Video::create(7, fields(), now).expect("create video");
        let value = serde_json::to_value(&video).unwrap();

        assert_eq!(value["canBeDownloaded"], false);
        assert!(value["minAgeRestriction"].is_null());
        assert_eq!(value["availableResolutions"][0], "P720");
        assert_eq!(value["createdAt"], "2021-03-04T05:06:07.000Z");
    }

    #[test]
    fn empty_body_is_an_empty_submission() {
        let input = VideoInput::from_slice(b"  ").expect("parse blank body");

        assert!(input.title.is_none());
        assert!(input.available_resolutions.is_none());
    }

    #[test]
    fn oversized_body_is_rejected() {
        let body = vec![b' '; MAX_BODY_LENGTH + 1];

        assert!(matches!(
            VideoInput::from_slice(&body),
            Err(BackendError::BodyTooLarge { length }) if length == MAX_BODY_LENGTH + 1
        ));
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(matches!(
            VideoInput::from_slice(b"[1, 2]"),
            Err(BackendError::MalformedBody(_))
        ));
    }

    #[test]
    fn resolutions_parse_by_label() {
        for resolution in Resolution::ALL.iter() {
            assert_eq!(resolution.as_str().parse(), Ok(*resolution));
        }

        assert_eq!("P999".parse::<Resolution>(), Err(UnknownResolution));
        assert_eq!("p144".parse::<Resolution>(), Err(UnknownResolution));
    }
}
