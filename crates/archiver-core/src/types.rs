//! Archive data model as returned by the backend
//!
//! Field names on the wire follow the backend's capitalised keys
//! (`Url`, `Versions`, `Timestamp`, `S3Path`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Shown in place of a capture date the backend sent in an unknown format
pub const INVALID_DATE: &str = "Invalid Date";

/// A URL the signed-in user has submitted, with its capture history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedUrl {
    #[serde(rename = "Url")]
    pub url: String,

    /// Most recent first, in the order the server returned them
    #[serde(rename = "Versions", default, deserialize_with = "null_as_empty")]
    pub versions: Vec<Version>,
}

impl ArchivedUrl {
    /// The most recent capture, if any
    pub fn latest(&self) -> Option<&Version> {
        self.versions.first()
    }
}

/// One archived snapshot of a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(rename = "Timestamp", default)]
    pub timestamp: CaptureTime,

    /// Opaque backend locator; passed back verbatim when requesting a preview
    #[serde(rename = "S3Path")]
    pub storage_path: String,
}

/// When a version was captured.
///
/// A value that is not recognisable ISO-8601 is kept as received, so it only
/// affects the date shown for that one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTime {
    At(DateTime<Utc>),
    Unrecognised(String),
}

impl CaptureTime {
    pub fn parse(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Ok(ts) => CaptureTime::At(ts),
            Err(_) => CaptureTime::Unrecognised(raw.to_string()),
        }
    }

    pub fn instant(&self) -> Option<&DateTime<Utc>> {
        match self {
            CaptureTime::At(ts) => Some(ts),
            CaptureTime::Unrecognised(_) => None,
        }
    }
}

impl Default for CaptureTime {
    fn default() -> Self {
        CaptureTime::Unrecognised(String::new())
    }
}

impl From<DateTime<Utc>> for CaptureTime {
    fn from(ts: DateTime<Utc>) -> Self {
        CaptureTime::At(ts)
    }
}

impl Serialize for CaptureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CaptureTime::At(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            CaptureTime::Unrecognised(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for CaptureTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(raw) => CaptureTime::parse(&raw),
            Wire::Other(_) => CaptureTime::default(),
        })
    }
}

/// Time-limited link to the raw HTML of one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLink(String);

impl PreviewLink {
    pub fn new(link: impl Into<String>) -> Self {
        Self(link.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Render a capture instant the way the dashboard shows dates (`1/1/2024`)
pub fn format_capture_date(timestamp: &CaptureTime) -> String {
    match timestamp.instant() {
        Some(ts) => ts.format("%-m/%-d/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Version>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Version>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339, a space in place of `T`, basic offsets (`+0000`), naive
/// date-times read as UTC, and bare dates read as UTC midnight
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    let value = match trimmed.get(10..11) {
        Some(" ") => format!("{}T{}", &trimmed[..10], &trimmed[11..]),
        _ => trimmed.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_archived_url_from_backend_shape() {
        let value = json!([{
            "Url": "https://a.com",
            "Versions": [
                {"Timestamp": "2024-01-01T00:00:00Z", "S3Path": "p1"},
                {"Timestamp": "2023-12-30T10:00:00Z", "S3Path": "p0"}
            ]
        }]);

        let urls: Vec<ArchivedUrl> = serde_json::from_value(value).unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].url, "https://a.com");
        assert_eq!(urls[0].versions.len(), 2);
        assert_eq!(urls[0].latest().unwrap().storage_path, "p1");
    }

    #[test]
    fn test_missing_or_null_versions_are_empty() {
        let missing: ArchivedUrl = serde_json::from_value(json!({"Url": "https://b.com"})).unwrap();
        assert!(missing.versions.is_empty());
        assert!(missing.latest().is_none());

        let null: ArchivedUrl =
            serde_json::from_value(json!({"Url": "https://b.com", "Versions": null})).unwrap();
        assert!(null.versions.is_empty());
    }

    #[test]
    fn test_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T02:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T00:00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00.250000").unwrap(),
            expected + chrono::Duration::milliseconds(250)
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_loose_iso_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01 00:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01 02:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00.123456+0000").unwrap(),
            expected + chrono::Duration::microseconds(123456)
        );
    }

    #[test]
    fn test_unrecognised_timestamp_keeps_the_rest() {
        let value = json!([
            {"Url": "https://a.com", "Versions": [
                {"Timestamp": "last tuesday", "S3Path": "p2"},
                {"Timestamp": "2024-01-01", "S3Path": "p1"}
            ]},
            {"Url": "https://b.com", "Versions": [{"Timestamp": 1704067200, "S3Path": "p0"}]},
            {"Url": "https://c.com", "Versions": []}
        ]);

        let urls: Vec<ArchivedUrl> = serde_json::from_value(value).unwrap();
        assert_eq!(urls.len(), 3);
        let a = &urls[0].versions;
        assert_eq!(a[0].timestamp, CaptureTime::Unrecognised("last tuesday".into()));
        assert_eq!(format_capture_date(&a[0].timestamp), INVALID_DATE);
        assert_eq!(format_capture_date(&a[1].timestamp), "1/1/2024");
        assert_eq!(a[0].storage_path, "p2");
        assert!(urls[1].versions[0].timestamp.instant().is_none());
    }

    #[test]
    fn test_storage_path_kept_verbatim() {
        let version: Version = serde_json::from_value(json!({
            "Timestamp": "2024-05-06T07:08:09Z",
            "S3Path": "s3://bucket/a%20b/../index.html"
        }))
        .unwrap();
        assert_eq!(version.storage_path, "s3://bucket/a%20b/../index.html");
    }

    #[test]
    fn test_format_capture_date() {
        let ts: CaptureTime = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into();
        assert_eq!(format_capture_date(&ts), "1/1/2024");

        let ts: CaptureTime = Utc.with_ymd_and_hms(2023, 11, 25, 23, 59, 0).unwrap().into();
        assert_eq!(format_capture_date(&ts), "11/25/2023");
    }
}
