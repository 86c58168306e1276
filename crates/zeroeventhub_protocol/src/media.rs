//! Response media types and `Accept` negotiation.

use std::fmt;

/// Media type of line-delimited JSON feeds.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Media type of whole-document JSON feeds.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The body format of a feed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeedFormat {
    /// One JSON object per line.
    #[default]
    Ndjson,
    /// A single JSON array.
    Json,
}

impl FeedFormat {
    /// Returns the media type of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            FeedFormat::Ndjson => NDJSON_CONTENT_TYPE,
            FeedFormat::Json => JSON_CONTENT_TYPE,
        }
    }

    /// Looks up the format for a media type, ignoring parameters and case.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(NDJSON_CONTENT_TYPE) {
            Some(FeedFormat::Ndjson)
        } else if essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
            Some(FeedFormat::Json)
        } else {
            None
        }
    }

    /// Picks a format for an `Accept` header value.
    ///
    /// Entries are tried in descending `q` order (ties keep header order);
    /// `q=0` entries are never chosen. A missing or blank header selects
    /// `default`. `*/*` and `application/*` select `default` unless it was
    /// excluded with `q=0`, in which case the other format is used if it
    /// was not excluded too. Returns `None` when nothing in the header is
    /// supported.
    pub fn negotiate(accept: Option<&str>, default: FeedFormat) -> Option<FeedFormat> {
        let accept = match accept {
            Some(a) if !a.trim().is_empty() => a,
            _ => return Some(default),
        };

        let (mut ranges, excluded): (Vec<(&str, f32)>, Vec<(&str, f32)>) = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let essence = parts.next()?.trim();
                if essence.is_empty() {
                    return None;
                }
                let quality = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((essence, quality))
            })
            .partition(|(_, q)| *q > 0.0);
        let excluded: Vec<FeedFormat> = excluded
            .into_iter()
            .filter_map(|(essence, _)| FeedFormat::from_media_type(essence))
            .collect();
        ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        ranges.into_iter().find_map(|(essence, _)| {
            if essence == "*/*" || essence.eq_ignore_ascii_case("application/*") {
                [default, FeedFormat::Ndjson, FeedFormat::Json]
                    .into_iter()
                    .find(|format| !excluded.contains(format))
            } else {
                FeedFormat::from_media_type(essence)
            }
        })
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}
