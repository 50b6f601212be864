//! Inbound job request and source classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Where the source media for a request currently lives.
///
/// Classification is pure string matching over the request URL; the
/// fetch strategy for a kind is bound exactly once, at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Object already sitting in our S3 bucket
    S3,
    /// Hosted on YouTube, fetched via yt-dlp
    Youtube,
    /// Hosted on Vimeo, fetched via yt-dlp
    Vimeo,
}

impl Source {
    /// Classify a URL against the recognized host patterns.
    ///
    /// Patterns are tried in order (S3, YouTube, Vimeo); the first match
    /// wins. Returns `None` for anything unrecognized, including URLs
    /// that do not parse at all.
    pub fn classify(raw: &str) -> Option<Source> {
        let url = Url::parse(raw).ok()?;
        let host = url.host_str()?;

        if host.contains("s3") && host.ends_with("amazonaws.com") {
            return Some(Source::S3);
        }

        if is_youtube(&url, host) {
            return Some(Source::Youtube);
        }

        if host == "vimeo.com" || host.ends_with(".vimeo.com") {
            return Some(Source::Vimeo);
        }

        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::S3 => "s3",
            Source::Youtube => "youtube",
            Source::Vimeo => "vimeo",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_youtube(url: &Url, host: &str) -> bool {
    if host == "youtu.be" {
        return url.path().len() > 1;
    }

    let is_yt_host = host == "youtube.com" || host.ends_with(".youtube.com");
    if !is_yt_host {
        return false;
    }

    url.path() == "/watch" && url.query_pairs().any(|(k, v)| k == "v" && !v.is_empty())
}

/// The minimal information needed to process one upload.
///
/// `id` and `url` are immutable after decode; `status` and `duration`
/// are each written once per pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Stable identifier, reused across retries of the same job
    pub id: String,

    /// Source URL for the media
    pub url: String,

    /// Informational lifecycle label
    #[serde(default)]
    pub status: String,

    /// Duration in whole seconds, populated after probing
    #[serde(default)]
    pub duration: u64,
}

impl JobRequest {
    /// Decode a request from an inbound payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Classify this request's URL.
    pub fn source(&self) -> Option<Source> {
        Source::classify(&self.url)
    }

    /// Object key for the S3 strategy: the percent-decoded URL path
    /// without its leading slash.
    pub fn object_key(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let decoded = urlencoding::decode(url.path()).ok()?;
        Some(decoded.trim_start_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_s3() {
        let urls = [
            "https://takeabow.s3.amazonaws.com/upload/foo.mp4",
            "https://s3.eu-west-1.amazonaws.com/bucket/upload/foo.mp4",
        ];
        for url in urls {
            assert_eq!(Source::classify(url), Some(Source::S3), "{url}");
        }
    }

    #[test]
    fn test_classify_youtube() {
        let urls = [
            "http://www.youtube.com/watch?v=-wtIMTCHWuI",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(Source::classify(url), Some(Source::Youtube), "{url}");
        }
    }

    #[test]
    fn test_classify_vimeo() {
        assert_eq!(
            Source::classify("https://vimeo.com/123456789"),
            Some(Source::Vimeo)
        );
        assert_eq!(
            Source::classify("https://player.vimeo.com/video/123456789"),
            Some(Source::Vimeo)
        );
    }

    #[test]
    fn test_classify_unknown() {
        let urls = [
            "https://example.com/video.mp4",
            "https://dailymotion.com/video/x123",
            "not a url",
            "",
        ];
        for url in urls {
            assert_eq!(Source::classify(url), None, "{url:?}");
        }
    }

    #[test]
    fn test_classify_order_s3_first() {
        // An amazonaws host never falls through to the external patterns
        let url = "https://bucket.s3.amazonaws.com/upload/youtube.com.mp4";
        assert_eq!(Source::classify(url), Some(Source::S3));
    }

    #[test]
    fn test_decode_payload() {
        let payload = br#"{"id":"abc","url":"https://bucket.s3.amazonaws.com/upload/x.mp4"}"#;
        let req = JobRequest::from_payload(payload).unwrap();
        assert_eq!(req.id, "abc");
        assert_eq!(req.source(), Some(Source::S3));
        assert_eq!(req.duration, 0);
        assert!(req.status.is_empty());
    }

    #[test]
    fn test_decode_invalid_payload() {
        assert!(JobRequest::from_payload(b"not json").is_err());
        assert!(JobRequest::from_payload(br#"{"url":"no id field"}"#).is_err());
    }

    #[test]
    fn test_object_key() {
        let req = JobRequest {
            id: "abc".into(),
            url: "https://bucket.s3.amazonaws.com/upload/some%20file.mp4".into(),
            status: String::new(),
            duration: 0,
        };
        assert_eq!(req.object_key().unwrap(), "upload/some file.mp4");
    }
}
