use std::fmt;

use thiserror::Error;

use crate::utils::url::Url;

/// Hosts whose URLs we know how to extract a video id from.
const LONG_HOSTS: [&str; 3] = ["youtube.com", "youtube-nocookie.com", "music.youtube.com"];
const SHORT_HOST: &str = "youtu.be";

/// Path prefixes directly followed by the video id.
const ID_PATH_PREFIXES: [&str; 5] = ["embed", "v", "shorts", "live", "e"];

/// Identifier of a video for the embed widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VideoId(String);

impl VideoId {
    /// Resolve either a raw id or one of the widget's many URL forms into a
    /// `VideoId`.
    pub(crate) fn resolve(input: &str) -> Result<Self, VideoIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VideoIdError::Empty);
        }
        if is_valid_id(input) {
            return Ok(Self(input.to_owned()));
        }
        let url = Url::new(input.to_owned());
        let host = url.host().ok_or_else(|| VideoIdError::Unrecognized {
            input: input.to_owned(),
        })?;
        let candidate = if host == SHORT_HOST {
            url.path_segments().first().copied()
        } else if LONG_HOSTS.contains(&host.as_str()) {
            let segments = url.path_segments();
            match segments.as_slice() {
                ["watch", ..] => url.query_param("v"),
                [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => Some(*id),
                _ => None,
            }
        } else {
            return Err(VideoIdError::UnknownHost { host });
        };
        match candidate {
            Some(id) if is_valid_id(id) => Ok(Self(id.to_owned())),
            _ => Err(VideoIdError::Unrecognized {
                input: input.to_owned(),
            }),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ids are 11 characters from the URL-safe base64 alphabet.
fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum VideoIdError {
    #[error("No video id given")]
    Empty,
    #[error("Cannot extract a video id from an URL of host `{host}`")]
    UnknownHost { host: String },
    #[error("`{input}` is neither a video id nor a known video URL")]
    Unrecognized { input: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(input: &str) -> Option<String> {
        VideoId::resolve(input).ok().map(|id| id.as_str().to_owned())
    }

    #[test]
    fn test_raw_id() {
        assert_eq!(resolved("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(resolved("  dQw4w9WgXcQ ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(VideoId::resolve(""), Err(VideoIdError::Empty));
        assert!(resolved("too-short").is_none());
    }

    #[test]
    fn test_url_forms() {
        let expected = Some("dQw4w9WgXcQ");
        assert_eq!(
            resolved("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            expected
        );
        assert_eq!(
            resolved("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0").as_deref(),
            expected
        );
        assert_eq!(
            resolved("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ").as_deref(),
            expected
        );
        assert_eq!(resolved("youtu.be/dQw4w9WgXcQ").as_deref(), expected);
        assert_eq!(
            resolved("https://youtu.be/dQw4w9WgXcQ?si=abc#t=3").as_deref(),
            expected
        );
        assert_eq!(
            resolved("https://m.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            expected
        );
        assert_eq!(
            resolved("https://youtube.com/live/dQw4w9WgXcQ").as_deref(),
            expected
        );
    }

    #[test]
    fn test_rejected_urls() {
        assert_eq!(
            VideoId::resolve("https://vimeo.com/123456"),
            Err(VideoIdError::UnknownHost {
                host: "vimeo.com".to_owned()
            })
        );
        assert!(resolved("https://www.youtube.com/watch?list=abc").is_none());
        assert!(resolved("https://www.youtube.com/channel/UCabcdefghij").is_none());
    }
}
