use validator::ValidationError;

/// Only links hosted on YouTube are accepted for lesson videos.
pub const ALLOWED_VIDEO_HOST: &str = "https://www.youtube.com";

pub fn validate_video_link(link: &str) -> Result<(), ValidationError> {
    // Empty values pass through; only a provided link is checked
    if link.is_empty() || link.starts_with(ALLOWED_VIDEO_HOST) {
        return Ok(());
    }
    let mut err = ValidationError::new("link");
    err.message = Some("site is not ok".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_link_passes() {
        assert!(validate_video_link("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
    }

    #[test]
    fn other_host_fails() {
        let err = validate_video_link("https://www.vimeo.com/123").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("site is not ok"));
    }

    #[test]
    fn empty_link_passes() {
        assert!(validate_video_link("").is_ok());
    }

    #[test]
    fn scheme_must_match_exactly() {
        assert!(validate_video_link("http://www.youtube.com/watch?v=x").is_err());
    }
}
