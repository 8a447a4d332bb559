//! YouTube link detection in request text

use std::sync::OnceLock;

use regex::Regex;

static YOUTUBE_URL: OnceLock<Regex> = OnceLock::new();

fn youtube_url_pattern() -> &'static Regex {
    YOUTUBE_URL.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{6,})",
        )
        .expect("hardcoded pattern is valid")
    })
}

/// A YouTube link found in free text, normalized to the canonical watch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoutubeLink {
    pub url: String,
    pub video_id: String,
}

/// Find the first YouTube link in the text. Short-link and embed forms are
/// normalized to `https://www.youtube.com/watch?v={id}`.
pub fn find_youtube_link(text: &str) -> Option<YoutubeLink> {
    let captures = youtube_url_pattern().captures(text)?;
    let video_id = captures.get(1)?.as_str().to_string();
    Some(YoutubeLink {
        url: format!("https://www.youtube.com/watch?v={}", video_id),
        video_id,
    })
}

pub fn contains_youtube_link(text: &str) -> bool {
    youtube_url_pattern().is_match(text)
}
