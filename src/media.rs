/// Media link classification for card attachments
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Serialize;
use url::Url;

const VIDEO_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_LINK_HOST: &str = "youtu.be";
const SOCIAL_HOSTS: &[&str] = &["twitter.com", "www.twitter.com", "mobile.twitter.com"];

/// Path markers on youtube.com whose next segment is a video id
const SINGLE_VIDEO_MARKERS: &[&str] = &["embed", "shorts", "live"];

static EMBED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("embed id pattern is valid"));

/// What kind of media a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    VideoSingle,
    VideoPlaylist,
    SocialProfile,
    Unrecognized,
}

impl MediaKind {
    /// Human readable name, used in formatted attachment links
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::VideoSingle => "YouTube video",
            MediaKind::VideoPlaylist => "YouTube playlist",
            MediaKind::SocialProfile => "Twitter profile",
            MediaKind::Unrecognized => "Link",
        }
    }
}

/// A classified attachment URL.
///
/// Only [`classify`] builds one, so `embed_id` is present exactly for the
/// two video kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLink {
    raw_url: String,
    kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed_id: Option<String>,
}

impl MediaLink {
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn embed_id(&self) -> Option<&str> {
        self.embed_id.as_deref()
    }

    pub fn is_video(&self) -> bool {
        matches!(self.kind, MediaKind::VideoSingle | MediaKind::VideoPlaylist)
    }

    pub fn is_recognized(&self) -> bool {
        self.kind != MediaKind::Unrecognized
    }

    /// Still image for a single video; playlists have no stable thumbnail
    pub fn thumbnail_url(&self) -> Option<String> {
        match (self.kind, &self.embed_id) {
            (MediaKind::VideoSingle, Some(id)) => {
                Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
            }
            _ => None,
        }
    }
}

/// Classify an attachment URL
///
/// Algorithm:
/// 1. Trim and parse; only http(s) URLs are considered
/// 2. Social hosts → SocialProfile (the URL itself is the profile reference)
/// 3. Video hosts:
///    - `watch` with a well-formed `list` parameter → playlist, id = `list`
///    - `watch` alone → single video, id = `v`
///    - `playlist` segment or a `list` parameter → playlist, id = `list`
///    - youtube.com `embed/<id>`, `shorts/<id>`, `live/<id>` → single video
///    - `youtu.be/<id>` → single video, id = first path segment
/// 4. Everything else, including video URLs with a missing or malformed id,
///    is Unrecognized; a malformed `list` counts as absent
///
/// Query parameters are looked up by name, so their order does not matter.
pub fn classify(raw_url: &str) -> MediaLink {
    match parse_http_url(raw_url).and_then(|url| resolve(&url)) {
        Some((kind, embed_id)) => MediaLink {
            raw_url: raw_url.to_string(),
            kind,
            embed_id,
        },
        None => {
            debug!("Not a recognized media link: {}", raw_url);
            MediaLink {
                raw_url: raw_url.to_string(),
                kind: MediaKind::Unrecognized,
                embed_id: None,
            }
        }
    }
}

fn parse_http_url(raw_url: &str) -> Option<Url> {
    let url = Url::parse(raw_url.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn resolve(url: &Url) -> Option<(MediaKind, Option<String>)> {
    // The parser already lowercases hosts of http(s) URLs
    let host = url.host_str()?;

    if SOCIAL_HOSTS.contains(&host) {
        return Some((MediaKind::SocialProfile, None));
    }

    let short_link = host == SHORT_LINK_HOST;
    if !short_link && !VIDEO_HOSTS.contains(&host) {
        return None;
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    // A malformed `list` is ignored so `watch?v=..` still plays the single video
    let list = query_param(url, "list").filter(|list| EMBED_ID.is_match(list));

    let (kind, id) = if segments.contains(&"watch") {
        match list {
            Some(list) => (MediaKind::VideoPlaylist, Some(list)),
            None => (MediaKind::VideoSingle, query_param(url, "v")),
        }
    } else if segments.contains(&"playlist") || list.is_some() {
        (MediaKind::VideoPlaylist, list)
    } else if short_link {
        (MediaKind::VideoSingle, segments.first().map(|s| s.to_string()))
    } else if segments.len() >= 2 && SINGLE_VIDEO_MARKERS.contains(&segments[0]) {
        (MediaKind::VideoSingle, Some(segments[1].to_string()))
    } else {
        return None;
    };

    let id = id.filter(|id| EMBED_ID.is_match(id))?;
    Some((kind, Some(id)))
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
