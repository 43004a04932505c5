/// Embed rendering for classified media links
use html_escape::encode_double_quoted_attribute;
use serde::Serialize;
use url::Url;

use crate::media::{MediaKind, MediaLink};

const VIDEO_EMBED_BASE: &str = "https://www.youtube.com/embed/";
const TIMELINE_EMBED_BASE: &str = "https://twitframe.com/show";

const SINGLE_SIZE: (u32, u32) = (853, 480);
const PLAYLIST_SIZE: (u32, u32) = (720, 405);
const TIMELINE_SIZE: (u32, u32) = (340, 500);

const VIDEO_ALLOW: &str = "accelerometer; encrypted-media; gyroscope; picture-in-picture";

/// Everything needed to put a player or timeline into an iframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDescriptor {
    pub src: String,
    pub html_fragment: String,
    pub width: u32,
    pub height: u32,
}

/// Build the embed for a link. Unrecognized links render nothing.
pub fn render(link: &MediaLink) -> Option<EmbedDescriptor> {
    match link.kind() {
        MediaKind::VideoSingle => {
            let src = format!("{}{}", VIDEO_EMBED_BASE, link.embed_id()?);
            Some(video_frame(src, SINGLE_SIZE))
        }
        MediaKind::VideoPlaylist => {
            let src = format!(
                "{}?listType=playlist&list={}",
                VIDEO_EMBED_BASE,
                link.embed_id()?
            );
            Some(video_frame(src, PLAYLIST_SIZE))
        }
        MediaKind::SocialProfile => {
            let src = Url::parse_with_params(
                TIMELINE_EMBED_BASE,
                &[("url", link.raw_url().trim())],
            )
            .ok()?
            .to_string();
            Some(timeline_frame(src))
        }
        MediaKind::Unrecognized => None,
    }
}

fn video_frame(src: String, (width, height): (u32, u32)) -> EmbedDescriptor {
    let html_fragment = format!(
        r#"<iframe width="{}" height="{}" src="{}" frameborder="0" allow="{}" allowfullscreen></iframe>"#,
        width,
        height,
        encode_double_quoted_attribute(&src),
        VIDEO_ALLOW
    );

    EmbedDescriptor {
        src,
        html_fragment,
        width,
        height,
    }
}

fn timeline_frame(src: String) -> EmbedDescriptor {
    let (width, height) = TIMELINE_SIZE;
    let html_fragment = format!(
        r#"<iframe width="{}" height="{}" src="{}" frameborder="0" scrolling="yes"></iframe>"#,
        width,
        height,
        encode_double_quoted_attribute(&src)
    );

    EmbedDescriptor {
        src,
        html_fragment,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::classify;

    #[test]
    fn test_render_single_video() {
        let embed = render(&classify("https://www.youtube.com/watch?v=abc123")).unwrap();

        assert_eq!(embed.width, 853);
        assert_eq!(embed.height, 480);
        assert_eq!(embed.src, "https://www.youtube.com/embed/abc123");
        assert!(embed.html_fragment.starts_with("<iframe"));
        assert!(embed.html_fragment.contains(r#"src="https://www.youtube.com/embed/abc123""#));
        assert!(embed.html_fragment.contains(r#"width="853" height="480""#));
    }

    #[test]
    fn test_render_playlist() {
        let embed = render(&classify("https://www.youtube.com/watch?v=abc123&list=PL1")).unwrap();

        assert_eq!((embed.width, embed.height), (720, 405));
        assert_eq!(embed.src, "https://www.youtube.com/embed/?listType=playlist&list=PL1");
        assert!(embed
            .html_fragment
            .contains("embed/?listType=playlist&amp;list=PL1"));
    }

    #[test]
    fn test_render_social_profile() {
        let embed = render(&classify("https://twitter.com/rustlang")).unwrap();

        assert_eq!((embed.width, embed.height), (340, 500));
        assert_eq!(
            embed.src,
            "https://twitframe.com/show?url=https%3A%2F%2Ftwitter.com%2Frustlang"
        );
        assert!(embed.html_fragment.contains(&embed.src));
    }

    #[test]
    fn test_render_unrecognized() {
        assert_eq!(render(&classify("https://example.com/page")), None);
        assert_eq!(render(&classify("")), None);
    }

    #[test]
    fn test_fragment_escapes_src() {
        let embed = video_frame(r#"x"><script>&"#.to_string(), SINGLE_SIZE);

        assert_eq!(embed.src, r#"x"><script>&"#);
        assert!(embed.html_fragment.contains(r#"src="x&quot;&gt;&lt;script&gt;&amp;""#));
        assert!(!embed.html_fragment.contains("<script>"));
    }
}
