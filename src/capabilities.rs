/// Payloads for the host's capability callbacks
///
/// Everything here is plain data; `host` turns it into the objects and
/// callbacks the host expects.
use serde::{Deserialize, Serialize};

use crate::config::PowerUpConfig;
use crate::media::{classify, MediaLink};

/// Argument carrying the attachment URL into the video section page
pub const VIDEO_URL_ARG: &str = "ytUrl";
/// Argument carrying the attachment URL into the social section page
pub const PROFILE_URL_ARG: &str = "profileUrl";

/// A card attachment as handed over by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn new(url: impl Into<String>) -> Attachment {
        Attachment {
            url: url.into(),
            name: None,
        }
    }
}

/// An attachment section before its iframe URL has been signed by the host
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlan {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub claimed: Vec<Attachment>,
    pub page: String,
    pub arg_name: &'static str,
    pub arg_value: String,
    pub height: u32,
}

impl SectionPlan {
    pub fn into_section(self, signed_url: String) -> AttachmentSection {
        AttachmentSection {
            id: self.id,
            claimed: self.claimed,
            icon: self.icon,
            title: self.title,
            content: SectionContent {
                content_type: "iframe",
                url: signed_url,
                height: self.height,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentSection {
    pub id: String,
    pub claimed: Vec<Attachment>,
    pub icon: String,
    pub title: String,
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionContent {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub url: String,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupSpec {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A card button; clicking it opens `popup`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardButton {
    pub icon: String,
    pub text: String,
    #[serde(skip)]
    pub popup: PopupSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailImage {
    pub url: String,
    pub logo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub title: String,
    pub image: ThumbnailImage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedUrl {
    pub icon: String,
    pub text: String,
}

/// Claim recognized media attachments, one section per attachment
pub fn attachment_sections(attachments: &[Attachment], config: &PowerUpConfig) -> Vec<SectionPlan> {
    attachments
        .iter()
        .map(|attachment| (attachment, classify(&attachment.url)))
        .filter(|(_, link)| link.is_recognized())
        .enumerate()
        .map(|(index, (attachment, link))| section_plan(index, attachment, &link, config))
        .collect()
}

fn section_plan(
    index: usize,
    attachment: &Attachment,
    link: &MediaLink,
    config: &PowerUpConfig,
) -> SectionPlan {
    let (id, title, page, arg_name, height) = if link.is_video() {
        (
            "YouTube",
            "Video Attachment",
            &config.pages.video_section,
            VIDEO_URL_ARG,
            config.video_section_height,
        )
    } else {
        (
            "SocialLinks",
            "Social Feeds",
            &config.pages.social_section,
            PROFILE_URL_ARG,
            config.social_section_height,
        )
    };

    SectionPlan {
        id: format!("{}-{}", id, index),
        title: title.to_string(),
        icon: config.icons.video_gray.clone(),
        claimed: vec![attachment.clone()],
        page: page.clone(),
        arg_name,
        arg_value: attachment.url.clone(),
        height,
    }
}

/// A play badge on cards carrying at least one video
pub fn card_badges(attachments: &[Attachment], config: &PowerUpConfig) -> Vec<Badge> {
    if attachments.iter().any(|a| classify(&a.url).is_video()) {
        vec![Badge {
            icon: config.icons.video.clone(),
            text: None,
        }]
    } else {
        Vec::new()
    }
}

pub fn card_buttons(config: &PowerUpConfig) -> Vec<CardButton> {
    vec![
        CardButton {
            icon: config.icons.gray.clone(),
            text: "Add YouTube".to_string(),
            popup: PopupSpec {
                title: "Add YouTube Link".to_string(),
                url: config.pages.video_link_form.clone(),
                height: None,
            },
        },
        CardButton {
            icon: config.icons.gray.clone(),
            text: "Add Social Links".to_string(),
            popup: PopupSpec {
                title: "Add Social Links".to_string(),
                url: config.pages.social_link_form.clone(),
                height: None,
            },
        },
    ]
}

pub fn settings_popup(config: &PowerUpConfig) -> PopupSpec {
    PopupSpec {
        title: "Settings".to_string(),
        url: config.pages.settings.clone(),
        height: Some(config.settings_popup_height),
    }
}

/// Thumbnail for a recognized media attachment; `None` leaves it to the host
pub fn attachment_thumbnail(url: &str, config: &PowerUpConfig) -> Option<Thumbnail> {
    let link = classify(url);
    if !link.is_recognized() {
        return None;
    }

    let image = match link.thumbnail_url() {
        Some(thumbnail) => ThumbnailImage {
            url: thumbnail,
            logo: false,
        },
        None => ThumbnailImage {
            url: config.icons.video_gray.clone(),
            logo: true,
        },
    };

    Some(Thumbnail {
        url: url.to_string(),
        title: link.kind().label().to_string(),
        image,
    })
}

/// Short replacement text for recognized media links in card descriptions
pub fn format_url(url: &str, config: &PowerUpConfig) -> Option<FormattedUrl> {
    let link = classify(url);
    if !link.is_recognized() {
        return None;
    }

    let text = match link.embed_id() {
        Some(id) => format!("{} ({})", link.kind().label(), id),
        None => link.kind().label().to_string(),
    };

    Some(FormattedUrl {
        icon: config.icons.gray.clone(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachments(urls: &[&str]) -> Vec<Attachment> {
        urls.iter().map(|url| Attachment::new(*url)).collect()
    }

    #[test]
    fn test_attachment_sections_claims_media_only() {
        let config = PowerUpConfig::default();
        let attachments = attachments(&[
            "https://example.com/doc.pdf",
            "https://www.youtube.com/watch?v=abc123",
            "https://twitter.com/rustlang",
            "https://youtu.be/xyz",
        ]);

        let sections = attachment_sections(&attachments, &config);

        assert_eq!(sections.len(), 3);

        assert_eq!(sections[0].id, "YouTube-0");
        assert_eq!(sections[0].title, "Video Attachment");
        assert_eq!(sections[0].page, "./section.html");
        assert_eq!(sections[0].arg_name, VIDEO_URL_ARG);
        assert_eq!(sections[0].arg_value, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(sections[0].height, 230);
        assert_eq!(sections[0].claimed, vec![attachments[1].clone()]);

        assert_eq!(sections[1].id, "SocialLinks-1");
        assert_eq!(sections[1].title, "Social Feeds");
        assert_eq!(sections[1].arg_name, PROFILE_URL_ARG);
        assert_eq!(sections[1].height, 500);

        assert_eq!(sections[2].id, "YouTube-2");
    }

    #[test]
    fn test_attachment_sections_empty() {
        let config = PowerUpConfig::default();
        assert!(attachment_sections(&[], &config).is_empty());
        assert!(attachment_sections(&attachments(&["https://example.com"]), &config).is_empty());
    }

    #[test]
    fn test_into_section_serialization() {
        let config = PowerUpConfig::default();
        let plan = attachment_sections(&attachments(&["https://youtu.be/abc"]), &config)
            .remove(0);

        let section = plan.into_section("./section.html#signed".to_string());
        let json = serde_json::to_value(&section).unwrap();

        assert_eq!(json["content"]["type"], "iframe");
        assert_eq!(json["content"]["url"], "./section.html#signed");
        assert_eq!(json["content"]["height"], 230);
        assert_eq!(json["claimed"][0]["url"], "https://youtu.be/abc");
        assert!(json["claimed"][0].get("name").is_none());
    }

    #[test]
    fn test_card_badges() {
        let config = PowerUpConfig::default();

        let badges = card_badges(&attachments(&["https://m.youtube.com/watch?v=abc"]), &config);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].icon, config.icons.video);

        // Social links alone do not earn the video badge
        assert!(card_badges(&attachments(&["https://twitter.com/rustlang"]), &config).is_empty());
        assert!(card_badges(&[], &config).is_empty());
    }

    #[test]
    fn test_card_buttons() {
        let config = PowerUpConfig::default();
        let buttons = card_buttons(&config);

        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].text, "Add YouTube");
        assert_eq!(buttons[0].popup.url, "./inputData.html");
        assert_eq!(buttons[1].popup.title, "Add Social Links");

        let json = serde_json::to_value(&buttons[0]).unwrap();
        assert!(json.get("popup").is_none());
    }

    #[test]
    fn test_settings_popup() {
        let popup = settings_popup(&PowerUpConfig::default());
        assert_eq!(popup.url, "./settings.html");
        assert_eq!(popup.height, Some(184));
    }

    #[test]
    fn test_attachment_thumbnail() {
        let config = PowerUpConfig::default();

        let thumbnail = attachment_thumbnail("https://youtu.be/abc123", &config).unwrap();
        assert_eq!(thumbnail.title, "YouTube video");
        assert_eq!(thumbnail.image.url, "https://img.youtube.com/vi/abc123/hqdefault.jpg");
        assert!(!thumbnail.image.logo);

        let thumbnail = attachment_thumbnail("https://twitter.com/rustlang", &config).unwrap();
        assert!(thumbnail.image.logo);

        assert!(attachment_thumbnail("https://example.com", &config).is_none());
    }

    #[test]
    fn test_format_url() {
        let config = PowerUpConfig::default();

        let formatted = format_url("https://www.youtube.com/playlist?list=PL1", &config).unwrap();
        assert_eq!(formatted.text, "YouTube playlist (PL1)");

        let formatted = format_url("https://twitter.com/rustlang", &config).unwrap();
        assert_eq!(formatted.text, "Twitter profile");

        assert!(format_url("https://example.com", &config).is_none());
    }
}
