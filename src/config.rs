/// Power-Up configuration: icons, iframe pages and their sizes
use log::warn;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconSet {
    pub gray: String,
    pub video: String,
    pub video_gray: String,
}

impl Default for IconSet {
    fn default() -> Self {
        IconSet {
            gray: "./images/icon-gray.svg".to_string(),
            video: "./images/YT_PlayButton.png".to_string(),
            video_gray: "./images/yt_icon_gray.png".to_string(),
        }
    }
}

/// Paths of the iframe pages, relative to the Power-Up's connector page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSet {
    pub video_section: String,
    pub social_section: String,
    pub settings: String,
    pub video_link_form: String,
    pub social_link_form: String,
}

impl Default for PageSet {
    fn default() -> Self {
        PageSet {
            video_section: "./section.html".to_string(),
            social_section: "./sectionSocialLinks.html".to_string(),
            settings: "./settings.html".to_string(),
            video_link_form: "./inputData.html".to_string(),
            social_link_form: "./inputSocialLinks.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerUpConfig {
    pub icons: IconSet,
    pub pages: PageSet,
    pub video_section_height: u32,
    pub social_section_height: u32,
    pub settings_popup_height: u32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        PowerUpConfig {
            icons: IconSet::default(),
            pages: PageSet::default(),
            video_section_height: 230,
            social_section_height: 500,
            settings_popup_height: 184,
        }
    }
}

impl PowerUpConfig {
    /// Read overrides passed in from the connector page.
    ///
    /// `undefined`/`null` mean defaults; anything unreadable falls back to the
    /// defaults as well.
    pub fn from_js(value: JsValue) -> Self {
        if value.is_undefined() || value.is_null() {
            return Self::default();
        }

        serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
            warn!("Ignoring invalid Power-Up config: {:?}", e);
            Self::default()
        })
    }
}
