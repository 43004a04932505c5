/// Embed Power-Up - plays video and social links attached to board cards
/// Built with Rust + WASM + Yew

pub mod capabilities;
pub mod config;
pub mod embed;
mod host;
pub mod media;
pub mod settings;
pub mod ui;

pub use host::bucket_from_all;

use wasm_bindgen::prelude::*;

use crate::config::PowerUpConfig;
use crate::ui::link_form::{LinkForm, LinkFormProps, LinkTarget};
use crate::ui::section::{EmbedSection, EmbedSectionProps, SectionSource};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Classification and rendering exposed to page scripts
#[wasm_bindgen]
pub fn classify_url(url: &str) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&media::classify(url))?)
}

#[wasm_bindgen]
pub fn render_url(url: &str) -> Result<JsValue, JsValue> {
    let embed = embed::render(&media::classify(url));
    Ok(serde_wasm_bindgen::to_value(&embed)?)
}

// Connector page: register capabilities with the host
#[wasm_bindgen]
pub fn register_power_up(config: JsValue) -> Result<(), JsValue> {
    host::register_capabilities(PowerUpConfig::from_js(config))
}

#[wasm_bindgen]
pub fn start_video_section() {
    yew::Renderer::<EmbedSection>::with_props(EmbedSectionProps {
        source: SectionSource::Video,
    })
    .render();
}

#[wasm_bindgen]
pub fn start_social_section() {
    yew::Renderer::<EmbedSection>::with_props(EmbedSectionProps {
        source: SectionSource::Social,
    })
    .render();
}

#[wasm_bindgen]
pub fn start_settings() {
    yew::Renderer::<ui::settings::SettingsPanel>::new().render();
}

#[wasm_bindgen]
pub fn start_video_link_form() {
    yew::Renderer::<LinkForm>::with_props(LinkFormProps {
        target: LinkTarget::Video,
    })
    .render();
}

#[wasm_bindgen]
pub fn start_social_link_form() {
    yew::Renderer::<LinkForm>::with_props(LinkFormProps {
        target: LinkTarget::Social,
    })
    .render();
}
