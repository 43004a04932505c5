/// Card button popups for adding a video or social link to a card

use log::{info, warn};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::host::HostFrame;
use crate::media::{classify, MediaKind, MediaLink};
use crate::settings::store_card_link;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LinkTarget {
    Video,
    Social,
}

impl LinkTarget {
    fn placeholder(&self) -> &'static str {
        match self {
            LinkTarget::Video => "https://www.youtube.com/watch?v=...",
            LinkTarget::Social => "https://twitter.com/...",
        }
    }

    fn submit_label(&self) -> &'static str {
        match self {
            LinkTarget::Video => "Add video",
            LinkTarget::Social => "Embed feed",
        }
    }

    /// Check the submitted URL fits this form
    fn validate(&self, url: &str) -> Result<MediaLink, String> {
        let link = classify(url);
        match (self, link.kind()) {
            (LinkTarget::Video, MediaKind::VideoSingle | MediaKind::VideoPlaylist) => Ok(link),
            (LinkTarget::Social, MediaKind::SocialProfile) => Ok(link),
            (LinkTarget::Video, _) => Err("That is not a YouTube video or playlist link.".to_string()),
            (LinkTarget::Social, _) => Err("That is not a Twitter profile link.".to_string()),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct LinkFormProps {
    pub target: LinkTarget,
}

#[derive(Clone, PartialEq)]
enum FormState {
    Idle,
    Submitting,
    Error(String),
}

#[function_component(LinkForm)]
pub fn link_form(props: &LinkFormProps) -> Html {
    let state = use_state(|| FormState::Idle);
    let url = use_state(String::new);
    let frame = use_memo((), |_| HostFrame::current());

    {
        let frame = frame.clone();
        use_effect_with((*state).clone(), move |_| {
            let frame = (*frame).clone();
            spawn_local(async move {
                let _ = frame.size_to("#content").await;
            });
            || ()
        });
    }

    let on_input = {
        let url = url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                url.set(input.value());
            }
        })
    };

    let on_submit = {
        let state = state.clone();
        let url = url.clone();
        let frame = frame.clone();
        let target = props.target;

        Callback::from(move |_| {
            let link = match target.validate(&url) {
                Ok(link) => link,
                Err(message) => {
                    state.set(FormState::Error(message));
                    return;
                }
            };

            let state = state.clone();
            let frame = (*frame).clone();
            state.set(FormState::Submitting);

            spawn_local(async move {
                match submit_link(&frame, target, &link).await {
                    Ok(()) => info!("Added {} to card", link.raw_url().trim()),
                    Err(e) => {
                        warn!("Link not added: {}", e);
                        state.set(FormState::Error(e));
                    }
                }
            });
        })
    };

    let is_busy = matches!(*state, FormState::Submitting);

    html! {
        <div id="content" class="padding-20">
            if let FormState::Error(err) = &*state {
                <Alert r#type={AlertType::Warning} title={err.clone()} inline={true}>
                </Alert>
            }

            <input
                type="url"
                class="search-input"
                placeholder={props.target.placeholder()}
                value={(*url).clone()}
                oninput={on_input}
                disabled={is_busy}
            />

            <Button onclick={on_submit} disabled={is_busy || url.trim().is_empty()} variant={ButtonVariant::Primary} block={true}>
                {props.target.submit_label()}
            </Button>
        </div>
    }
}

/// Persist and attach the link, closing the popup only after the host has
/// acknowledged every write
async fn submit_link(frame: &HostFrame, target: LinkTarget, link: &MediaLink) -> Result<(), String> {
    let url = link.raw_url().trim();

    if target == LinkTarget::Video {
        store_card_link(&frame.settings_store(), url)
            .await
            .map_err(|e| format!("Failed to save the link: {}", e))?;
    }

    frame.attach(url).await?;
    frame.close_popup().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_form_accepts_videos_only() {
        assert!(LinkTarget::Video.validate("https://youtu.be/abc123").is_ok());
        assert!(LinkTarget::Video.validate("https://www.youtube.com/playlist?list=PL1").is_ok());
        assert!(LinkTarget::Video.validate("https://twitter.com/rustlang").is_err());
        assert!(LinkTarget::Video.validate("https://example.com").is_err());
    }

    #[test]
    fn test_social_form_accepts_profiles_only() {
        assert!(LinkTarget::Social.validate("https://mobile.twitter.com/rustlang").is_ok());
        assert!(LinkTarget::Social.validate("https://youtu.be/abc123").is_err());
    }
}
