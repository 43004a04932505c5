/// Attachment section page: the player or timeline for one claimed attachment

use log::{debug, error};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::capabilities::{PROFILE_URL_ARG, VIDEO_URL_ARG};
use crate::embed::{render, EmbedDescriptor};
use crate::host::HostFrame;
use crate::media::{classify, MediaKind, MediaLink};
use crate::settings::stored_card_link;
use crate::ui::components::{EmbedFrame, Placeholder};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SectionSource {
    Video,
    Social,
}

impl SectionSource {
    fn arg_name(&self) -> &'static str {
        match self {
            SectionSource::Video => VIDEO_URL_ARG,
            SectionSource::Social => PROFILE_URL_ARG,
        }
    }

    fn accepts(&self, link: &MediaLink) -> bool {
        match self {
            SectionSource::Video => link.is_video(),
            SectionSource::Social => link.kind() == MediaKind::SocialProfile,
        }
    }

    fn empty_message(&self) -> &'static str {
        match self {
            SectionSource::Video => "No playable video on this card.",
            SectionSource::Social => "No social profile on this card.",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct EmbedSectionProps {
    pub source: SectionSource,
}

#[derive(Clone, PartialEq)]
enum SectionState {
    Loading,
    Ready(Option<EmbedDescriptor>),
    Error(String),
}

#[function_component(EmbedSection)]
pub fn embed_section(props: &EmbedSectionProps) -> Html {
    let state = use_state(|| SectionState::Loading);
    let frame = use_memo((), |_| HostFrame::current());

    // The host calls the render callback again whenever attachments change
    {
        let state = state.clone();
        let frame = frame.clone();
        let source = props.source;

        use_effect_with((), move |_| {
            let host = (*frame).clone();
            frame.on_render(move || {
                let state = state.clone();
                let host = host.clone();

                spawn_local(async move {
                    match load_embed(&host, source).await {
                        Ok(embed) => state.set(SectionState::Ready(embed)),
                        Err(e) => {
                            error!("{}", e);
                            state.set(SectionState::Error(e));
                        }
                    }
                });
            });
            || ()
        });
    }

    // Resize the iframe once new content is in the DOM
    {
        let frame = frame.clone();
        use_effect_with((*state).clone(), move |_| {
            let frame = (*frame).clone();
            spawn_local(async move {
                if let Err(e) = frame.size_to("#content").await {
                    debug!("{}", e);
                }
            });
            || ()
        });
    }

    html! {
        <div id="content">
            {match &*state {
                SectionState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                SectionState::Ready(Some(embed)) => html! {
                    <EmbedFrame embed={embed.clone()} />
                },
                SectionState::Ready(None) => html! {
                    <Placeholder message={props.source.empty_message()} />
                },
                SectionState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
            }}
        </div>
    }
}

/// Resolve the URL this section shows: the iframe argument first, then the
/// link stored for the card
async fn load_embed(
    frame: &HostFrame,
    source: SectionSource,
) -> Result<Option<EmbedDescriptor>, String> {
    let url = match frame.arg(source.arg_name()) {
        Some(url) => Some(url),
        None if source == SectionSource::Video => stored_card_link(&frame.settings_store())
            .await
            .map_err(|e| format!("Failed to read the card link: {}", e))?,
        None => None,
    };

    Ok(url
        .map(|url| classify(&url))
        .filter(|link| source.accepts(link))
        .and_then(|link| render(&link)))
}
