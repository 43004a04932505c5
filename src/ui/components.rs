/// Reusable UI components

use yew::prelude::*;

use crate::embed::EmbedDescriptor;

#[derive(Properties, PartialEq)]
pub struct EmbedFrameProps {
    pub embed: EmbedDescriptor,
}

/// The player or timeline iframe for a rendered embed
#[function_component(EmbedFrame)]
pub fn embed_frame(props: &EmbedFrameProps) -> Html {
    let style = format!(
        "width: {}px; max-width: 100%; height: {}px;",
        props.embed.width, props.embed.height
    );

    html! {
        <div class="embed-frame" style={style}>
            <iframe
                src={props.embed.src.clone()}
                width={props.embed.width.to_string()}
                height={props.embed.height.to_string()}
                frameborder="0"
                allowfullscreen=true
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PlaceholderProps {
    pub message: AttrValue,
}

/// Shown instead of an embed when there is nothing to play
#[function_component(Placeholder)]
pub fn placeholder(props: &PlaceholderProps) -> Html {
    html! {
        <div class="empty-state">
            <p>{props.message.clone()}</p>
        </div>
    }
}
