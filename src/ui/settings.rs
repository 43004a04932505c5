/// Settings popup: board level preferences

use log::{error, warn};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::host::HostFrame;
use crate::settings::{BoardPreferences, FRUITS, VEGETABLES};

#[derive(Clone, PartialEq)]
enum PanelState {
    Loading,
    Idle,
    Saving,
    Error(String),
}

#[function_component(SettingsPanel)]
pub fn settings_panel() -> Html {
    let state = use_state(|| PanelState::Loading);
    let preferences = use_state(BoardPreferences::default);
    let frame = use_memo((), |_| HostFrame::current());

    // Load saved choices on mount
    {
        let state = state.clone();
        let preferences = preferences.clone();
        let frame = frame.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match BoardPreferences::load(&frame.settings_store()).await {
                    Ok(loaded) => {
                        preferences.set(loaded);
                        state.set(PanelState::Idle);
                    }
                    Err(e) => {
                        warn!("Failed to load board preferences: {}", e);
                        state.set(PanelState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Resize the popup to its content
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

    let on_fruit_change = {
        let preferences = preferences.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let mut updated = (*preferences).clone();
                updated.fruit = Some(select.value());
                preferences.set(updated);
            }
        })
    };

    let on_vegetable_change = {
        let preferences = preferences.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let mut updated = (*preferences).clone();
                updated.vegetable = Some(select.value());
                preferences.set(updated);
            }
        })
    };

    let on_save = {
        let state = state.clone();
        let preferences = preferences.clone();
        let frame = frame.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let preferences = (*preferences).clone();
            let frame = (*frame).clone();

            state.set(PanelState::Saving);

            spawn_local(async move {
                if let Err(e) = preferences.save(&frame.settings_store()).await {
                    warn!("Board preferences not saved: {}", e);
                    state.set(PanelState::Error(format!("Failed to save: {}", e)));
                    return;
                }
                // Only close once the write has been acknowledged
                if let Err(e) = frame.close_popup().await {
                    error!("{}", e);
                    state.set(PanelState::Error(e));
                }
            });
        })
    };

    let is_busy = matches!(*state, PanelState::Loading | PanelState::Saving);

    html! {
        <div id="content" class="padding-20">
            if let PanelState::Error(err) = &*state {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err.clone()}
                </Alert>
            }

            <label for="fruit">{"Favorite fruit"}</label>
            {choice_select("fruit", FRUITS, preferences.fruit.as_deref(), on_fruit_change)}

            <label for="vegetable">{"Favorite vegetable"}</label>
            {choice_select("vegetable", VEGETABLES, preferences.vegetable.as_deref(), on_vegetable_change)}

            <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                {"Save"}
            </Button>
        </div>
    }
}

fn choice_select(
    id: &'static str,
    choices: &'static [&'static str],
    selected: Option<&str>,
    onchange: Callback<Event>,
) -> Html {
    html! {
        <select id={id} class="choice-select" {onchange}>
            <option value="" disabled={true} selected={selected.is_none()}>{"Choose one"}</option>
            {for choices.iter().map(|choice| html! {
                <option value={*choice} selected={selected == Some(*choice)}>{*choice}</option>
            })}
        </select>
    }
}
