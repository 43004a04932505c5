/// Bindings to the host's Power-Up client library (`TrelloPowerUp`)
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Object, Promise, Reflect};
use log::{error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::capabilities::{self, Attachment, AttachmentSection, PopupSpec};
use crate::config::PowerUpConfig;
use crate::settings::{
    Bucket, HostContext, Scope, SettingsError, SettingsStore, StorageBackend, Visibility,
};

#[wasm_bindgen]
extern "C" {
    /// The `t` handle passed to capability callbacks and returned by `iframe()`
    pub type PowerUpContext;

    #[wasm_bindgen(js_namespace = TrelloPowerUp, js_name = iframe)]
    fn iframe() -> PowerUpContext;

    #[wasm_bindgen(js_namespace = TrelloPowerUp, js_name = initialize)]
    fn initialize(capabilities: &Object);

    #[wasm_bindgen(method, js_name = getAll)]
    fn get_all(this: &PowerUpContext) -> Promise;

    #[wasm_bindgen(method)]
    fn set(this: &PowerUpContext, scope: &str, visibility: &str, key: &str, value: &str) -> Promise;

    #[wasm_bindgen(method, js_name = getContext)]
    fn get_context(this: &PowerUpContext) -> JsValue;

    #[wasm_bindgen(method)]
    fn arg(this: &PowerUpContext, name: &str) -> JsValue;

    #[wasm_bindgen(method)]
    fn render(this: &PowerUpContext, callback: &js_sys::Function);

    #[wasm_bindgen(method, js_name = sizeTo)]
    fn size_to(this: &PowerUpContext, selector: &str) -> Promise;

    #[wasm_bindgen(method, js_name = closePopup)]
    fn close_popup(this: &PowerUpContext) -> Promise;

    #[wasm_bindgen(method)]
    fn attach(this: &PowerUpContext, attachment: JsValue) -> Promise;

    #[wasm_bindgen(method)]
    fn popup(this: &PowerUpContext, options: JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = signUrl)]
    fn sign_url(this: &PowerUpContext, url: &str, args: &JsValue) -> String;

    #[wasm_bindgen(method, js_name = NotHandled)]
    fn not_handled(this: &PowerUpContext) -> JsValue;
}

async fn settle(promise: Promise, action: &str) -> Result<JsValue, String> {
    JsFuture::from(promise)
        .await
        .map_err(|e| format!("{} failed: {:?}", action, e))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

/// Read `options[name]`, treating a missing field as the type's default
fn option_field<T: DeserializeOwned + Default>(options: &JsValue, name: &str) -> Result<T, JsValue> {
    let value = Reflect::get(options, &JsValue::from_str(name))?;
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// The host handle of the iframe page this code runs in
#[derive(Clone)]
pub struct HostFrame {
    t: Rc<PowerUpContext>,
}

impl HostFrame {
    pub fn current() -> Self {
        HostFrame { t: Rc::new(iframe()) }
    }

    pub fn context(&self) -> HostContext {
        serde_wasm_bindgen::from_value(self.t.get_context()).unwrap_or_else(|e| {
            warn!("Unreadable host context: {:?}", e);
            HostContext::default()
        })
    }

    /// String argument passed to this iframe, if present and non-empty
    pub fn arg(&self, name: &str) -> Option<String> {
        self.t
            .arg(name)
            .as_string()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn settings_store(&self) -> SettingsStore<HostBackend> {
        SettingsStore::new(HostBackend { t: self.t.clone() }, self.context())
    }

    /// Run `callback` now and every time the host asks the page to re-render
    pub fn on_render(&self, callback: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut()>::new(callback);
        self.t.render(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub async fn size_to(&self, selector: &str) -> Result<(), String> {
        settle(self.t.size_to(selector), "Resize").await.map(|_| ())
    }

    pub async fn attach(&self, url: &str) -> Result<(), String> {
        let attachment = serde_wasm_bindgen::to_value(&Attachment::new(url))
            .map_err(|e| format!("Failed to serialize attachment: {:?}", e))?;
        settle(self.t.attach(attachment), "Attach").await.map(|_| ())
    }

    pub async fn close_popup(&self) -> Result<(), String> {
        settle(self.t.close_popup(), "Close popup").await.map(|_| ())
    }
}

/// Scoped storage backed by the host's `getAll`/`set`
pub struct HostBackend {
    t: Rc<PowerUpContext>,
}

impl StorageBackend for HostBackend {
    async fn bucket(&self, scope: Scope, visibility: Visibility) -> Result<Bucket, SettingsError> {
        let all = settle(self.t.get_all(), "Read storage")
            .await
            .map_err(SettingsError::Host)?;
        bucket_from_all(all, scope, visibility)
    }

    async fn write(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        let promise = self.t.set(scope.as_str(), visibility.as_str(), key, value);
        settle(promise, "Write storage").await.map_err(|e| {
            error!("{}", e);
            SettingsError::Host(e)
        })?;
        Ok(())
    }
}

/// Pick one scope/visibility bucket out of a `getAll` result.
///
/// The host answers `undefined` when nothing was ever stored and leaves out
/// scopes and visibilities that hold no keys; all of those read as empty.
pub fn bucket_from_all(
    all: JsValue,
    scope: Scope,
    visibility: Visibility,
) -> Result<Bucket, SettingsError> {
    if all.is_undefined() || all.is_null() {
        return Ok(Bucket::new());
    }

    let mut all: HashMap<String, HashMap<String, Bucket>> = serde_wasm_bindgen::from_value(all)
        .map_err(|e| SettingsError::Host(format!("Unreadable storage: {:?}", e)))?;

    Ok(all
        .remove(scope.as_str())
        .and_then(|mut by_visibility| by_visibility.remove(visibility.as_str()))
        .unwrap_or_default())
}

type CapabilityHandler = dyn Fn(PowerUpContext, JsValue) -> Result<JsValue, JsValue>;

fn set_capability<F>(capabilities: &Object, name: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(PowerUpContext, JsValue) -> Result<JsValue, JsValue> + 'static,
{
    let closure = Closure::<CapabilityHandler>::new(handler);
    Reflect::set(capabilities, &JsValue::from_str(name), closure.as_ref())?;
    closure.forget();
    Ok(())
}

/// A JS function that opens `spec` as a popup when the host calls it
fn popup_callback(spec: PopupSpec) -> JsValue {
    let closure = Closure::<dyn Fn(PowerUpContext) -> Result<JsValue, JsValue>>::new(
        move |t: PowerUpContext| Ok(t.popup(to_js(&spec)?).into()),
    );
    let callback = closure.as_ref().clone();
    closure.forget();
    callback
}

fn signed_section(
    t: &PowerUpContext,
    plan: capabilities::SectionPlan,
) -> Result<AttachmentSection, JsValue> {
    let args = Object::new();
    Reflect::set(
        &args,
        &JsValue::from_str(plan.arg_name),
        &JsValue::from_str(&plan.arg_value),
    )?;
    let signed_url = t.sign_url(&plan.page, &args);
    Ok(plan.into_section(signed_url))
}

/// Register every capability this Power-Up answers with the host
pub fn register_capabilities(config: PowerUpConfig) -> Result<(), JsValue> {
    let config = Rc::new(config);
    let handlers = Object::new();

    {
        let config = config.clone();
        set_capability(&handlers, "attachment-sections", move |t, options| {
            let entries: Vec<Attachment> = option_field(&options, "entries")?;
            let sections = capabilities::attachment_sections(&entries, &config)
                .into_iter()
                .map(|plan| signed_section(&t, plan))
                .collect::<Result<Vec<_>, JsValue>>()?;
            to_js(&sections)
        })?;
    }

    {
        let config = config.clone();
        set_capability(&handlers, "attachment-thumbnail", move |t, options| {
            let url: String = option_field(&options, "url")?;
            match capabilities::attachment_thumbnail(&url, &config) {
                Some(thumbnail) => to_js(&thumbnail),
                None => Err(t.not_handled()),
            }
        })?;
    }

    {
        let config = config.clone();
        set_capability(&handlers, "card-badges", move |_, options| {
            let attachments: Vec<Attachment> = option_field(&options, "attachments")?;
            to_js(&capabilities::card_badges(&attachments, &config))
        })?;
    }

    {
        let config = config.clone();
        set_capability(&handlers, "card-buttons", move |_, _| {
            let buttons = js_sys::Array::new();
            for button in capabilities::card_buttons(&config) {
                let descriptor = to_js(&button)?;
                Reflect::set(
                    &descriptor,
                    &JsValue::from_str("callback"),
                    &popup_callback(button.popup),
                )?;
                buttons.push(&descriptor);
            }
            Ok(buttons.into())
        })?;
    }

    {
        let config = config.clone();
        set_capability(&handlers, "format-url", move |t, options| {
            let url: String = option_field(&options, "url")?;
            match capabilities::format_url(&url, &config) {
                Some(formatted) => to_js(&formatted),
                None => Err(t.not_handled()),
            }
        })?;
    }

    {
        let config = config.clone();
        set_capability(&handlers, "show-settings", move |t, _| {
            Ok(t.popup(to_js(&capabilities::settings_popup(&config))?).into())
        })?;
    }

    initialize(&handlers);
    info!("Power-Up capabilities registered");
    Ok(())
}
