//! dom_utils.rs – thin helper layer for repetitive DOM operations.
//!
//! Small wrappers for element creation, the disabled state of guarded
//! controls and event wiring, so the view modules do not repeat the
//! `Closure::wrap(...)` / `forget()` dance for every listener.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::constants::DISABLED_CLASS;

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

/// Create `<tag class="class_name">`.
pub fn create_with_class(document: &Document, tag: &str, class_name: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class_name);
    Ok(el)
}

/// An `<img>` with the same text in `title` and `alt`.
pub fn icon(document: &Document, src: &str, class_name: &str, title: &str) -> Result<Element, JsValue> {
    let img = create_with_class(document, "img", class_name)?;
    img.set_attribute("src", src)?;
    if !title.is_empty() {
        img.set_attribute("title", title)?;
        img.set_attribute("alt", title)?;
    }
    Ok(img)
}

/// Disable or re-enable a guarded control.  Works for any element, the
/// `disabled` class is what the stylesheet keys on.
pub fn set_disabled(el: &Element, disabled: bool) -> Result<(), JsValue> {
    if disabled {
        el.class_list().add_1(DISABLED_CLASS)?;
        el.set_attribute("disabled", "disabled")?;
    } else {
        el.class_list().remove_1(DISABLED_CLASS)?;
        el.remove_attribute("disabled")?;
    }
    Ok(())
}

pub fn is_disabled(el: &Element) -> bool {
    el.class_list().contains(DISABLED_CLASS)
}

/// Remove every child node of `el`.
pub fn clear(el: &Element) {
    while let Some(child) = el.first_child() {
        if el.remove_child(&child).is_err() {
            break;
        }
    }
}

/// Ask the user to confirm a destructive action.
pub fn confirm(text: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(text).ok())
        .unwrap_or(false)
}

/// Attach a listener for `event_type` that lives as long as the page.
pub fn listen<E, F>(target: &Element, event_type: &str, handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let mut handler = handler;
    let closure = Closure::wrap(Box::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
