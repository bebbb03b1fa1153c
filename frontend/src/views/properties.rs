//! Property panel: a key/value table mounted under the block it was opened
//! from.  Values are edited in place and sent as `UPDATE` on change.

use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlInputElement, MouseEvent};

use super::AdminView;
use crate::constants::ICON_DELETE;
use crate::dom_utils;
use crate::messages::Message;
use crate::models::{EntityType, PropertyTarget};
use crate::registry::ElementKey;
use crate::state::{dispatch_global_message, AdminState};

// Shown but never editable
const READ_ONLY_KEYS: &[&str] = &["id", "type"];

/// Block the panel for `target` is mounted under.
pub fn anchor_key(target: &PropertyTarget) -> ElementKey {
    match (&target.group_id, target.entity.entity_type) {
        (Some(group_id), EntityType::User) => ElementKey::member(group_id, &target.entity.id),
        (_, EntityType::User) => ElementKey::User(target.entity.id.clone()),
        (_, EntityType::Group) => ElementKey::Group(target.entity.id.clone()),
    }
}

/// Text shown for a property value in the input field.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Remove the mounted panel and, when the state has one open, mount it again.
pub fn render_properties(view: &mut AdminView, document: &Document, state: &AdminState) -> Result<(), JsValue> {
    if let Some(old) = view.properties.take() {
        old.remove();
    }
    let Some(panel) = &state.property_panel else {
        return Ok(());
    };
    let Some(anchor) = view.registry.get(&anchor_key(&panel.target)).cloned() else {
        return Ok(());
    };

    let container = dom_utils::create_with_class(document, "div", "properties")?;

    let close = dom_utils::icon(document, ICON_DELETE, "delete_icon button", "Close properties")?;
    let target = panel.target.clone();
    dom_utils::listen(&close, "click", move |_: MouseEvent| {
        dispatch_global_message(Message::EditProperties(target.clone()));
    })?;
    container.append_child(&close)?;

    match &panel.properties {
        None => {
            let loading = dom_utils::create_with_class(document, "span", "loading")?;
            loading.set_text_content(Some("Loading..."));
            container.append_child(&loading)?;
        }
        Some(properties) => {
            let table = document.create_element("table")?;
            let mut keys: Vec<&String> = properties.keys().collect();
            keys.sort();
            for key in keys {
                let value = properties.get(key).unwrap_or(&Value::Null);
                let row = property_row(document, &panel.target.entity.id, key, value)?;
                table.append_child(&row)?;
            }
            container.append_child(&table)?;
        }
    }

    anchor.append_child(&container)?;
    view.properties = Some(container);
    Ok(())
}

fn property_row(document: &Document, id: &str, key: &str, value: &Value) -> Result<Element, JsValue> {
    let row = document.create_element("tr")?;

    let key_cell = dom_utils::create_with_class(document, "td", "key")?;
    key_cell.set_text_content(Some(key));
    row.append_child(&key_cell)?;

    let value_cell = dom_utils::create_with_class(document, "td", "value")?;
    if READ_ONLY_KEYS.contains(&key) {
        value_cell.set_text_content(Some(&display_value(value)));
    } else {
        let input = document.create_element("input")?.dyn_into::<HtmlInputElement>()?;
        input.set_name(key);
        input.set_value(&display_value(value));

        let id = id.to_string();
        let key = key.to_string();
        dom_utils::listen(&input, "change", move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            dispatch_global_message(Message::UpdateProperty {
                id: id.clone(),
                key: key.clone(),
                value: input.value(),
            });
        })?;
        value_cell.append_child(&input)?;
    }
    row.append_child(&value_cell)?;
    Ok(row)
}
