use wasm_bindgen::prelude::*;
use web_sys::{Document, DragEvent, Element, MouseEvent};

use super::drag::DragPayload;
use super::{add_button, append_label, guarded_control, properties, AdminView};
use crate::constants::{DRAG_MIME_TYPE, ICON_DELETE, ICON_USER, ICON_USER_ADD, ICON_USER_DELETE};
use crate::dom_utils;
use crate::guard::{ControlGuard, ControlId};
use crate::messages::Message;
use crate::models::{Entity, EntityRef, EntityType, PropertyTarget, User};
use crate::registry::ElementKey;
use crate::state::{dispatch_global_message, AdminState};

/// Redraw the top-level users container.
pub fn render_users(view: &mut AdminView, document: &Document, state: &AdminState) -> Result<(), JsValue> {
    dom_utils::clear(&view.users);
    view.registry.remove_where(ElementKey::in_users_container);

    for user in &state.users {
        append_user_element(view, document, user, None, &state.guard)?;
    }

    if !state.users.is_empty() {
        let button = add_button(document, "add_user_icon", ICON_USER_ADD, "Add User")?;
        let button = guarded_control(view, button, ControlId::AddUser, &state.guard, Message::RequestCreateUser, None)?;
        view.users.append_child(&button)?;
    }

    properties::render_properties(view, document, state)
}

/// Append a user block.  With `group_id` the block goes inside that group's
/// block and its delete icon only removes the membership; without it the
/// block goes into the users container, is draggable and deletes the user.
pub fn append_user_element(
    view: &mut AdminView,
    document: &Document,
    user: &User,
    group_id: Option<&str>,
    guard: &ControlGuard,
) -> Result<Option<Element>, JsValue> {
    let div = dom_utils::create_with_class(document, "div", &format!("nested user {}_", user.id))?;
    let name = append_label(document, &div, ICON_USER, "realName", user.display_name(), &user.id)?;

    let target = PropertyTarget {
        entity: EntityRef::new(user.id.as_str(), EntityType::User),
        group_id: group_id.map(str::to_string),
    };
    dom_utils::listen(&name, "click", move |_: MouseEvent| {
        dispatch_global_message(Message::EditProperties(target.clone()));
    })?;

    match group_id {
        Some(group_id) => {
            let Some(parent) = view.registry.get(&ElementKey::Group(group_id.to_string())).cloned() else {
                web_sys::console::warn_1(&format!("No block for group {}, skipping member {}", group_id, user.id).into());
                return Ok(None);
            };
            let title = format!("Remove user {} from group {}", user.id, group_id);
            let remove = dom_utils::icon(document, ICON_USER_DELETE, "delete_icon button", &title)?;
            let msg = Message::RemoveUserFromGroup {
                user_id: user.id.clone(),
                group_id: group_id.to_string(),
            };
            dom_utils::listen(&remove, "click", move |_: MouseEvent| {
                dispatch_global_message(msg.clone());
            })?;
            div.append_child(&remove)?;

            parent.append_child(&div)?;
            view.registry.insert(ElementKey::member(group_id, &user.id), div.clone());
        }
        None => {
            let entity = Entity::User(user.clone());
            let title = format!("Delete user {}", user.id);
            let delete = dom_utils::icon(document, ICON_DELETE, "delete_icon button", &title)?;
            let delete = guarded_control(
                view,
                delete,
                ControlId::Delete(entity.to_ref()),
                guard,
                Message::RequestDelete { entity },
                Some(format!("Delete user '{}'?", user.display_name())),
            )?;
            div.append_child(&delete)?;

            make_draggable(&div, &user.id)?;

            view.users.append_child(&div)?;
            view.registry.insert(ElementKey::User(user.id.clone()), div.clone());
        }
    }
    Ok(Some(div))
}

// The block itself never moves; dropping outside a group leaves it in place.
fn make_draggable(div: &Element, user_id: &str) -> Result<(), JsValue> {
    div.set_attribute("draggable", "true")?;
    let payload = DragPayload::user(user_id).to_json();
    dom_utils::listen(div, "dragstart", move |event: DragEvent| {
        if let Some(data_transfer) = event.data_transfer() {
            let _ = data_transfer.set_data(DRAG_MIME_TYPE, &payload);
            data_transfer.set_effect_allowed("link");
        }
    })
}
