use wasm_bindgen::prelude::*;
use web_sys::{Document, DragEvent, Element, MouseEvent};

use super::drag::parse_user_drag;
use super::{add_button, append_label, guarded_control, properties, users, AdminView};
use crate::constants::{DRAG_MIME_TYPE, GROUP_HOVER_CLASS, ICON_GROUP, ICON_GROUP_ADD, ICON_GROUP_DELETE};
use crate::dom_utils;
use crate::guard::{ControlGuard, ControlId};
use crate::messages::Message;
use crate::models::{Entity, Group, PropertyTarget};
use crate::registry::ElementKey;
use crate::state::{dispatch_global_message, AdminState};

/// Redraw the groups container: one block per group with its members, then
/// a single Add control when there is at least one group.
pub fn render_groups(view: &mut AdminView, document: &Document, state: &AdminState) -> Result<(), JsValue> {
    dom_utils::clear(&view.groups);
    view.registry.remove_where(ElementKey::in_groups_container);

    for group in &state.groups {
        append_group_element(view, document, group, &state.guard)?;
        for user in state.members_of(&group.id) {
            users::append_user_element(view, document, user, Some(&group.id), &state.guard)?;
        }
    }

    if !state.groups.is_empty() {
        let button = add_button(document, "add_group_icon", ICON_GROUP_ADD, "Add Group")?;
        let button = guarded_control(view, button, ControlId::AddGroup, &state.guard, Message::RequestCreateGroup, None)?;
        view.groups.append_child(&button)?;
    }

    properties::render_properties(view, document, state)
}

/// Redraw only the nested member blocks of one group.
pub fn render_members(
    view: &mut AdminView,
    document: &Document,
    state: &AdminState,
    group_id: &str,
) -> Result<(), JsValue> {
    if !view.registry.contains(&ElementKey::Group(group_id.to_string())) {
        return Ok(());
    }
    for el in view.registry.remove_members_of(group_id) {
        el.remove();
    }
    for user in state.members_of(group_id) {
        users::append_user_element(view, document, user, Some(group_id), &state.guard)?;
    }
    properties::render_properties(view, document, state)
}

/// Append one group block to the groups container and register it.
pub fn append_group_element(
    view: &mut AdminView,
    document: &Document,
    group: &Group,
    guard: &ControlGuard,
) -> Result<Element, JsValue> {
    let div = dom_utils::create_with_class(document, "div", &format!("nested top group {}_", group.id))?;
    let name = append_label(document, &div, ICON_GROUP, "name", &group.name, &group.id)?;

    let entity = Entity::Group(group.clone());
    let title = format!("Delete Group {}", group.id);
    let delete = dom_utils::icon(document, ICON_GROUP_DELETE, "delete_icon button", &title)?;
    let delete = guarded_control(
        view,
        delete,
        ControlId::Delete(entity.to_ref()),
        guard,
        Message::RequestDelete { entity: entity.clone() },
        Some(format!("Delete group '{}'?", group.name)),
    )?;
    div.append_child(&delete)?;

    let target = PropertyTarget { entity: entity.to_ref(), group_id: None };
    dom_utils::listen(&name, "click", move |_: MouseEvent| {
        dispatch_global_message(Message::EditProperties(target.clone()));
    })?;

    add_drop_target(&div, &group.id)?;

    view.groups.append_child(&div)?;
    view.registry.insert(ElementKey::Group(group.id.clone()), div.clone());
    Ok(div)
}

fn carries_user(event: &DragEvent) -> bool {
    event.data_transfer().map_or(false, |dt| {
        let types: js_sys::Array = dt.types();
        types.includes(&JsValue::from_str(DRAG_MIME_TYPE), 0)
    })
}

// Group blocks accept dragged top-level users
fn add_drop_target(div: &Element, group_id: &str) -> Result<(), JsValue> {
    let hovered = div.clone();
    dom_utils::listen(div, "dragover", move |event: DragEvent| {
        if carries_user(&event) {
            event.prevent_default();
            let _ = hovered.class_list().add_1(GROUP_HOVER_CLASS);
        }
    })?;

    let left = div.clone();
    dom_utils::listen(div, "dragleave", move |_: DragEvent| {
        let _ = left.class_list().remove_1(GROUP_HOVER_CLASS);
    })?;

    let dropped = div.clone();
    let group_id = group_id.to_string();
    dom_utils::listen(div, "drop", move |event: DragEvent| {
        event.prevent_default();
        let _ = dropped.class_list().remove_1(GROUP_HOVER_CLASS);
        let raw = event.data_transfer().and_then(|dt| dt.get_data(DRAG_MIME_TYPE).ok());
        match raw.as_deref().and_then(parse_user_drag) {
            Some(user_id) => dispatch_global_message(Message::AssignUserToGroup {
                user_id,
                group_id: group_id.clone(),
            }),
            None => web_sys::console::warn_1(&"Ignoring drop without a user payload".into()),
        }
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::models::{EntityRef, EntityType, User};
    use crate::network::tests::MockWsClient;
    use crate::network::{self, ConnectionState};
    use crate::state::APP_STATE;
    use crate::views::drag::DragPayload;
    use serde_json::json;
    use wasm_bindgen_test::*;
    use web_sys::{DataTransfer, DragEventInit, HtmlElement};

    wasm_bindgen_test_configure!(run_in_browser);

    // Transport that records what the global dispatcher sends
    fn recording_client() -> MockWsClient {
        let mock = MockWsClient::new(ConnectionState::Connected);
        network::install_client(Rc::new(RefCell::new(mock.clone())));
        mock
    }

    fn drop_event(payload: Option<&str>) -> DragEvent {
        let data = DataTransfer::new().unwrap();
        if let Some(payload) = payload {
            data.set_data(DRAG_MIME_TYPE, payload).unwrap();
        }
        let init = DragEventInit::new();
        init.set_data_transfer(Some(&data));
        DragEvent::new_with_event_init_dict("drop", &init).unwrap()
    }

    fn fresh_view(document: &Document) -> AdminView {
        let groups = document.create_element("div").unwrap();
        let users = document.create_element("div").unwrap();
        AdminView::new(groups, users)
    }

    fn listed_state(groups: &[(&str, &str)]) -> AdminState {
        let mut state = AdminState::with_seed(1);
        state.dispatch(Message::EntitiesListed {
            entity_type: EntityType::Group,
            entities: groups
                .iter()
                .map(|(id, name)| Entity::Group(Group { id: id.to_string(), name: name.to_string() }))
                .collect(),
        });
        state
    }

    #[wasm_bindgen_test]
    fn blocks_render_in_listed_order() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        let state = listed_state(&[("g1", "Alpha"), ("g2", "Beta")]);

        render_groups(&mut view, &document, &state).unwrap();

        let blocks = view.groups.query_selector_all("div.group").unwrap();
        assert_eq!(blocks.length(), 2);
        let names = view.groups.query_selector_all("div.group > b.name").unwrap();
        assert_eq!(names.item(0).unwrap().text_content().unwrap(), "Alpha");
        assert_eq!(names.item(1).unwrap().text_content().unwrap(), "Beta");
        assert_eq!(view.groups.query_selector_all("div.group > .delete_icon").unwrap().length(), 2);
        assert!(view.registry.contains(&ElementKey::Group("g1".into())));
    }

    #[wasm_bindgen_test]
    fn repeated_render_keeps_single_add_control() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        let state = listed_state(&[("g1", "Alpha"), ("g2", "Beta")]);

        render_groups(&mut view, &document, &state).unwrap();
        render_groups(&mut view, &document, &state).unwrap();

        assert_eq!(view.groups.query_selector_all(".add_group_icon").unwrap().length(), 1);
        assert_eq!(view.groups.query_selector_all("div.group").unwrap().length(), 2);
    }

    #[wasm_bindgen_test]
    fn empty_list_has_no_add_control() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        render_groups(&mut view, &document, &listed_state(&[])).unwrap();
        assert_eq!(view.groups.child_element_count(), 0);
    }

    #[wasm_bindgen_test]
    fn armed_add_control_renders_disabled() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        let mut state = listed_state(&[("g1", "Alpha")]);
        state.dispatch(Message::RequestCreateGroup);

        render_groups(&mut view, &document, &state).unwrap();
        let button = view.groups.query_selector(".add_group_icon").unwrap().unwrap();
        assert!(dom_utils::is_disabled(&button));
    }

    #[wasm_bindgen_test]
    fn members_render_nested_in_group_block() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        let mut state = listed_state(&[("g1", "Alpha")]);
        state.dispatch(Message::MembersListed {
            group_id: "g1".into(),
            users: vec![User { id: "u1".into(), name: "1".into(), real_name: Some("Jane".into()) }],
        });

        render_groups(&mut view, &document, &state).unwrap();
        let block = view.registry.get(&ElementKey::Group("g1".into())).unwrap().clone();
        assert_eq!(block.query_selector_all("div.user").unwrap().length(), 1);

        state.dispatch(Message::MemberRemoved { user_id: "u1".into(), group_id: "g1".into() });
        render_members(&mut view, &document, &state, "g1").unwrap();
        assert_eq!(block.query_selector_all("div.user").unwrap().length(), 0);
    }

    #[wasm_bindgen_test]
    fn dropping_user_on_group_sends_one_add() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        render_groups(&mut view, &document, &listed_state(&[("g1", "Alpha"), ("g2", "Beta")])).unwrap();
        let mock = recording_client();

        let block = view.registry.get(&ElementKey::Group("g1".into())).unwrap().clone();
        block.class_list().add_1(GROUP_HOVER_CLASS).unwrap();
        let payload = DragPayload::user("u1").to_json();
        block.dispatch_event(&drop_event(Some(&payload))).unwrap();

        assert_eq!(mock.sent_values(), vec![json!({ "command": "ADD", "id": "g1", "data": { "id": "u1" } })]);
        assert!(!block.class_list().contains(GROUP_HOVER_CLASS));
    }

    #[wasm_bindgen_test]
    fn drop_without_user_payload_sends_nothing() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        render_groups(&mut view, &document, &listed_state(&[("g1", "Alpha")])).unwrap();
        let mock = recording_client();

        let block = view.registry.get(&ElementKey::Group("g1".into())).unwrap().clone();
        block.dispatch_event(&drop_event(None)).unwrap();

        assert!(mock.sent_values().is_empty());
    }

    #[wasm_bindgen_test]
    fn label_click_opens_properties_for_that_group() {
        let document = dom_utils::document().unwrap();
        let mut view = fresh_view(&document);
        render_groups(&mut view, &document, &listed_state(&[("g1", "Alpha"), ("g2", "Beta")])).unwrap();
        let mock = recording_client();
        APP_STATE.with(|state| state.borrow_mut().property_panel = None);

        let block = view.registry.get(&ElementKey::Group("g2".into())).unwrap().clone();
        let label: HtmlElement = block.query_selector("b.name").unwrap().unwrap().dyn_into().unwrap();
        label.click();

        let target = APP_STATE.with(|state| state.borrow().property_panel.as_ref().map(|p| p.target.clone()));
        assert_eq!(
            target,
            Some(PropertyTarget { entity: EntityRef::new("g2", EntityType::Group), group_id: None })
        );
        assert_eq!(mock.sent_values(), vec![json!({ "command": "GET", "id": "g2" })]);
    }
}
