// frontend/src/views/mod.rs
//
// Rendering of the admin panel from `AdminState`.  Every render function
// takes the view model explicitly; the thread-local `VIEW` only exists so
// the command executor can reach it.
//
pub mod drag;
pub mod groups;
pub mod layout;
pub mod properties;
pub mod users;

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{Document, Element, MouseEvent};

use crate::dom_utils;
use crate::guard::{ControlGuard, ControlId};
use crate::messages::Message;
use crate::registry::{ElementKey, ElementRegistry};
use crate::state::{dispatch_global_message, APP_STATE};

/// Container handles plus the keyed registry of everything rendered into
/// them.
pub struct AdminView {
    pub groups: Element,
    pub users: Element,
    pub registry: ElementRegistry<Element>,
    // Mounted property panel, if any
    pub properties: Option<Element>,
}

impl AdminView {
    pub fn new(groups: Element, users: Element) -> Self {
        Self {
            groups,
            users,
            registry: ElementRegistry::new(),
            properties: None,
        }
    }

    /// Reflect the guard on the element registered for `control`.
    pub fn set_control_disabled(&self, control: &ControlId, disabled: bool) -> Result<(), JsValue> {
        match self.registry.get(&ElementKey::Control(control.clone())) {
            Some(el) => dom_utils::set_disabled(el, disabled),
            None => Ok(()),
        }
    }
}

thread_local! {
    pub static VIEW: RefCell<Option<AdminView>> = RefCell::new(None);
}

/// Build (or adopt) the page layout and install the view model.
pub fn mount(document: &Document) -> Result<(), JsValue> {
    let view = layout::create_base_ui(document)?;
    VIEW.with(|slot| *slot.borrow_mut() = Some(view));
    Ok(())
}

/// Run `f` with the mounted view and a read-only look at the state.  Does
/// nothing before `mount`.
pub fn with_view<F>(f: F) -> Result<(), JsValue>
where
    F: FnOnce(&mut AdminView, &Document, &crate::state::AdminState) -> Result<(), JsValue>,
{
    let document = dom_utils::document()?;
    VIEW.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(view) = slot.as_mut() else {
            return Ok(());
        };
        APP_STATE.with(|state_ref| {
            let state = state_ref.borrow();
            f(view, &document, &state)
        })
    })
}

/// Build a guarded control that dispatches `msg` when clicked, register it
/// and reflect the current guard state on it.
pub(crate) fn guarded_control(
    view: &mut AdminView,
    element: Element,
    control: ControlId,
    guard: &ControlGuard,
    msg: Message,
    confirm_text: Option<String>,
) -> Result<Element, JsValue> {
    if guard.is_disabled(&control) {
        dom_utils::set_disabled(&element, true)?;
    }
    let clicked = element.clone();
    dom_utils::listen(&element, "click", move |_: MouseEvent| {
        if dom_utils::is_disabled(&clicked) {
            return;
        }
        if let Some(text) = &confirm_text {
            if !dom_utils::confirm(text) {
                return;
            }
        }
        dispatch_global_message(msg.clone());
    })?;
    view.registry.insert(ElementKey::Control(control), element.clone());
    Ok(element)
}

/// `<button class="{class} button"><img> {label}</button>`
pub(crate) fn add_button(document: &Document, class: &str, icon_src: &str, label: &str) -> Result<Element, JsValue> {
    let button = dom_utils::create_with_class(document, "button", &format!("{} button", class))?;
    let img = dom_utils::icon(document, icon_src, "", label)?;
    button.append_child(&img)?;
    button.insert_adjacent_text("beforeend", &format!(" {}", label))?;
    Ok(button)
}

/// Label shared by group and user blocks: `<img> <b class="{label_class}">…</b> <span>[id]</span>`.
pub(crate) fn append_label(
    document: &Document,
    block: &Element,
    icon_src: &str,
    label_class: &str,
    text: &str,
    id: &str,
) -> Result<Element, JsValue> {
    let type_icon = dom_utils::icon(document, icon_src, "typeIcon", "")?;
    block.append_child(&type_icon)?;
    let name = dom_utils::create_with_class(document, "b", label_class)?;
    name.set_text_content(Some(text));
    block.append_child(&name)?;
    let id_span = dom_utils::create_with_class(document, "span", "id")?;
    id_span.set_text_content(Some(&format!(" [{}]", id)));
    block.append_child(&id_span)?;
    Ok(name)
}
