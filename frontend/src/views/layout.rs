use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use super::AdminView;
use crate::constants::{GROUPS_CONTAINER_ID, MAIN_CONTAINER_ID, USERS_CONTAINER_ID};

const STYLE_ID: &str = "usergroup-admin-styles";

/// Create the `#main` area with the `#groups` and `#users` containers.
/// Containers already present in the host page are adopted as they are.
pub fn create_base_ui(document: &Document) -> Result<AdminView, JsValue> {
    ensure_styles(document)?;

    let main = match document.get_element_by_id(MAIN_CONTAINER_ID) {
        Some(main) => main,
        None => {
            let main = document.create_element("div")?;
            main.set_id(MAIN_CONTAINER_ID);

            let header = document.create_element("div")?;
            header.set_class_name("header");
            let title = document.create_element("h1")?;
            title.set_text_content(Some("Users and Groups"));
            header.append_child(&title)?;
            main.append_child(&header)?;

            let body = document.body().ok_or(JsValue::from_str("No body found"))?;
            body.append_child(&main)?;
            main
        }
    };

    let groups = ensure_container(document, &main, GROUPS_CONTAINER_ID)?;
    let users = ensure_container(document, &main, USERS_CONTAINER_ID)?;
    Ok(AdminView::new(groups, users))
}

fn ensure_container(document: &Document, main: &Element, id: &str) -> Result<Element, JsValue> {
    if let Some(el) = document.get_element_by_id(id) {
        return Ok(el);
    }
    let el = document.create_element("div")?;
    el.set_id(id);
    el.set_class_name("column");
    main.append_child(&el)?;
    Ok(el)
}

fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let css = "
#main{display:flex;flex-wrap:wrap;gap:24px;font-family:Arial,Helvetica,sans-serif}
#main .header{flex-basis:100%}
.column{flex:1;min-width:280px}
.nested{border:1px solid #cbd5e1;border-radius:4px;padding:6px 8px;margin:6px 0;background:#fff}
.nested .nested{margin-left:16px;background:#f8fafc}
.user[draggable=true]{cursor:move}
.typeIcon{vertical-align:middle;margin-right:4px}
.delete_icon{float:right;cursor:pointer}
b.name,b.realName{cursor:pointer}
.groupHover{background:#dbeafe}
.disabled{opacity:.4;pointer-events:none}
.properties{margin-top:6px;border-top:1px dashed #cbd5e1;padding-top:4px}
.properties td{padding:2px 6px}
";
    let style = document.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(css));
    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .body()
            .ok_or(JsValue::from_str("No body found"))?
            .append_child(&style)?,
    };
    Ok(())
}
