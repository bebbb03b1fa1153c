use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::messages::{Command, Message};
use crate::network;
use crate::state::{dispatch_global_message, AdminState};
use crate::toast;
use crate::views::{self, AdminView};

pub fn execute_commands(commands: Vec<Command>) {
    for cmd in commands {
        execute_command(cmd);
    }
}

pub fn execute_command(cmd: Command) {
    match cmd {
        Command::SendMessage(msg) => dispatch_global_message(msg),
        Command::Send(envelope) => {
            if let Err(e) = network::send_command(&envelope) {
                warn_log!("Could not send {} command: {}", envelope.command, e);
                dispatch_global_message(Message::CommandFailed {
                    command: envelope.command,
                    code: 0,
                    message: e.to_string(),
                });
            }
        }
        Command::RenderGroups => render(views::groups::render_groups),
        Command::RenderUsers => render(views::users::render_users),
        Command::RenderMembers(group_id) => render(|view, document, state| {
            views::groups::render_members(view, document, state, &group_id)
        }),
        Command::RenderProperties => render(views::properties::render_properties),
        Command::SetControlDisabled { control, disabled } => {
            render(|view, _, _| view.set_control_disabled(&control, disabled))
        }
        Command::Notify { kind, text } => toast::show(&text, kind),
    }
}

fn render<F>(f: F)
where
    F: FnOnce(&mut AdminView, &Document, &AdminState) -> Result<(), JsValue>,
{
    if let Err(e) = views::with_view(f) {
        web_sys::console::error_1(&format!("Render failed: {:?}", e).into());
    }
}
