// frontend/src/update.rs
//
// The reducer: applies a `Message` to `AdminState` and records the side
// effects as `Command`s.  Nothing in here touches the DOM or the socket.
//
use crate::constants::CREATE_USER_CALLBACK;
use crate::guard::{ArmOutcome, ControlId};
use crate::messages::{Command, Message};
use crate::models::{Entity, EntityType, Group, User};
use crate::network::commands::{self as wire, CommandEnvelope};
use crate::state::{AdminState, PropertyPanel};
use crate::toast::ToastKind;

pub fn update(state: &mut AdminState, msg: Message, commands: &mut Vec<Command>) {
    match msg {
        Message::ConnectionOpened => {
            state.connected = true;
            commands.push(Command::SendMessage(Message::RefreshGroups));
            commands.push(Command::SendMessage(Message::RefreshUsers));
        }
        Message::ConnectionLost => {
            let was_connected = std::mem::replace(&mut state.connected, false);
            for control in state.guard.release_all() {
                commands.push(Command::SetControlDisabled { control, disabled: false });
            }
            // Failed reconnect attempts close again; only report the first loss
            if was_connected {
                commands.push(Command::Notify {
                    kind: ToastKind::Error,
                    text: "Connection to the server lost".to_string(),
                });
            }
        }

        Message::RefreshGroups => {
            state.groups.clear();
            state.members.clear();
            state.groups_listed = false;
            commands.push(Command::RenderGroups);
            commands.push(Command::Send(wire::list(EntityType::Group)));
        }
        Message::RefreshUsers => {
            state.users.clear();
            state.users_listed = false;
            commands.push(Command::RenderUsers);
            commands.push(Command::Send(wire::list(EntityType::User)));
        }
        Message::RefreshGroup(group_id) => {
            state.members.remove(&group_id);
            commands.push(Command::RenderMembers(group_id.clone()));
            commands.push(Command::Send(wire::list_members(&group_id)));
        }
        Message::EntitiesListed { entity_type, entities } => match entity_type {
            EntityType::Group => {
                state.groups = entities
                    .into_iter()
                    .filter_map(|e| match e {
                        Entity::Group(g) => Some(g),
                        Entity::User(_) => None,
                    })
                    .collect();
                state.groups_listed = true;
                let groups = &state.groups;
                state.members.retain(|id, _| groups.iter().any(|g| &g.id == id));
                debug_log!("Listed {} groups", state.groups.len());
                commands.push(Command::RenderGroups);
                for group in &state.groups {
                    commands.push(Command::Send(wire::list_members(&group.id)));
                }
            }
            EntityType::User => {
                state.users = entities
                    .into_iter()
                    .filter_map(|e| match e {
                        Entity::User(u) => Some(u),
                        Entity::Group(_) => None,
                    })
                    .collect();
                state.users_listed = true;
                debug_log!("Listed {} users", state.users.len());
                commands.push(Command::RenderUsers);
            }
        },
        Message::MembersListed { group_id, users } => {
            if state.group(&group_id).is_none() {
                debug_log!("Members for unknown group {}, ignoring", group_id);
                return;
            }
            state.members.insert(group_id.clone(), users);
            commands.push(Command::RenderMembers(group_id));
        }

        Message::RequestCreateGroup => {
            let envelope = wire::create_group(&mut state.rng);
            guarded_send(state, ControlId::AddGroup, envelope, commands);
        }
        Message::RequestCreateUser => {
            let envelope = wire::create_user(&mut state.rng);
            guarded_send(state, ControlId::AddUser, envelope, commands);
        }
        Message::RequestDelete { entity } => {
            let control = ControlId::Delete(entity.to_ref());
            guarded_send(state, control, wire::delete(&entity), commands);
        }
        Message::EntityCreated { entity, callback } => {
            debug_log!("Created {} {} (callback: {:?})", entity.entity_type(), entity.id(), callback);
            // CREATE is broadcast; only our own user creates carry the callback tag
            let control = match &entity {
                Entity::Group(_) => Some(ControlId::AddGroup),
                Entity::User(_) if callback.as_deref() == Some(CREATE_USER_CALLBACK) => Some(ControlId::AddUser),
                Entity::User(_) => None,
            };
            if let Some(control) = control.and_then(|c| state.guard.resolve_control(&c)) {
                commands.push(Command::SetControlDisabled { control, disabled: false });
                let text = match &entity {
                    Entity::Group(g) => format!("Group '{}' created", g.name),
                    Entity::User(u) => format!("User '{}' created", u.display_name()),
                };
                commands.push(Command::Notify { kind: ToastKind::Success, text });
            }
            match entity {
                Entity::Group(group) => {
                    if state.group(&group.id).is_none() {
                        state.groups.push(group);
                    }
                    commands.push(Command::RenderGroups);
                }
                Entity::User(user) => {
                    if state.user(&user.id).is_none() {
                        state.users.push(user);
                    }
                    commands.push(Command::RenderUsers);
                }
            }
        }
        Message::EntityDeleted { id } => {
            if let Some(control) = state.guard.resolve_delete(&id) {
                commands.push(Command::SetControlDisabled { control, disabled: false });
            }
            apply_deletion(state, &id, commands);
        }

        Message::AssignUserToGroup { user_id, group_id } => {
            debug_log!("Assigning user {} to group {}", user_id, group_id);
            commands.push(Command::Send(wire::add_to_group(&user_id, &group_id)));
        }
        Message::RemoveUserFromGroup { user_id, group_id } => {
            debug_log!("Removing user {} from group {}", user_id, group_id);
            commands.push(Command::Send(wire::remove_from_group(&user_id, &group_id)));
        }
        Message::MemberAdded { user_id, group_id } => {
            if state.group(&group_id).is_none() {
                return;
            }
            match state.user(&user_id).cloned() {
                Some(user) => {
                    let members = state.members.entry(group_id.clone()).or_default();
                    if !members.iter().any(|m| m.id == user.id) {
                        members.push(user);
                    }
                    commands.push(Command::RenderMembers(group_id));
                }
                // We do not know this user yet, ask for the whole member list
                None => commands.push(Command::Send(wire::list_members(&group_id))),
            }
        }
        Message::MemberRemoved { user_id, group_id } => {
            if let Some(members) = state.members.get_mut(&group_id) {
                members.retain(|m| m.id != user_id);
                commands.push(Command::RenderMembers(group_id));
            }
        }

        Message::EditProperties(target) => {
            let same = state
                .property_panel
                .as_ref()
                .map_or(false, |panel| panel.target == target);
            if same {
                state.property_panel = None;
            } else {
                commands.push(Command::Send(wire::get_properties(&target.entity.id)));
                state.property_panel = Some(PropertyPanel { target, properties: None });
            }
            commands.push(Command::RenderProperties);
        }
        Message::PropertiesLoaded { id, properties } => {
            if let Some(panel) = state.property_panel.as_mut() {
                if panel.target.entity.id == id {
                    panel.properties = Some(properties);
                    commands.push(Command::RenderProperties);
                }
            }
        }
        Message::UpdateProperty { id, key, value } => {
            commands.push(Command::Send(wire::update_property(&id, &key, &value)));
        }
        Message::EntityUpdated { id, properties } => {
            let name = properties.get("name").and_then(|v| v.as_str()).map(str::to_string);
            let real_name = properties.get("realName").and_then(|v| v.as_str()).map(str::to_string);

            if let Some(group) = state.groups.iter_mut().find(|g| g.id == id) {
                if let Some(name) = &name {
                    group.name = name.clone();
                }
                commands.push(Command::RenderGroups);
            }
            let mut user_touched = false;
            let patch = |user: &mut User| {
                if let Some(name) = &name {
                    user.name = name.clone();
                }
                if let Some(real) = &real_name {
                    user.real_name = Some(real.clone());
                }
            };
            if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
                patch(user);
                user_touched = true;
            }
            let mut touched_groups: Vec<String> = Vec::new();
            for (group_id, members) in state.members.iter_mut() {
                if let Some(user) = members.iter_mut().find(|u| u.id == id) {
                    patch(user);
                    touched_groups.push(group_id.clone());
                }
            }
            if user_touched {
                commands.push(Command::RenderUsers);
            }
            touched_groups.sort();
            commands.extend(touched_groups.into_iter().map(Command::RenderMembers));

            if let Some(panel) = state.property_panel.as_mut() {
                if panel.target.entity.id == id {
                    let loaded = panel.properties.get_or_insert_with(Default::default);
                    loaded.extend(properties);
                    commands.push(Command::RenderProperties);
                }
            }
        }

        Message::CommandFailed { command, code, message } => {
            warn_log!("{} failed with code {}: {}", command, code, message);
            if let Some(control) = state.guard.resolve_kind(command) {
                commands.push(Command::SetControlDisabled { control, disabled: false });
            }
            commands.push(Command::Notify {
                kind: ToastKind::Error,
                text: format!("{} failed: {}", command, message),
            });
        }
    }
}

/// Arm `control` and send `envelope`, unless that control already waits on
/// a command.
fn guarded_send(
    state: &mut AdminState,
    control: ControlId,
    envelope: CommandEnvelope,
    commands: &mut Vec<Command>,
) {
    if state.guard.try_arm(control.clone(), envelope.command) == ArmOutcome::Rejected {
        debug_log!("Control {} is disabled, ignoring", control);
        return;
    }
    commands.push(Command::SetControlDisabled { control, disabled: true });
    commands.push(Command::Send(envelope));
}

fn apply_deletion(state: &mut AdminState, id: &str, commands: &mut Vec<Command>) {
    let groups_before = state.groups.len();
    state.groups.retain(|g: &Group| g.id != id);
    if state.groups.len() != groups_before {
        state.members.remove(id);
        commands.push(Command::RenderGroups);
    }

    let users_before = state.users.len();
    state.users.retain(|u| u.id != id);
    if state.users.len() != users_before {
        commands.push(Command::RenderUsers);
    }

    let mut touched: Vec<String> = Vec::new();
    for (group_id, members) in state.members.iter_mut() {
        let before = members.len();
        members.retain(|u| u.id != id);
        if members.len() != before {
            touched.push(group_id.clone());
        }
    }
    touched.sort();
    commands.extend(touched.into_iter().map(Command::RenderMembers));

    let panel_shows_deleted = state
        .property_panel
        .as_ref()
        .map_or(false, |panel| panel.target.entity.id == id);
    if panel_shows_deleted {
        state.property_panel = None;
        commands.push(Command::RenderProperties);
    }
}
