//! Inbound frames from the backend and their translation into `Message`s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::commands::CommandKind;
use crate::messages::Message;
use crate::models::{Entity, EntityType, User};

/// Status codes at or above this value mark a failed command.
pub const FIRST_ERROR_CODE: u16 = 400;

/// Response frame as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub command: CommandKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub callback: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
}

impl ServerMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_error(&self) -> bool {
        self.code.map_or(false, |c| c >= FIRST_ERROR_CODE)
    }

    fn data_str(&self, key: &str) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn data_object(&self) -> Map<String, Value> {
        match &self.data {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

fn decode_entities(values: &[Value]) -> Vec<Entity> {
    values
        .iter()
        .filter_map(|v| match serde_json::from_value::<Entity>(v.clone()) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn_log!("Skipping undecodable entity {}: {}", v, e);
                None
            }
        })
        .collect()
}

fn decode_users(values: &[Value]) -> Vec<User> {
    decode_entities(values)
        .into_iter()
        .filter_map(|e| match e {
            Entity::User(u) => Some(u),
            Entity::Group(_) => None,
        })
        .collect()
}

/// Map a backend frame onto the message the reducer understands.
/// Returns `None` for frames this panel has no use for.
pub fn route(frame: ServerMessage) -> Option<Message> {
    if frame.is_error() {
        return Some(Message::CommandFailed {
            command: frame.command,
            code: frame.code.unwrap_or_default(),
            message: frame.message.unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    match frame.command {
        CommandKind::List => {
            let results = frame.result.as_deref().unwrap_or(&[]);
            let entities = decode_entities(results);
            let listed_type = frame
                .data
                .as_ref()
                .and_then(|d| d.get("type"))
                .and_then(|t| serde_json::from_value::<EntityType>(t.clone()).ok())
                .or_else(|| entities.first().map(Entity::entity_type));
            match listed_type {
                Some(entity_type) => Some(Message::EntitiesListed {
                    entity_type,
                    entities: entities
                        .into_iter()
                        .filter(|e| e.entity_type() == entity_type)
                        .collect(),
                }),
                None => {
                    warn_log!("LIST response without a type, ignoring");
                    None
                }
            }
        }
        CommandKind::Create => {
            let data = frame.data.clone()?;
            match serde_json::from_value::<Entity>(data) {
                Ok(entity) => Some(Message::EntityCreated {
                    entity,
                    callback: frame.callback,
                }),
                Err(e) => {
                    warn_log!("CREATE response with undecodable entity: {}", e);
                    None
                }
            }
        }
        CommandKind::Delete => frame.id.map(|id| Message::EntityDeleted { id }),
        CommandKind::Add => Some(Message::MemberAdded {
            user_id: frame.data_str("id")?,
            group_id: frame.id?,
        }),
        CommandKind::Remove => Some(Message::MemberRemoved {
            user_id: frame.data_str("id")?,
            group_id: frame.id?,
        }),
        CommandKind::Children => {
            let users = decode_users(frame.result.as_deref().unwrap_or(&[]));
            Some(Message::MembersListed {
                group_id: frame.id?,
                users,
            })
        }
        CommandKind::Get => {
            let properties = frame.data_object();
            Some(Message::PropertiesLoaded {
                id: frame.id?,
                properties,
            })
        }
        CommandKind::Update => {
            let properties = frame.data_object();
            Some(Message::EntityUpdated {
                id: frame.id?,
                properties,
            })
        }
        CommandKind::Unknown => {
            debug_log!("Ignoring frame with unknown command");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;
    use serde_json::json;

    fn frame(value: Value) -> ServerMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn list_keeps_backend_order() {
        let msg = route(frame(json!({
            "command": "LIST",
            "data": { "type": "Group" },
            "result": [
                { "type": "Group", "id": "g1", "name": "Alpha" },
                { "type": "Group", "id": "g2", "name": "Beta" }
            ]
        })));
        let expected = Message::EntitiesListed {
            entity_type: EntityType::Group,
            entities: vec![
                Entity::Group(Group { id: "g1".into(), name: "Alpha".into() }),
                Entity::Group(Group { id: "g2".into(), name: "Beta".into() }),
            ],
        };
        assert_eq!(msg, Some(expected));
    }

    #[test]
    fn empty_list_still_reports_type() {
        let msg = route(frame(json!({ "command": "LIST", "data": { "type": "User" }, "result": [] })));
        assert_eq!(msg, Some(Message::EntitiesListed { entity_type: EntityType::User, entities: vec![] }));
    }

    #[test]
    fn list_infers_type_and_skips_garbage() {
        let msg = route(frame(json!({
            "command": "LIST",
            "result": [
                { "type": "User", "id": "u1", "name": "1" },
                { "id": "broken" }
            ]
        })));
        match msg {
            Some(Message::EntitiesListed { entity_type, entities }) => {
                assert_eq!(entity_type, EntityType::User);
                assert_eq!(entities.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn untyped_empty_list_is_ignored() {
        assert_eq!(route(frame(json!({ "command": "LIST", "result": [] }))), None);
    }

    #[test]
    fn create_carries_callback() {
        let msg = route(frame(json!({
            "command": "CREATE",
            "callback": "test",
            "data": { "type": "User", "id": "u7", "name": "7", "realName": "New user_7" }
        })));
        match msg {
            Some(Message::EntityCreated { entity, callback }) => {
                assert_eq!(entity.id(), "u7");
                assert_eq!(callback.as_deref(), Some("test"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn membership_frames() {
        assert_eq!(
            route(frame(json!({ "command": "ADD", "id": "g1", "data": { "id": "u1" } }))),
            Some(Message::MemberAdded { user_id: "u1".into(), group_id: "g1".into() })
        );
        assert_eq!(
            route(frame(json!({ "command": "REMOVE", "id": "g1", "data": { "id": "u1" } }))),
            Some(Message::MemberRemoved { user_id: "u1".into(), group_id: "g1".into() })
        );
        assert_eq!(route(frame(json!({ "command": "ADD", "id": "g1" }))), None);
    }

    #[test]
    fn children_only_yields_users() {
        let msg = route(frame(json!({
            "command": "CHILDREN",
            "id": "g1",
            "result": [
                { "type": "User", "id": "u1", "name": "1" },
                { "type": "Group", "id": "g9", "name": "nested" }
            ]
        })));
        match msg {
            Some(Message::MembersListed { group_id, users }) => {
                assert_eq!(group_id, "g1");
                assert_eq!(users.len(), 1);
                assert_eq!(users[0].id, "u1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn error_code_becomes_failure() {
        let msg = route(frame(json!({ "command": "CREATE", "code": 422, "message": "name taken" })));
        assert_eq!(
            msg,
            Some(Message::CommandFailed { command: CommandKind::Create, code: 422, message: "name taken".into() })
        );
    }

    #[test]
    fn delete_and_properties() {
        assert_eq!(
            route(frame(json!({ "command": "DELETE", "id": "g1", "code": 200 }))),
            Some(Message::EntityDeleted { id: "g1".into() })
        );
        match route(frame(json!({ "command": "GET", "id": "u1", "data": { "name": "1", "realName": "X" } }))) {
            Some(Message::PropertiesLoaded { id, properties }) => {
                assert_eq!(id, "u1");
                assert_eq!(properties.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_command_is_dropped() {
        assert_eq!(route(frame(json!({ "command": "PING" }))), None);
        assert!(ServerMessage::parse("not json").is_err());
    }
}
