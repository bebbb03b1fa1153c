//! Outbound command envelopes.
//!
//! Every request the panel makes is a single JSON object with a `command`
//! verb and optional `id`, `callback` and `data` fields.  The builders here
//! are the only place those objects are assembled.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    CREATE_USER_CALLBACK, NEW_GROUP_NAME_PREFIX, NEW_USER_REAL_NAME_PREFIX, PLACEHOLDER_MAX,
    PLACEHOLDER_MIN,
};
use crate::models::{Entity, EntityType};

/// Command verbs understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Create,
    Delete,
    List,
    Add,
    Remove,
    Children,
    Get,
    Update,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CommandKind::Create => "CREATE",
            CommandKind::Delete => "DELETE",
            CommandKind::List => "LIST",
            CommandKind::Add => "ADD",
            CommandKind::Remove => "REMOVE",
            CommandKind::Children => "CHILDREN",
            CommandKind::Get => "GET",
            CommandKind::Update => "UPDATE",
            CommandKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Entity-shaped `data` payload. Unset fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPayload {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "realName", skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandData {
    Entity(EntityPayload),
    Properties(Map<String, Value>),
}

/// A single request to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: CommandKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CommandData>,
}

impl CommandEnvelope {
    fn new(command: CommandKind) -> Self {
        Self {
            command,
            id: None,
            callback: None,
            data: None,
        }
    }

    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn with_payload(mut self, payload: EntityPayload) -> Self {
        self.data = Some(CommandData::Entity(payload));
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Payload fields, if this envelope carries an entity-shaped `data`.
    pub fn payload(&self) -> Option<&EntityPayload> {
        match &self.data {
            Some(CommandData::Entity(p)) => Some(p),
            _ => None,
        }
    }
}

fn placeholder_number<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(PLACEHOLDER_MIN..=PLACEHOLDER_MAX)
}

/// `CREATE` for a Group with a random placeholder name.
pub fn create_group<R: Rng + ?Sized>(rng: &mut R) -> CommandEnvelope {
    let n = placeholder_number(rng);
    CommandEnvelope::new(CommandKind::Create).with_payload(EntityPayload {
        entity_type: Some(EntityType::Group),
        name: Some(format!("{}{}", NEW_GROUP_NAME_PREFIX, n)),
        ..Default::default()
    })
}

/// `CREATE` for a User; the numeric placeholder doubles as login name.
pub fn create_user<R: Rng + ?Sized>(rng: &mut R) -> CommandEnvelope {
    let n = placeholder_number(rng);
    let mut envelope = CommandEnvelope::new(CommandKind::Create).with_payload(EntityPayload {
        entity_type: Some(EntityType::User),
        name: Some(n.to_string()),
        real_name: Some(format!("{}{}", NEW_USER_REAL_NAME_PREFIX, n)),
        ..Default::default()
    });
    envelope.callback = Some(CREATE_USER_CALLBACK.to_string());
    envelope
}

/// `DELETE` for any entity. The payload is always `{ type, name, id }`.
pub fn delete(entity: &Entity) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::Delete)
        .with_id(entity.id())
        .with_payload(EntityPayload {
            entity_type: Some(entity.entity_type()),
            name: Some(entity.name().to_string()),
            id: Some(entity.id().to_string()),
            ..Default::default()
        })
}

pub fn list(entity_type: EntityType) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::List).with_payload(EntityPayload {
        entity_type: Some(entity_type),
        ..Default::default()
    })
}

/// Add `user_id` (source) to `group_id` (target).
pub fn add_to_group(user_id: &str, group_id: &str) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::Add)
        .with_id(group_id)
        .with_payload(EntityPayload {
            id: Some(user_id.to_string()),
            ..Default::default()
        })
}

/// Remove `user_id` (source) from `group_id` (target).
pub fn remove_from_group(user_id: &str, group_id: &str) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::Remove)
        .with_id(group_id)
        .with_payload(EntityPayload {
            id: Some(user_id.to_string()),
            ..Default::default()
        })
}

pub fn list_members(group_id: &str) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::Children).with_id(group_id)
}

pub fn get_properties(id: &str) -> CommandEnvelope {
    CommandEnvelope::new(CommandKind::Get).with_id(id)
}

pub fn update_property(id: &str, key: &str, value: &str) -> CommandEnvelope {
    let mut props = Map::new();
    props.insert(key.to_string(), Value::String(value.to_string()));
    let mut envelope = CommandEnvelope::new(CommandKind::Update).with_id(id);
    envelope.data = Some(CommandData::Properties(props));
    envelope
}
