use serde::{Deserialize, Serialize};

/// The two entity kinds this panel manages.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub enum EntityType {
    User,
    Group,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "User",
            EntityType::Group => "Group",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group as delivered by the backend
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// User as delivered by the backend
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "realName", default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

impl User {
    /// Label shown in the list: the real name when present, the login name otherwise.
    pub fn display_name(&self) -> &str {
        match &self.real_name {
            Some(real) if !real.is_empty() => real,
            _ => &self.name,
        }
    }
}

/// Either entity, tagged by its `type` field on the wire.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(tag = "type")]
pub enum Entity {
    User(User),
    Group(Group),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::User(u) => &u.id,
            Entity::Group(g) => &g.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::User(u) => &u.name,
            Entity::Group(g) => &g.name,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::User(_) => EntityType::User,
            Entity::Group(_) => EntityType::Group,
        }
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id().to_string(),
            entity_type: self.entity_type(),
        }
    }
}

/// Identity-only reference to an entity.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct EntityRef {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            entity_type,
        }
    }
}

/// What the property panel is opened for. `group_id` is set when a user is
/// edited from inside a group block, so the panel mounts under that block.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PropertyTarget {
    pub entity: EntityRef,
    pub group_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_is_tagged_by_type() {
        let value = json!({ "type": "User", "id": "u1", "name": "4711", "realName": "New user_4711" });
        let entity: Entity = serde_json::from_value(value).unwrap();
        assert_eq!(entity.entity_type(), EntityType::User);
        assert_eq!(entity.id(), "u1");

        let group: Entity = serde_json::from_value(json!({ "type": "Group", "id": "g1", "name": "Alpha" })).unwrap();
        assert_eq!(group, Entity::Group(Group { id: "g1".into(), name: "Alpha".into() }));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = serde_json::from_value::<Entity>(json!({ "type": "Folder", "id": "f1" }));
        assert!(result.is_err());
    }

    #[test]
    fn display_name_falls_back_to_login_name() {
        let mut user = User { id: "u1".into(), name: "jdoe".into(), real_name: None };
        assert_eq!(user.display_name(), "jdoe");
        user.real_name = Some(String::new());
        assert_eq!(user.display_name(), "jdoe");
        user.real_name = Some("Jane Doe".into());
        assert_eq!(user.display_name(), "Jane Doe");
    }

    #[test]
    fn user_without_real_name_omits_field() {
        let user = User { id: "u1".into(), name: "jdoe".into(), real_name: None };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("realName").is_none());
    }
}
