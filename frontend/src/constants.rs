// Placeholder values for freshly created entities - the backend resolves
// name collisions, we only need something readable.
pub const NEW_GROUP_NAME_PREFIX: &str = "New group_";
pub const NEW_USER_REAL_NAME_PREFIX: &str = "New user_";
pub const PLACEHOLDER_MIN: u32 = 1;
pub const PLACEHOLDER_MAX: u32 = 9998;

// Response routing tag attached to CREATE User commands.
pub const CREATE_USER_CALLBACK: &str = "test";

// DOM anchors
pub const MAIN_CONTAINER_ID: &str = "main";
pub const GROUPS_CONTAINER_ID: &str = "groups";
pub const USERS_CONTAINER_ID: &str = "users";

// Icons (relative to the host page)
pub const ICON_GROUP: &str = "icon/group.png";
pub const ICON_GROUP_ADD: &str = "icon/group_add.png";
pub const ICON_GROUP_DELETE: &str = "icon/group_delete.png";
pub const ICON_USER: &str = "icon/user.png";
pub const ICON_USER_ADD: &str = "icon/user_add.png";
pub const ICON_USER_DELETE: &str = "icon/user_delete.png";
pub const ICON_DELETE: &str = "icon/delete.png";

// CSS classes
pub const GROUP_HOVER_CLASS: &str = "groupHover";
pub const DISABLED_CLASS: &str = "disabled";

// Drag and drop
pub const DRAG_MIME_TYPE: &str = "application/json";
pub const DRAG_KIND_USER: &str = "user";
