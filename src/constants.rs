pub const RECIPES_TABLE: &str = "recipes";
pub const INGREDIENTS_TABLE: &str = "ingredients";
pub const RECIPE_INGREDIENTS_TABLE: &str = "recipe_ingredients";

// Both are fixed by sql/schema.sql.
pub const RECIPES_SCHEMA: &str = "public";
pub const RECIPE_CHANGES_CHANNEL: &str = "recipe_changes";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const LOGIN_PATH: &str = "/login";
pub const SESSION_COOKIE: &str = "session";
pub const SESSION_LIFETIME_HOURS: i64 = 1;
