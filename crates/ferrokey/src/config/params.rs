//! Well-known generator parameter keys.
//!
//! The mapping layer supplies the `target_*`, `identity_tables`, `schema`,
//! `catalog` and `entity_name` keys to every generator; the remaining keys
//! are strategy specific and documented on each generator.

/// The table the generated identifier belongs to.
pub const TARGET_TABLE: &str = "target_table";
/// The identifier column of [`TARGET_TABLE`].
pub const TARGET_COLUMN: &str = "target_column";
/// Comma-separated tables sharing the identifier space (inheritance).
pub const IDENTITY_TABLES: &str = "identity_tables";
pub const SCHEMA: &str = "schema";
pub const CATALOG: &str = "catalog";
/// The mapped entity whose identifier is generated.
pub const ENTITY_NAME: &str = "entity_name";

pub const TABLE: &str = "table";
pub const TABLES: &str = "tables";
pub const COLUMN: &str = "column";
pub const MAX_LO: &str = "max_lo";
pub const SEQUENCE: &str = "sequence";
pub const PARAMETERS: &str = "parameters";
pub const PRIMARY_KEY_COLUMN: &str = "primary_key_column";
pub const PRIMARY_KEY_VALUE: &str = "primary_key_value";
pub const PRIMARY_KEY_LENGTH: &str = "primary_key_length";
pub const VALUE_COLUMN: &str = "value_column";
pub const SEPARATOR: &str = "separator";
pub const KEY: &str = "key";
pub const PROPERTY: &str = "property";
