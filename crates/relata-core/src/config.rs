use crate::{
    stmt::{JoinKind, Type},
    Error, Result,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

/// Options that shape mapping resolution, hydration, and rendering.
///
/// The effective configuration is hashed to key the mapping cache, so two
/// repositories with different options never share a `MappingCollection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Maximum number of relationship levels walked from the root entity
    pub max_depth: usize,

    /// To-one relationships are joined unless marked lazy
    pub eager_load_to_one: bool,

    /// To-many relationships are loaded as soon as their parent is hydrated
    pub eager_load_to_many: bool,

    /// Properties without column metadata get a column named by the naming
    /// strategy
    pub guess_mappings: bool,

    pub naming_strategy: NamingStrategy,

    /// Class name to table name
    pub table_overrides: IndexMap<String, String>,

    /// `Class.property` to column override
    pub column_overrides: IndexMap<String, ColumnOverride>,

    /// `Class.property` to relationship override
    pub relationship_overrides: IndexMap<String, RelationshipOverride>,

    /// When non-empty, only properties in one of these groups (and primary
    /// keys) are fetched
    pub serialization_groups: Vec<String>,

    /// Do not consult or populate the entity tracker while hydrating
    pub disable_entity_cache: bool,

    /// Deprecated: coerce NULL used with a non-`IS` operator to `''`
    pub convert_null_to_empty: bool,

    /// Quote table and column identifiers when rendering SQL
    pub quote_identifiers: bool,
}

/// How property names become column names when no column is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    SnakeCase,
    AsIs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnOverride {
    pub name: Option<String>,
    pub read_only: Option<bool>,

    /// Storage type, replacing the declared one
    #[serde(rename = "type")]
    pub ty: Option<Type>,

    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationshipOverride {
    pub lazy: Option<bool>,
    pub join_type: Option<JoinKind>,
    pub cascade_deletes: Option<bool>,
    pub source_join_column: Option<String>,
    pub target_join_column: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 3,
            eager_load_to_one: true,
            eager_load_to_many: false,
            guess_mappings: true,
            naming_strategy: NamingStrategy::SnakeCase,
            table_overrides: IndexMap::new(),
            column_overrides: IndexMap::new(),
            relationship_overrides: IndexMap::new(),
            serialization_groups: vec![],
            disable_entity_cache: false,
            convert_null_to_empty: false,
            quote_identifiers: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole configuration document. Missing options keep their
    /// defaults; unknown options are rejected.
    pub fn from_json(src: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(src)
            .map_err(|err| Error::configuration(format!("unreadable configuration: {err}")))?;

        let serde_json::Value::Object(options) = json else {
            return Err(Error::configuration(
                "configuration document must be an object",
            ));
        };

        let mut config = Self::default();
        for (name, value) in options {
            config.set_option(&name, value)?;
        }
        Ok(config)
    }

    /// Set a single option by name.
    pub fn set_option(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;

        let serde_json::Value::Object(options) = &mut json else {
            unreachable!("Config always serializes to an object");
        };

        match options.get_mut(name) {
            Some(slot) => *slot = value,
            None => return Err(Error::configuration(format!("unknown option `{name}`"))),
        }

        *self = serde_json::from_value(json).map_err(|err| {
            Error::configuration(format!("invalid value for option `{name}`: {err}"))
        })?;

        Ok(())
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn eager_load_to_one(mut self, eager: bool) -> Self {
        self.eager_load_to_one = eager;
        self
    }

    pub fn eager_load_to_many(mut self, eager: bool) -> Self {
        self.eager_load_to_many = eager;
        self
    }

    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    pub fn table_override(mut self, class: &str, table: &str) -> Self {
        self.table_overrides
            .insert(class.to_string(), table.to_string());
        self
    }

    pub fn column_override(mut self, class: &str, property: &str, column: ColumnOverride) -> Self {
        self.column_overrides
            .insert(format!("{class}.{property}"), column);
        self
    }

    pub fn relationship_override(
        mut self,
        class: &str,
        property: &str,
        relationship: RelationshipOverride,
    ) -> Self {
        self.relationship_overrides
            .insert(format!("{class}.{property}"), relationship);
        self
    }

    pub fn serialization_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.serialization_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Stable hash of the effective configuration.
    pub fn hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        serde_json::to_string(self)
            .unwrap_or_default()
            .hash(&mut hasher);
        hasher.finish()
    }

    /// Column name for a property with no declared column.
    pub fn column_name_for(&self, property: &str) -> String {
        use heck::ToSnakeCase;

        match self.naming_strategy {
            NamingStrategy::SnakeCase => property.to_snake_case(),
            NamingStrategy::AsIs => property.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_known_option() {
        let mut config = Config::default();
        config.set_option("maxDepth", json!(5)).unwrap();
        assert_eq!(config.max_depth, 5);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut config = Config::default();
        let err = config.set_option("maxDepht", json!(5)).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("maxDepht"));
    }

    #[test]
    fn badly_typed_option_is_rejected() {
        let mut config = Config::default();
        let err = config
            .set_option("eagerLoadToOne", json!("sometimes"))
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(config.eager_load_to_one);
    }

    #[test]
    fn hash_tracks_changes() {
        let a = Config::default();
        let b = Config::default().max_depth(2);
        assert_eq!(a.hash(), Config::default().hash());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn from_json_document() {
        let config = Config::from_json(r#"{"maxDepth": 1, "tableOverrides": {"Contact": "person"}}"#)
            .unwrap();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.table_overrides["Contact"], "person");

        assert!(Config::from_json("[1]").unwrap_err().is_configuration());
        assert!(Config::from_json("{").unwrap_err().is_configuration());
    }

    #[test]
    fn snake_case_columns() {
        let config = Config::default();
        assert_eq!(config.column_name_for("lastName"), "last_name");

        let mut config = Config::default();
        config.set_option("namingStrategy", json!("as_is")).unwrap();
        assert_eq!(config.column_name_for("lastName"), "lastName");
    }
}
