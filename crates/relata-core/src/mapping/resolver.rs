use super::{
    join_alias, Bridge, ColumnMapping, JoinColumns, JoinMapping, KeyColumn, MappingCollection,
    PropertyMapping, RelationshipMapping, ScalarJoin, TableMapping,
};
use crate::{
    config::{ColumnOverride, RelationshipOverride},
    schema::{
        self, HierarchyProperty, MetadataProvider, PropertyDef, RelationshipDef, RelationshipKind,
    },
    stmt::PropertyPath,
    Config, Error, Result,
};

use indexmap::IndexMap;
use std::{cell::RefCell, collections::HashMap, sync::Arc};

/// Resolves and caches [`MappingCollection`]s.
///
/// Collections are cached per configuration hash, class and set of
/// required paths, so changing any option resolves afresh without flushing
/// the entries of other configurations.
pub struct MappingResolver {
    provider: Arc<dyn MetadataProvider>,
    cache: RefCell<HashMap<CacheKey, Arc<MappingCollection>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    config_hash: u64,
    class_name: String,
    required: Vec<String>,
}

impl MappingResolver {
    pub fn new(provider: impl MetadataProvider + 'static) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    pub fn from_arc(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        &*self.provider
    }

    /// Resolve the mapping of `class_name`.
    pub fn resolve(&self, class_name: &str, config: &Config) -> Result<Arc<MappingCollection>> {
        self.resolve_with(class_name, config, &[])
    }

    /// Resolve the mapping of `class_name`, joining every relationship that
    /// one of `required` filters through even when it would otherwise be
    /// late-bound.
    pub fn resolve_with(
        &self,
        class_name: &str,
        config: &Config,
        required: &[PropertyPath],
    ) -> Result<Arc<MappingCollection>> {
        let mut signature: Vec<String> = required
            .iter()
            .filter(|path| path.len() > 1)
            .map(PropertyPath::to_string)
            .collect();
        signature.sort();
        signature.dedup();

        let key = CacheKey {
            config_hash: config.hash(),
            class_name: class_name.to_string(),
            required: signature,
        };

        if let Some(mapping) = self.cache.borrow().get(&key) {
            tracing::trace!(class = class_name, "mapping cache hit");
            return Ok(mapping.clone());
        }

        tracing::trace!(class = class_name, required = key.required.len(), "mapping cache miss");

        let mapping = Arc::new(Walk::new(&*self.provider, config, required).run(class_name, key.config_hash)?);
        self.cache.borrow_mut().insert(key, mapping.clone());
        Ok(mapping)
    }

    /// Forget every cached collection.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Forget cached collections for one class.
    pub fn clear_class(&self, class_name: &str) {
        self.cache
            .borrow_mut()
            .retain(|key, _| key.class_name != class_name);
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl std::fmt::Debug for MappingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingResolver")
            .field("cached", &self.cached_len())
            .finish()
    }
}

/// One recursive walk of a class's object graph.
struct Walk<'a> {
    provider: &'a dyn MetadataProvider,
    config: &'a Config,
    required: &'a [PropertyPath],
    properties: IndexMap<String, PropertyMapping>,
    joins: Vec<JoinMapping>,
    classes: IndexMap<String, String>,
}

/// Position of the walk: the object being mapped and how it was reached.
struct Scope {
    class_name: String,
    parents: Vec<String>,
    alias: String,
    depth: usize,
    column_prefix: String,
    via: Option<Via>,

    /// Reached only to satisfy a required path; nothing below is selected
    filter_only: bool,
}

/// The relationship a child scope was entered through.
struct Via {
    class_name: String,
    property: String,
    mapped_by: Option<String>,
}

impl<'a> Walk<'a> {
    fn new(provider: &'a dyn MetadataProvider, config: &'a Config, required: &'a [PropertyPath]) -> Self {
        Self {
            provider,
            config,
            required,
            properties: IndexMap::new(),
            joins: vec![],
            classes: IndexMap::new(),
        }
    }

    fn run(mut self, class_name: &str, config_hash: u64) -> Result<MappingCollection> {
        let Some(table) = self.table_name(class_name) else {
            return Err(Error::mapping(class_name, None, "class has no table mapping"));
        };

        let repository = schema::table_of(self.provider, class_name).and_then(|table| table.repository.clone());

        self.map_class(Scope {
            class_name: class_name.to_string(),
            parents: vec![],
            alias: table.clone(),
            depth: 0,
            column_prefix: String::new(),
            via: None,
            filter_only: false,
        })?;

        Ok(MappingCollection {
            class_name: class_name.to_string(),
            table: TableMapping {
                alias: table.clone(),
                name: table,
                repository,
            },
            properties: self.properties,
            joins: self.joins,
            classes: self.classes,
            config_hash,
        })
    }

    fn map_class(&mut self, scope: Scope) -> Result<()> {
        let provider = self.provider;
        let hierarchy = schema::hierarchy(provider, &scope.class_name)?;

        self.classes
            .insert(scope.parents.join("."), scope.class_name.clone());

        // Cycle detection anchors on the parent, so every scalar of this
        // class is in place before any child is walked.
        for prop in hierarchy.iter().filter(|p| !p.def.transient) {
            if prop.def.relationship.is_none() {
                self.map_scalar(&scope, prop)?;
            }
        }

        for prop in hierarchy.iter().filter(|p| !p.def.transient) {
            if let Some(relationship) = &prop.def.relationship {
                self.map_relationship(&scope, prop, relationship)?;
            }
        }

        Ok(())
    }

    fn map_scalar(&mut self, scope: &Scope, prop: &HierarchyProperty<'_>) -> Result<()> {
        let column = self.column(&scope.class_name, prop)?.map(|mut column| {
            column.name = format!("{}{}", scope.column_prefix, column.name);
            column
        });

        let fetchable = column.is_some() && !scope.filter_only && self.in_groups(prop.def, column.as_ref());

        self.insert(PropertyMapping {
            class_name: scope.class_name.clone(),
            declaring_class: prop.declaring_class.to_string(),
            name: prop.def.name.clone(),
            parents: scope.parents.clone(),
            slot: prop.slot,
            ty: prop.def.ty.clone(),
            nullable: prop.def.nullable,
            default: prop.def.default.clone(),
            column,
            relationship: None,
            table_alias: scope.alias.clone(),
            groups: prop.def.groups.clone(),
            late_bound: false,
            points_to_parent: false,
            key_only: false,
            fetchable,
        });

        Ok(())
    }

    fn map_relationship(
        &mut self,
        scope: &Scope,
        prop: &HierarchyProperty<'_>,
        def: &RelationshipDef,
    ) -> Result<()> {
        let class_name = scope.class_name.as_str();
        let name = prop.def.name.as_str();
        let def = self.merged_relationship(class_name, prop, def);

        let child_class = match def.child_class.clone().or_else(|| prop.def.ty.class_name().map(String::from)) {
            Some(child) => child,
            None if def.is_scalar_join() => String::new(),
            None => {
                return Err(Error::mapping(
                    class_name,
                    Some(name),
                    "relationship does not name a child class",
                ))
            }
        };

        let Some(kind) = def.kind else {
            return Err(Error::mapping(
                class_name,
                Some(name),
                format!("relationship to `{child_class}` has no relationship type"),
            ));
        };

        let mut path = scope.parents.clone();
        path.push(name.to_string());

        if def.is_scalar_join() {
            return self.map_scalar_join(scope, prop, &def, path);
        }

        if self.provider.class(&child_class).is_none() {
            return Err(Error::mapping(
                class_name,
                Some(name),
                format!("child class `{child_class}` is not registered"),
            ));
        }

        if def.embedded {
            self.insert(self.relationship_property(scope, prop, None, false, false));
            self.set_relationship(
                &path,
                RelationshipMapping {
                    kind,
                    child_class: child_class.clone(),
                    mapped_by: None,
                    source_columns: vec![],
                    target_columns: vec![],
                    child_table: None,
                    bridge: None,
                    scalar: None,
                    join_kind: def.join_type,
                    lazy: false,
                    cascade_deletes: false,
                    orphan_removal: false,
                    embedded: true,
                    order_by: vec![],
                    target_key: vec![],
                    load_immediately: false,
                },
            );

            return self.map_class(Scope {
                class_name: child_class,
                parents: path,
                alias: scope.alias.clone(),
                depth: scope.depth,
                column_prefix: format!("{}{}", scope.column_prefix, def.embedded_column_prefix),
                via: None,
                filter_only: scope.filter_only,
            });
        }

        let points_to_parent = !kind.is_to_many()
            && scope.via.as_ref().is_some_and(|via| {
                self.is_same_or_ancestor(&child_class, &via.class_name)
                    && (via.mapped_by.as_deref() == Some(name)
                        || def.mapped_by.as_deref() == Some(via.property.as_str()))
            });

        let truncated = scope.depth + 1 > self.config.max_depth;
        let lazy = def.lazy.unwrap_or(if kind.is_to_many() {
            !self.config.eager_load_to_many
        } else {
            !self.config.eager_load_to_one
        });
        let late_bound = !points_to_parent && (kind.is_to_many() || lazy || truncated);

        let path_ref = PropertyPath::from_parts(path.iter().cloned());
        let required = self.required.iter().any(|req| path_ref.is_prefix_of(req));

        let child_table = self.table_name(&child_class);
        let (source_columns, target_columns, bridge) =
            self.join_columns(scope, prop, &def, &child_class)?;
        let target_key = self.target_key(&def, &child_class, &target_columns)?;

        let mut joined = !points_to_parent && (!late_bound || required);

        if joined && child_table.is_none() {
            if required {
                return Err(Error::mapping(
                    class_name,
                    Some(name),
                    format!("criteria filter through `{child_class}`, which has no table mapping"),
                ));
            }
            joined = false;
        }

        tracing::trace!(
            class = class_name,
            property = %path_ref,
            late_bound,
            points_to_parent,
            joined,
            "mapped relationship"
        );

        let relationship = RelationshipMapping {
            kind,
            child_class: child_class.clone(),
            mapped_by: def.mapped_by.clone(),
            source_columns: source_columns.clone(),
            target_columns: target_columns.clone(),
            child_table: child_table.clone(),
            bridge: bridge.clone(),
            scalar: None,
            join_kind: def.join_type,
            lazy,
            cascade_deletes: def.cascade_deletes,
            orphan_removal: def.orphan_removal,
            embedded: false,
            order_by: def.order_by.clone(),
            target_key: target_key.clone(),
            load_immediately: kind.is_to_many() && !lazy && !truncated,
        };

        let is_owning = relationship.is_owning();
        self.insert(self.relationship_property(
            scope,
            prop,
            Some(relationship),
            late_bound && !points_to_parent,
            points_to_parent,
        ));

        if joined {
            let table = child_table.unwrap_or_default();
            let alias = join_alias(&path);
            let mut source_alias = scope.alias.clone();
            let mut source_columns = source_columns;

            if let Some(bridge) = &bridge {
                let bridge_alias = format!("{alias}_bridge");
                self.joins.push(JoinMapping {
                    path: path_ref.clone(),
                    alias: bridge_alias.clone(),
                    table: bridge.table.clone(),
                    kind: def.join_type,
                    on: pairs(&source_alias, &source_columns, &[bridge.source_column.clone()]),
                });
                source_alias = bridge_alias;
                source_columns = vec![bridge.target_column.clone()];
            }

            self.joins.push(JoinMapping {
                path: path_ref,
                alias: alias.clone(),
                table,
                kind: def.join_type,
                on: pairs(&source_alias, &source_columns, &target_columns),
            });

            return self.map_class(Scope {
                class_name: child_class,
                parents: path,
                alias,
                depth: scope.depth + 1,
                column_prefix: String::new(),
                via: Some(Via {
                    class_name: class_name.to_string(),
                    property: name.to_string(),
                    mapped_by: def.mapped_by.clone(),
                }),
                filter_only: scope.filter_only || late_bound,
            });
        }

        if late_bound && is_owning {
            // The child's key is carried by our own foreign key
            let child_hierarchy = schema::hierarchy(self.provider, &child_class)?;
            for (key, column) in target_key.iter().zip(&source_columns) {
                let Some(child_prop) = child_hierarchy.iter().find(|p| p.def.name == key.property)
                else {
                    continue;
                };

                self.insert(PropertyMapping {
                    class_name: child_class.clone(),
                    declaring_class: child_prop.declaring_class.to_string(),
                    name: key.property.clone(),
                    parents: path.clone(),
                    slot: child_prop.slot,
                    ty: child_prop.def.ty.clone(),
                    nullable: true,
                    default: child_prop.def.default.clone(),
                    column: Some(ColumnMapping {
                        name: column.clone(),
                        ty: child_prop.def.ty.clone(),
                        format: None,
                        read_only: false,
                        primary_key: false,
                        auto_increment: false,
                        value_map: IndexMap::new(),
                    }),
                    relationship: None,
                    table_alias: scope.alias.clone(),
                    groups: vec![],
                    late_bound: false,
                    points_to_parent: false,
                    key_only: true,
                    fetchable: !scope.filter_only,
                });
            }
        }

        Ok(())
    }

    fn map_scalar_join(
        &mut self,
        scope: &Scope,
        prop: &HierarchyProperty<'_>,
        def: &RelationshipDef,
        path: Vec<String>,
    ) -> Result<()> {
        let class_name = scope.class_name.as_str();
        let name = prop.def.name.as_str();

        let (Some(table), Some(target_column), Some(value_column)) = (
            def.join_table.clone(),
            def.target_join_column.clone(),
            def.target_scalar_value_column.clone(),
        ) else {
            return Err(Error::mapping(
                class_name,
                Some(name),
                "scalar join needs a join table, target column and value column",
            ));
        };

        let source_column = def
            .source_join_column
            .clone()
            .or_else(|| prop.def.column.as_ref().and_then(|c| c.name.clone()))
            .unwrap_or_else(|| self.config.column_name_for(name));

        let alias = join_alias(&path);
        self.joins.push(JoinMapping {
            path: PropertyPath::from_parts(path),
            alias: alias.clone(),
            table: table.clone(),
            kind: def.join_type,
            on: vec![JoinColumns {
                source_alias: scope.alias.clone(),
                source_column: format!("{}{source_column}", scope.column_prefix),
                target_column: target_column.clone(),
            }],
        });

        let column = ColumnMapping {
            name: value_column.clone(),
            ty: prop.def.ty.clone(),
            format: prop.def.column.as_ref().and_then(|c| c.format.clone()),
            read_only: true,
            primary_key: false,
            auto_increment: false,
            value_map: IndexMap::new(),
        };

        let mut mapping = self.relationship_property(
            scope,
            prop,
            Some(RelationshipMapping {
                kind: def.kind.unwrap_or(RelationshipKind::ManyToOne),
                child_class: String::new(),
                mapped_by: None,
                source_columns: vec![source_column],
                target_columns: vec![target_column],
                child_table: None,
                bridge: None,
                scalar: Some(ScalarJoin {
                    table,
                    value_column,
                }),
                join_kind: def.join_type,
                lazy: false,
                cascade_deletes: false,
                orphan_removal: false,
                embedded: false,
                order_by: vec![],
                target_key: vec![],
                load_immediately: false,
            }),
            false,
            false,
        );
        mapping.fetchable = !scope.filter_only && self.in_groups(prop.def, Some(&column));
        mapping.column = Some(column);
        mapping.table_alias = alias;
        self.insert(mapping);
        Ok(())
    }

    fn relationship_property(
        &self,
        scope: &Scope,
        prop: &HierarchyProperty<'_>,
        relationship: Option<RelationshipMapping>,
        late_bound: bool,
        points_to_parent: bool,
    ) -> PropertyMapping {
        PropertyMapping {
            class_name: scope.class_name.clone(),
            declaring_class: prop.declaring_class.to_string(),
            name: prop.def.name.clone(),
            parents: scope.parents.clone(),
            slot: prop.slot,
            ty: prop.def.ty.clone(),
            nullable: prop.def.nullable,
            default: prop.def.default.clone(),
            column: None,
            relationship,
            table_alias: scope.alias.clone(),
            groups: prop.def.groups.clone(),
            late_bound,
            points_to_parent,
            key_only: false,
            fetchable: false,
        }
    }

    fn set_relationship(&mut self, path: &[String], relationship: RelationshipMapping) {
        if let Some(prop) = self.properties.get_mut(&path.join(".")) {
            prop.relationship = Some(relationship);
        }
    }

    fn insert(&mut self, mapping: PropertyMapping) {
        self.properties.insert(mapping.path().to_string(), mapping);
    }

    /// Columns on each side of the relationship and, for many-to-many, the
    /// bridge table.
    fn join_columns(
        &self,
        scope: &Scope,
        prop: &HierarchyProperty<'_>,
        def: &RelationshipDef,
        child_class: &str,
    ) -> Result<(Vec<String>, Vec<String>, Option<Bridge>)> {
        let class_name = scope.class_name.as_str();
        let name = prop.def.name.as_str();
        let kind = def.kind.unwrap_or(RelationshipKind::ManyToOne);

        let (source, target, bridge) = if kind == RelationshipKind::ManyToMany {
            let Some(table) = def.bridge_table.clone() else {
                return Err(Error::mapping(
                    class_name,
                    Some(name),
                    "many-to-many relationship has no bridge table",
                ));
            };

            let source = match split_columns(def.source_join_column.as_deref()) {
                Some(columns) => columns,
                None => self.key_columns(class_name)?,
            };
            let target = match split_columns(def.target_join_column.as_deref()) {
                Some(columns) => columns,
                None => self.key_columns(child_class)?,
            };

            let bridge = Bridge {
                table,
                source_column: def.bridge_source_column.clone().unwrap_or_else(|| {
                    format!("{}_id", self.config.column_name_for(class_name))
                }),
                target_column: def.bridge_target_column.clone().unwrap_or_else(|| {
                    format!("{}_id", self.config.column_name_for(child_class))
                }),
            };

            (source, target, Some(bridge))
        } else if let Some(mapped_by) = &def.mapped_by {
            let hierarchy = schema::hierarchy(self.provider, child_class)?;
            let Some(inverse) = hierarchy.iter().find(|p| &p.def.name == mapped_by) else {
                return Err(Error::mapping(
                    class_name,
                    Some(name),
                    format!("mapped_by property `{child_class}::{mapped_by}` does not exist"),
                ));
            };

            let inverse_def = inverse.def.relationship.as_ref();
            let target = inverse_def
                .and_then(|r| split_columns(r.source_join_column.as_deref()))
                .unwrap_or_else(|| vec![format!("{}_id", self.config.column_name_for(mapped_by))]);
            let source = match inverse_def.and_then(|r| split_columns(r.target_join_column.as_deref())) {
                Some(columns) => columns,
                None => self.key_columns(class_name)?,
            };

            (source, target, None)
        } else {
            let source = split_columns(def.source_join_column.as_deref())
                .or_else(|| {
                    prop.def
                        .column
                        .as_ref()
                        .and_then(|c| c.name.clone())
                        .map(|c| vec![c])
                })
                .unwrap_or_else(|| vec![format!("{}_id", self.config.column_name_for(name))]);
            let target = match split_columns(def.target_join_column.as_deref()) {
                Some(columns) => columns,
                None => self.key_columns(child_class)?,
            };

            (source, target, None)
        };

        if source.len() != target.len() {
            return Err(Error::mapping(
                class_name,
                Some(name),
                format!(
                    "relationship has {} source column(s) but {} target column(s)",
                    source.len(),
                    target.len()
                ),
            ));
        }

        Ok((source, target, bridge))
    }

    /// Child properties behind `target_columns`.
    fn target_key(
        &self,
        def: &RelationshipDef,
        child_class: &str,
        target_columns: &[String],
    ) -> Result<Vec<KeyColumn>> {
        let hierarchy = schema::hierarchy(self.provider, child_class)?;
        let mut ret = vec![];

        let columns: Vec<String> = if def.kind == Some(RelationshipKind::ManyToMany) {
            self.key_columns(child_class)?
        } else {
            target_columns.to_vec()
        };

        for column in columns {
            let found = hierarchy.iter().find(|p| {
                p.def.relationship.is_none() && self.column_name(&p.def.name, p.def) == column
            });

            match found {
                Some(p) => ret.push(KeyColumn {
                    property: p.def.name.clone(),
                    column,
                }),
                // A foreign key column with no scalar property on the child
                None => ret.push(KeyColumn {
                    property: String::new(),
                    column,
                }),
            }
        }

        Ok(ret)
    }

    fn key_columns(&self, class_name: &str) -> Result<Vec<String>> {
        let columns: Vec<String> = schema::hierarchy(self.provider, class_name)?
            .iter()
            .filter(|p| p.def.is_primary_key())
            .map(|p| self.column_name(&p.def.name, p.def))
            .collect();

        if columns.is_empty() {
            return Err(Error::mapping(class_name, None, "class has no primary key"));
        }

        Ok(columns)
    }

    fn column(&self, class_name: &str, prop: &HierarchyProperty<'_>) -> Result<Option<ColumnMapping>> {
        let def = prop.def;
        let overrides = self.column_override(class_name, prop);

        if def.column.is_none() && overrides.is_none() && !self.config.guess_mappings {
            return Ok(None);
        }

        let column = def.column.clone().unwrap_or_default();
        let overrides = overrides.cloned().unwrap_or_default();
        let name = overrides
            .name
            .or(column.name)
            .unwrap_or_else(|| self.config.column_name_for(&def.name));

        if name.is_empty() {
            return Err(Error::mapping(class_name, Some(&def.name), "column name is empty"));
        }

        Ok(Some(ColumnMapping {
            name,
            ty: overrides
                .ty
                .or(column.ty)
                .unwrap_or_else(|| def.ty.clone()),
            format: overrides.format.or(column.format),
            read_only: overrides.read_only.unwrap_or(column.read_only),
            primary_key: column.primary_key,
            auto_increment: column.auto_increment,
            value_map: column.value_map,
        }))
    }

    fn column_name(&self, property: &str, def: &PropertyDef) -> String {
        def.column
            .as_ref()
            .and_then(|column| column.name.clone())
            .unwrap_or_else(|| self.config.column_name_for(property))
    }

    fn column_override(&self, class_name: &str, prop: &HierarchyProperty<'_>) -> Option<&ColumnOverride> {
        let overrides = &self.config.column_overrides;
        overrides
            .get(&format!("{class_name}.{}", prop.def.name))
            .or_else(|| overrides.get(&format!("{}.{}", prop.declaring_class, prop.def.name)))
    }

    fn merged_relationship(
        &self,
        class_name: &str,
        prop: &HierarchyProperty<'_>,
        def: &RelationshipDef,
    ) -> RelationshipDef {
        let overrides = &self.config.relationship_overrides;
        let found: Option<&RelationshipOverride> = overrides
            .get(&format!("{class_name}.{}", prop.def.name))
            .or_else(|| overrides.get(&format!("{}.{}", prop.declaring_class, prop.def.name)));

        let mut def = def.clone();
        if let Some(found) = found {
            if found.lazy.is_some() {
                def.lazy = found.lazy;
            }
            if let Some(join_type) = found.join_type {
                def.join_type = join_type;
            }
            if let Some(cascade) = found.cascade_deletes {
                def.cascade_deletes = cascade;
            }
            if found.source_join_column.is_some() {
                def.source_join_column = found.source_join_column.clone();
            }
            if found.target_join_column.is_some() {
                def.target_join_column = found.target_join_column.clone();
            }
        }
        def
    }

    fn in_groups(&self, def: &PropertyDef, column: Option<&ColumnMapping>) -> bool {
        let groups = &self.config.serialization_groups;
        groups.is_empty()
            || column.is_some_and(|column| column.primary_key)
            || def.groups.iter().any(|group| groups.contains(group))
    }

    fn table_name(&self, class_name: &str) -> Option<String> {
        self.config
            .table_overrides
            .get(class_name)
            .cloned()
            .or_else(|| schema::table_of(self.provider, class_name).map(|table| table.name.clone()))
    }

    fn is_same_or_ancestor(&self, class_name: &str, other: &str) -> bool {
        let mut next = Some(other);
        let mut guard = 0;

        while let Some(name) = next {
            if name == class_name {
                return true;
            }
            guard += 1;
            if guard > 64 {
                return false;
            }
            next = self
                .provider
                .class(name)
                .and_then(|def| def.parent.as_deref());
        }

        false
    }
}

fn split_columns(columns: Option<&str>) -> Option<Vec<String>> {
    let columns: Vec<String> = columns?
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(String::from)
        .collect();

    (!columns.is_empty()).then_some(columns)
}

fn pairs(source_alias: &str, source: &[String], target: &[String]) -> Vec<JoinColumns> {
    source
        .iter()
        .zip(target)
        .map(|(source_column, target_column)| JoinColumns {
            source_alias: source_alias.to_string(),
            source_column: source_column.clone(),
            target_column: target_column.clone(),
        })
        .collect()
}
