use crate::stmt::{Direction, JoinKind};

/// How a property connects two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl RelationshipKind {
    pub fn is_to_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

/// Raw relationship metadata for a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipDef {
    /// Missing while `child_class` is set is a mapping error
    pub kind: Option<RelationshipKind>,

    /// Related class. Defaults to the class named by the property type.
    pub child_class: Option<String>,

    /// Property on the child that owns the foreign key pointing back here
    pub mapped_by: Option<String>,

    /// Foreign key column(s) on this side, comma separated when composite
    pub source_join_column: Option<String>,

    /// Referenced column(s) on the child, comma separated when composite
    pub target_join_column: Option<String>,

    /// Bridge table for many-to-many relationships
    pub bridge_table: Option<String>,
    pub bridge_source_column: Option<String>,
    pub bridge_target_column: Option<String>,

    /// Explicit fetch policy; unset defers to configuration
    pub lazy: Option<bool>,

    pub join_type: JoinKind,

    pub cascade_deletes: bool,

    pub orphan_removal: bool,

    /// Value object stored in the parent's own table
    pub embedded: bool,
    pub embedded_column_prefix: String,

    /// Lookup table for a scalar join
    pub join_table: Option<String>,

    /// Column of the lookup table whose value the property holds
    pub target_scalar_value_column: Option<String>,

    /// Ordering applied when loading a to-many collection
    pub order_by: Vec<(String, Direction)>,
}

impl RelationshipDef {
    fn new(kind: Option<RelationshipKind>, child: Option<String>) -> Self {
        Self {
            kind,
            child_class: child,
            ..Self::default()
        }
    }

    pub fn one_to_one(child: impl Into<String>) -> Self {
        Self::new(Some(RelationshipKind::OneToOne), Some(child.into()))
    }

    pub fn many_to_one(child: impl Into<String>) -> Self {
        Self::new(Some(RelationshipKind::ManyToOne), Some(child.into()))
    }

    pub fn one_to_many(child: impl Into<String>) -> Self {
        Self::new(Some(RelationshipKind::OneToMany), Some(child.into()))
    }

    pub fn many_to_many(child: impl Into<String>) -> Self {
        Self::new(Some(RelationshipKind::ManyToMany), Some(child.into()))
    }

    /// A relationship naming a child class but no relationship type.
    pub fn untyped(child: impl Into<String>) -> Self {
        Self::new(None, Some(child.into()))
    }

    /// A value object flattened into the parent's table.
    pub fn embedded(child: impl Into<String>, column_prefix: impl Into<String>) -> Self {
        Self {
            embedded: true,
            embedded_column_prefix: column_prefix.into(),
            ..Self::one_to_one(child)
        }
    }

    /// A foreign key whose property holds a value from a lookup table rather
    /// than a hydrated object.
    pub fn scalar(
        join_table: impl Into<String>,
        target_join_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Self {
        Self {
            kind: Some(RelationshipKind::ManyToOne),
            join_table: Some(join_table.into()),
            target_join_column: Some(target_join_column.into()),
            target_scalar_value_column: Some(value_column.into()),
            ..Self::default()
        }
    }

    pub fn mapped_by(mut self, property: impl Into<String>) -> Self {
        self.mapped_by = Some(property.into());
        self
    }

    pub fn join_column(mut self, column: impl Into<String>) -> Self {
        self.source_join_column = Some(column.into());
        self
    }

    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_join_column = Some(column.into());
        self
    }

    pub fn bridge(
        mut self,
        table: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        self.bridge_table = Some(table.into());
        self.bridge_source_column = Some(source_column.into());
        self.bridge_target_column = Some(target_column.into());
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }

    pub fn inner_join(mut self) -> Self {
        self.join_type = JoinKind::Inner;
        self
    }

    pub fn cascade_deletes(mut self) -> Self {
        self.cascade_deletes = true;
        self
    }

    pub fn orphan_removal(mut self) -> Self {
        self.orphan_removal = true;
        self
    }

    pub fn order_by(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push((property.into(), direction));
        self
    }

    pub fn is_scalar_join(&self) -> bool {
        self.target_scalar_value_column.is_some()
    }
}
