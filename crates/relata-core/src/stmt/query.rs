use super::{
    CriteriaList, DeleteQuery, FieldExpression, InsertQuery, JoinExpression, PropertyPath,
    SelectQuery, UpdateQuery, Value,
};
use crate::{mapping::MappingCollection, Error, Result};

use indexmap::IndexMap;

/// A structured data operation against one mapped class.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

/// Parts shared by every kind of query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBase {
    /// Logical target class
    pub class_name: String,

    /// Selected fields. Empty means every fetchable property.
    pub fields: Vec<FieldExpression>,

    pub joins: Vec<JoinExpression>,

    pub criteria: CriteriaList,

    finalised: bool,

    /// Required paths captured when the query was finalised
    required: Vec<PropertyPath>,
}

impl QueryBase {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: vec![],
            joins: vec![],
            criteria: CriteriaList::new(),
            finalised: false,
            required: vec![],
        }
    }

    pub fn is_finalised(&self) -> bool {
        self.finalised
    }

    pub(crate) fn latch(&mut self) {
        self.finalised = true;
    }

    /// Returns `true` if `path` starts at an explicitly joined alias rather
    /// than at the target class.
    pub fn is_join_alias_path(&self, path: &PropertyPath) -> bool {
        self.joins
            .iter()
            .any(|join| !join.is_relationship() && path.first() == Some(join.alias.as_str()))
    }

    pub fn join_by_alias(&self, alias: &str) -> Option<&JoinExpression> {
        self.joins.iter().find(|join| join.alias == alias)
    }

    /// Checks done by every query kind before latching.
    pub(crate) fn verify(&self, mapping: &MappingCollection) -> Result<()> {
        if mapping.class_name() != self.class_name {
            return Err(Error::query(format!(
                "query on `{}` finalised with the mapping of `{}`",
                self.class_name,
                mapping.class_name()
            )));
        }

        self.criteria.verify_balanced()?;

        for join in &self.joins {
            join.extra_criteria.verify_balanced()?;
        }

        Ok(())
    }

    /// Add joins for every relationship of `mapping` reachable through one
    /// of `paths`, or every relationship when `paths` is `None`.
    pub(crate) fn add_relationship_joins(
        &mut self,
        mapping: &MappingCollection,
        paths: Option<&[PropertyPath]>,
    ) {
        let mut auto = vec![];

        for join in mapping.joins() {
            let needed = match paths {
                None => true,
                Some(paths) => paths.iter().any(|path| join.path.is_prefix_of(path)),
            };

            let present = self
                .joins
                .iter()
                .any(|existing| existing.alias == join.alias);

            if needed && !present {
                auto.push(JoinExpression::relationship(
                    join.path.clone(),
                    join.alias.clone(),
                    join.kind,
                ));
            }
        }

        // Relationship joins come first so explicit joins may refer to them
        auto.append(&mut self.joins);
        self.joins = auto;
    }

    fn collect_paths<'a>(&'a self, dst: &mut Vec<&'a PropertyPath>) {
        for field in &self.fields {
            dst.extend(field.property_paths());
        }

        dst.extend(self.criteria.property_paths());

        for join in &self.joins {
            dst.extend(&join.source_property);
            dst.extend(join.extra_criteria.property_paths());
        }
    }
}

impl Query {
    pub fn base(&self) -> &QueryBase {
        match self {
            Self::Select(query) => &query.base,
            Self::Insert(query) => &query.base,
            Self::Update(query) => &query.base,
            Self::Delete(query) => &query.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut QueryBase {
        match self {
            Self::Select(query) => &mut query.base,
            Self::Insert(query) => &mut query.base,
            Self::Update(query) => &mut query.base,
            Self::Delete(query) => &mut query.base,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.base().class_name
    }

    pub fn is_finalised(&self) -> bool {
        self.base().is_finalised()
    }

    /// Fill in missing parts from `mapping`, then latch. Repeat calls are
    /// no-ops.
    pub fn finalise(&mut self, mapping: &MappingCollection) -> Result<()> {
        if self.is_finalised() {
            return Ok(());
        }

        let required = self.required_paths();

        match self {
            Self::Select(query) => query.finalise(mapping)?,
            Self::Insert(query) => query.finalise(mapping)?,
            Self::Update(query) => query.finalise(mapping)?,
            Self::Delete(query) => query.finalise(mapping)?,
        }

        self.base_mut().required = required;
        Ok(())
    }

    /// Fill alias placeholders throughout the query.
    pub fn apply_values(
        &mut self,
        params: &IndexMap<String, Value>,
        remove_unbound: bool,
    ) -> Result<()> {
        let base = self.base_mut();
        base.criteria.apply_values(params, remove_unbound)?;

        for join in &mut base.joins {
            join.extra_criteria.apply_values(params, remove_unbound)?;
        }

        match self {
            Self::Select(select) => select.having.apply_values(params, remove_unbound)?,
            Self::Insert(insert) => insert.assignments.apply_values(params, remove_unbound),
            Self::Update(update) => update.assignments.apply_values(params, remove_unbound),
            Self::Delete(_) => {}
        }

        Ok(())
    }

    /// Every property path rooted at the target class that the query touches.
    ///
    /// The mapping resolver must make these reachable by joins even when the
    /// relationship would otherwise be late-bound.
    ///
    /// Once finalised, the paths seen at finalisation are returned so the
    /// same mapping is resolved again when rendering.
    pub fn required_paths(&self) -> Vec<PropertyPath> {
        let base = self.base();

        if base.is_finalised() {
            return base.required.clone();
        }

        let mut paths = vec![];
        base.collect_paths(&mut paths);

        match self {
            Self::Select(select) => select.collect_paths(&mut paths),
            Self::Insert(insert) => paths.extend(insert.assignments.paths()),
            Self::Update(update) => paths.extend(update.assignments.paths()),
            Self::Delete(_) => {}
        }

        let mut ret: Vec<PropertyPath> = vec![];
        for path in paths {
            if base.is_join_alias_path(path) || ret.contains(path) {
                continue;
            }
            ret.push(path.clone());
        }
        ret
    }
}

impl From<SelectQuery> for Query {
    fn from(value: SelectQuery) -> Self {
        Self::Select(value)
    }
}

impl From<InsertQuery> for Query {
    fn from(value: InsertQuery) -> Self {
        Self::Insert(value)
    }
}

impl From<UpdateQuery> for Query {
    fn from(value: UpdateQuery) -> Self {
        Self::Update(value)
    }
}

impl From<DeleteQuery> for Query {
    fn from(value: DeleteQuery) -> Self {
        Self::Delete(value)
    }
}
