use super::{
    Assignments, CriteriaExpression, CriteriaList, CriteriaValue, DeleteQuery, Direction,
    FieldExpression, InsertQuery, JoinExpression, JoinKind, Joiner, LatestRecord, Operator,
    OrderByExpr, PropertyPath, SelectQuery, UpdateQuery,
};
use crate::{Error, Result};

/// Clause that `and`, `or` and group calls currently append to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Where,
    Join(usize),
    Having,
}

/// Fluent constructor for query models.
///
/// Errors raised by individual calls are held until one of the `build_*`
/// methods, which returns the first of them.
///
/// ```
/// # use relata_core::stmt::{Operator, QueryBuilder};
/// let query = QueryBuilder::new()
///     .select(["firstName", "lastName"])
///     .from("Contact")
///     .where_("lastName", Operator::Eq, "Skywalker")
///     .and_start()
///     .and("age", Operator::Gt, 18)
///     .or("vip", Operator::Eq, true)
///     .end()
///     .order_by("firstName", Default::default())
///     .build_select_query()
///     .unwrap();
///
/// assert_eq!(query.base.criteria.condition_count(), 3);
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    class_name: Option<String>,
    fields: Vec<FieldExpression>,
    criteria: CriteriaList,
    having: CriteriaList,
    joins: Vec<JoinExpression>,
    group_by: Vec<FieldExpression>,
    order_by: Vec<OrderByExpr>,
    limit: Option<u64>,
    offset: Option<u64>,
    latest: Option<LatestRecord>,
    assignments: Assignments,
    on_duplicate_key_update: bool,
    clause: Clause,
    error: Option<Error>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            class_name: None,
            fields: vec![],
            criteria: CriteriaList::new(),
            having: CriteriaList::new(),
            joins: vec![],
            group_by: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
            latest: None,
            assignments: Assignments::new(),
            on_duplicate_key_update: false,
            clause: Clause::Where,
            error: None,
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            if let Some(field) = self.check(FieldExpression::new(field.as_ref())) {
                self.fields.push(field);
            }
        }
        self
    }

    pub fn from(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Alias of [`from`](Self::from) for insert queries.
    pub fn insert(self, class_name: impl Into<String>) -> Self {
        self.from(class_name)
    }

    /// Alias of [`from`](Self::from) for update queries.
    pub fn update(self, class_name: impl Into<String>) -> Self {
        self.from(class_name)
    }

    /// Begin the WHERE clause with a condition.
    pub fn where_(mut self, property: &str, operator: Operator, value: impl Into<CriteriaValue>) -> Self {
        self.clause = Clause::Where;
        self.condition(Joiner::And, property, operator, value.into(), None)
    }

    pub fn and(self, property: &str, operator: Operator, value: impl Into<CriteriaValue>) -> Self {
        self.condition(Joiner::And, property, operator, value.into(), None)
    }

    pub fn or(self, property: &str, operator: Operator, value: impl Into<CriteriaValue>) -> Self {
        self.condition(Joiner::Or, property, operator, value.into(), None)
    }

    pub fn and_between(
        self,
        property: &str,
        low: impl Into<CriteriaValue>,
        high: impl Into<CriteriaValue>,
    ) -> Self {
        self.condition(Joiner::And, property, Operator::Between, low.into(), Some(high.into()))
    }

    /// Append an already-built condition.
    pub fn and_expression(mut self, expr: CriteriaExpression) -> Self {
        self.current().and(expr);
        self
    }

    /// Append every condition of `criteria` to the WHERE clause.
    pub fn where_criteria(mut self, criteria: CriteriaList) -> Self {
        self.clause = Clause::Where;
        self.criteria.extend_grouped(Joiner::And, criteria);
        self
    }

    pub fn and_start(mut self) -> Self {
        self.current().start_group(Joiner::And);
        self
    }

    pub fn or_start(mut self) -> Self {
        self.current().start_group(Joiner::Or);
        self
    }

    pub fn end(mut self) -> Self {
        self.current().end_group();
        self
    }

    pub fn inner_join(self, target_class: impl Into<String>, alias: impl Into<String>) -> Self {
        self.join(JoinExpression::new(target_class, alias, JoinKind::Inner))
    }

    pub fn left_join(self, target_class: impl Into<String>, alias: impl Into<String>) -> Self {
        self.join(JoinExpression::new(target_class, alias, JoinKind::Left))
    }

    /// Join a table that is not a mapped class.
    pub fn join_table(self, table: impl Into<String>, alias: impl Into<String>, kind: JoinKind) -> Self {
        self.join(JoinExpression::table(table, alias, kind))
    }

    fn join(mut self, join: JoinExpression) -> Self {
        if self.joins.iter().any(|existing| existing.alias == join.alias) {
            self.fail(Error::query(format!("join alias `{}` used twice", join.alias)));
            return self;
        }

        self.joins.push(join);
        self.clause = Clause::Join(self.joins.len() - 1);
        self
    }

    /// Set the condition of the most recent join. Later `and`/`or` calls add
    /// extra conditions to the same join until another clause starts.
    pub fn on(mut self, source: &str, operator: Operator, target: &str) -> Self {
        let Clause::Join(index) = self.clause else {
            self.fail(Error::query("`on` called without a preceding join"));
            return self;
        };

        let source = self.check(PropertyPath::parse(source));
        let target = self.check(PropertyPath::parse(target));

        if let (Some(source), Some(target)) = (source, target) {
            let join = &mut self.joins[index];
            join.source_property = Some(source);
            join.operator = operator;
            join.target_property = Some(target);
        }
        self
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            if let Some(field) = self.check(FieldExpression::new(field.as_ref())) {
                self.group_by.push(field);
            }
        }
        self
    }

    /// Begin the HAVING clause with a condition.
    pub fn having(mut self, field: &str, operator: Operator, value: impl Into<CriteriaValue>) -> Self {
        self.clause = Clause::Having;
        self.condition(Joiner::And, field, operator, value.into(), None)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        if let Some(field) = self.check(FieldExpression::new(field)) {
            self.order_by.push(OrderByExpr::new(field, direction));
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Keep only the most recent record (by `recency_property`) per
    /// `group_property`.
    pub fn latest(mut self, group_property: &str, recency_property: &str) -> Self {
        let group = self.check(PropertyPath::parse(group_property));
        let recency = self.check(PropertyPath::parse(recency_property));

        if let (Some(group_property), Some(recency_property)) = (group, recency) {
            self.latest = Some(LatestRecord {
                group_property,
                recency_property,
            });
        }
        self
    }

    /// Assign a value for an insert or update.
    pub fn set(mut self, property: &str, value: impl Into<CriteriaValue>) -> Self {
        if let Some(path) = self.check(PropertyPath::parse(property)) {
            self.assignments.set(path, value);
        }
        self
    }

    pub fn on_duplicate_key_update(mut self) -> Self {
        self.on_duplicate_key_update = true;
        self
    }

    pub fn build_select_query(mut self) -> Result<SelectQuery> {
        let class_name = self.prepare()?;

        let mut query = SelectQuery::new(class_name);
        query.base.fields = self.fields;
        query.base.joins = self.joins;
        query.base.criteria = self.criteria;
        query.group_by = self.group_by;
        query.having = self.having;
        query.order_by = self.order_by;
        query.limit = self.limit;
        query.offset = self.offset;
        query.latest = self.latest;
        Ok(query)
    }

    pub fn build_insert_query(mut self) -> Result<InsertQuery> {
        let class_name = self.prepare()?;
        self.only_where("insert")?;

        let mut query = InsertQuery::new(class_name);
        query.assignments = self.assignments;
        query.on_duplicate_key_update = self.on_duplicate_key_update;
        Ok(query)
    }

    pub fn build_update_query(mut self) -> Result<UpdateQuery> {
        let class_name = self.prepare()?;

        let mut query = UpdateQuery::new(class_name);
        query.base.joins = self.joins;
        query.base.criteria = self.criteria;
        query.assignments = self.assignments;
        Ok(query)
    }

    pub fn build_delete_query(mut self) -> Result<DeleteQuery> {
        let class_name = self.prepare()?;

        let mut query = DeleteQuery::new(class_name);
        query.base.joins = self.joins;
        query.base.criteria = self.criteria;
        Ok(query)
    }

    fn prepare(&mut self) -> Result<String> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let Some(class_name) = self.class_name.take() else {
            return Err(Error::query("query has no target class"));
        };

        self.criteria.verify_balanced()?;
        self.having.verify_balanced()?;

        for join in &self.joins {
            join.extra_criteria.verify_balanced()?;

            if join.source_property.is_none() {
                return Err(Error::query(format!(
                    "join `{}` has no `on` condition",
                    join.alias
                )));
            }
        }

        Ok(class_name)
    }

    fn only_where(&self, kind: &str) -> Result<()> {
        if !self.joins.is_empty() || !self.criteria.is_empty() {
            return Err(Error::query(format!("{kind} queries take no criteria or joins")));
        }
        Ok(())
    }

    fn condition(
        mut self,
        joiner: Joiner,
        property: &str,
        operator: Operator,
        value: CriteriaValue,
        value2: Option<CriteriaValue>,
    ) -> Self {
        let expr = FieldExpression::new(property)
            .and_then(|field| CriteriaExpression::new(field, operator, value, value2));

        if let Some(expr) = self.check(expr) {
            self.current().push(joiner, expr);
        }
        self
    }

    fn current(&mut self) -> &mut CriteriaList {
        match self.clause {
            Clause::Where => &mut self.criteria,
            Clause::Having => &mut self.having,
            Clause::Join(index) => &mut self.joins[index].extra_criteria,
        }
    }

    fn check<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{CriteriaGroup, CriteriaItem};

    #[test]
    fn unbalanced_groups_fail_at_build() {
        let err = QueryBuilder::new()
            .from("Contact")
            .where_("a", Operator::Eq, 1)
            .and_start()
            .and("b", Operator::Eq, 2)
            .build_select_query()
            .unwrap_err();

        assert!(err.is_query());
    }

    #[test]
    fn first_error_wins() {
        let err = QueryBuilder::new()
            .from("Contact")
            .where_("date", Operator::Between, "2018-12-01")
            .and("ok", Operator::Eq, 1)
            .end()
            .build_select_query()
            .unwrap_err();

        assert!(err.to_string().contains("BETWEEN"), "{err}");
    }

    #[test]
    fn join_conditions_go_to_the_join() {
        let query = QueryBuilder::new()
            .from("Contact")
            .left_join("Order", "o")
            .on("id", Operator::Eq, "o.contactId")
            .and("o.status", Operator::Eq, "paid")
            .where_("lastName", Operator::Eq, "Skywalker")
            .build_select_query()
            .unwrap();

        assert_eq!(query.base.joins[0].extra_criteria.condition_count(), 1);
        assert_eq!(query.base.criteria.condition_count(), 1);
    }

    #[test]
    fn join_without_on() {
        let err = QueryBuilder::new()
            .from("Contact")
            .inner_join("Order", "o")
            .build_select_query()
            .unwrap_err();
        assert!(err.is_query());
    }

    #[test]
    fn between_with_pair() {
        let query = QueryBuilder::new()
            .from("Event")
            .where_("date", Operator::Between, vec!["2018-12-01", "2018-12-31"])
            .build_select_query()
            .unwrap();

        let expr = query.base.criteria.conditions().next().unwrap();
        assert!(expr.value2.is_some());
    }

    #[test]
    fn groups_are_recorded() {
        let query = QueryBuilder::new()
            .from("Contact")
            .where_("a", Operator::Eq, 1)
            .or_start()
            .and("b", Operator::Eq, 2)
            .end()
            .build_select_query()
            .unwrap();

        assert_eq!(
            query.base.criteria.items[1],
            CriteriaItem::Group(CriteriaGroup::StartOr)
        );
    }

    #[test]
    fn update_assignments() {
        let query = QueryBuilder::new()
            .update("Contact")
            .set("lastName", "Solo")
            .where_("id", Operator::Eq, 3)
            .build_update_query()
            .unwrap();

        assert_eq!(query.assignments.len(), 1);
    }

    #[test]
    fn missing_class() {
        assert!(QueryBuilder::new().build_delete_query().unwrap_err().is_query());
    }
}
