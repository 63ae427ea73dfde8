mod assignment;
pub use assignment::Assignments;

mod builder;
pub use builder::QueryBuilder;

mod criteria;
pub use criteria::CriteriaExpression;

mod criteria_group;
pub use criteria_group::CriteriaGroup;

mod criteria_list;
pub use criteria_list::{CriteriaItem, CriteriaList, Joiner};

mod criteria_value;
pub use criteria_value::CriteriaValue;

mod delete;
pub use delete::DeleteQuery;

mod direction;
pub use direction::Direction;

mod field_expr;
pub use field_expr::{ExprPart, FieldExpression};

mod insert;
pub use insert::InsertQuery;

mod join;
pub use join::{JoinExpression, JoinKind, JoinTarget};

mod normalize;
pub use normalize::{normalize, IntoCriteria, NormalizeOptions};

mod op;
pub use op::Operator;

mod order_by;
pub use order_by::OrderByExpr;

mod path;
pub use path::PropertyPath;

mod query;
pub use query::{Query, QueryBase};

mod select;
pub use select::{LatestRecord, SelectQuery};

mod ty;
pub use ty::Type;

mod update;
pub use update::UpdateQuery;

mod value;
pub use value::Value;
