use super::{Direction, FieldExpression};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub field: FieldExpression,
    pub direction: Direction,
}

impl OrderByExpr {
    pub fn new(field: FieldExpression, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: &str) -> Result<Self> {
        Ok(Self::new(FieldExpression::new(field)?, Direction::Asc))
    }

    pub fn desc(field: &str) -> Result<Self> {
        Ok(Self::new(FieldExpression::new(field)?, Direction::Desc))
    }
}
