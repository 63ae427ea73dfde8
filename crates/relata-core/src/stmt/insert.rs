use super::{Assignments, QueryBase};
use crate::{mapping::MappingCollection, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub base: QueryBase,

    pub assignments: Assignments,

    /// On a primary or unique key conflict, update the assigned non-key
    /// columns instead of failing
    pub on_duplicate_key_update: bool,
}

impl InsertQuery {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            base: QueryBase::new(class_name),
            assignments: Assignments::new(),
            on_duplicate_key_update: false,
        }
    }

    pub(crate) fn finalise(&mut self, mapping: &MappingCollection) -> Result<()> {
        if self.base.is_finalised() {
            return Ok(());
        }

        self.base.verify(mapping)?;

        if self.assignments.is_empty() {
            return Err(Error::query(format!(
                "insert into `{}` has no values",
                self.base.class_name
            )));
        }

        self.base.latch();
        Ok(())
    }
}
