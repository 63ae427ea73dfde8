use super::{Assignments, QueryBase};
use crate::{mapping::MappingCollection, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub base: QueryBase,

    pub assignments: Assignments,
}

impl UpdateQuery {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            base: QueryBase::new(class_name),
            assignments: Assignments::new(),
        }
    }

    pub(crate) fn finalise(&mut self, mapping: &MappingCollection) -> Result<()> {
        if self.base.is_finalised() {
            return Ok(());
        }

        self.base.verify(mapping)?;

        if self.assignments.is_empty() {
            return Err(Error::query(format!(
                "update of `{}` has no assignments",
                self.base.class_name
            )));
        }

        let paths: Vec<_> = self.base.criteria.property_paths().into_iter().cloned().collect();
        self.base.add_relationship_joins(mapping, Some(&paths));
        self.base.latch();
        Ok(())
    }
}
