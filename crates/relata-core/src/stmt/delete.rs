use super::QueryBase;
use crate::{mapping::MappingCollection, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub base: QueryBase,
}

impl DeleteQuery {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            base: QueryBase::new(class_name),
        }
    }

    pub(crate) fn finalise(&mut self, mapping: &MappingCollection) -> Result<()> {
        if self.base.is_finalised() {
            return Ok(());
        }

        self.base.verify(mapping)?;

        let paths: Vec<_> = self.base.criteria.property_paths().into_iter().cloned().collect();
        self.base.add_relationship_joins(mapping, Some(&paths));
        self.base.latch();
        Ok(())
    }
}
