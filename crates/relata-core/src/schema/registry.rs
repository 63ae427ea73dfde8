use super::{ClassDef, MetadataProvider};

use indexmap::IndexMap;

/// A declarative, in-memory [`MetadataProvider`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: IndexMap<String, ClassDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: ClassDef) -> Self {
        self.register(class);
        self
    }

    pub fn register(&mut self, class: ClassDef) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values()
    }
}

impl MetadataProvider for Registry {
    fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }
}
