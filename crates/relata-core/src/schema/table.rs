/// Raw table metadata for a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,

    /// Name of a custom repository registered for this class
    pub repository: Option<String>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: None,
        }
    }

    pub fn repository(mut self, name: impl Into<String>) -> Self {
        self.repository = Some(name.into());
        self
    }
}
