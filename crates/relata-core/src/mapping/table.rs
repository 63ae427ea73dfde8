#[derive(Debug, Clone, PartialEq)]
pub struct TableMapping {
    pub name: String,

    /// Alias used in rendered SQL
    pub alias: String,

    /// Custom repository registered for the class
    pub repository: Option<String>,
}
