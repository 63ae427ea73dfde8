use super::Joiner;

/// Bracket marker in a linear criteria list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaGroup {
    /// `AND (`
    StartAnd,

    /// `OR (`
    StartOr,

    /// `)`
    End,
}

impl CriteriaGroup {
    pub fn start(joiner: Joiner) -> Self {
        match joiner {
            Joiner::And => Self::StartAnd,
            Joiner::Or => Self::StartOr,
        }
    }

    pub fn is_start(self) -> bool {
        !self.is_end()
    }

    pub fn is_end(self) -> bool {
        matches!(self, Self::End)
    }

    /// The joiner that links the opened group to what precedes it.
    pub fn joiner(self) -> Option<Joiner> {
        match self {
            Self::StartAnd => Some(Joiner::And),
            Self::StartOr => Some(Joiner::Or),
            Self::End => None,
        }
    }
}
