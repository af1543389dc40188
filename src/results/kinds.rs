//! Classification enums for harvest results

use std::fmt;

/// Post-extraction classification of an article body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validity {
    /// Body length within bounds, stored as extracted
    Ok,

    /// Body longer than the configured ceiling; stored text was cut
    Truncated,

    /// Body shorter than the configured floor (video or graphic pages)
    Empty,
}

impl Validity {
    /// Classifies a body of `character_count` characters
    pub fn classify(character_count: usize, min_chars: usize, max_chars: usize) -> Self {
        if character_count < min_chars {
            Self::Empty
        } else if character_count > max_chars {
            Self::Truncated
        } else {
            Self::Ok
        }
    }

    /// Suffix written after the character count in tabular output
    ///
    /// `Ok` records carry no comment.
    pub fn comment(&self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::Truncated => "TRUNCATED",
            Self::Empty => "EMPTY",
        }
    }

    /// Converts the flag to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Truncated => "truncated",
            Self::Empty => "empty",
        }
    }

    /// Parses a flag from a database string representation
    #[cfg(test)]
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(Self::Ok),
            "truncated" => Some(Self::Truncated),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    /// Returns all flags
    pub fn all() -> [Self; 3] {
        [Self::Ok, Self::Truncated, Self::Empty]
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// The pipeline stage at which a failure was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorStage {
    /// The page could not be retrieved
    Fetch,

    /// The page was retrieved but an expected element was missing
    Parse,

    /// A topic-month page listed a different number of links and dates
    Structural,
}

impl ErrorStage {
    /// Upper-case label used in the error log
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetch => "FETCH",
            Self::Parse => "PARSE",
            Self::Structural => "STRUCTURAL",
        }
    }

    /// Converts the stage to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Structural => "structural",
        }
    }

    /// Parses a stage from a database string representation
    #[cfg(test)]
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "fetch" => Some(Self::Fetch),
            "parse" => Some(Self::Parse),
            "structural" => Some(Self::Structural),
            _ => None,
        }
    }

    /// Returns all stages
    pub fn all() -> [Self; 3] {
        [Self::Fetch, Self::Parse, Self::Structural]
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
