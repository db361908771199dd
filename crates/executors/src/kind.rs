//! The fixed set of built-in task type tags.

use serde::{Deserialize, Serialize};

use crate::UnsupportedTaskType;

/// Built-in task types.
///
/// Tasks store their type as a plain string so that tags outside this set
/// can still be persisted; they are rejected when the workflow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    HttpRequest,
    Email,
    Database,
    Transform,
    Conditional,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        Self::HttpRequest,
        Self::Email,
        Self::Database,
        Self::Transform,
        Self::Conditional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HttpRequest => "http_request",
            Self::Email => "email",
            Self::Database => "database",
            Self::Transform => "transform",
            Self::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = UnsupportedTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedTaskType(s.to_owned()))
    }
}
