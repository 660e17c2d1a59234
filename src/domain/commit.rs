//! Commit source classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which producer triggered a tree revision.
///
/// Only [`CommitSource::React`] is distinguished by mount propagation: it is
/// the primary reconciliation pipeline and the only source allowed to
/// refresh runtime references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitSource {
    #[default]
    Unknown,
    React,
    AnimationEndSync,
    ReactRevisionMerge,
}

impl CommitSource {
    pub fn is_primary(self) -> bool {
        self == CommitSource::React
    }
}

impl fmt::Display for CommitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitSource::Unknown => "unknown",
            CommitSource::React => "react",
            CommitSource::AnimationEndSync => "animation-end-sync",
            CommitSource::ReactRevisionMerge => "react-revision-merge",
        };
        f.write_str(name)
    }
}
