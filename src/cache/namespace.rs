//! Cache namespaces.

use std::fmt;

use serde::Serialize;

/// An independently bounded partition of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// Lists of caption tracks per video
    TrackList,
    /// Subtitle segments per video (and language)
    SubtitleBody,
}

impl Namespace {
    /// Every namespace, in a stable order.
    pub const ALL: [Namespace; 2] = [Namespace::TrackList, Namespace::SubtitleBody];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::TrackList => "track-list",
            Namespace::SubtitleBody => "subtitle-body",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
