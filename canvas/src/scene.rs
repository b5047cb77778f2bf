//! Background scene identifiers.
//!
//! Any string is a legal scene id. Unknown ids are kept verbatim and simply
//! have no matching background when rendered.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SceneId {
    /// Plain cream background.
    #[default]
    Clean,
    /// Dotted notebook paper.
    Notebook,
    /// Pastel gradient.
    Dreamy,
    /// Room backdrop.
    Room,
    /// Any other id supplied by the host.
    Custom(String),
}

impl SceneId {
    /// Scenes with a known background.
    pub const KNOWN: [SceneId; 4] = [SceneId::Clean, SceneId::Notebook, SceneId::Dreamy, SceneId::Room];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clean => "clean",
            Self::Notebook => "notebook",
            Self::Dreamy => "dreamy",
            Self::Room => "room",
            Self::Custom(id) => id,
        }
    }

    /// Returns `true` if a background exists for this scene.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for SceneId {
    fn from(raw: &str) -> Self {
        match raw {
            "clean" => Self::Clean,
            "notebook" => Self::Notebook,
            "dreamy" => Self::Dreamy,
            "room" => Self::Room,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for SceneId {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<SceneId> for String {
    fn from(scene: SceneId) -> Self {
        scene.as_str().to_owned()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
