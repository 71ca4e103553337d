//! The generated artifacts.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    LadderText,
    LadderXml,
    Scl,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::LadderText,
        ArtifactKind::LadderXml,
        ArtifactKind::Scl,
    ];

    /// The file name the artifact is written to.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::LadderText => "rockwell_ladder.txt",
            ArtifactKind::LadderXml => "rockwell_ladder.L5X",
            ArtifactKind::Scl => "siemens_scl.scl",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub content: String,
}

impl Artifact {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}

/// The three artifacts of one run. They exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub ladder_text: Artifact,
    pub ladder_xml: Artifact,
    pub scl: Artifact,
}

impl Artifacts {
    pub fn new(ladder_text: String, ladder_xml: String, scl: String) -> Self {
        Self {
            ladder_text: Artifact {
                kind: ArtifactKind::LadderText,
                content: ladder_text,
            },
            ladder_xml: Artifact {
                kind: ArtifactKind::LadderXml,
                content: ladder_xml,
            },
            scl: Artifact {
                kind: ArtifactKind::Scl,
                content: scl,
            },
        }
    }

    pub fn get(&self, kind: ArtifactKind) -> &Artifact {
        match kind {
            ArtifactKind::LadderText => &self.ladder_text,
            ArtifactKind::LadderXml => &self.ladder_xml,
            ArtifactKind::Scl => &self.scl,
        }
    }

    /// The artifacts in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        ArtifactKind::ALL.into_iter().map(move |kind| self.get(kind))
    }
}
