//! Destinations for generated artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use stepgen_dsl::diagnostic::{Diagnostic, Label};
use stepgen_problems::Problem;

use crate::artifact::{Artifact, Artifacts};

/// Receives the artifacts of one run as a set.
pub trait ArtifactSink {
    fn write(&mut self, artifacts: &Artifacts) -> Result<(), Diagnostic>;
}

/// Writes the artifacts as files into a directory.
///
/// Every artifact is first written to a staged file next to its target.
/// Existing targets are moved aside before the staged files are renamed
/// over them. A failure at any point removes the staged files and puts the
/// previous files back, so the directory holds either the new set or the
/// old one.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

/// One artifact on its way to its target.
#[derive(Debug)]
struct Placement {
    staged: PathBuf,
    target: PathBuf,
    backup: PathBuf,
    backed_up: bool,
    placed: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path the artifact is written to.
    pub fn path_of(&self, artifact: &Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    fn hidden_path(&self, artifact: &Artifact, extension: &str) -> PathBuf {
        self.dir.join(format!(".{}.{}", artifact.file_name(), extension))
    }

    fn stage(&self, artifacts: &Artifacts) -> Result<Vec<Placement>, Diagnostic> {
        let mut placements = vec![];
        for artifact in artifacts.iter() {
            let placement = Placement {
                staged: self.hidden_path(artifact, "partial"),
                target: self.path_of(artifact),
                backup: self.hidden_path(artifact, "bak"),
                backed_up: false,
                placed: false,
            };
            if let Err(err) = fs::write(&placement.staged, &artifact.content) {
                let _ = fs::remove_file(&placement.staged);
                roll_back(&placements);
                return Err(write_error(&placement.staged, err));
            }
            placements.push(placement);
        }
        Ok(placements)
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, artifacts: &Artifacts) -> Result<(), Diagnostic> {
        fs::create_dir_all(&self.dir).map_err(|err| write_error(&self.dir, err))?;

        let mut placements = self.stage(artifacts)?;
        if let Err(err) = place(&mut placements) {
            roll_back(&placements);
            return Err(err);
        }

        for placement in placements.iter().filter(|p| p.backed_up) {
            let _ = fs::remove_file(&placement.backup);
        }

        info!("Wrote artifacts to {}", self.dir.display());
        Ok(())
    }
}

fn place(placements: &mut [Placement]) -> Result<(), Diagnostic> {
    // Only regular files are moved aside; anything else at a target makes
    // its rename fail.
    for placement in placements.iter_mut() {
        if placement.target.is_file() {
            fs::rename(&placement.target, &placement.backup)
                .map_err(|err| write_error(&placement.target, err))?;
            placement.backed_up = true;
        }
    }

    for placement in placements.iter_mut() {
        fs::rename(&placement.staged, &placement.target)
            .map_err(|err| write_error(&placement.target, err))?;
        placement.placed = true;
        debug!("Wrote {}", placement.target.display());
    }
    Ok(())
}

/// Removes what a failed write left behind and restores the previous files.
fn roll_back(placements: &[Placement]) {
    for placement in placements {
        if placement.placed {
            let _ = fs::remove_file(&placement.target);
        } else {
            let _ = fs::remove_file(&placement.staged);
        }
        if placement.backed_up {
            if let Err(err) = fs::rename(&placement.backup, &placement.target) {
                warn!("Unable to restore {}: {}", placement.target.display(), err);
            }
        }
    }
}

fn write_error(path: &Path, err: std::io::Error) -> Diagnostic {
    Diagnostic::problem(Problem::ArtifactWrite, Label::file(path, err.to_string()))
}

/// Keeps the written artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub written: Vec<Artifacts>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Artifacts> {
        self.written.last()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifacts: &Artifacts) -> Result<(), Diagnostic> {
        self.written.push(artifacts.clone());
        Ok(())
    }
}
