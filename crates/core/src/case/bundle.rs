//! Output files of one case, persisted together
//!
//! Every file is first written to a hidden temporary sibling. Existing
//! outputs are then moved aside to hidden backups, the temporaries renamed
//! into place and the backups dropped. If any step fails the backups are
//! moved back, so a failed run leaves the previous case as it was.

use super::context::CaseContext;
use super::generator::generate;
use super::terrain::{EncodedTerrain, TerrainFile};
use crate::error::{CaseError, CaseResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Text deck and, for `&GEOM` terrain, the binary terrain of one case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBundle {
    pub fds_file_name: String,
    pub fds_text: String,
    pub terrain_file: Option<TerrainFile>,
}

/// Paths of a written case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenCase {
    pub fds_path: PathBuf,
    pub terrain_path: Option<PathBuf>,
}

/// One output file on its way into place
struct Staged<'a> {
    path: PathBuf,
    contents: &'a [u8],
    temp: PathBuf,
    backup: PathBuf,
    backed_up: bool,
    placed: bool,
}

impl<'a> Staged<'a> {
    fn new(path: PathBuf, contents: &'a [u8]) -> Self {
        Self {
            temp: hidden_sibling(&path, "part"),
            backup: hidden_sibling(&path, "bak"),
            path,
            contents,
            backed_up: false,
            placed: false,
        }
    }
}

impl CaseBundle {
    /// Render the deck for `ctx` and pair it with the terrain it references
    pub fn new(ctx: &CaseContext, terrain: EncodedTerrain) -> Self {
        Self {
            fds_file_name: ctx.fds_file_name(),
            fds_text: generate(ctx),
            terrain_file: terrain.file,
        }
    }

    /// Write every file into `dir`, replacing existing ones
    ///
    /// # Errors
    /// Returns [`CaseError::Write`] if a file cannot be written; existing
    /// outputs are restored in that case.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> CaseResult<WrittenCase> {
        let dir = dir.as_ref();
        let mut files: Vec<Staged<'_>> = self
            .terrain_file
            .iter()
            .map(|file| Staged::new(dir.join(&file.name), file.bytes.as_slice()))
            .collect();
        files.push(Staged::new(
            dir.join(&self.fds_file_name),
            self.fds_text.as_bytes(),
        ));

        if let Err(err) = commit(&mut files) {
            roll_back(&files);
            return Err(err);
        }
        for file in &files {
            if file.backed_up {
                if let Err(e) = fs::remove_file(&file.backup) {
                    warn!("Could not remove backup <{}>: {e}", file.backup.display());
                }
            }
        }

        let fds_path = dir.join(&self.fds_file_name);
        let terrain_path = self.terrain_file.as_ref().map(|file| dir.join(&file.name));
        match &terrain_path {
            Some(path) => info!(
                "Saved FDS case <{}> and terrain <{}>",
                fds_path.display(),
                path.display()
            ),
            None => info!("Saved FDS case <{}>", fds_path.display()),
        }
        Ok(WrittenCase {
            fds_path,
            terrain_path,
        })
    }
}

/// Stage, back up and place every file, recording progress for roll back
fn commit(files: &mut [Staged<'_>]) -> CaseResult<()> {
    for file in files.iter() {
        fs::write(&file.temp, file.contents).map_err(|e| CaseError::write(&file.path, e))?;
        debug!(
            "Staged <{}> ({} bytes)",
            file.temp.display(),
            file.contents.len()
        );
    }
    for file in files.iter_mut() {
        if file.path.exists() {
            fs::rename(&file.path, &file.backup).map_err(|e| CaseError::write(&file.path, e))?;
            file.backed_up = true;
        }
    }
    for file in files.iter_mut() {
        fs::rename(&file.temp, &file.path).map_err(|e| CaseError::write(&file.path, e))?;
        file.placed = true;
    }
    Ok(())
}

/// Undo a partial [`commit`]: drop new files, restore backups, remove temporaries
fn roll_back(files: &[Staged<'_>]) {
    for file in files {
        if file.placed {
            let _ = fs::remove_file(&file.path);
        }
        if file.backed_up {
            if let Err(e) = fs::rename(&file.backup, &file.path) {
                warn!(
                    "Could not restore <{}> from <{}>: {e}",
                    file.path.display(),
                    file.backup.display()
                );
            }
        }
        let _ = fs::remove_file(&file.temp);
    }
}

/// Hidden file next to `path`, with `suffix` appended to its name
fn hidden_sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}
