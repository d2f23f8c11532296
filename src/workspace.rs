//! Workspace build context and source discovery
//!
//! A [`Workspace`] is the explicit state threaded through a run: every
//! top-level definition discovered so far and every registration request,
//! both append-only. One is constructed per run and passed by reference
//! into each file-processing step; there is no global state.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::errors::{Error, Result};
use crate::model::Frame;
use crate::scan::extract::{extract_frame, FrameMatch};
use crate::scan::normalize::normalize;
use crate::scan::registry::{scan_registrations, Registration};

/// Extensions of files worth scanning.
const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];

/// A top-level definition together with the file it came from, kept so a
/// duplicate can name both locations.
#[derive(Debug)]
pub struct Definition {
    pub frame: Frame,
    pub file: PathBuf,
}

/// Accumulated scan state for one generator run.
#[derive(Debug, Default)]
pub struct Workspace {
    /// Top-level frames keyed by declared type name.
    pub definitions: FxHashMap<String, Definition>,
    /// Deduplicated registration requests in first-seen order.
    pub registrations: Vec<Registration>,
    seen: FxHashSet<Registration>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one source file: collect registration requests from the raw
    /// text, then normalize and extract every struct/union definition.
    pub fn scan_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        for registration in scan_registrations(&raw, path) {
            if self.seen.insert(registration.clone()) {
                self.registrations.push(registration);
            }
        }

        let normalized = normalize(&raw).map_err(|e| Error::parse(path, e))?;
        let mut rest = normalized;
        loop {
            let (matched, remainder) =
                extract_frame(&rest).map_err(|e| Error::parse(path, e))?;
            match matched {
                FrameMatch::None => break,
                FrameMatch::Skipped => {}
                FrameMatch::Definition(raw_frame) => {
                    let frame = Frame::from_raw(raw_frame).map_err(|e| Error::parse(path, e))?;
                    self.insert_definition(frame, path)?;
                }
            }
            rest = remainder;
        }
        Ok(())
    }

    fn insert_definition(&mut self, frame: Frame, file: &Path) -> Result<()> {
        // Anonymous top-level definitions cannot be addressed by a
        // registration; keying them would only manufacture collisions.
        if frame.type_name == frame.kind.anonymous_name() {
            debug!(file = %file.display(), "skipping anonymous top-level definition");
            return Ok(());
        }

        if let Some(existing) = self.definitions.get(&frame.type_name) {
            return Err(Error::DuplicateDefinition {
                name: frame.type_name.clone(),
                first: existing.file.clone(),
                second: file.to_path_buf(),
            });
        }
        debug!(file = %file.display(), type_name = %frame.type_name, "definition");
        self.definitions.insert(
            frame.type_name.clone(),
            Definition {
                frame,
                file: file.to_path_buf(),
            },
        );
        Ok(())
    }
}

/// Collect every scannable source file under the root and the extra
/// include directories, excluding the output file itself. The list is
/// sorted so a run is reproducible regardless of directory order.
pub fn discover_sources(
    root: &Path,
    includes: &[PathBuf],
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let output_canonical = output.canonicalize().ok();

    let mut files = Vec::new();
    collect_dir(root, &output_canonical, &mut files)?;
    for include in includes {
        if include.is_dir() {
            collect_dir(include, &output_canonical, &mut files)?;
        } else {
            warn!(path = %include.display(), "include path is not a directory");
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_dir(
    dir: &Path,
    output: &Option<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        // file_type() does not follow symlinks, so a linked directory is
        // never recursed into; a link cycle under the root would otherwise
        // recurse without bound. Symlinked plain files still scan.
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            collect_dir(&path, output, files)?;
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            continue;
        }
        let scannable = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        if !scannable {
            continue;
        }
        if output.as_deref().is_some_and(|out| {
            path.canonicalize().map(|p| p == out).unwrap_or(false)
        }) {
            continue;
        }
        files.push(path);
    }
    Ok(())
}
