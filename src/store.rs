//! Fields-file storage
//!
//! Resolves fields-file names to paths under the registry directory and runs
//! append/create against them. Every write goes through a temp file and a
//! rename, and appends hold an exclusive lock on `<file>.lock` from the read
//! until the write lands.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use similar::{ChangeTag, TextDiff};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{DuplicatePolicy, FieldsConfig};
use crate::error::{FieldsError, Result};
use crate::merge::{merge, DuplicateField, Registry};
use crate::normalize::{normalize, RawFieldInput};
use crate::transform::{transformer_for, GENERIC_PROFILE};

/// Access to the fields-files in one directory
#[derive(Debug, Clone)]
pub struct RegistryStore {
    /// Directory holding the fields-files
    root: PathBuf,
    /// Extension appended to bare file names
    extension: String,
    /// Transformation profile for new fields
    profile: String,
}

/// Outcome of appending to a fields-file
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// The file did not exist and was created from the batch
    Created {
        path: PathBuf,
        added: Vec<String>,
        warnings: Vec<DuplicateField>,
        diff: Option<String>,
    },
    /// The batch was merged into the existing file
    Merged {
        path: PathBuf,
        added: Vec<String>,
        warnings: Vec<DuplicateField>,
        diff: Option<String>,
    },
}

impl AppendOutcome {
    pub fn path(&self) -> &Path {
        match self {
            AppendOutcome::Created { path, .. } | AppendOutcome::Merged { path, .. } => path,
        }
    }

    pub fn added(&self) -> &[String] {
        match self {
            AppendOutcome::Created { added, .. } | AppendOutcome::Merged { added, .. } => added,
        }
    }

    pub fn warnings(&self) -> &[DuplicateField] {
        match self {
            AppendOutcome::Created { warnings, .. } | AppendOutcome::Merged { warnings, .. } => warnings,
        }
    }

    /// Diff of the change, present for dry runs only
    pub fn diff(&self) -> Option<&str> {
        match self {
            AppendOutcome::Created { diff, .. } | AppendOutcome::Merged { diff, .. } => diff.as_deref(),
        }
    }

    /// Apply the duplicate policy to this outcome
    pub fn check(&self, policy: DuplicatePolicy) -> Result<()> {
        let warnings = self.warnings();
        if policy == DuplicatePolicy::Strict && !warnings.is_empty() {
            return Err(FieldsError::DuplicateFields {
                names: warnings.iter().map(|w| w.name.clone()).collect(),
            });
        }
        Ok(())
    }
}

/// Options for [`RegistryStore::append`] and [`RegistryStore::create`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Compute the result and a diff without touching the file
    pub dry_run: bool,
    /// Let `create` replace an existing file
    pub force: bool,
}

/// Exclusive lock on one fields-file, released on drop
pub struct RegistryLock {
    file: fs::File,
    path: PathBuf,
}

impl RegistryLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl RegistryStore {
    /// Store rooted at `root` with the default extension and profile
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: ".json".to_string(),
            profile: GENERIC_PROFILE.to_string(),
        }
    }

    pub fn from_config(config: &FieldsConfig) -> Self {
        Self {
            root: config.registry_path(),
            extension: config.registry.extension.clone(),
            profile: config.transform.profile.clone(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Path of a fields-file, adding the extension when it is missing
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        let file_name = file_name.trim();
        if file_name.ends_with(&self.extension) {
            self.root.join(file_name)
        } else {
            self.root.join(format!("{}{}", file_name, self.extension))
        }
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.file_path(file_name).is_file()
    }

    pub fn read(&self, file_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.file_path(file_name))?)
    }

    /// Replace a fields-file's content (temp file + rename)
    pub fn write(&self, file_name: &str, content: &str) -> Result<()> {
        let path = self.file_path(file_name);
        atomic_write(&path, content.as_bytes())?;
        info!(path = %path.display(), "wrote fields-file");
        Ok(())
    }

    /// Decode a fields-file
    pub fn load(&self, file_name: &str) -> Result<Registry> {
        let path = self.file_path(file_name);
        let content = fs::read_to_string(&path)?;
        Registry::decode(&content).map_err(|e| e.at_path(&path))
    }

    /// All fields-files in the registry directory, sorted
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(&self.extension))
                .unwrap_or(false);
            if matches {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Take the exclusive lock for a fields-file without blocking
    pub fn lock(&self, file_name: &str) -> Result<RegistryLock> {
        let path = self.file_path(file_name);
        let lock_path = lock_path_for(&path);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(RegistryLock { file, path: lock_path }),
            Err(e) => Err(lock_error(e, path)),
        }
    }

    /// Append fields to a fields-file, creating it if it does not exist
    pub fn append(&self, file_name: &str, input: &RawFieldInput, options: WriteOptions) -> Result<AppendOutcome> {
        input.validate()?;

        let path = self.file_path(file_name);
        let _lock = if options.dry_run { None } else { Some(self.lock(file_name)?) };

        if !path.is_file() {
            warn!(path = %path.display(), "the fields-file does not exist, creating it");
            return self.create_unlocked(file_name, input, options);
        }

        let transformer = transformer_for(&self.profile)?;
        let batch = normalize(input, transformer.as_ref())?;

        let existing = fs::read_to_string(&path)?;
        let outcome = merge(&existing, batch).map_err(|e| e.at_path(&path))?;
        debug!(
            path = %path.display(),
            added = outcome.added.len(),
            skipped = outcome.warnings.len(),
            "merged fields"
        );

        let diff = if options.dry_run {
            Some(render_diff(&existing, &outcome.serialized))
        } else {
            if !outcome.added.is_empty() {
                self.write(file_name, &outcome.serialized)?;
            }
            None
        };

        Ok(AppendOutcome::Merged {
            path,
            added: outcome.added,
            warnings: outcome.warnings,
            diff,
        })
    }

    /// Create a fields-file from a batch
    pub fn create(&self, file_name: &str, input: &RawFieldInput, options: WriteOptions) -> Result<AppendOutcome> {
        input.validate()?;
        let _lock = if options.dry_run { None } else { Some(self.lock(file_name)?) };
        self.create_unlocked(file_name, input, options)
    }

    fn create_unlocked(&self, file_name: &str, input: &RawFieldInput, options: WriteOptions) -> Result<AppendOutcome> {
        let path = self.file_path(file_name);
        if path.is_file() && !options.force {
            return Err(FieldsError::AlreadyExists(path));
        }

        let transformer = transformer_for(&self.profile)?;
        let batch = normalize(input, transformer.as_ref())?;

        // Repeated names are dropped the same way a merge would drop them
        let mut registry = Registry::new();
        let (added, warnings) = registry.append(batch);
        let content = registry.encode()?;

        let diff = if options.dry_run {
            let previous = if path.is_file() { fs::read_to_string(&path)? } else { String::new() };
            Some(render_diff(&previous, &content))
        } else {
            self.write(file_name, &content)?;
            None
        };

        Ok(AppendOutcome::Created {
            path,
            added,
            warnings,
            diff,
        })
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Only contention means "busy"; anything else is a plain I/O failure
fn lock_error(err: io::Error, path: PathBuf) -> FieldsError {
    if err.kind() == fs2::lock_contended_error().kind() {
        FieldsError::LockBusy(path)
    } else {
        FieldsError::Io(err)
    }
}

/// Atomic write via a uniquely named temp file and rename
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Line diff of two fields-file contents
fn render_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        out.push(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
