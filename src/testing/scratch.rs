//! Scratch files for field list persistence tests.
//!
//! Everything here lives under the system temp directory and disappears when
//! the owning value is dropped.

use crate::field::FieldList;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// An empty `.json` file, removed on drop.
pub struct TempJsonFile {
    file: NamedTempFile,
}

impl TempJsonFile {
    pub fn create() -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("ironflow-")
            .suffix(".json")
            .tempfile()
            .context("create temporary json file")?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// A directory that starts empty and is removed, with its contents, on drop.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ironflow-")
            .tempdir()
            .context("create scratch directory")?;
        Ok(Self { dir })
    }

    /// Path of `relative` inside the directory. Nothing is created.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// Write `fields` to a fresh [`TempJsonFile`].
///
/// ```
/// use ironflow::FieldList;
/// use ironflow::testing::field_list_file;
///
/// # fn main() -> anyhow::Result<()> {
/// let fields = FieldList::from_names(["a"])?;
/// let file = field_list_file(&fields)?;
/// assert_eq!(FieldList::load(file.path())?, fields);
/// # Ok(())
/// # }
/// ```
pub fn field_list_file(fields: &FieldList) -> Result<TempJsonFile> {
    let file = TempJsonFile::create()?;
    fields.save(file.path())?;
    Ok(file)
}
