//! Raw-result stores.
//!
//! A raw-result store holds the unscored output of each parameter setting
//! (e.g. TREC run files), one file per parameter, named by the parameter id.
//! It is either a plain directory or a tar archive (optionally gzip
//! compressed) of such files.
//!
//! ```text
//! runs/                      runs.tar.gz
//! ├── bm25.k1-0.9            ├── runs/bm25.k1-0.9
//! ├── bm25.k1-1.2            ├── runs/bm25.k1-1.2
//! └── ql.mu-1000             └── runs/ql.mu-1000
//! ```

use crate::error::StoreError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Location of a raw-result store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStore {
    /// Directory with one file per parameter id
    Directory(PathBuf),
    /// tar or tar.gz archive with one member per parameter id
    Archive(PathBuf),
}

impl RawStore {
    /// Classifies `path` as a directory or archive store.
    pub fn detect(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.is_dir() {
            Ok(Self::Directory(path))
        } else if path.is_file() {
            Ok(Self::Archive(path))
        } else {
            Err(StoreError::NotFound(path.display().to_string()))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }

    /// Opens the store. The returned handle releases its resources on drop.
    pub fn open(&self) -> Result<OpenStore, StoreError> {
        match self {
            Self::Directory(path) => Ok(OpenStore::Directory(path.clone())),
            Self::Archive(path) => {
                let archive = open_archive(path).map_err(|source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(OpenStore::Archive {
                    path: path.clone(),
                    archive,
                })
            }
        }
    }
}

/// An open raw-result store, scoped to one lookup session.
pub enum OpenStore {
    Directory(PathBuf),
    Archive {
        path: PathBuf,
        archive: tar::Archive<Box<dyn Read>>,
    },
}

impl OpenStore {
    /// Opens the member named `name`, or `None` if the store has no such member.
    ///
    /// Archive members match on their full path or, for archives that nest
    /// files under a directory, on their final path component. Archives are
    /// read sequentially, so a handle serves one member lookup.
    pub fn open_member(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>, StoreError> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(name);
                match File::open(&path) {
                    Ok(file) if path.is_file() => Ok(Some(Box::new(BufReader::new(file)))),
                    Ok(_) => Ok(None),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(StoreError::Io {
                        path: path.display().to_string(),
                        source,
                    }),
                }
            }
            Self::Archive { path, archive } => {
                let io_error = |source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                };

                for entry in archive.entries().map_err(io_error)? {
                    let entry = entry.map_err(io_error)?;
                    if !entry.header().entry_type().is_file() {
                        continue;
                    }
                    let entry_path = entry.path().map_err(io_error)?;
                    let matches = entry_path.as_os_str() == name
                        || entry_path.file_name().is_some_and(|file| file == name);
                    if matches {
                        return Ok(Some(Box::new(entry)));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Reads the whole member named `name` as text (lossy UTF-8).
    pub fn read_member(&mut self, name: &str) -> Result<Option<String>, StoreError> {
        let location = self.display_member(name);
        let Some(mut member) = self.open_member(name)? else {
            return Ok(None);
        };

        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|source| StoreError::Io {
                path: location,
                source,
            })?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Visits every file in the store with its file name and contents.
    ///
    /// Directory files are visited in name order, archive members in
    /// archive order. Subdirectories are not descended into; archive members
    /// are named by their final path component.
    pub fn for_each_member<E>(
        &mut self,
        mut visit: impl FnMut(&str, &mut dyn Read) -> Result<(), E>,
    ) -> Result<(), E>
    where
        E: From<StoreError>,
    {
        match self {
            Self::Directory(dir) => {
                let io_error = |source| StoreError::Io {
                    path: dir.display().to_string(),
                    source,
                };

                let mut files = Vec::new();
                for entry in std::fs::read_dir(&*dir).map_err(io_error)? {
                    let path = entry.map_err(io_error)?.path();
                    if path.is_file() {
                        files.push(path);
                    }
                }
                files.sort();

                for path in files {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let mut file = File::open(&path).map_err(|source| StoreError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                    visit(&name, &mut file)?;
                }
                Ok(())
            }
            Self::Archive { path, archive } => {
                let io_error = |source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                };

                for entry in archive.entries().map_err(io_error)? {
                    let mut entry = entry.map_err(io_error)?;
                    if !entry.header().entry_type().is_file() {
                        continue;
                    }
                    let name = entry
                        .path()
                        .map_err(io_error)?
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    visit(&name, &mut entry)?;
                }
                Ok(())
            }
        }
    }

    fn display_member(&self, name: &str) -> String {
        match self {
            Self::Directory(dir) => dir.join(name).display().to_string(),
            Self::Archive { path, .. } => format!("{}:{}", path.display(), name),
        }
    }
}

fn open_archive(path: &Path) -> io::Result<tar::Archive<Box<dyn Read>>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    drop(file);

    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if read == 2 && magic == GZIP_MAGIC {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(tar::Archive::new(reader))
}
