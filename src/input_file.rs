use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::params::Params;

/// Media argument of the `send*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFile {
    /// Local file, uploaded as multipart.
    Path(PathBuf),
    /// In-memory content, uploaded as multipart under `file_name`.
    Memory { file_name: String, data: Vec<u8> },
    /// A `file_id` already stored on the server, or an HTTP URL.
    Remote(String),
}

impl InputFile {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        InputFile::Path(path.into())
    }

    pub fn memory(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        InputFile::Memory {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn remote(id_or_url: impl Into<String>) -> Self {
        InputFile::Remote(id_or_url.into())
    }

    /// Puts a remote reference into `params` under `field`, or reads the
    /// content that has to be uploaded.
    pub(crate) async fn prepare(self, field: &str, params: &mut Params) -> Result<Option<Upload>> {
        match self {
            InputFile::Remote(id) => {
                params.set(field, id);
                Ok(None)
            }
            InputFile::Memory { file_name, data } => Ok(Some(Upload {
                field: field.to_string(),
                file_name,
                data,
            })),
            InputFile::Path(path) => {
                let data = tokio::fs::read(&path).await?;
                Ok(Some(Upload {
                    field: field.to_string(),
                    file_name: base_name(&path),
                    data,
                }))
            }
        }
    }
}

impl From<&Path> for InputFile {
    fn from(path: &Path) -> Self {
        InputFile::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for InputFile {
    fn from(path: PathBuf) -> Self {
        InputFile::Path(path)
    }
}

/// File part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field the file is sent under (`photo`, `audio`, ...).
    pub field: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}
