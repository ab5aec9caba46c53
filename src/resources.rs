//! SQL text resources resolved under a configured root directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{EtlError, EtlResult};

/// Resolves `<root>/<resource>.sql` and reads it in full.
#[derive(Debug, Clone)]
pub struct QueryResources {
    root: PathBuf,
}

impl QueryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a resource name.
    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.root.join(format!("{}.sql", resource))
    }

    /// Read the SQL text of a resource.
    pub fn load(&self, resource: &str) -> EtlResult<String> {
        let path = self.path_for(resource);
        let sql = match fs::read_to_string(&path) {
            Ok(sql) => sql,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EtlError::resource_missing(path));
            }
            Err(e) => return Err(e.into()),
        };

        if sql.trim().is_empty() {
            return Err(EtlError::execution(format!(
                "SQL resource {} is empty",
                path.display()
            )));
        }
        Ok(sql)
    }
}
