use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::output::error::OutputError;
use crate::settings::ReportSettings;

pub(crate) struct JsonOutput {
    path: PathBuf,
    pretty: bool,
}

impl JsonOutput {
    pub(crate) fn new(settings: ReportSettings) -> Self {
        Self {
            path: settings.path,
            pretty: settings.pretty,
        }
    }

    pub(crate) fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn write<T>(&self, data: &T) -> Result<(), OutputError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OutputError::io(parent, source))?;
        }
        fs::write(&self.path, encoded).map_err(|source| OutputError::io(&self.path, source))?;
        Ok(())
    }
}
