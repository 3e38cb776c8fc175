//! Test data loader
//!
//! Reads named data files from the per-format trees (`test-data/json`,
//! `test-data/yaml`). Both formats deserialize into `serde_json::Value` so
//! the same logical record is structurally equal regardless of source
//! format. No caching: loads happen at suite-definition time only.

use crate::settings::DataFormat;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Loader failure taxonomy. Data failures are hard stops for the caller:
/// a parameterized test cannot run without its records.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("test data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {} as {format}: {detail}", .path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        detail: String,
    },

    #[error("test data file {} has no field '{key}'", .path.display())]
    MissingKey { path: PathBuf, key: String },

    #[error("field '{key}' in {} is not an array", .path.display())]
    NotAnArray { path: PathBuf, key: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct DataLoader {
    root: PathBuf,
    format: DataFormat,
}

impl DataLoader {
    pub fn new(root: impl Into<PathBuf>, format: DataFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// Resolve `<root>/<format-dir>/<base>.<ext>`
    fn file_path(&self, base: &str, format: DataFormat) -> PathBuf {
        self.root
            .join(format.dir_name())
            .join(format!("{}.{}", base, format.extension()))
    }

    /// Load a named data file as one record
    pub fn load(&self, base: &str, format_override: Option<DataFormat>) -> Result<Value, DataError> {
        let format = format_override.unwrap_or(self.format);
        let path = self.file_path(base, format);

        if !path.is_file() {
            return Err(DataError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;

        match format {
            DataFormat::Json => {
                serde_json::from_str(&content).map_err(|e| DataError::Parse {
                    path,
                    format: "JSON",
                    detail: e.to_string(),
                })
            }
            DataFormat::Yaml => {
                let yaml: serde_yaml::Value =
                    serde_yaml::from_str(&content).map_err(|e| DataError::Parse {
                        path: path.clone(),
                        format: "YAML",
                        detail: e.to_string(),
                    })?;
                // Re-encode through serde_json so both formats yield the
                // same Value shape for identical logical content
                serde_json::to_value(yaml).map_err(|e| DataError::Parse {
                    path,
                    format: "YAML",
                    detail: e.to_string(),
                })
            }
        }
    }

    /// Load a record and require a named array field, returning its items
    pub fn load_array(&self, base: &str, key: &str) -> Result<Vec<Value>, DataError> {
        let record = self.load(base, None)?;
        let path = self.file_path(base, self.format);

        let field = record.get(key).ok_or_else(|| DataError::MissingKey {
            path: path.clone(),
            key: key.to_string(),
        })?;

        match field {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(DataError::NotAnArray {
                path,
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("json")).unwrap();
        std::fs::create_dir_all(dir.path().join("yaml")).unwrap();
        std::fs::write(
            dir.path().join("json/users.json"),
            r#"{"validUsers":[{"username":"a","password":"secret"}],"note":"fixtures"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("yaml/users.yaml"),
            "validUsers:\n  - username: a\n    password: secret\nnote: fixtures\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_array_returns_typed_records() {
        let root = fixture_root();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let users = loader.load_array("users", "validUsers").unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "a");
    }

    #[test]
    fn test_missing_key_is_typed_error() {
        let root = fixture_root();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let err = loader.load_array("users", "adminUsers").unwrap_err();
        assert!(matches!(err, DataError::MissingKey { .. }));
    }

    #[test]
    fn test_scalar_key_is_not_an_array() {
        let root = fixture_root();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let err = loader.load_array("users", "note").unwrap_err();
        assert!(matches!(err, DataError::NotAnArray { .. }));
    }

    #[test]
    fn test_absent_file_is_not_found() {
        let root = fixture_root();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let err = loader.load("missing", None).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_malformed_content_reports_parse_detail() {
        let root = fixture_root();
        std::fs::write(root.path().join("json/broken.json"), "{not json").unwrap();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let err = loader.load("broken", None).unwrap_err();
        match err {
            DataError::Parse { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_and_yaml_round_trip_equal() {
        let root = fixture_root();
        let loader = DataLoader::new(root.path(), DataFormat::Json);
        let from_json = loader.load("users", None).unwrap();
        let from_yaml = loader.load("users", Some(DataFormat::Yaml)).unwrap();
        assert_eq!(from_json, from_yaml);
    }
}
