//! Codemodel reply model and lazy per-target documents.
//!
//! The codemodel reply names the configured targets; the detail for each one
//! (compile groups, source list) lives in a separate per-target document that
//! is only read when iteration reaches it.

use crate::error::{ApiError, Result};
use crate::reply::read_reply_file;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CodemodelFile {
    #[serde(default)]
    configurations: Vec<Configuration>,
    paths: CodemodelPaths,
}

#[derive(Debug, Deserialize)]
struct Configuration {
    #[serde(default)]
    name: String,
    #[serde(default)]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    name: String,
    #[serde(rename = "jsonFile")]
    json_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CodemodelPaths {
    source: PathBuf,
}

/// Handle to a lazily-loaded per-target document.
///
/// The filename recorded in the codemodel acts as an untyped pointer; it is
/// wrapped here so dereferencing always goes through [`load_target`].
#[derive(Debug, Clone)]
pub struct TargetRef {
    pub name: String,
    json_file: PathBuf,
}

/// Resolve a target handle to its parsed per-target document.
pub fn load_target(target: &TargetRef) -> Result<TargetDocument> {
    read_reply_file(&target.json_file)
}

/// The selected configuration's target list and the project source root.
#[derive(Debug)]
pub struct Codemodel {
    pub source_root: PathBuf,
    pub targets: Vec<TargetRef>,
}

impl Codemodel {
    /// Load the codemodel from its reply document. Target document paths in
    /// the reply are relative to the reply directory and are absolutized
    /// here.
    ///
    /// Configuration index 0 is selected unconditionally; disambiguating
    /// multi-configuration generators is a known limitation, not supported.
    pub fn load(path: &Path, reply_dir: &Path) -> Result<Self> {
        let file: CodemodelFile = read_reply_file(path)?;

        let config = file.configurations.into_iter().next().ok_or_else(|| {
            ApiError::CodemodelParseError(format!(
                "no configurations in {}",
                path.display()
            ))
        })?;
        tracing::debug!(
            configuration = %config.name,
            targets = config.targets.len(),
            "loaded codemodel"
        );

        let targets = config
            .targets
            .into_iter()
            .map(|t| TargetRef {
                name: t.name,
                json_file: reply_dir.join(t.json_file),
            })
            .collect();

        Ok(Self {
            source_root: file.paths.source,
            targets,
        })
    }
}

/// Per-target reply document.
#[derive(Debug, Deserialize)]
pub struct TargetDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "compileGroups")]
    pub compile_groups: Vec<CompileGroup>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

impl TargetDocument {
    /// Resolve one compile-group source index against this target's source
    /// list. Indexes are produced by the build tool and must land inside the
    /// list; anything else is a malformed document.
    pub fn source_path(&self, index: usize) -> Result<&Path> {
        self.sources
            .get(index)
            .map(|s| s.path.as_path())
            .ok_or_else(|| {
                ApiError::CodemodelParseError(format!(
                    "target {:?} has no source at index {} ({} sources)",
                    self.name,
                    index,
                    self.sources.len()
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct SourceEntry {
    pub path: PathBuf,
}

/// Sources within one target that share flags, includes, and defines for one
/// language.
#[derive(Debug, Deserialize)]
pub struct CompileGroup {
    #[serde(default)]
    pub language: String,
    #[serde(default, rename = "compileCommandFragments")]
    pub fragments: Vec<Fragment>,
    #[serde(default)]
    pub includes: Vec<IncludeDir>,
    #[serde(default)]
    pub defines: Vec<Define>,
    #[serde(default, rename = "sourceIndexes")]
    pub source_indexes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Fragment {
    pub fragment: String,
}

#[derive(Debug, Deserialize)]
pub struct IncludeDir {
    pub path: PathBuf,
    #[serde(default, rename = "isSystem")]
    pub is_system: bool,
}

#[derive(Debug, Deserialize)]
pub struct Define {
    pub define: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_selects_first_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codemodel-v2-abc.json");
        fs::write(
            &path,
            r#"{
                "kind": "codemodel",
                "paths": { "source": "C:/proj", "build": "C:/proj/build" },
                "configurations": [
                    {
                        "name": "Debug",
                        "targets": [
                            { "name": "app", "jsonFile": "target-app.json" },
                            { "name": "lib", "jsonFile": "target-lib.json" }
                        ]
                    },
                    { "name": "Release", "targets": [] }
                ]
            }"#,
        )
        .unwrap();

        let codemodel = Codemodel::load(&path, dir.path()).unwrap();
        assert_eq!(codemodel.source_root, PathBuf::from("C:/proj"));
        assert_eq!(codemodel.targets.len(), 2);
        assert_eq!(codemodel.targets[0].name, "app");
        assert_eq!(
            codemodel.targets[0].json_file,
            dir.path().join("target-app.json")
        );
    }

    #[test]
    fn test_load_no_configurations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codemodel-v2-abc.json");
        fs::write(
            &path,
            r#"{ "kind": "codemodel", "paths": { "source": "/src" }, "configurations": [] }"#,
        )
        .unwrap();

        let err = Codemodel::load(&path, dir.path()).unwrap_err();
        assert!(matches!(err, ApiError::CodemodelParseError(_)));
    }

    #[test]
    fn test_target_document_source_index_bounds() {
        let doc: TargetDocument = serde_json::from_str(
            r#"{
                "name": "app",
                "sources": [ { "path": "src/main.cpp" } ],
                "compileGroups": []
            }"#,
        )
        .unwrap();

        assert_eq!(doc.source_path(0).unwrap(), Path::new("src/main.cpp"));
        let err = doc.source_path(1).unwrap_err();
        assert!(matches!(err, ApiError::CodemodelParseError(_)));
    }
}
