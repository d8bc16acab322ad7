//! Reply document reading and index resolution.
//!
//! The File API writes its output as a set of JSON documents under
//! `<buildRoot>/.cmake/api/v1/reply/`. A top-level index file
//! (`index-*.json`) names the build tool and points at the per-kind response
//! documents generated for each client query.

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Client name under which cmscan registers its query.
pub const CLIENT_NAME: &str = "client-cmscan";

/// Filename prefix shared by all index documents.
pub const INDEX_PREFIX: &str = "index-";

/// Read and parse one reply document.
///
/// No retries: reply files are produced synchronously by the configure step
/// immediately before being read, so a missing file is a real upstream
/// failure.
pub fn read_reply_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Err(ApiError::ReplyNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| ApiError::ReplyParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ApiError::ReplyParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Parse a reply document from a JSON string.
pub fn parse_reply_str<T: DeserializeOwned>(what: &str, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| ApiError::ReplyParseError {
        path: what.to_string(),
        reason: e.to_string(),
    })
}

/// Locate and parse the most recent index document in `<api_dir>/reply`.
///
/// Index filenames embed a monotonically increasing timestamp token, so the
/// lexicographically greatest name is the newest document regardless of
/// filesystem iteration order.
pub fn resolve_index(api_dir: &Path) -> Result<IndexFile> {
    let reply_dir = api_dir.join("reply");
    let entries =
        fs::read_dir(&reply_dir).map_err(|_| ApiError::IndexNotFound(reply_dir.clone()))?;

    let mut newest: Option<PathBuf> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(INDEX_PREFIX) || !name.ends_with(".json") {
            continue;
        }
        let path = entry.path();
        match &newest {
            Some(best) if best.file_name() >= path.file_name() => {}
            _ => newest = Some(path),
        }
    }

    let index_path = newest.ok_or_else(|| ApiError::IndexNotFound(reply_dir.clone()))?;
    tracing::debug!(index = %index_path.display(), "resolved File API index");
    read_reply_file(&index_path)
}

/// Top-level index document.
#[derive(Debug, Deserialize)]
pub struct IndexFile {
    pub cmake: CmakeDescription,
    /// Reply section, keyed by client name. The value shapes differ between
    /// client sections and shared stateless queries, so navigation happens
    /// through [`IndexFile::response`] rather than a fully typed model.
    #[serde(default)]
    reply: serde_json::Value,
}

/// Build-tool identity recorded in the index.
#[derive(Debug, Deserialize)]
pub struct CmakeDescription {
    pub paths: CmakePaths,
    pub version: CmakeVersion,
}

#[derive(Debug, Deserialize)]
pub struct CmakePaths {
    pub cmake: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct CmakeVersion {
    pub string: String,
}

/// Reference to one per-kind response document, relative to the reply dir.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRef {
    pub kind: String,
    #[serde(rename = "jsonFile")]
    pub json_file: PathBuf,
}

impl IndexFile {
    /// Look up the response document generated for one request kind of this
    /// client's query. Returns `None` when the kind was not answered (for
    /// example `toolchains` on a CMake that predates it).
    pub fn response(&self, kind: &str) -> Option<ReplyRef> {
        let responses = self
            .reply
            .get(CLIENT_NAME)?
            .get("query.json")?
            .get("responses")?
            .as_array()?;
        responses
            .iter()
            .filter_map(|r| serde_json::from_value::<ReplyRef>(r.clone()).ok())
            .find(|r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn index_json(version: &str) -> String {
        format!(
            r#"{{
                "cmake": {{
                    "paths": {{ "cmake": "/opt/cmake/bin/cmake" }},
                    "version": {{ "string": "{version}" }}
                }},
                "reply": {{
                    "client-cmscan": {{
                        "query.json": {{
                            "responses": [
                                {{ "kind": "cache", "jsonFile": "cache-v2-abc.json" }},
                                {{ "kind": "codemodel", "jsonFile": "codemodel-v2-abc.json" }}
                            ]
                        }}
                    }}
                }}
            }}"#
        )
    }

    #[test]
    fn test_read_missing_reply() {
        let err = read_reply_file::<IndexFile>(Path::new("/nonexistent/reply.json")).unwrap_err();
        assert!(matches!(err, ApiError::ReplyNotFound(_)));
    }

    #[test]
    fn test_read_empty_path() {
        let err = read_reply_file::<IndexFile>(Path::new("")).unwrap_err();
        assert!(matches!(err, ApiError::ReplyNotFound(_)));
    }

    #[test]
    fn test_read_malformed_reply() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "bad.json", "{ not json");
        let err = read_reply_file::<IndexFile>(&dir.path().join("bad.json")).unwrap_err();
        assert!(matches!(err, ApiError::ReplyParseError { .. }));
    }

    #[test]
    fn test_resolve_index_picks_lexicographic_max() {
        let dir = tempfile::tempdir().unwrap();
        let reply = dir.path().join("reply");
        fs::create_dir_all(&reply).unwrap();
        write_file(&reply, "index-2023-01-01T00-00-00-0000.json", &index_json("3.20.0"));
        write_file(&reply, "index-2024-06-01T12-30-00-0001.json", &index_json("3.26.4"));
        write_file(&reply, "index-2024-01-15T08-00-00-0000.json", &index_json("3.24.1"));

        let index = resolve_index(dir.path()).unwrap();
        assert_eq!(index.cmake.version.string, "3.26.4");
    }

    #[test]
    fn test_resolve_index_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("reply")).unwrap();
        let err = resolve_index(dir.path()).unwrap_err();
        assert!(matches!(err, ApiError::IndexNotFound(_)));
    }

    #[test]
    fn test_response_lookup() {
        let index: IndexFile = parse_reply_str("index", &index_json("3.21.0")).unwrap();
        let cache = index.response("cache").unwrap();
        assert_eq!(cache.json_file, PathBuf::from("cache-v2-abc.json"));
        assert!(index.response("toolchains").is_none());
    }
}
