//! Query descriptor construction.

use crate::error::{ApiError, Result};
use crate::reply::CLIENT_NAME;
use crate::version::{ToolVersion, TOOLCHAINS_MAX_VERSION};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Query {
    requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
struct Request {
    kind: &'static str,
    version: u32,
}

/// Build the request list for one detected build-tool version.
///
/// `cache` and `codemodel` are always requested; `toolchains` only at or
/// below [`TOOLCHAINS_MAX_VERSION`]. Above the threshold the simpler pair is
/// assumed to suffice, with toolchain data re-derived from the cache.
fn requests_for(version: ToolVersion) -> Vec<Request> {
    let mut requests = vec![
        Request {
            kind: "cache",
            version: 2,
        },
        Request {
            kind: "codemodel",
            version: 2,
        },
    ];
    if version <= TOOLCHAINS_MAX_VERSION {
        requests.push(Request {
            kind: "toolchains",
            version: 1,
        });
    }
    requests
}

/// Write `<api_dir>/query/client-cmscan/query.json`, creating missing
/// directories on the way.
pub fn write_query(api_dir: &Path, version: ToolVersion) -> Result<()> {
    let query_dir = api_dir.join("query").join(CLIENT_NAME);
    let query_path = query_dir.join("query.json");

    let write = |path: &Path| -> std::io::Result<()> {
        fs::create_dir_all(&query_dir)?;
        let query = Query {
            requests: requests_for(version),
        };
        let body = serde_json::to_string_pretty(&query)?;
        fs::write(path, body)
    };

    write(&query_path).map_err(|e| ApiError::QueryWriteError {
        path: query_path.clone(),
        reason: e.to_string(),
    })?;
    tracing::debug!(query = %query_path.display(), %version, "wrote File API query");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_include_toolchains_below_threshold() {
        let kinds: Vec<_> = requests_for(ToolVersion::new(3, 21, 0))
            .iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(kinds, vec!["cache", "codemodel", "toolchains"]);
    }

    #[test]
    fn test_requests_omit_toolchains_above_threshold() {
        let kinds: Vec<_> = requests_for(ToolVersion::new(3, 28, 0))
            .iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(kinds, vec!["cache", "codemodel"]);
    }

    #[test]
    fn test_write_query_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_query(dir.path(), ToolVersion::new(3, 21, 0)).unwrap();

        let body =
            fs::read_to_string(dir.path().join("query").join(CLIENT_NAME).join("query.json"))
                .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        let requests = parsed["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0]["kind"], "cache");
        assert_eq!(requests[0]["version"], 2);
        assert_eq!(requests[2]["kind"], "toolchains");
        assert_eq!(requests[2]["version"], 1);
    }
}
