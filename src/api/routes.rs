//! Ordered route table
//!
//! Every path the router serves is decided here, before anything is handed to
//! axum. Overlaps between complaint mounts and the catch-all are resolved
//! according to [`RoutePrecedence`] instead of registration order.

use crate::config::{RoutePrecedence, RoutesSection};
use crate::error::{Error, Result};

/// Path of the complaints router relative to its mount point.
pub const COMPLAINTS_PATH: &str = "/complaints";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// `GET /`
    Root,
    /// `POST` to a complaints path. Other methods go to the catch-all when it
    /// covers the path.
    Complaint { catch_all_fallback: bool },
    /// Every method on the exact catch-all prefix.
    CatchAllPrefix,
    /// Every method on any path below the catch-all prefix.
    CatchAllWildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub kind: RouteKind,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    shadowed: Vec<String>,
}

impl RouteTable {
    pub fn from_config(config: &RoutesSection) -> Result<Self> {
        let catch_all = if config.catch_all.enabled {
            let prefix = normalize_prefix(&config.catch_all.prefix)?;
            if prefix.is_empty() {
                return Err(Error::invalid_route(
                    "catch-all prefix must not be the root path",
                ));
            }
            Some(prefix)
        } else {
            None
        };

        let mut complaint_paths: Vec<String> = Vec::new();
        for mount in &config.complaint_mounts {
            let path = format!("{}{}", normalize_prefix(mount)?, COMPLAINTS_PATH);
            if !complaint_paths.contains(&path) {
                complaint_paths.push(path);
            }
        }

        let mut table = RouteTable::default();
        table.push("/", RouteKind::Root);

        for path in complaint_paths {
            let covered = catch_all
                .as_deref()
                .is_some_and(|prefix| is_under(&path, prefix));

            if covered && config.precedence == RoutePrecedence::CatchAllFirst {
                table.shadowed.push(path);
                continue;
            }

            table.push(
                path,
                RouteKind::Complaint {
                    catch_all_fallback: covered,
                },
            );
        }

        if let Some(prefix) = catch_all {
            // A complaint route sitting exactly on the prefix already falls
            // back to the catch-all handler.
            if !table.contains_path(&prefix) {
                table.push(prefix.clone(), RouteKind::CatchAllPrefix);
            }
            table.push(format!("{prefix}/*rest"), RouteKind::CatchAllWildcard);
        }

        Ok(table)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Complaint paths that were dropped because the catch-all claims them.
    pub fn shadowed(&self) -> &[String] {
        &self.shadowed
    }

    /// Paths that accept `POST` for complaint creation.
    pub fn complaint_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, RouteKind::Complaint { .. }))
            .map(|e| e.path.as_str())
    }

    fn push(&mut self, path: impl Into<String>, kind: RouteKind) {
        self.entries.push(RouteEntry {
            path: path.into(),
            kind,
        });
    }

    fn contains_path(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }
}

/// Normalise a mount prefix: `""` and `"/"` become the root (`""`), trailing
/// slashes are dropped and ASCII case is folded, matching how request paths
/// are rewritten before routing. Wildcards and path parameters are rejected.
fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Ok(String::new());
    }

    if !trimmed.starts_with('/') {
        return Err(Error::invalid_route(format!(
            "prefix '{trimmed}' must start with '/'"
        )));
    }

    if trimmed.contains(['*', ':', '{', '}']) {
        return Err(Error::invalid_route(format!(
            "prefix '{trimmed}' must not contain wildcards or parameters"
        )));
    }

    let prefix = trimmed.trim_end_matches('/');
    if prefix.split('/').skip(1).any(str::is_empty) {
        return Err(Error::invalid_route(format!(
            "prefix '{trimmed}' contains an empty segment"
        )));
    }

    Ok(prefix.to_ascii_lowercase())
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
