use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{EventsDocument, FieldsDocument, LayoutDocument, SharedLayout, SiteManifest};
use crate::model::{Event, Field};

const SITES_DIR: &str = "sites";
const SCREENS_DIR: &str = "screens";
/// Reserved directory for site-wide documents. Never listed as a screen or site.
pub const SHARED_DIR: &str = "_shared";
pub const APP_LAYOUT: &str = "app-layout";
pub const APP_FIELDS: &str = "app-fields";
pub const APP_EVENTS: &str = "app-events";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of reading one YAML document. Absent and malformed are kept apart
/// so callers decide which of them is fatal.
#[derive(Debug)]
pub enum Document<T> {
    Present(T),
    Absent,
    Malformed(String),
}

impl<T> Document<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Document<U> {
        match self {
            Self::Present(v) => Document::Present(f(v)),
            Self::Absent => Document::Absent,
            Self::Malformed(e) => Document::Malformed(e),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Treats a malformed document as absent after logging it.
    pub fn optional(self, what: &str) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent => None,
            Self::Malformed(reason) => {
                tracing::warn!(document = what, %reason, "ignoring malformed document");
                None
            }
        }
    }
}

/// Read-only view over a design tree:
/// `sites/<site>/{site.yaml,_shared/,screens/<screen>/}`.
#[derive(Debug, Clone)]
pub struct DesignVault {
    root: PathBuf,
}

impl DesignVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn site_dir(&self, site_id: &str) -> Option<PathBuf> {
        is_plain_segment(site_id).then(|| self.root.join(SITES_DIR).join(site_id))
    }

    fn screen_dir(&self, site_id: &str, screen_id: &str) -> Option<PathBuf> {
        if !is_plain_segment(screen_id) {
            return None;
        }
        self.site_dir(site_id)
            .map(|dir| dir.join(SCREENS_DIR).join(screen_id))
    }

    fn shared_path(&self, site_id: &str, name: &str) -> Option<PathBuf> {
        if !is_plain_segment(name) {
            return None;
        }
        self.site_dir(site_id)
            .map(|dir| dir.join(SHARED_DIR).join(format!("{name}.yaml")))
    }

    /// Site directory names, sorted, skipping `_`-prefixed entries. A missing
    /// `sites/` directory yields an empty list.
    pub fn site_ids(&self) -> Result<Vec<String>, LoadError> {
        list_dirs(&self.root.join(SITES_DIR))
            .map(|ids| ids.into_iter().filter(|id| !id.starts_with('_')).collect())
    }

    pub fn site_exists(&self, site_id: &str) -> bool {
        self.site_dir(site_id).is_some_and(|dir| dir.is_dir())
    }

    /// Screen directory names of a site, sorted. The reserved shared
    /// directory is never a screen.
    pub fn screen_ids(&self, site_id: &str) -> Result<Vec<String>, LoadError> {
        let Some(dir) = self.site_dir(site_id) else {
            return Ok(Vec::new());
        };
        list_dirs(&dir.join(SCREENS_DIR))
            .map(|ids| ids.into_iter().filter(|id| id != SHARED_DIR).collect())
    }

    pub fn screen_exists(&self, site_id: &str, screen_id: &str) -> bool {
        self.screen_dir(site_id, screen_id)
            .is_some_and(|dir| dir.is_dir())
    }

    pub fn site_manifest(&self, site_id: &str) -> Document<SiteManifest> {
        match self.site_dir(site_id) {
            Some(dir) => read_yaml(&dir.join("site.yaml")),
            None => Document::Absent,
        }
    }

    pub fn layout(&self, site_id: &str, screen_id: &str) -> Document<LayoutDocument> {
        self.screen_document(site_id, screen_id, "layout.yaml")
    }

    pub fn fields(&self, site_id: &str, screen_id: &str) -> Document<Vec<Field>> {
        self.screen_document::<FieldsDocument>(site_id, screen_id, "fields.yaml")
            .map(FieldsDocument::into_fields)
    }

    pub fn events(&self, site_id: &str, screen_id: &str) -> Document<Vec<Event>> {
        self.screen_document::<EventsDocument>(site_id, screen_id, "events.yaml")
            .map(|doc| doc.events)
    }

    /// Loads `_shared/<name>.yaml`; `name` is an `extends` value with any
    /// `_shared/` prefix or `.yaml` suffix already stripped.
    pub fn shared_layout(&self, site_id: &str, name: &str) -> Document<SharedLayout> {
        match self.shared_path(site_id, name) {
            Some(path) => read_yaml(&path),
            None => Document::Absent,
        }
    }

    pub fn shared_fields(&self, site_id: &str) -> Document<Vec<Field>> {
        match self.shared_path(site_id, APP_FIELDS) {
            Some(path) => read_yaml::<FieldsDocument>(&path).map(FieldsDocument::into_fields),
            None => Document::Absent,
        }
    }

    pub fn shared_events(&self, site_id: &str) -> Document<Vec<Event>> {
        match self.shared_path(site_id, APP_EVENTS) {
            Some(path) => read_yaml::<EventsDocument>(&path).map(|doc| doc.events),
            None => Document::Absent,
        }
    }

    fn screen_document<T: DeserializeOwned>(
        &self,
        site_id: &str,
        screen_id: &str,
        file: &str,
    ) -> Document<T> {
        match self.screen_dir(site_id, screen_id) {
            Some(dir) => read_yaml(&dir.join(file)),
            None => Document::Absent,
        }
    }
}

/// Ids arrive from URLs; only single, non-dot path segments are accepted.
fn is_plain_segment(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

fn list_dirs(path: &Path) -> Result<Vec<String>, LoadError> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LoadError::List {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::List {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

/// An empty file counts as absent.
fn read_yaml<T: DeserializeOwned>(path: &Path) -> Document<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Document::Absent,
        Err(e) => return Document::Malformed(format!("{}: {e}", path.display())),
    };
    if raw.trim().is_empty() {
        return Document::Absent;
    }
    match serde_yaml::from_str(&raw) {
        Ok(doc) => Document::Present(doc),
        Err(e) => Document::Malformed(format!("{}: {e}", path.display())),
    }
}
