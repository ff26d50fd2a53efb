use serde::{Deserialize, Serialize};

use crate::model::{Area, Element, Event, Field, LayoutMode, Viewport};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SiteSection {
    pub name: Option<String>,
}

/// `site.yaml`. The display name may sit at the top level or under `site:`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SiteManifest {
    pub name: Option<String>,
    pub site: Option<SiteSection>,
    #[serde(default)]
    pub viewports: Vec<Viewport>,
}

impl SiteManifest {
    /// The nested `site.name` wins over the top-level `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.site
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .or(self.name.as_deref())
    }
}

/// Slot content a screen injects into the shared `main-content` area.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MainContent {
    pub layout: Option<LayoutMode>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// `screens/<id>/layout.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub screen_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub extends: Option<String>, // e.g. "_shared/app-layout"
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub main_content: Option<MainContent>,
}

/// A layout under `_shared/`, either the app chrome or an `extends` target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedLayout {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventsDocument {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Field documents are normally a bare list; a `fields:` wrapper is accepted too.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldsDocument {
    List(Vec<Field>),
    Wrapped {
        #[serde(default)]
        fields: Vec<Field>,
    },
}

impl FieldsDocument {
    pub fn into_fields(self) -> Vec<Field> {
        match self {
            Self::List(fields) | Self::Wrapped { fields } => fields,
        }
    }
}
