use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier used when a site declares no viewports at all.
pub const DEFAULT_VIEWPORT: &str = "desktop";

/// Key/value pairs a document carries beyond the modelled ones. Kept so the
/// property inspector can still show them.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Rows of area ids, e.g. `[["header", "header"], ["nav", "main"]]`.
pub type GridTemplate = Vec<Vec<String>>;

/// Per-viewport overrides, keyed by validated viewport id.
pub type ResponsiveBehavior = BTreeMap<ViewportId, ViewportOverride>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid viewport id {0:?}: expected ASCII letters, digits, '-' or '_'")]
    InvalidViewportId(String),
}

/// A responsive breakpoint name such as `desktop` or `mobile`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewportId(String);

impl ViewportId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(id))
        } else {
            Err(ModelError::InvalidViewportId(id))
        }
    }

    pub fn desktop() -> Self {
        Self(DEFAULT_VIEWPORT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ViewportId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ViewportId> for String {
    fn from(id: ViewportId) -> Self {
        id.0
    }
}

impl FromStr for ViewportId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub id: ViewportId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetail {
    pub id: String,
    pub name: String,
    pub viewports: Vec<Viewport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Vertical,
    Horizontal,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeHint {
    Auto,
    Narrow,
    Fill,
}

/// Horizontal alignment of an element inside a `horizontal` area. Hints the
/// engine does not know are preserved as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutHint {
    LeftAligned,
    RightAligned,
    Centered,
    Other(String),
}

impl From<String> for LayoutHint {
    fn from(value: String) -> Self {
        match value.as_str() {
            "leftAligned" => Self::LeftAligned,
            "rightAligned" => Self::RightAligned,
            "centered" => Self::Centered,
            _ => Self::Other(value),
        }
    }
}

impl From<LayoutHint> for String {
    fn from(hint: LayoutHint) -> Self {
        match hint {
            LayoutHint::LeftAligned => "leftAligned".to_string(),
            LayoutHint::RightAligned => "rightAligned".to_string(),
            LayoutHint::Centered => "centered".to_string(),
            LayoutHint::Other(s) => s,
        }
    }
}

/// Tri-state `gridAreas` override: a viewport can leave the base template
/// alone, clear it with an explicit `null`, or replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GridOverride {
    #[default]
    Unset,
    Cleared,
    Set(GridTemplate),
}

impl GridOverride {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl<'de> Deserialize<'de> for GridOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the key is present; a missing key takes `Default`.
        Ok(match Option::<GridTemplate>::deserialize(deserializer)? {
            Some(template) => Self::Set(template),
            None => Self::Cleared,
        })
    }
}

impl Serialize for GridOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(template) => template.serialize(serializer),
            Self::Unset | Self::Cleared => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ViewportOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<SizeHint>,
    #[serde(default, skip_serializing_if = "GridOverride::is_unset")]
    pub grid_areas: GridOverride,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hint: Option<LayoutHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// A reference from an area's `children` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef<'a> {
    Area(&'a str),
    Element(&'a str),
}

impl<'a> ChildRef<'a> {
    /// `@id` names an area, `$id` an element. Anything else is not a reference.
    pub fn parse(raw: &'a str) -> Option<Self> {
        if let Some(id) = raw.strip_prefix('@') {
            Some(Self::Area(id))
        } else {
            raw.strip_prefix('$').map(Self::Element)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub area_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<SizeHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_areas: Option<GridTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responsive_behavior: ResponsiveBehavior,
    /// Set by the resolver: true when the area comes from the shared layout
    /// and the screen did not redefine it.
    #[serde(default, skip_deserializing)]
    pub inherited: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Area {
    pub fn child_refs(&self) -> impl Iterator<Item = ChildRef<'_>> {
        self.children.iter().filter_map(|raw| ChildRef::parse(raw))
    }

    /// True when this area can act as the grid root of a screen.
    pub fn has_grid(&self) -> bool {
        self.grid_areas.as_ref().is_some_and(|rows| !rows.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hint: Option<LayoutHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responsive_behavior: ResponsiveBehavior,
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub element: String,
    #[serde(default)]
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub actions: Vec<EventAction>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Event {
    /// Display label for edges: the event name, or its id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Navigate,
    Other(String),
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        if value == "navigate" {
            Self::Navigate
        } else {
            Self::Other(value)
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Navigate => "navigate".to_string(),
            ActionKind::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<EventAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_error: Vec<EventAction>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Visits `actions` depth-first in pre-order: each action, then its
/// `onSuccess` branch, then its `onError` branch.
pub fn walk_actions<'a>(actions: &'a [EventAction], visit: &mut impl FnMut(&'a EventAction)) {
    for action in actions {
        visit(action);
        walk_actions(&action.on_success, visit);
        walk_actions(&action.on_error, visit);
    }
}

/// Request-scoped read model of one fully resolved screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDetail {
    pub screen_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub areas: Vec<Area>,
    pub elements: Vec<Element>,
    pub fields: Vec<Field>,
    pub events: Vec<Event>,
    pub viewports: Vec<Viewport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionNode {
    pub id: String,
    pub screen_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub event_id: String,
    pub is_external: bool,
    pub is_shared: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionGraph {
    pub nodes: Vec<TransitionNode>,
    pub edges: Vec<TransitionEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_id_rejects_path_like_values() {
        assert!(ViewportId::new("mobile").is_ok());
        assert!(ViewportId::new("tablet_landscape-2").is_ok());
        assert!(ViewportId::new("").is_err());
        assert!(ViewportId::new("../etc").is_err());
        assert!(ViewportId::new("wide screen").is_err());
    }

    #[test]
    fn override_distinguishes_null_grid_from_missing() {
        let cleared: ViewportOverride = serde_yaml::from_str("gridAreas: null").unwrap();
        assert_eq!(cleared.grid_areas, GridOverride::Cleared);

        let untouched: ViewportOverride = serde_yaml::from_str("hidden: true").unwrap();
        assert_eq!(untouched.grid_areas, GridOverride::Unset);
        assert_eq!(untouched.hidden, Some(true));

        let set: ViewportOverride = serde_yaml::from_str("gridAreas: [[a, b]]").unwrap();
        assert_eq!(
            set.grid_areas,
            GridOverride::Set(vec![vec!["a".to_string(), "b".to_string()]])
        );
    }

    #[test]
    fn override_rejects_unknown_keys() {
        let err = serde_yaml::from_str::<ViewportOverride>("hiden: true");
        assert!(err.is_err());
    }

    #[test]
    fn responsive_behavior_rejects_bad_viewport_keys() {
        let yaml = "areaId: nav\nresponsiveBehavior:\n  'bad key':\n    hidden: true\n";
        assert!(serde_yaml::from_str::<Area>(yaml).is_err());
    }

    #[test]
    fn child_refs_skip_unprefixed_entries() {
        let area: Area =
            serde_yaml::from_str("areaId: a\nchildren: ['@b', '$c', 'd']\n").unwrap();
        let refs: Vec<_> = area.child_refs().collect();
        assert_eq!(refs, vec![ChildRef::Area("b"), ChildRef::Element("c")]);
    }

    #[test]
    fn unknown_layout_hint_round_trips() {
        let hint: LayoutHint = serde_json::from_str("\"stretch\"").unwrap();
        assert_eq!(hint, LayoutHint::Other("stretch".to_string()));
        assert_eq!(serde_json::to_string(&hint).unwrap(), "\"stretch\"");
    }

    #[test]
    fn field_keeps_unmodelled_keys() {
        let field: Field =
            serde_yaml::from_str("fieldId: f\ntype: select\noptionsSource: {api: list}\n")
                .unwrap();
        assert_eq!(field.field_type, "select");
        assert!(field.extra.contains_key("optionsSource"));
    }

    #[test]
    fn walk_actions_is_pre_order() {
        let yaml = r#"
- type: callApi
  target: a
  onSuccess:
    - type: navigate
      target: b
  onError:
    - type: navigate
      target: c
- type: navigate
  target: d
"#;
        let actions: Vec<EventAction> = serde_yaml::from_str(yaml).unwrap();
        let mut seen = Vec::new();
        walk_actions(&actions, &mut |a| seen.push(a.target.clone().unwrap()));
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }
}
