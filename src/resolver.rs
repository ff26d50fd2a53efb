use indexmap::IndexMap;

use crate::manifest::{LayoutDocument, MainContent, SharedLayout};
use crate::model::{Area, ChildRef, Element, Event, Field};

/// The area a screen's `mainContent` block is injected into.
pub const MAIN_CONTENT_AREA: &str = "main-content";

/// Everything the resolver needs for one screen, already loaded.
#[derive(Debug, Clone, Default)]
pub struct ScreenSources {
    pub layout: LayoutDocument,
    /// The `extends` target, when the layout names one and it exists.
    pub shared_layout: Option<SharedLayout>,
    pub fields: Vec<Field>,
    pub shared_fields: Vec<Field>,
    pub events: Vec<Event>,
    pub shared_events: Vec<Event>,
}

/// Flattened areas, elements, fields and events of one screen. Maps keep
/// first-insertion order; an overwrite keeps the key's first slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedScreen {
    pub areas: IndexMap<String, Area>,
    pub elements: IndexMap<String, Element>,
    pub fields: Vec<Field>,
    pub events: Vec<Event>,
}

/// Strips an optional `_shared/` prefix and `.yaml` suffix from an `extends`
/// value, leaving the shared document name.
pub fn extends_target(extends: &str) -> &str {
    let name = extends.strip_prefix("_shared/").unwrap_or(extends);
    name.strip_suffix(".yaml").unwrap_or(name)
}

#[tracing::instrument(skip_all, fields(screen = sources.layout.screen_id.as_deref()))]
pub fn resolve_screen(sources: &ScreenSources) -> ResolvedScreen {
    let (shared_areas, shared_elements) = match &sources.shared_layout {
        Some(shared) => (
            tag_areas(&shared.areas, true),
            keyed(shared.elements.iter().cloned(), |e| &e.element_id),
        ),
        None => (IndexMap::new(), IndexMap::new()),
    };

    let fields = merge_by_key(
        keyed(sources.shared_fields.iter().cloned(), |f| &f.field_id),
        sources.fields.iter().cloned(),
        |f| &f.field_id,
    );

    let areas = merge_by_key(
        shared_areas,
        tag_areas(&sources.layout.areas, false).into_values(),
        |a| &a.area_id,
    );
    let areas = match &sources.layout.main_content {
        Some(slot) => inject_main_content(areas, slot),
        None => areas,
    };

    let elements = merge_by_key(
        shared_elements,
        sources.layout.elements.iter().cloned(),
        |e| &e.element_id,
    );

    let events = merge_by_key(
        keyed(sources.shared_events.iter().cloned(), |e| &e.event_id),
        sources.events.iter().cloned(),
        |e| &e.event_id,
    );
    let events: Vec<Event> = events.into_values().collect();

    let elements = bind_elements(elements, &fields, &events);
    log_dangling_children(&areas, &elements);

    ResolvedScreen {
        areas,
        elements,
        fields: fields.into_values().collect(),
        events,
    }
}

fn keyed<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> &String) -> IndexMap<String, T> {
    merge_by_key(IndexMap::new(), items, key)
}

/// Returns `base` with every item of `overlay` inserted by key; later items win.
fn merge_by_key<T>(
    base: IndexMap<String, T>,
    overlay: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> &String,
) -> IndexMap<String, T> {
    let mut merged = base;
    for item in overlay {
        merged.insert(key(&item).clone(), item);
    }
    merged
}

fn tag_areas(areas: &[Area], inherited: bool) -> IndexMap<String, Area> {
    keyed(
        areas.iter().cloned().map(|mut area| {
            area.extra.remove("inherited");
            area.inherited = inherited;
            area
        }),
        |a| &a.area_id,
    )
}

/// Fills the shared `main-content` slot with the screen's own content. A
/// screen without that slot in its merged areas is left unchanged.
fn inject_main_content(mut areas: IndexMap<String, Area>, slot: &MainContent) -> IndexMap<String, Area> {
    if let Some(area) = areas.get_mut(MAIN_CONTENT_AREA) {
        if slot.layout.is_some() {
            area.layout = slot.layout;
        }
        area.children = slot.children.clone();
        area.inherited = false;
    }
    areas
}

/// Attaches the referenced field and the triggering events to each element.
fn bind_elements(
    elements: IndexMap<String, Element>,
    fields: &IndexMap<String, Field>,
    events: &[Event],
) -> IndexMap<String, Element> {
    elements
        .into_iter()
        .map(|(id, mut element)| {
            // `field` and `events` are always computed.
            element.extra.remove("field");
            element.extra.remove("events");
            element.field = element
                .field_ref
                .as_ref()
                .and_then(|field_id| fields.get(field_id))
                .cloned();
            let field_id = element.field.as_ref().map(|f| f.field_id.as_str());
            element.events = events
                .iter()
                .filter(|event| {
                    let trigger = event.trigger.element.as_str();
                    trigger == element.element_id || Some(trigger) == field_id
                })
                .cloned()
                .collect();
            (id, element)
        })
        .collect()
}

fn log_dangling_children(areas: &IndexMap<String, Area>, elements: &IndexMap<String, Element>) {
    for area in areas.values() {
        for child in area.child_refs() {
            let resolved = match child {
                ChildRef::Area(id) => areas.contains_key(id),
                ChildRef::Element(id) => elements.contains_key(id),
            };
            if !resolved {
                tracing::debug!(area = %area.area_id, child = ?child, "dropping unresolved child reference");
            }
        }
    }
}
