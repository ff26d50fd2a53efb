use std::collections::{HashMap, HashSet};

use crate::manifest::{LayoutDocument, SharedLayout};
use crate::model::{
    ActionKind, Area, ChildRef, Event, TransitionEdge, TransitionGraph, TransitionNode, ViewportId,
    walk_actions,
};
use crate::viewport::{hidden_subtrees, is_hidden};

/// Prefix of transition-graph ids for shared (cross-screen) areas.
pub const SHARED_NODE_PREFIX: &str = "_shared-";

/// One screen directory of a site.
#[derive(Debug, Clone, Default)]
pub struct ScreenEntry {
    pub screen_id: String,
    /// `None` when the layout is missing or unreadable; the screen then gets
    /// no node but still counts as a local navigation target.
    pub layout: Option<LayoutDocument>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteSources {
    pub screens: Vec<ScreenEntry>,
    pub shared_layout: Option<SharedLayout>,
    pub shared_events: Vec<Event>,
}

/// Maps `$element` children of shared areas to the area listing them. When
/// an element appears under several areas the last one wins.
pub fn element_area_index(shared: &SharedLayout) -> HashMap<&str, &Area> {
    let mut index = HashMap::new();
    for area in &shared.areas {
        for child in area.child_refs() {
            if let ChildRef::Element(id) = child {
                index.insert(id, area);
            }
        }
    }
    index
}

/// Builds the site's screen-transition graph.
///
/// Nodes come first for every screen with a layout, then one synthetic node
/// per shared area owning the trigger of a shared event. Edges follow the
/// same order: shared events first, then each screen's own events. With a
/// `viewport`, shared areas hidden there (themselves or through an ancestor)
/// contribute nothing, and neither do shared events on hidden elements.
#[tracing::instrument(skip(sources), fields(screens = sources.screens.len()))]
pub fn build_transitions(sources: &SiteSources, viewport: Option<&ViewportId>) -> TransitionGraph {
    let screen_ids: HashSet<&str> = sources
        .screens
        .iter()
        .map(|s| s.screen_id.as_str())
        .collect();
    let mut graph = TransitionGraph::default();

    for screen in &sources.screens {
        if let Some(layout) = &screen.layout {
            graph.nodes.push(TransitionNode {
                id: node_id(&screen.screen_id),
                screen_id: screen.screen_id.clone(),
                label: layout
                    .title
                    .clone()
                    .unwrap_or_else(|| screen.screen_id.clone()),
                description: layout.description.clone(),
            });
        }
    }

    let index = sources
        .shared_layout
        .as_ref()
        .map(element_area_index)
        .unwrap_or_default();
    let (hidden_areas, hidden_elements): (HashSet<&str>, HashSet<&str>) =
        match (viewport, &sources.shared_layout) {
            (Some(vp), Some(shared)) => (
                hidden_subtrees(&shared.areas, vp),
                shared
                    .elements
                    .iter()
                    .filter(|e| is_hidden(&e.responsive_behavior, vp))
                    .map(|e| e.element_id.as_str())
                    .collect(),
            ),
            _ => (HashSet::new(), HashSet::new()),
        };
    let mut seen_areas = HashSet::new();

    for event in &sources.shared_events {
        let trigger = event.trigger.element.as_str();
        let Some(area) = index.get(trigger) else {
            tracing::debug!(event = %event.event_id, "shared event trigger is not inside a shared area");
            continue;
        };
        if hidden_areas.contains(area.area_id.as_str()) || hidden_elements.contains(trigger) {
            continue;
        }

        let label = area.name.clone().unwrap_or_else(|| area.area_id.clone());
        if seen_areas.insert(area.area_id.as_str()) {
            graph.nodes.push(TransitionNode {
                id: node_id(&shared_source(&area.area_id)),
                screen_id: format!("_shared/{}", area.area_id),
                description: Some(format!("Shared component: {label}")),
                label,
            });
        }
        push_navigation_edges(event, &shared_source(&area.area_id), &screen_ids, true, &mut graph.edges);
    }

    for screen in &sources.screens {
        for event in &screen.events {
            push_navigation_edges(event, &screen.screen_id, &screen_ids, false, &mut graph.edges);
        }
    }

    graph
}

fn node_id(screen_id: &str) -> String {
    format!("node-{screen_id}")
}

fn shared_source(area_id: &str) -> String {
    format!("{SHARED_NODE_PREFIX}{area_id}")
}

/// Emits one edge per `navigate` action with a target, in pre-order.
fn push_navigation_edges(
    event: &Event,
    source: &str,
    screen_ids: &HashSet<&str>,
    is_shared: bool,
    edges: &mut Vec<TransitionEdge>,
) {
    walk_actions(&event.actions, &mut |action| {
        let (ActionKind::Navigate, Some(target)) = (&action.kind, &action.target) else {
            return;
        };
        edges.push(TransitionEdge {
            id: format!("edge-{}-{target}", event.event_id),
            source: node_id(source),
            target: node_id(target),
            label: event.label().to_string(),
            event_id: event.event_id.clone(),
            is_external: !screen_ids.contains(target.as_str()),
            is_shared,
        });
    });
}
