use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::model::{
    Area, ChildRef, Element, GridOverride, GridTemplate, LayoutHint, LayoutMode,
    ResponsiveBehavior, SizeHint, Viewport, ViewportId, ViewportOverride,
};

/// Picks the widest declared viewport. Missing `minWidth` counts as 0 and the
/// first declared viewport wins a tie; no viewports at all means `desktop`.
pub fn default_viewport(viewports: &[Viewport]) -> ViewportId {
    viewports
        .iter()
        .rev()
        .max_by_key(|vp| vp.min_width.unwrap_or(0))
        .map(|vp| vp.id.clone())
        .unwrap_or_else(ViewportId::desktop)
}

pub fn override_for<'a>(
    behavior: &'a ResponsiveBehavior,
    viewport: &ViewportId,
) -> Option<&'a ViewportOverride> {
    behavior.get(viewport)
}

pub fn is_hidden(behavior: &ResponsiveBehavior, viewport: &ViewportId) -> bool {
    override_for(behavior, viewport)
        .and_then(|o| o.hidden)
        .unwrap_or(false)
}

/// Layout attributes of an area at one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveArea {
    pub hidden: bool,
    pub layout: Option<LayoutMode>,
    pub size_hint: Option<SizeHint>,
    pub grid_areas: Option<GridTemplate>,
}

/// Layout attributes of an element at one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveElement {
    pub hidden: bool,
    pub layout_hint: Option<LayoutHint>,
}

/// Overlays the viewport's entry key by key: only keys the entry defines
/// replace base values.
pub fn effective_area(area: &Area, viewport: &ViewportId) -> EffectiveArea {
    let base = EffectiveArea {
        hidden: false,
        layout: area.layout,
        size_hint: area.size_hint,
        grid_areas: area.grid_areas.clone(),
    };
    let Some(o) = override_for(&area.responsive_behavior, viewport) else {
        return base;
    };
    EffectiveArea {
        hidden: o.hidden.unwrap_or(base.hidden),
        layout: o.layout.or(base.layout),
        size_hint: o.size_hint.or(base.size_hint),
        grid_areas: match &o.grid_areas {
            GridOverride::Unset => base.grid_areas,
            GridOverride::Cleared => None,
            GridOverride::Set(template) => Some(template.clone()),
        },
    }
}

pub fn effective_element(element: &Element, viewport: &ViewportId) -> EffectiveElement {
    let o = override_for(&element.responsive_behavior, viewport);
    EffectiveElement {
        hidden: o.and_then(|o| o.hidden).unwrap_or(false),
        layout_hint: o
            .and_then(|o| o.layout_hint.clone())
            .or_else(|| element.layout_hint.clone()),
    }
}

/// Ids of areas hidden at `viewport`, either directly or through an `@`
/// ancestor that is.
pub fn hidden_subtrees<'a>(areas: &'a [Area], viewport: &ViewportId) -> HashSet<&'a str> {
    let by_id: HashMap<&str, &Area> = areas.iter().map(|a| (a.area_id.as_str(), a)).collect();
    let mut pending: Vec<&str> = areas
        .iter()
        .filter(|a| is_hidden(&a.responsive_behavior, viewport))
        .map(|a| a.area_id.as_str())
        .collect();

    let mut hidden = HashSet::new();
    while let Some(id) = pending.pop() {
        if !hidden.insert(id) {
            continue;
        }
        if let Some(&area) = by_id.get(id) {
            pending.extend(area_refs(area));
        }
    }
    hidden
}

fn area_refs(area: &Area) -> impl Iterator<Item = &str> {
    area.child_refs().filter_map(|child| match child {
        ChildRef::Area(id) => Some(id),
        ChildRef::Element(_) => None,
    })
}

/// Drops cells for which `keep` is false, then rows left empty.
pub fn filter_grid(template: &[Vec<String>], keep: impl Fn(&str) -> bool) -> GridTemplate {
    template
        .iter()
        .map(|row| row.iter().filter(|id| keep(id)).cloned().collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect()
}

/// Resolved areas and elements of one screen, seen through one viewport.
/// Hidden areas and elements never appear through any accessor, and neither
/// does anything only reachable through them.
#[derive(Debug, Clone, Copy)]
pub struct ViewportScene<'a> {
    areas: &'a IndexMap<String, Area>,
    elements: &'a IndexMap<String, Element>,
    viewport: &'a ViewportId,
}

impl<'a> ViewportScene<'a> {
    pub fn new(
        areas: &'a IndexMap<String, Area>,
        elements: &'a IndexMap<String, Element>,
        viewport: &'a ViewportId,
    ) -> Self {
        Self {
            areas,
            elements,
            viewport,
        }
    }

    pub fn viewport(&self) -> &'a ViewportId {
        self.viewport
    }

    pub fn area(&self, id: &str) -> Option<&'a Area> {
        self.areas.get(id)
    }

    pub fn element(&self, id: &str) -> Option<&'a Element> {
        self.elements.get(id)
    }

    pub fn effective(&self, area: &Area) -> EffectiveArea {
        effective_area(area, self.viewport)
    }

    pub fn area_hidden(&self, area: &Area) -> bool {
        is_hidden(&area.responsive_behavior, self.viewport)
    }

    fn visible_area(&self, id: &str) -> Option<&'a Area> {
        self.areas.get(id).filter(|a| !self.area_hidden(a))
    }

    /// Visible child areas in `children` order. Unresolved refs are skipped.
    pub fn child_areas(&self, area: &Area) -> Vec<&'a Area> {
        area.child_refs()
            .filter_map(|child| match child {
                ChildRef::Area(id) => self.visible_area(id),
                ChildRef::Element(_) => None,
            })
            .collect()
    }

    /// Visible child elements in `children` order. Unresolved refs are skipped.
    pub fn child_elements(&self, area: &Area) -> Vec<&'a Element> {
        area.child_refs()
            .filter_map(|child| match child {
                ChildRef::Element(id) => self.elements.get(id),
                ChildRef::Area(_) => None,
            })
            .filter(|e| !is_hidden(&e.responsive_behavior, self.viewport))
            .collect()
    }

    /// The first area whose base `gridAreas` is non-empty.
    pub fn root(&self) -> Option<&'a Area> {
        self.areas.values().find(|a| a.has_grid())
    }

    /// Visible areas no other area lists as a child, for screens without a
    /// root. Everything else is reached by recursing from these. Areas only
    /// reachable through a `children` cycle contribute the first of the cycle.
    pub fn top_level_areas(&self) -> Vec<&'a Area> {
        let nested: HashSet<&str> = self.areas.values().flat_map(area_refs).collect();
        let mut tops: Vec<&'a Area> = self
            .areas
            .values()
            .filter(|a| !nested.contains(a.area_id.as_str()))
            .collect();

        let mut reached = HashSet::new();
        for &area in &tops {
            self.mark_reachable(area, &mut reached);
        }
        for area in self.areas.values() {
            if !reached.contains(area.area_id.as_str()) {
                self.mark_reachable(area, &mut reached);
                tops.push(area);
            }
        }

        tops.retain(|a| !self.area_hidden(a));
        tops
    }

    fn mark_reachable(&self, from: &'a Area, reached: &mut HashSet<&'a str>) {
        let mut pending = vec![from];
        while let Some(area) = pending.pop() {
            if !reached.insert(area.area_id.as_str()) {
                continue;
            }
            pending.extend(area_refs(area).filter_map(|id| self.areas.get(id)));
        }
    }

    /// The root's grid template at this viewport with hidden or unknown
    /// areas removed. `None` when the root lays out vertically, has its
    /// template cleared, or has nothing visible left in it.
    pub fn root_grid(&self, root: &Area) -> Option<GridTemplate> {
        let effective = self.effective(root);
        if effective.layout == Some(LayoutMode::Vertical) {
            return None;
        }
        let template = effective.grid_areas?;
        let filtered = filter_grid(&template, |id| self.visible_area(id).is_some());
        (!filtered.is_empty()).then_some(filtered)
    }
}
