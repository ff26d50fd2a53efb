//! Geometry for the layout viewer.
//!
//! Turns a [`ViewportScene`] into absolute rectangles for every visible area
//! and element. The root area's grid template drives the top level when it
//! has one; below that each area places its children according to its
//! effective layout mode.
//!
//! Heights come from [`LayoutEngine::required_height`], which placement calls
//! as well, so measured and drawn sizes never disagree.

use kurbo::{Point, Rect, Size};
use serde::Serialize;

use crate::model::{Area, Element, LayoutHint, LayoutMode, SizeHint, ViewportId};
use crate::viewport::{ViewportScene, effective_element};

pub const PADDING: f64 = 20.0;
/// Space above the content reserved for the screen title.
pub const TITLE_HEIGHT: f64 = 30.0;
/// Extra space below the content.
pub const FOOTER_HEIGHT: f64 = 50.0;
pub const CELL_WIDTH: f64 = 180.0;
pub const MIN_CELL_HEIGHT: f64 = 60.0;
pub const ELEMENT_HEIGHT: f64 = 28.0;
pub const ELEMENT_GAP: f64 = 4.0;
pub const GAP: f64 = 10.0;
pub const HEADER_HEIGHT: f64 = 24.0;
pub const INSET: f64 = 6.0;
pub const VERTICAL_ROOT_WIDTH: f64 = 600.0;
pub const FALLBACK_CANVAS_WIDTH: f64 = 800.0;
pub const NARROW_WIDTH: f64 = 120.0;
pub const AUTO_WIDTH: f64 = 100.0;
pub const MIN_FILL_WIDTH: f64 = 100.0;
pub const MAX_ROW_ELEMENT_WIDTH: f64 = 70.0;
pub const WRAP_PITCH: f64 = 54.0;
pub const WRAP_ELEMENT_WIDTH: f64 = 50.0;
const BOTTOM_PADDING: f64 = 8.0;
const ROW: f64 = ELEMENT_HEIGHT + ELEMENT_GAP;

/// One area's slot in a grid template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub area_id: String,
    pub start_col: usize,
    pub start_row: usize,
    pub col_span: usize,
    pub row_span: usize,
}

/// Finds one cell per distinct id, scanning rows top to bottom and cells
/// left to right. The span runs right and down from the first occurrence.
pub fn grid_cells(template: &[Vec<String>]) -> Vec<GridCell> {
    let mut cells = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (row, ids) in template.iter().enumerate() {
        for (col, id) in ids.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let col_span = ids[col..].iter().take_while(|c| *c == id).count();
            let row_span = template[row..]
                .iter()
                .take_while(|r| r.get(col) == Some(id))
                .count();
            cells.push(GridCell {
                area_id: id.clone(),
                start_col: col,
                start_row: row,
                col_span,
                row_span,
            });
        }
    }
    cells
}

/// Width of a cell spanning `span` columns.
pub fn cell_width(span: usize) -> f64 {
    span as f64 * CELL_WIDTH + span.saturating_sub(1) as f64 * GAP
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RootMode {
    /// Top level laid out from the root's grid template.
    Grid { rows: usize, cols: usize },
    /// The root exists but has no usable grid here; its children stack.
    Vertical,
    /// No root area: top-level areas stack.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedArea {
    pub area_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub bounds: Rect,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<SizeHint>,
    pub inherited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedElement {
    pub element_id: String,
    /// The area that placed this element.
    pub area_id: String,
    pub bounds: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    pub has_events: bool,
}

/// Everything the viewer needs to draw one screen at one viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGraph {
    pub screen_id: String,
    pub title: String,
    pub viewport: ViewportId,
    pub width: f64,
    pub height: f64,
    pub root: RootMode,
    pub cells: Vec<GridCell>,
    pub areas: Vec<PlacedArea>,
    pub elements: Vec<PlacedElement>,
}

impl SceneGraph {
    pub fn area(&self, id: &str) -> Option<&PlacedArea> {
        self.areas.iter().find(|a| a.area_id == id)
    }

    pub fn element(&self, id: &str) -> Option<&PlacedElement> {
        self.elements.iter().find(|e| e.element_id == id)
    }
}

#[derive(Default)]
struct Placement {
    areas: Vec<PlacedArea>,
    elements: Vec<PlacedElement>,
}

/// Ids of the areas currently being laid out, outermost first. A child that
/// is already on the trail would nest forever and is skipped.
type Trail<'a> = Vec<&'a str>;

pub struct LayoutEngine<'a> {
    scene: ViewportScene<'a>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(scene: ViewportScene<'a>) -> Self {
        Self { scene }
    }

    /// Height `area` needs when given `width`. Never below [`MIN_CELL_HEIGHT`].
    pub fn required_height(&self, area: &'a Area, width: f64, depth: usize) -> f64 {
        self.measure(area, width, depth, &mut Trail::new())
    }

    fn children(&self, area: &'a Area, trail: &Trail<'a>) -> (Vec<&'a Element>, Vec<&'a Area>) {
        let areas = self
            .scene
            .child_areas(area)
            .into_iter()
            .filter(|child| !trail.contains(&child.area_id.as_str()))
            .collect();
        (self.scene.child_elements(area), areas)
    }

    fn measure(&self, area: &'a Area, width: f64, depth: usize, trail: &mut Trail<'a>) -> f64 {
        trail.push(&area.area_id);
        let (elements, areas) = self.children(area, trail);
        let inner = width - 2.0 * INSET;
        let mut content = HEADER_HEIGHT;

        match self.scene.effective(area).layout {
            Some(LayoutMode::Vertical) => {
                content += elements.len() as f64 * ROW;
                for &child in &areas {
                    content += self.measure(child, inner, depth + 1, trail) + ELEMENT_GAP;
                }
            }
            Some(LayoutMode::Horizontal) => {
                if !elements.is_empty() {
                    content += ROW;
                }
                if !areas.is_empty() {
                    let widths = self.row_widths(&areas, inner);
                    let tallest = areas
                        .iter()
                        .zip(&widths)
                        .map(|(&child, w)| self.measure(child, *w, depth + 1, trail))
                        .fold(0.0, f64::max);
                    content += tallest + ELEMENT_GAP;
                }
            }
            Some(LayoutMode::Grid) | None => {
                let rows = elements.len().div_ceil(wrap_columns(inner));
                content += rows as f64 * ROW;
                for &child in &areas {
                    content += self.measure(child, inner, depth + 1, trail) + ELEMENT_GAP;
                }
            }
        }

        trail.pop();
        MIN_CELL_HEIGHT.max(content + BOTTOM_PADDING)
    }

    /// Widths for child areas sharing one row: `narrow` and `auto` are fixed,
    /// `fill` (or no hint) splits what is left, never below [`MIN_FILL_WIDTH`].
    fn row_widths(&self, areas: &[&'a Area], inner: f64) -> Vec<f64> {
        let hints: Vec<_> = areas
            .iter()
            .map(|a| self.scene.effective(a).size_hint)
            .collect();
        let count = |hint: SizeHint| hints.iter().filter(|h| **h == Some(hint)).count() as f64;
        let fill_count = hints
            .iter()
            .filter(|h| matches!(h, Some(SizeHint::Fill) | None))
            .count();

        let used = count(SizeHint::Narrow) * NARROW_WIDTH
            + count(SizeHint::Auto) * AUTO_WIDTH
            + areas.len().saturating_sub(1) as f64 * ELEMENT_GAP;
        let fill = if fill_count > 0 {
            (inner - used) / fill_count as f64
        } else {
            0.0
        };

        hints
            .iter()
            .map(|hint| match hint {
                Some(SizeHint::Narrow) => NARROW_WIDTH,
                Some(SizeHint::Auto) => AUTO_WIDTH,
                Some(SizeHint::Fill) | None => fill.max(MIN_FILL_WIDTH),
            })
            .collect()
    }

    #[tracing::instrument(skip(self), fields(viewport = %self.scene.viewport()))]
    pub fn layout(&self, screen_id: &str, title: &str) -> SceneGraph {
        let origin = Point::new(PADDING, PADDING + TITLE_HEIGHT);
        let mut out = Placement::default();

        let (root, cells, size) = match self.scene.root() {
            Some(root) => match self.scene.root_grid(root) {
                Some(template) => {
                    let cells = grid_cells(&template);
                    let (rows, cols, size) = self.place_grid(&cells, origin, &mut out);
                    (RootMode::Grid { rows, cols }, cells, size)
                }
                None => {
                    let children = self.scene.child_areas(root);
                    let trail = vec![root.area_id.as_str()];
                    let size = self.stack(&children, origin, VERTICAL_ROOT_WIDTH, trail, &mut out);
                    (RootMode::Vertical, Vec::new(), size)
                }
            },
            None => {
                let top = self.scene.top_level_areas();
                let width = FALLBACK_CANVAS_WIDTH - 2.0 * PADDING;
                let size = self.stack(&top, origin, width, Trail::new(), &mut out);
                (RootMode::Fallback, Vec::new(), size)
            }
        };

        SceneGraph {
            screen_id: screen_id.to_string(),
            title: title.to_string(),
            viewport: self.scene.viewport().clone(),
            width: size.width,
            height: size.height,
            root,
            cells,
            areas: out.areas,
            elements: out.elements,
        }
    }

    /// Places grid cells and returns `(rows, cols, canvas size)`. Row heights
    /// only consider cells spanning a single row.
    fn place_grid(&self, cells: &[GridCell], origin: Point, out: &mut Placement) -> (usize, usize, Size) {
        let rows = cells.iter().map(|c| c.start_row + c.row_span).max().unwrap_or(0);
        let cols = cells.iter().map(|c| c.start_col + c.col_span).max().unwrap_or(0);

        let mut heights = vec![MIN_CELL_HEIGHT; rows];
        for cell in cells.iter().filter(|c| c.row_span == 1) {
            if let Some(area) = self.scene.area(&cell.area_id) {
                let h = self.required_height(area, cell_width(cell.col_span), 0);
                heights[cell.start_row] = heights[cell.start_row].max(h);
            }
        }

        let mut row_y = Vec::with_capacity(rows);
        let mut y = 0.0;
        for h in &heights {
            row_y.push(y);
            y += h + GAP;
        }

        for cell in cells {
            let Some(area) = self.scene.area(&cell.area_id) else {
                continue;
            };
            let spanned = &heights[cell.start_row..cell.start_row + cell.row_span];
            let height = spanned.iter().sum::<f64>() + (spanned.len().saturating_sub(1)) as f64 * GAP;
            let bounds = Rect::from_origin_size(
                (
                    origin.x + cell.start_col as f64 * (CELL_WIDTH + GAP),
                    origin.y + row_y[cell.start_row],
                ),
                (cell_width(cell.col_span), height),
            );
            self.place_area(area, bounds, 0, &mut Trail::new(), out);
        }

        let content = heights.iter().sum::<f64>() + rows.saturating_sub(1) as f64 * GAP;
        let size = Size::new(
            2.0 * PADDING + cell_width(cols),
            2.0 * PADDING + content + FOOTER_HEIGHT,
        );
        (rows, cols, size)
    }

    /// Stacks `areas` top to bottom at `width` and returns the canvas size.
    fn stack(
        &self,
        areas: &[&'a Area],
        origin: Point,
        width: f64,
        mut trail: Trail<'a>,
        out: &mut Placement,
    ) -> Size {
        let mut y = 0.0;
        for &area in areas {
            if trail.contains(&area.area_id.as_str()) {
                continue;
            }
            let h = self.measure(area, width, 0, &mut trail);
            let bounds = Rect::from_origin_size((origin.x, origin.y + y), (width, h));
            self.place_area(area, bounds, 0, &mut trail, out);
            y += h + GAP;
        }
        Size::new(2.0 * PADDING + width, 2.0 * PADDING + y + FOOTER_HEIGHT)
    }

    fn place_area(&self, area: &'a Area, bounds: Rect, depth: usize, trail: &mut Trail<'a>, out: &mut Placement) {
        let effective = self.scene.effective(area);
        out.areas.push(PlacedArea {
            area_id: area.area_id.clone(),
            name: area.name.clone(),
            bounds,
            depth,
            layout: effective.layout,
            size_hint: effective.size_hint,
            inherited: area.inherited,
        });

        trail.push(&area.area_id);
        let (elements, areas) = self.children(area, trail);
        let inner = bounds.width() - 2.0 * INSET;
        let left = bounds.x0 + INSET;
        let mut y = bounds.y0 + HEADER_HEIGHT;

        match effective.layout {
            Some(LayoutMode::Vertical) => {
                for element in &elements {
                    place_element(element, area, Point::new(left, y), inner, out);
                    y += ROW;
                }
                for &child in &areas {
                    let h = self.measure(child, inner, depth + 1, trail);
                    let child_bounds = Rect::from_origin_size((left, y), (inner, h));
                    self.place_area(child, child_bounds, depth + 1, trail, out);
                    y += h + ELEMENT_GAP;
                }
            }
            Some(LayoutMode::Horizontal) => {
                if !elements.is_empty() {
                    self.place_aligned_row(&elements, area, bounds, y, out);
                    y += ROW;
                }
                if !areas.is_empty() {
                    let widths = self.row_widths(&areas, inner);
                    let tallest = areas
                        .iter()
                        .zip(&widths)
                        .map(|(&child, w)| self.measure(child, *w, depth + 1, trail))
                        .fold(0.0, f64::max);
                    let mut x = left;
                    for (&child, w) in areas.iter().zip(&widths) {
                        let child_bounds = Rect::from_origin_size((x, y), (*w, tallest));
                        self.place_area(child, child_bounds, depth + 1, trail, out);
                        x += w + ELEMENT_GAP;
                    }
                }
            }
            Some(LayoutMode::Grid) | None => {
                let per_row = wrap_columns(inner);
                for (idx, element) in elements.iter().enumerate() {
                    let origin = Point::new(
                        left + (idx % per_row) as f64 * WRAP_PITCH,
                        y + (idx / per_row) as f64 * ROW,
                    );
                    place_element(element, area, origin, WRAP_ELEMENT_WIDTH, out);
                }
                y += elements.len().div_ceil(per_row) as f64 * ROW;
                for &child in &areas {
                    let h = self.measure(child, inner, depth + 1, trail);
                    let child_bounds = Rect::from_origin_size((left, y), (inner, h));
                    self.place_area(child, child_bounds, depth + 1, trail, out);
                    y += h + ELEMENT_GAP;
                }
            }
        }
        trail.pop();
    }

    /// Left-aligned (and unhinted) elements pack from the left edge,
    /// right-aligned ones from the right edge, centered ones in the middle.
    fn place_aligned_row(&self, elements: &[&'a Element], area: &Area, bounds: Rect, y: f64, out: &mut Placement) {
        let viewport = self.scene.viewport();
        let inner = bounds.width() - 2.0 * INSET;
        let n = elements.len();
        let width = MAX_ROW_ELEMENT_WIDTH
            .min((inner - n.saturating_sub(1) as f64 * ELEMENT_GAP) / n.max(2) as f64);

        let hint_of = |e: &Element| effective_element(e, viewport).layout_hint;
        let (mut left, mut right, mut center) = (Vec::new(), Vec::new(), Vec::new());
        for &element in elements {
            match hint_of(element) {
                Some(LayoutHint::RightAligned) => right.push(element),
                Some(LayoutHint::Centered) => center.push(element),
                _ => left.push(element),
            }
        }

        let mut x = bounds.x0 + INSET;
        for element in left {
            place_element(element, area, Point::new(x, y), width, out);
            x += width + ELEMENT_GAP;
        }

        let mut x = bounds.x1 - INSET - width;
        for element in right.into_iter().rev() {
            place_element(element, area, Point::new(x, y), width, out);
            x -= width + ELEMENT_GAP;
        }

        if !center.is_empty() {
            let span = center.len() as f64 * width + (center.len() - 1) as f64 * ELEMENT_GAP;
            let mut x = bounds.x0 + INSET + (inner - span) / 2.0;
            for element in center {
                place_element(element, area, Point::new(x, y), width, out);
                x += width + ELEMENT_GAP;
            }
        }
    }
}

/// Elements per row when wrapping, at least one.
fn wrap_columns(inner: f64) -> usize {
    ((inner / WRAP_PITCH).floor() as usize).max(1)
}

fn place_element(
    element: &Element,
    area: &Area,
    origin: Point,
    width: f64,
    out: &mut Placement,
) {
    out.elements.push(PlacedElement {
        element_id: element.element_id.clone(),
        area_id: area.area_id.clone(),
        bounds: Rect::from_origin_size(origin, (width, ELEMENT_HEIGHT - ELEMENT_GAP)),
        label: element
            .label
            .clone()
            .or_else(|| element.field.as_ref().map(|f| f.label.clone())),
        field_type: element.field.as_ref().map(|f| f.field_type.clone()),
        has_events: !element.events.is_empty(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn cells_of(rows: &[&[&str]]) -> Vec<GridCell> {
        let template: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        grid_cells(&template)
    }

    fn cell(id: &str, col: usize, row: usize, col_span: usize, row_span: usize) -> GridCell {
        GridCell {
            area_id: id.to_string(),
            start_col: col,
            start_row: row,
            col_span,
            row_span,
        }
    }

    struct Fixture {
        areas: IndexMap<String, Area>,
        elements: IndexMap<String, Element>,
        viewport: ViewportId,
    }

    impl Fixture {
        fn new(areas: &str, elements: &str, viewport: &str) -> Self {
            let areas: Vec<Area> = serde_yaml::from_str(areas).unwrap();
            let elements: Vec<Element> = serde_yaml::from_str(elements).unwrap();
            Self {
                areas: areas.into_iter().map(|a| (a.area_id.clone(), a)).collect(),
                elements: elements.into_iter().map(|e| (e.element_id.clone(), e)).collect(),
                viewport: ViewportId::new(viewport).unwrap(),
            }
        }

        fn engine(&self) -> LayoutEngine<'_> {
            LayoutEngine::new(ViewportScene::new(&self.areas, &self.elements, &self.viewport))
        }

        fn scene(&self) -> SceneGraph {
            self.engine().layout("s", "S")
        }
    }

    #[test]
    fn grid_cells_detect_row_and_column_spans() {
        let cells = cells_of(&[&["a", "a", "b"], &["c", "c", "b"]]);
        assert_eq!(
            cells,
            vec![cell("a", 0, 0, 2, 1), cell("b", 2, 0, 1, 2), cell("c", 0, 1, 2, 1)]
        );
    }

    #[test]
    fn grid_cells_handle_ragged_rows() {
        let cells = cells_of(&[&["a", "b"], &["a"]]);
        assert_eq!(cells, vec![cell("a", 0, 0, 1, 2), cell("b", 1, 0, 1, 1)]);
    }

    #[test]
    fn empty_area_gets_minimum_height() {
        let f = Fixture::new("- areaId: a\n", "[]", "desktop");
        let engine = f.engine();
        assert_eq!(engine.required_height(&f.areas["a"], 300.0, 0), MIN_CELL_HEIGHT);
    }

    #[test]
    fn vertical_height_counts_elements_and_children() {
        let f = Fixture::new(
            "- {areaId: a, layout: vertical, children: ['$x', '$y', '@b']}\n- {areaId: b}\n",
            "- {elementId: x}\n- {elementId: y}\n",
            "desktop",
        );
        // header + two element rows + child (minimum) + gap + bottom padding
        let expected = 24.0 + 2.0 * 32.0 + 60.0 + 4.0 + 8.0;
        assert_eq!(f.engine().required_height(&f.areas["a"], 300.0, 0), expected);
    }

    #[test]
    fn grid_root_places_cells_on_rows() {
        let f = Fixture::new(
            "- {areaId: root, gridAreas: [[header, header], [nav, main]]}\n- {areaId: header}\n- {areaId: nav}\n- {areaId: main}\n",
            "[]",
            "desktop",
        );
        let scene = f.scene();
        assert_eq!(scene.root, RootMode::Grid { rows: 2, cols: 2 });
        assert_eq!(scene.area("header").unwrap().bounds, Rect::new(20.0, 50.0, 390.0, 110.0));
        assert_eq!(scene.area("nav").unwrap().bounds, Rect::new(20.0, 120.0, 200.0, 180.0));
        assert_eq!(scene.area("main").unwrap().bounds, Rect::new(210.0, 120.0, 390.0, 180.0));
        assert_eq!((scene.width, scene.height), (410.0, 220.0));
        assert!(scene.area("root").is_none());
    }

    #[test]
    fn row_spanning_cells_do_not_grow_rows() {
        let f = Fixture::new(
            "- {areaId: root, gridAreas: [[side, top], [side, bottom]]}\n- {areaId: side, layout: vertical, children: ['$a', '$b', '$c', '$d', '$e']}\n- {areaId: top}\n- {areaId: bottom}\n",
            "- {elementId: a}\n- {elementId: b}\n- {elementId: c}\n- {elementId: d}\n- {elementId: e}\n",
            "desktop",
        );
        let scene = f.scene();
        let side = scene.area("side").unwrap();
        assert_eq!(side.bounds.height(), 60.0 + GAP + 60.0);
        let needed = f.engine().required_height(&f.areas["side"], CELL_WIDTH, 0);
        assert!(needed > side.bounds.height());
    }

    #[test]
    fn horizontal_row_splits_alignment_groups() {
        let f = Fixture::new(
            "- {areaId: bar, layout: horizontal, children: ['$a', '$b', '$c']}\n",
            "- {elementId: a}\n- {elementId: b, layoutHint: rightAligned}\n- {elementId: c, layoutHint: centered}\n",
            "desktop",
        );
        let scene = f.scene();
        assert_eq!(scene.root, RootMode::Fallback);
        let x = |id: &str| scene.element(id).unwrap().bounds.x0;
        assert_eq!(x("a"), 26.0);
        assert_eq!(x("b"), 20.0 + 760.0 - 6.0 - 70.0);
        assert_eq!(x("c"), 26.0 + (748.0 - 70.0) / 2.0);
        assert_eq!(scene.element("a").unwrap().bounds.y0, 50.0 + HEADER_HEIGHT);
    }

    #[test]
    fn horizontal_children_follow_size_hints() {
        let f = Fixture::new(
            r#"
- {areaId: row, layout: horizontal, children: ['@n', '@a', '@f1', '@f2']}
- {areaId: n, sizeHint: narrow}
- {areaId: a, sizeHint: auto}
- {areaId: f1, sizeHint: fill}
- {areaId: f2}
"#,
            "[]",
            "desktop",
        );
        let scene = f.scene();
        let bounds = |id: &str| scene.area(id).unwrap().bounds;
        assert_eq!(bounds("n").width(), 120.0);
        assert_eq!(bounds("a").width(), 100.0);
        assert_eq!(bounds("f1").width(), 258.0);
        assert_eq!(bounds("f2").x0, 26.0 + 124.0 + 104.0 + 262.0);
        assert_eq!(scene.areas.len(), 5);
    }

    #[test]
    fn hidden_area_removes_its_whole_subtree() {
        let areas = r#"
- {areaId: root, gridAreas: [[side, main]]}
- areaId: side
  layout: vertical
  children: ['$link', '@inner']
  responsiveBehavior:
    mobile: {hidden: true}
- {areaId: inner, children: ['$deep']}
- {areaId: main, children: ['$title']}
"#;
        let elements = "- {elementId: link}\n- {elementId: deep}\n- {elementId: title}\n";

        let desktop = Fixture::new(areas, elements, "desktop").scene();
        assert!(desktop.area("inner").is_some());
        assert!(desktop.element("deep").is_some());

        let mobile = Fixture::new(areas, elements, "mobile").scene();
        let ids: Vec<_> = mobile.areas.iter().map(|a| a.area_id.as_str()).collect();
        assert_eq!(ids, vec!["main"]);
        let ids: Vec<_> = mobile.elements.iter().map(|e| e.element_id.as_str()).collect();
        assert_eq!(ids, vec!["title"]);
        assert_eq!(mobile.root, RootMode::Grid { rows: 1, cols: 1 });
    }

    #[test]
    fn cleared_grid_stacks_root_children() {
        let f = Fixture::new(
            r#"
- areaId: root
  gridAreas: [[a, b]]
  children: ['@a', '@b']
  responsiveBehavior:
    mobile: {gridAreas: null}
- {areaId: a}
- {areaId: b}
"#,
            "[]",
            "mobile",
        );
        let scene = f.scene();
        assert_eq!(scene.root, RootMode::Vertical);
        assert_eq!(scene.area("a").unwrap().bounds, Rect::new(20.0, 50.0, 620.0, 110.0));
        assert_eq!(scene.area("b").unwrap().bounds.y0, 120.0);
        assert_eq!(scene.width, 640.0);
    }

    #[test]
    fn self_referencing_children_terminate() {
        let f = Fixture::new(
            "- {areaId: a, layout: vertical, children: ['@b']}\n- {areaId: b, layout: vertical, children: ['@a', '@b']}\n",
            "[]",
            "desktop",
        );
        let engine = f.engine();
        let h = engine.required_height(&f.areas["a"], 400.0, 0);
        assert!(h >= MIN_CELL_HEIGHT);
        let scene = f.scene();
        let ids: Vec<_> = scene.areas.iter().map(|a| a.area_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(scene.area("b").unwrap().depth, 1);
    }

    #[test]
    fn hidden_elements_leave_no_gap() {
        let areas = r#"
- {areaId: bar, layout: horizontal, children: ['$a', '$b', '$c']}
- {areaId: tray, children: ['$p', '$q', '$r']}
"#;
        let elements = r#"
- {elementId: a}
- {elementId: b, responsiveBehavior: {mobile: {hidden: true}}}
- {elementId: c}
- {elementId: p}
- {elementId: q, responsiveBehavior: {mobile: {hidden: true}}}
- {elementId: r}
"#;
        let desktop = Fixture::new(areas, elements, "desktop").scene();
        assert!(desktop.element("b").is_some());
        assert!(desktop.element("q").is_some());
        assert_eq!(desktop.element("c").unwrap().bounds.x0, 26.0 + 2.0 * 74.0);
        assert_eq!(desktop.element("r").unwrap().bounds.x0, 26.0 + 2.0 * WRAP_PITCH);

        let mobile = Fixture::new(areas, elements, "mobile").scene();
        let ids: Vec<_> = mobile.elements.iter().map(|e| e.element_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "p", "r"]);
        assert_eq!(mobile.element("c").unwrap().bounds.x0, 26.0 + 74.0);
        assert_eq!(mobile.element("r").unwrap().bounds.x0, 26.0 + WRAP_PITCH);
    }

    #[test]
    fn placed_heights_match_measurement() {
        let f = Fixture::new(
            r#"
- {areaId: page, layout: vertical, children: ['@row']}
- {areaId: row, layout: horizontal, children: ['@left', '@right']}
- {areaId: left, layout: vertical, children: ['$a', '$b', '$c']}
- {areaId: right, sizeHint: narrow, children: ['$d']}
"#,
            "- {elementId: a}\n- {elementId: b}\n- {elementId: c}\n- {elementId: d}\n",
            "desktop",
        );
        let scene = f.scene();
        let engine = f.engine();
        let page = scene.area("page").unwrap();
        assert_eq!(page.bounds.height(), engine.required_height(&f.areas["page"], 760.0, 0));
        let row = scene.area("row").unwrap();
        let left = scene.area("left").unwrap();
        assert_eq!(left.bounds.height(), engine.required_height(&f.areas["left"], left.bounds.width(), 0));
        assert_eq!(row.bounds.intersect(left.bounds), left.bounds);
    }

    #[test]
    fn layout_is_deterministic() {
        let f = Fixture::new(
            "- {areaId: root, gridAreas: [[a, b]]}\n- {areaId: a, children: ['$x']}\n- {areaId: b}\n",
            "- {elementId: x}\n",
            "desktop",
        );
        assert_eq!(f.scene(), f.scene());
    }
}
