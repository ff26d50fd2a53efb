use anyhow::Context;
use indexmap::IndexMap;

use crate::layout::{LayoutEngine, SceneGraph};
use crate::manifest::LayoutDocument;
use crate::model::{ScreenDetail, Site, SiteDetail, TransitionGraph, Viewport, ViewportId};
use crate::resolver::{ResolvedScreen, ScreenSources, extends_target, resolve_screen};
use crate::storage::{APP_EVENTS, APP_FIELDS, APP_LAYOUT, DesignVault, Document};
use crate::transitions::{ScreenEntry, SiteSources, build_transitions};
use crate::viewport::{ViewportScene, default_viewport};
use crate::{ViewerError, ViewerResult};

/// Request surface over a design tree. Every call re-reads and re-resolves
/// from disk; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DesignService {
    vault: DesignVault,
}

/// A resolved screen plus the layout metadata the detail view reports.
struct LoadedScreen {
    layout: LayoutDocument,
    resolved: ResolvedScreen,
    viewports: Vec<Viewport>,
}

impl DesignService {
    pub fn new(vault: DesignVault) -> Self {
        Self { vault }
    }

    #[tracing::instrument(skip(self))]
    pub fn list_sites(&self) -> ViewerResult<Vec<Site>> {
        let ids = self.vault.site_ids().context("listing sites")?;
        Ok(ids
            .into_iter()
            .map(|id| {
                let name = self.site_name(&id);
                Site { id, name }
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub fn site_detail(&self, site_id: &str) -> ViewerResult<SiteDetail> {
        self.require_site(site_id)?;
        Ok(SiteDetail {
            id: site_id.to_string(),
            name: self.site_name(site_id),
            viewports: self.viewports(site_id),
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn transitions(
        &self,
        site_id: &str,
        viewport: Option<&str>,
    ) -> ViewerResult<TransitionGraph> {
        self.require_site(site_id)?;
        let viewport = viewport.and_then(|raw| self.transition_viewport(site_id, raw));

        let screens = self
            .vault
            .screen_ids(site_id)
            .with_context(|| format!("listing screens of {site_id}"))?
            .into_iter()
            .map(|screen_id| ScreenEntry {
                layout: self
                    .vault
                    .layout(site_id, &screen_id)
                    .optional(&format!("{site_id}/{screen_id}/layout")),
                events: self
                    .vault
                    .events(site_id, &screen_id)
                    .optional(&format!("{site_id}/{screen_id}/events"))
                    .unwrap_or_default(),
                screen_id,
            })
            .collect();

        let sources = SiteSources {
            screens,
            shared_layout: self
                .vault
                .shared_layout(site_id, APP_LAYOUT)
                .optional(&format!("{site_id}/_shared/{APP_LAYOUT}")),
            shared_events: self
                .vault
                .shared_events(site_id)
                .optional(&format!("{site_id}/_shared/{APP_EVENTS}"))
                .unwrap_or_default(),
        };
        Ok(build_transitions(&sources, viewport.as_ref()))
    }

    #[tracing::instrument(skip(self))]
    pub fn screen_detail(&self, site_id: &str, screen_id: &str) -> ViewerResult<ScreenDetail> {
        let LoadedScreen {
            layout,
            resolved,
            viewports,
        } = self.load_screen(site_id, screen_id)?;

        Ok(ScreenDetail {
            screen_id: layout
                .screen_id
                .clone()
                .unwrap_or_else(|| screen_id.to_string()),
            title: layout.title.unwrap_or_else(|| screen_id.to_string()),
            description: layout.description,
            extends: layout.extends,
            areas: resolved.areas.into_values().collect(),
            elements: resolved.elements.into_values().collect(),
            fields: resolved.fields,
            events: resolved.events,
            viewports,
        })
    }

    /// Geometry of a screen at `viewport`, or at the site's default viewport.
    #[tracing::instrument(skip(self))]
    pub fn screen_layout(
        &self,
        site_id: &str,
        screen_id: &str,
        viewport: Option<&str>,
    ) -> ViewerResult<SceneGraph> {
        let loaded = self.load_screen(site_id, screen_id)?;
        let viewport = match viewport {
            Some(raw) => check_viewport(&loaded.viewports, raw)?,
            None => default_viewport(&loaded.viewports),
        };

        let title = loaded
            .layout
            .title
            .as_deref()
            .unwrap_or(screen_id)
            .to_string();
        let screen = loaded.layout.screen_id.as_deref().unwrap_or(screen_id);
        let scene = ViewportScene::new(&loaded.resolved.areas, &loaded.resolved.elements, &viewport);
        Ok(LayoutEngine::new(scene).layout(screen, &title))
    }

    fn load_screen(&self, site_id: &str, screen_id: &str) -> ViewerResult<LoadedScreen> {
        self.require_site(site_id)?;
        if !self.vault.screen_exists(site_id, screen_id) {
            return Err(ViewerError::ScreenNotFound(screen_id.to_string()));
        }

        let layout = match self.vault.layout(site_id, screen_id) {
            Document::Present(layout) => layout,
            Document::Absent => return Err(ViewerError::LayoutNotFound(screen_id.to_string())),
            Document::Malformed(reason) => {
                tracing::warn!(site = site_id, screen = screen_id, %reason, "layout could not be parsed");
                return Err(ViewerError::LayoutNotFound(screen_id.to_string()));
            }
        };
        let viewports = self.viewports(site_id);

        let shared_layout = layout.extends.as_deref().and_then(|extends| {
            let name = extends_target(extends);
            self.vault
                .shared_layout(site_id, name)
                .optional(&format!("{site_id}/_shared/{name}"))
        });

        let sources = ScreenSources {
            shared_layout,
            fields: self
                .vault
                .fields(site_id, screen_id)
                .optional(&format!("{site_id}/{screen_id}/fields"))
                .unwrap_or_default(),
            shared_fields: self
                .vault
                .shared_fields(site_id)
                .optional(&format!("{site_id}/_shared/{APP_FIELDS}"))
                .unwrap_or_default(),
            events: self
                .vault
                .events(site_id, screen_id)
                .optional(&format!("{site_id}/{screen_id}/events"))
                .unwrap_or_default(),
            shared_events: self
                .vault
                .shared_events(site_id)
                .optional(&format!("{site_id}/_shared/{APP_EVENTS}"))
                .unwrap_or_default(),
            layout,
        };
        let resolved = resolve_screen(&sources);
        warn_undeclared_viewports(&resolved, &viewports);

        Ok(LoadedScreen {
            layout: sources.layout,
            resolved,
            viewports,
        })
    }

    fn require_site(&self, site_id: &str) -> ViewerResult<()> {
        if self.vault.site_exists(site_id) {
            Ok(())
        } else {
            Err(ViewerError::SiteNotFound(site_id.to_string()))
        }
    }

    fn site_name(&self, site_id: &str) -> String {
        self.vault
            .site_manifest(site_id)
            .optional(&format!("{site_id}/site"))
            .and_then(|m| m.display_name().map(str::to_string))
            .unwrap_or_else(|| site_id.to_string())
    }

    fn viewports(&self, site_id: &str) -> Vec<Viewport> {
        self.vault
            .site_manifest(site_id)
            .optional(&format!("{site_id}/site"))
            .map(|m| m.viewports)
            .unwrap_or_default()
    }

    /// A viewport the site does not declare hides nothing in the graph.
    fn transition_viewport(&self, site_id: &str, raw: &str) -> Option<ViewportId> {
        match check_viewport(&self.viewports(site_id), raw) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(site = site_id, error = %e, "transitions ignore this viewport");
                None
            }
        }
    }
}

/// Accepts `raw` if it is a well-formed id and, when the site declares any
/// viewports, one of them.
fn check_viewport(declared: &[Viewport], raw: &str) -> ViewerResult<ViewportId> {
    let unknown = || ViewerError::UnknownViewport {
        viewport: raw.to_string(),
        declared: declared.iter().map(|v| v.id.to_string()).collect(),
    };
    let id = ViewportId::new(raw).map_err(|_| unknown())?;
    if declared.is_empty() || declared.iter().any(|v| v.id == id) {
        Ok(id)
    } else {
        Err(unknown())
    }
}

fn warn_undeclared_viewports(resolved: &ResolvedScreen, declared: &[Viewport]) {
    if declared.is_empty() {
        return;
    }
    let behaviors = resolved
        .areas
        .iter()
        .map(|(id, a)| (id, &a.responsive_behavior))
        .chain(
            resolved
                .elements
                .iter()
                .map(|(id, e)| (id, &e.responsive_behavior)),
        );
    let mut undeclared: IndexMap<&ViewportId, Vec<&String>> = IndexMap::new();
    for (owner, behavior) in behaviors {
        for viewport in behavior.keys() {
            if !declared.iter().any(|v| &v.id == viewport) {
                undeclared.entry(viewport).or_default().push(owner);
            }
        }
    }
    for (viewport, owners) in undeclared {
        tracing::warn!(%viewport, ?owners, "responsive override for an undeclared viewport");
    }
}
