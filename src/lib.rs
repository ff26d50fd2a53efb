pub mod config;
pub mod layout;
pub mod manifest;
pub mod model;
pub mod resolver;
pub mod server;
pub mod service;
pub mod storage;
pub mod transitions;
pub mod viewport;

pub use config::ViewerConfig;
pub use layout::{LayoutEngine, SceneGraph};
pub use model::{
    Area, Element, Event, EventAction, Field, ScreenDetail, Site, SiteDetail, TransitionGraph,
    Viewport, ViewportId,
};
pub use service::DesignService;
pub use storage::DesignVault;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("site not found: {0}")]
    SiteNotFound(String),
    #[error("screen not found: {0}")]
    ScreenNotFound(String),
    #[error("layout file not found for screen: {0}")]
    LayoutNotFound(String),
    #[error("unknown viewport {viewport:?}; declared: {declared:?}")]
    UnknownViewport {
        viewport: String,
        declared: Vec<String>,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ViewerError {
    /// A required resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SiteNotFound(_) | Self::ScreenNotFound(_) | Self::LayoutNotFound(_)
        )
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_are_classified() {
        assert!(ViewerError::SiteNotFound("s".into()).is_not_found());
        assert!(ViewerError::ScreenNotFound("s".into()).is_not_found());
        assert!(ViewerError::LayoutNotFound("s".into()).is_not_found());
        assert!(!ViewerError::Internal(anyhow::anyhow!("boom")).is_not_found());
    }

    #[test]
    fn internal_preserves_source_message() {
        let err = ViewerError::from(anyhow::Error::new(std::io::Error::other("disk gone")));
        assert!(err.to_string().contains("disk gone"));
    }
}
