//! Provider selection
//!
//! Owns the live map view and decides which backend is active. Switching
//! disposes the old view before the new one is created, so at most one
//! view exists at any time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::models::Coordinate;
use crate::notice::Notice;
use crate::provider::MapProvider;
use crate::{Result, TripSyncError};

/// Backend slot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Primary,
    Fallback,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        })
    }
}

impl FromStr for ProviderKind {
    type Err = TripSyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "fallback" => Ok(Self::Fallback),
            other => Err(TripSyncError::validation(format!(
                "Unknown map provider '{other}'"
            ))),
        }
    }
}

/// A live map instance bound to the page
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapView {
    pub instance_id: u64,
    pub provider: ProviderKind,
    pub provider_name: String,
    pub anchor: String,
    pub center: Coordinate,
    pub zoom: u8,
}

/// Outcome of a selection: the active view plus an optional notice when
/// the selector had to fall back
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub view: MapView,
    pub notice: Option<Notice>,
}

pub struct ProviderSelector {
    primary: Arc<dyn MapProvider>,
    fallback: Arc<dyn MapProvider>,
    anchor: String,
    center: Coordinate,
    zoom: u8,
    load_timeout: Duration,
    active: Option<MapView>,
    views_created: u64,
}

impl fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .field("active", &self.active)
            .field("views_created", &self.views_created)
            .finish_non_exhaustive()
    }
}

impl ProviderSelector {
    pub fn new(
        primary: Arc<dyn MapProvider>,
        fallback: Arc<dyn MapProvider>,
        map: &MapConfig,
        load_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            anchor: map.anchor.clone(),
            center: map.center(),
            zoom: map.zoom,
            load_timeout,
            active: None,
            views_created: 0,
        }
    }

    /// Make `kind` the active backend. Selecting the active backend again
    /// is a no-op. If the primary SDK fails to load within the load timeout
    /// the fallback is activated instead and a warning notice is returned.
    pub async fn select(&mut self, kind: ProviderKind) -> Result<Selection> {
        if let Some(view) = self.active.as_ref().filter(|view| view.provider == kind) {
            debug!("Provider {} already active (view #{})", kind, view.instance_id);
            return Ok(Selection {
                view: view.clone(),
                notice: None,
            });
        }

        match kind {
            ProviderKind::Primary => {
                match timeout(self.load_timeout, self.primary.load()).await {
                    Ok(Ok(())) => Ok(Selection {
                        view: self.activate(ProviderKind::Primary),
                        notice: None,
                    }),
                    Ok(Err(e)) => {
                        warn!("{} failed to load: {}", self.primary.name(), e);
                        self.fall_back().await
                    }
                    Err(_) => {
                        warn!(
                            "{} did not load within {:?}",
                            self.primary.name(),
                            self.load_timeout
                        );
                        self.fall_back().await
                    }
                }
            }
            ProviderKind::Fallback => {
                self.fallback.load().await?;
                Ok(Selection {
                    view: self.activate(ProviderKind::Fallback),
                    notice: None,
                })
            }
        }
    }

    async fn fall_back(&mut self) -> Result<Selection> {
        let notice = Notice::warning(format!(
            "{} could not be loaded. Switched to {}.",
            self.primary.name(),
            self.fallback.name()
        ));

        let view = match self
            .active
            .clone()
            .filter(|view| view.provider == ProviderKind::Fallback)
        {
            Some(view) => view,
            None => {
                self.fallback.load().await.map_err(|e| {
                    TripSyncError::provider_unavailable(format!(
                        "no map provider could be loaded: {e}"
                    ))
                })?;
                self.activate(ProviderKind::Fallback)
            }
        };

        Ok(Selection {
            view,
            notice: Some(notice),
        })
    }

    fn activate(&mut self, kind: ProviderKind) -> MapView {
        if let Some(old) = self.active.take() {
            info!(
                "Disposing map view #{} ({})",
                old.instance_id, old.provider_name
            );
        }

        self.views_created += 1;
        let view = MapView {
            instance_id: self.views_created,
            provider: kind,
            provider_name: self.provider(kind).name().to_string(),
            anchor: self.anchor.clone(),
            center: self.center,
            zoom: self.zoom,
        };
        info!(
            "Created map view #{} ({}) on #{}",
            view.instance_id, view.provider_name, view.anchor
        );

        self.active = Some(view.clone());
        view
    }

    fn provider(&self, kind: ProviderKind) -> &Arc<dyn MapProvider> {
        match kind {
            ProviderKind::Primary => &self.primary,
            ProviderKind::Fallback => &self.fallback,
        }
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&MapView> {
        self.active.as_ref()
    }

    /// Backend behind the live view, if any
    #[must_use]
    pub fn active_provider(&self) -> Option<Arc<dyn MapProvider>> {
        self.active
            .as_ref()
            .map(|view| Arc::clone(self.provider(view.provider)))
    }

    /// Number of map views constructed over the selector's lifetime
    #[must_use]
    pub fn views_created(&self) -> u64 {
        self.views_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{FakeProvider, LoadBehavior};

    fn selector(primary: FakeProvider) -> ProviderSelector {
        ProviderSelector::new(
            Arc::new(primary),
            Arc::new(FakeProvider::new(ProviderKind::Fallback)),
            &MapConfig::default(),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_select_primary() {
        let mut selector = selector(FakeProvider::new(ProviderKind::Primary));
        let selection = selector.select(ProviderKind::Primary).await.unwrap();

        assert_eq!(selection.view.provider, ProviderKind::Primary);
        assert_eq!(selection.view.anchor, "map");
        assert_eq!(selection.view.zoom, 12);
        assert!(selection.notice.is_none());
        assert_eq!(
            selector.active_provider().unwrap().kind(),
            ProviderKind::Primary
        );
    }

    #[tokio::test]
    async fn test_select_same_provider_twice_is_idempotent() {
        let primary = Arc::new(FakeProvider::new(ProviderKind::Primary));
        let mut selector = ProviderSelector::new(
            primary.clone(),
            Arc::new(FakeProvider::new(ProviderKind::Fallback)),
            &MapConfig::default(),
            Duration::from_millis(50),
        );

        let first = selector.select(ProviderKind::Primary).await.unwrap();
        let second = selector.select(ProviderKind::Primary).await.unwrap();

        assert_eq!(first.view.instance_id, second.view.instance_id);
        assert_eq!(selector.views_created(), 1);
        assert_eq!(primary.load_calls(), 1);
    }

    #[tokio::test]
    async fn test_switching_disposes_previous_view() {
        let mut selector = selector(FakeProvider::new(ProviderKind::Primary));
        let first = selector.select(ProviderKind::Primary).await.unwrap();
        let second = selector.select(ProviderKind::Fallback).await.unwrap();

        assert_ne!(first.view.instance_id, second.view.instance_id);
        assert_eq!(selector.active_view(), Some(&second.view));
        assert_eq!(selector.views_created(), 2);
    }

    #[tokio::test]
    async fn test_primary_load_failure_falls_back() {
        let mut selector = selector(
            FakeProvider::new(ProviderKind::Primary).with_load(LoadBehavior::Fail),
        );
        let selection = selector.select(ProviderKind::Primary).await.unwrap();

        assert_eq!(selection.view.provider, ProviderKind::Fallback);
        let notice = selection.notice.unwrap();
        assert_eq!(notice.level, crate::notice::NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_primary_load_timeout_falls_back() {
        let mut selector = selector(
            FakeProvider::new(ProviderKind::Primary).with_load(LoadBehavior::Hang),
        );
        let selection = selector.select(ProviderKind::Primary).await.unwrap();

        assert_eq!(selection.view.provider, ProviderKind::Fallback);
        assert!(selection.notice.is_some());
    }

    #[tokio::test]
    async fn test_repeated_fallback_keeps_single_view() {
        let mut selector = selector(
            FakeProvider::new(ProviderKind::Primary).with_load(LoadBehavior::Fail),
        );
        let first = selector.select(ProviderKind::Primary).await.unwrap();
        let second = selector.select(ProviderKind::Primary).await.unwrap();

        assert_eq!(first.view.instance_id, second.view.instance_id);
        assert_eq!(selector.views_created(), 1);
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Primary".parse::<ProviderKind>().unwrap(), ProviderKind::Primary);
        assert_eq!("fallback".parse::<ProviderKind>().unwrap(), ProviderKind::Fallback);
        assert!("bing".parse::<ProviderKind>().is_err());
    }
}
