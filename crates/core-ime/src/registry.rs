//! Per-session overlay registry.
//!
//! Owns every overlay ever created for the session (the chain, in creation
//! order), the subset reserved for the active composition, the most recent
//! composition payload, and whether the primary cursor must be restored.
//! Overlays are never destroyed individually; they are hidden and reused,
//! and everything is released together by `teardown` (or on drop).

use core_config::ImeConfig;

use crate::error::{ImeError, Result};
use crate::message::CompositionMessage;
use crate::overlay::{Overlay, OverlayId};

#[derive(Debug, Default)]
pub struct OverlayRegistry {
    pub(crate) overlays: Vec<Overlay>,
    pub(crate) composition: Vec<OverlayId>,
    pub(crate) saved: Option<CompositionMessage>,
    pub(crate) saved_cursor_visible: bool,
    pub(crate) config: ImeConfig,
}

impl OverlayRegistry {
    pub fn new(config: ImeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ImeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(id.0)
    }

    pub(crate) fn overlay_mut(&mut self, id: OverlayId) -> Result<&mut Overlay> {
        self.overlays
            .get_mut(id.0)
            .ok_or(ImeError::InvalidArgument("unknown overlay id"))
    }

    /// Every overlay in chain order.
    pub fn overlays(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> {
        self.overlays
            .iter()
            .enumerate()
            .map(|(i, o)| (OverlayId(i), o))
    }

    /// The chain starting at `id` (inclusive).
    pub(crate) fn chain_from(&self, id: OverlayId) -> &[Overlay] {
        self.overlays.get(id.0..).unwrap_or(&[])
    }

    /// Overlays reserved for composition text, one per display row.
    pub fn composition(&self) -> &[OverlayId] {
        &self.composition
    }

    pub fn saved(&self) -> Option<&CompositionMessage> {
        self.saved.as_ref()
    }

    pub fn cursor_suppressed(&self) -> bool {
        self.saved_cursor_visible
    }

    pub fn visible_composition_rows(&self) -> usize {
        self.composition
            .iter()
            .filter_map(|id| self.overlay(*id))
            .filter(|o| !o.is_hidden())
            .count()
    }

    /// Release every overlay and the saved payload.
    pub fn teardown(&mut self) {
        tracing::debug!(
            target: "ime.factory",
            overlays = self.overlays.len(),
            composition_rows = self.composition.len(),
            "registry_teardown"
        );
        self.overlays.clear();
        self.composition.clear();
        self.saved = None;
        self.saved_cursor_visible = false;
    }
}
