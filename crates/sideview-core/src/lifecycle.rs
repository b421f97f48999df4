//! Tab / surface lifecycle manager
//!
//! The only writer of the tab registry and the closed-tab history. Every
//! operation mutates the registry synchronously first (so the active pointer
//! always reflects the most recent call) and only then awaits the host.
//! Visibility calls issued after a suspension point are guarded by
//! [`SurfaceSequencer`] tickets so a slow, superseded operation cannot show
//! or hide a surface out of order.
//!
//! Host failures are logged and swallowed: the registry stays the source of
//! truth, and the worst outcome is a surface the user has to close and reopen.

use parking_lot::RwLock;
use std::sync::Arc;

use sideview_tabs::{
    ClosedTabHistory, ClosedTabRecord, LabelAllocator, Tab, TabLabel, TabPatch, TabRegistry,
    TabState,
};

use crate::config::Config;
use crate::error::CoreError;
use crate::events::{TabAction, TabEvent};
use crate::geometry::GeometryProvider;
use crate::layout::LayoutEngine;
use crate::sequencer::{OpTicket, SurfaceSequencer};
use crate::surface::SurfaceHost;
use crate::Result;

/// What has to happen after a tab leaves the registry
enum Succession {
    /// The active tab is unchanged, or is a placeholder with nothing to show
    Unchanged,
    /// A URL-backed tab took over and must be revealed
    Reveal(OpTicket),
}

pub struct LifecycleManager {
    config: Arc<Config>,
    registry: Arc<RwLock<TabRegistry>>,
    history: Arc<RwLock<ClosedTabHistory>>,
    labels: Arc<LabelAllocator>,
    sequencer: Arc<SurfaceSequencer>,
    host: Arc<dyn SurfaceHost>,
    layout: LayoutEngine,
}

impl LifecycleManager {
    pub fn new(
        config: Config,
        host: Arc<dyn SurfaceHost>,
        geometry: Arc<dyn GeometryProvider>,
    ) -> Self {
        let history = ClosedTabHistory::with_capacity(config.history_capacity());
        let labels = LabelAllocator::new(config.label_prefix.clone());

        Self {
            layout: LayoutEngine::new(geometry, Arc::clone(&host)),
            config: Arc::new(config),
            registry: Arc::new(RwLock::new(TabRegistry::new())),
            history: Arc::new(RwLock::new(history)),
            labels: Arc::new(labels),
            sequencer: Arc::new(SurfaceSequencer::new()),
            host,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Queries ===

    pub fn tabs(&self) -> Vec<Tab> {
        self.registry.read().tabs().to_vec()
    }

    pub fn tab_count(&self) -> usize {
        self.registry.read().len()
    }

    pub fn find(&self, label: &TabLabel) -> Option<Tab> {
        self.registry.read().find(label).cloned()
    }

    pub fn index_of(&self, label: &TabLabel) -> Option<usize> {
        self.registry.read().index_of(label)
    }

    pub fn active_label(&self) -> Option<TabLabel> {
        self.registry.read().active().cloned()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.registry.read().active_tab().cloned()
    }

    pub fn state_of(&self, label: &TabLabel) -> TabState {
        self.registry.read().state_of(label)
    }

    /// Most recently closed first
    pub fn closed_tabs(&self) -> Vec<ClosedTabRecord> {
        self.history.read().iter().cloned().collect()
    }

    pub fn has_closed_tabs(&self) -> bool {
        !self.history.read().is_empty()
    }

    // === Lifecycle operations ===

    /// Open the startup placeholder if the window has no tabs yet
    pub async fn ensure_initial_tab(&self) -> Option<TabLabel> {
        if !self.config.start_with_new_tab || !self.registry.read().is_empty() {
            return None;
        }
        self.open_tab(None, None, None).await
    }

    /// Open a tab and make it active.
    ///
    /// Without a URL this inserts a new-tab placeholder. With a URL the
    /// surface is created first and the tab is only inserted once creation
    /// succeeded. Returns the new label, or `None` if nothing was opened.
    pub async fn open_tab(
        &self,
        url: Option<&str>,
        title: Option<&str>,
        insert_index: Option<usize>,
    ) -> Option<TabLabel> {
        let label = self.labels.allocate();
        let title = title.unwrap_or_default();

        match url.filter(|url| !url.is_empty()) {
            None => {
                let title = if title.is_empty() {
                    self.config.new_tab_title.as_str()
                } else {
                    title
                };
                self.open_placeholder(label.clone(), title, insert_index)
                    .await;
                Some(label)
            }
            Some(url) => match self.open_backed(&label, url, title, insert_index).await {
                Ok(()) => Some(label),
                Err(e) => {
                    tracing::error!(label = %label, url = %url, error = %e, "Failed to open tab");
                    None
                }
            },
        }
    }

    async fn open_placeholder(&self, label: TabLabel, title: &str, at: Option<usize>) {
        let hide = {
            let mut registry = self.registry.write();
            let index = registry.insert(Tab::placeholder(label.clone(), title), at);
            tracing::info!(label = %label, index, "Opened new tab");
            self.swap_active(&mut registry, &label)
        };

        self.conceal(hide).await;
    }

    async fn open_backed(
        &self,
        label: &TabLabel,
        url: &str,
        title: &str,
        at: Option<usize>,
    ) -> Result<()> {
        let tab = Tab::backed(label.clone(), url, title)?;
        let rect = self
            .layout
            .current_rect()
            .await
            .ok_or(CoreError::GeometryUnavailable)?;

        self.host.create_surface(label, url, rect).await?;

        let (hide, show) = {
            let mut registry = self.registry.write();
            let index = registry.insert(tab, at);
            tracing::info!(label = %label, url = %url, index, "Opened tab");
            let hide = self.swap_active(&mut registry, label);
            (hide, self.sequencer.issue(label))
        };

        self.conceal(hide).await;
        self.show(show).await;
        Ok(())
    }

    /// Close a tab, keeping it in the closed-tab history.
    ///
    /// If it was active, the last tab in the strip takes over; closing the
    /// only tab leaves a fresh placeholder behind. Returns false for an
    /// unknown label.
    pub async fn close_tab(&self, label: &TabLabel) -> bool {
        // The registry forgets the tab before the host is awaited, so nothing
        // can re-activate it while its surface is being torn down.
        let Some((tab, succession)) = self.detach(label) else {
            tracing::debug!(label = %label, "Ignoring close of unknown tab");
            return false;
        };

        if tab.is_backed() {
            self.destroy(label).await;
        }

        if let Succession::Reveal(show) = succession {
            self.reveal(show).await;
        }
        true
    }

    fn detach(&self, label: &TabLabel) -> Option<(Tab, Succession)> {
        let mut registry = self.registry.write();
        let was_active = registry.is_active(label);
        let (index, tab) = registry.remove(label)?;

        self.sequencer.forget(label);
        self.history.write().record(tab.clone(), index);
        tracing::info!(label = %label, index, "Closed tab");

        let succession = if registry.is_empty() {
            // The strip is never observably empty
            let placeholder = self.labels.allocate();
            registry.insert(
                Tab::placeholder(placeholder.clone(), self.config.new_tab_title.as_str()),
                None,
            );
            registry.set_active(Some(placeholder.clone()));
            tracing::info!(label = %placeholder, "Opened new tab");
            Succession::Unchanged
        } else if !was_active {
            Succession::Unchanged
        } else {
            // Last remaining tab, not the neighbour of the closed one
            let next = registry.last().map(|t| (t.label.clone(), t.is_backed()));
            match next {
                Some((next, backed)) => {
                    registry.set_active(Some(next.clone()));
                    if backed {
                        Succession::Reveal(self.sequencer.issue(&next))
                    } else {
                        Succession::Unchanged
                    }
                }
                None => Succession::Unchanged,
            }
        };

        Some((tab, succession))
    }

    /// Make `label` the active tab. Activating the active tab does nothing.
    pub async fn activate_tab(&self, label: &TabLabel) {
        let Some((hide, show)) = self.select(label) else {
            return;
        };

        self.conceal(hide).await;
        if let Some(show) = show {
            self.reveal(show).await;
        }
    }

    fn select(&self, label: &TabLabel) -> Option<(Option<OpTicket>, Option<OpTicket>)> {
        let mut registry = self.registry.write();
        if !registry.contains(label) {
            tracing::debug!(label = %label, "Ignoring activation of unknown tab");
            return None;
        }
        if registry.is_active(label) {
            return None;
        }

        let from = registry.state_of(label);
        let to = TabState::of(from == TabState::NewPlaceholder, true);
        if !from.can_transition_to(to) {
            tracing::warn!(label = %label, from = %from, to = %to, "Refusing invalid tab transition");
            return None;
        }

        let hide = self.swap_active(&mut registry, label);
        tracing::debug!(label = %label, from = %from, to = %to, "Tab state transition");

        Some((hide, to.has_surface().then(|| self.sequencer.issue(label))))
    }

    /// Pop the most recently closed tab and open it again at its old position
    /// (clamped to the current strip), under a new label.
    pub async fn reopen_last_closed_tab(&self) -> Option<TabLabel> {
        let Some(record) = self.history.write().pop_most_recent() else {
            tracing::debug!("No closed tabs to reopen");
            return None;
        };

        let index = record.original_index.min(self.registry.read().len());
        let url = record.tab.is_backed().then_some(record.tab.url.as_str());
        let reopened = self
            .open_tab(url, Some(record.tab.title.as_str()), Some(index))
            .await;

        match &reopened {
            Some(label) => {
                tracing::info!(
                    closed = %record.tab.label,
                    label = %label,
                    index,
                    "Reopened closed tab"
                );
            }
            // Keep it so the user can retry
            None => self.history.write().restore(record),
        }
        reopened
    }

    /// Close every tab except `keep`, which becomes active.
    /// Placeholders are dropped without entering the closed-tab history.
    pub async fn close_other_tabs(&self, keep: &TabLabel) {
        let Some((closed, show)) = self.collapse(keep) else {
            tracing::debug!(label = %keep, "Ignoring close-others for unknown tab");
            return;
        };

        for label in &closed {
            self.destroy(label).await;
        }
        if let Some(show) = show {
            self.reveal(show).await;
        }
    }

    fn collapse(&self, keep: &TabLabel) -> Option<(Vec<TabLabel>, Option<OpTicket>)> {
        let mut registry = self.registry.write();
        let keep_tab = registry.find(keep)?;
        let keep_backed = keep_tab.is_backed();
        let was_active = registry.is_active(keep);

        let removed = registry.retain_only(keep);
        let mut history = self.history.write();
        let mut closed = Vec::new();
        for (index, tab) in removed {
            if tab.is_backed() {
                self.sequencer.forget(&tab.label);
                closed.push(tab.label.clone());
                history.record(tab, index);
            }
        }
        tracing::info!(label = %keep, closed = closed.len(), "Closed other tabs");

        let show = (!was_active && keep_backed).then(|| self.sequencer.issue(keep));
        Some((closed, show))
    }

    /// Reload a tab's content. Placeholders have nothing to reload.
    pub async fn refresh_tab(&self, label: &TabLabel) {
        let backed = match self.registry.read().find(label) {
            Some(tab) => tab.is_backed(),
            None => {
                tracing::debug!(label = %label, "Ignoring refresh of unknown tab");
                return;
            }
        };
        if !backed {
            return;
        }

        if let Err(e) = self.host.reload_surface(label).await {
            tracing::warn!(label = %label, error = %e, "Failed to reload surface");
        }
    }

    /// Give the active new-tab placeholder a destination, in place.
    ///
    /// Only valid while the active tab is a placeholder. The surface is
    /// created before the tab record changes; if the placeholder disappears
    /// in the meantime the orphaned surface is destroyed again.
    pub async fn navigate_new_tab(&self, url: &str, title: Option<&str>) -> bool {
        if url.is_empty() {
            tracing::debug!("Ignoring navigation to an empty URL");
            return false;
        }

        let placeholder = self
            .registry
            .read()
            .active_tab()
            .filter(|tab| tab.is_new_tab)
            .map(|tab| tab.label.clone());
        let Some(label) = placeholder else {
            tracing::debug!("Active tab is not a new-tab placeholder");
            return false;
        };

        match self
            .navigate_placeholder(&label, url, title.unwrap_or_default())
            .await
        {
            Ok(navigated) => navigated,
            Err(e) => {
                tracing::error!(label = %label, url = %url, error = %e, "Failed to navigate new tab");
                false
            }
        }
    }

    async fn navigate_placeholder(&self, label: &TabLabel, url: &str, title: &str) -> Result<bool> {
        let rect = self
            .layout
            .current_rect()
            .await
            .ok_or(CoreError::GeometryUnavailable)?;

        self.host.create_surface(label, url, rect).await?;

        let outcome = {
            let mut registry = self.registry.write();
            let active = registry.is_active(label);
            match registry.tab_mut(label).filter(|tab| tab.is_new_tab) {
                Some(tab) => {
                    tab.navigate(url, title)?;
                    Some(active.then(|| self.sequencer.issue(label)))
                }
                None => None,
            }
        };

        match outcome {
            Some(show) => {
                tracing::info!(label = %label, url = %url, "Navigated new tab");
                if let Some(show) = show {
                    self.show(show).await;
                }
                Ok(true)
            }
            None => {
                tracing::warn!(label = %label, "Placeholder closed while its surface was created");
                self.destroy(label).await;
                Ok(false)
            }
        }
    }

    // === Convenience operations ===

    pub async fn activate_next(&self) {
        if let Some(label) = self.neighbour(1) {
            self.activate_tab(&label).await;
        }
    }

    pub async fn activate_previous(&self) {
        if let Some(label) = self.neighbour(-1) {
            self.activate_tab(&label).await;
        }
    }

    /// Activate the tab at `index`; out of range does nothing
    pub async fn activate_at(&self, index: usize) {
        let label = self.registry.read().get(index).map(|tab| tab.label.clone());
        match label {
            Some(label) => self.activate_tab(&label).await,
            None => tracing::debug!(index, "No tab at index"),
        }
    }

    fn neighbour(&self, step: isize) -> Option<TabLabel> {
        let registry = self.registry.read();
        let len = registry.len();
        if len < 2 {
            return None;
        }

        let current = registry
            .active()
            .and_then(|label| registry.index_of(label))
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(len as isize) as usize;
        registry.get(next).map(|tab| tab.label.clone())
    }

    pub async fn close_active_tab(&self) -> bool {
        match self.active_label() {
            Some(label) => self.close_tab(&label).await,
            None => false,
        }
    }

    pub async fn refresh_active_tab(&self) {
        if let Some(label) = self.active_label() {
            self.refresh_tab(&label).await;
        }
    }

    /// Title reported by the page inside a surface
    pub fn set_tab_title(&self, label: &TabLabel, title: String) -> bool {
        self.registry.write().update_tab(label, TabPatch::title(title))
    }

    /// Fit the active surface to the container. Call on window and
    /// container resize; placeholders have no surface and are skipped.
    pub async fn layout_active(&self) {
        let active = self
            .registry
            .read()
            .active_tab()
            .filter(|tab| tab.is_backed())
            .map(|tab| tab.label.clone());

        if let Some(label) = active {
            if let Err(e) = self.layout.layout(&label).await {
                tracing::warn!(label = %label, error = %e, "Failed to lay out surface");
            }
        }
    }

    pub async fn dispatch(&self, event: TabEvent) {
        tracing::debug!(label = %event.label(), ?event, "Dispatching tab event");
        match event {
            TabEvent::Refresh(label) => self.refresh_tab(&label).await,
            TabEvent::Close(label) => {
                self.close_tab(&label).await;
            }
            TabEvent::CloseOthers(label) => self.close_other_tabs(&label).await,
        }
    }

    pub async fn perform(&self, action: TabAction) {
        tracing::debug!(?action, "Performing tab action");
        match action {
            TabAction::NewTab => {
                self.open_tab(None, None, None).await;
            }
            TabAction::CloseTab => {
                self.close_active_tab().await;
            }
            TabAction::ReopenTab => {
                self.reopen_last_closed_tab().await;
            }
            TabAction::RefreshTab => self.refresh_active_tab().await,
            TabAction::NextTab => self.activate_next().await,
            TabAction::PrevTab => self.activate_previous().await,
            TabAction::SwitchTab(index) => self.activate_at(index).await,
        }
    }

    // === Surface plumbing ===

    /// Point the registry at `label` and claim the surface losing focus.
    /// Returns the ticket to hide it with, if it has a surface.
    fn swap_active(&self, registry: &mut TabRegistry, label: &TabLabel) -> Option<OpTicket> {
        let previous = registry
            .active_tab()
            .filter(|tab| tab.is_backed() && &tab.label != label)
            .map(|tab| tab.label.clone());

        registry.set_active(Some(label.clone()));
        previous.map(|previous| self.sequencer.issue(&previous))
    }

    async fn conceal(&self, ticket: Option<OpTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        if !self.sequencer.is_current(&ticket) {
            tracing::debug!(label = %ticket.label(), "Dropping superseded hide");
            return;
        }

        if let Err(e) = self.host.hide_surface(ticket.label()).await {
            tracing::warn!(label = %ticket.label(), error = %e, "Failed to hide surface");
        }
    }

    async fn show(&self, ticket: OpTicket) {
        if !self.sequencer.is_current(&ticket) {
            tracing::debug!(label = %ticket.label(), "Dropping superseded show");
            return;
        }

        if let Err(e) = self.host.show_surface(ticket.label()).await {
            tracing::warn!(label = %ticket.label(), error = %e, "Failed to show surface");
        }
    }

    /// Lay out, then show. The surface may have missed resizes while hidden.
    async fn reveal(&self, ticket: OpTicket) {
        if !self.sequencer.is_current(&ticket) {
            tracing::debug!(label = %ticket.label(), "Dropping superseded activation");
            return;
        }

        if let Err(e) = self.layout.layout(ticket.label()).await {
            tracing::warn!(label = %ticket.label(), error = %e, "Failed to lay out surface");
        }
        self.show(ticket).await;
    }

    async fn destroy(&self, label: &TabLabel) {
        if let Err(e) = self.host.destroy_surface(label).await {
            tracing::warn!(label = %label, error = %e, "Failed to destroy surface, tab removed anyway");
        }
    }
}

impl Clone for LifecycleManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            history: Arc::clone(&self.history),
            labels: Arc::clone(&self.labels),
            sequencer: Arc::clone(&self.sequencer),
            host: Arc::clone(&self.host),
            layout: self.layout.clone(),
        }
    }
}
