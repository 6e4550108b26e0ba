use std::rc::Rc;

use crate::modules::coordinator::ViewCoordinator;
use crate::modules::document::DocumentFactory;
use crate::modules::navigation::{format_url_preview, resolve_input, Location};
use crate::modules::shortcuts::{Action, Keymap};
use crate::modules::tabs::{StaticPage, Tab, TabContainer};
use crate::modules::views::{HistoryView, OutlineView};
use crate::settings::{Favourites, Settings, SettingsStore, StoreError};
use crate::state::{EventSender, TabEvent, TabEventKind, TabId};

/// Window-level owner of all tabs.
///
/// The container list is the only owner of each tab. Every change of the
/// active index, including the one implied by closing a tab, runs the view
/// coordinator before returning, so the shared panels never outlive the tab
/// they show.
pub struct Session {
    containers: Vec<TabContainer>,
    active: Option<usize>,
    coordinator: ViewCoordinator,
    documents: Box<dyn DocumentFactory>,
    events: EventSender,
    store: Box<dyn SettingsStore>,
    settings: Settings,
    keymap: Keymap,
    status: String,
    next_id: u64,
}

impl Session {
    /// Opens a session, loading settings from `store`. A store that fails to
    /// load yields default settings.
    pub fn open(
        store: Box<dyn SettingsStore>,
        documents: Box<dyn DocumentFactory>,
        events: EventSender,
        history_view: Rc<HistoryView>,
        outline_view: Rc<OutlineView>,
    ) -> Self {
        let settings = store.load().unwrap_or_else(|e| {
            log::warn!("[Session] Failed to load settings: {}, using defaults", e);
            Settings::default()
        });
        log::info!(
            "[Session] Opened with {} favourites",
            settings.favourites.len()
        );

        let mut keymap = Keymap::default();
        for (sequence, action) in &settings.shortcuts {
            keymap.bind(sequence, *action);
        }

        Self {
            containers: Vec::new(),
            active: None,
            coordinator: ViewCoordinator::new(history_view, outline_view),
            documents,
            events,
            store,
            settings,
            keymap,
            status: String::new(),
            next_id: 1,
        }
    }

    /// Tears down every tab and saves settings.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.coordinator.unbind();
        self.active = None;
        let closed = self.containers.len();
        self.containers.clear();
        log::info!("[Session] Closed {} tabs", closed);
        self.store.save(&self.settings)
    }

    // --- Tab lifecycle ---

    pub fn add_empty_tab(&mut self, focus: bool) -> TabId {
        let id = TabId::new(self.next_id);
        self.next_id += 1;

        let document = self.documents.create(self.events.for_tab(id));
        let index = self.push_container(TabContainer::Browser(Tab::new(id, document)), focus);
        log::info!("[Session] Added tab {} at {}", id, index);
        id
    }

    pub fn add_new_tab(&mut self, focus: bool, location: Location) -> TabId {
        let id = self.add_empty_tab(focus);
        if let Some(tab) = self.tab_mut(id) {
            tab.navigate_to(location);
        }
        id
    }

    /// Adds a container that is not a browser tab.
    pub fn add_static_page(&mut self, title: &str, focus: bool) -> usize {
        self.push_container(TabContainer::Static(StaticPage::new(title)), focus)
    }

    fn push_container(&mut self, container: TabContainer, focus: bool) -> usize {
        self.containers.push(container);
        let index = self.containers.len() - 1;
        // The first container becomes current even when not focused.
        if focus || self.active.is_none() {
            self.set_active(Some(index));
        }
        index
    }

    pub fn close_tab(&mut self, id: TabId) -> bool {
        match self.index_of(id) {
            Some(index) => self.close_at(index),
            None => {
                log::debug!("[Session] Close of unknown tab {} ignored", id);
                false
            }
        }
    }

    pub fn close_active(&mut self) -> bool {
        match self.active {
            Some(index) => self.close_at(index),
            None => false,
        }
    }

    /// Removes the container at `index`. If it was active, the container to
    /// its right takes over, else the one to its left, else nothing.
    pub fn close_at(&mut self, index: usize) -> bool {
        if index >= self.containers.len() {
            return false;
        }
        let removed = self.containers.remove(index);
        let remaining = self.containers.len();

        let active = match self.active {
            _ if remaining == 0 => None,
            Some(current) if current == index => Some(index.min(remaining - 1)),
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        self.active = active;
        self.coordinator
            .active_changed(active.and_then(|i| self.containers.get(i)));

        log::info!(
            "[Session] Closed '{}' at {}, active now {:?}",
            removed.label(),
            index,
            self.active
        );
        drop(removed);
        true
    }

    /// Makes `index` the active container (`None` for no active tab).
    pub fn set_active(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.containers.len() {
                log::debug!("[Session] Rejected active index {}", i);
                return false;
            }
        }
        self.active = index;
        self.coordinator
            .active_changed(index.and_then(|i| self.containers.get(i)));
        true
    }

    // --- Lookup ---

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.containers.get(self.active?)?.as_tab()
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.containers.get_mut(self.active?)?.as_tab_mut()
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.containers
            .iter()
            .position(|c| c.as_tab().is_some_and(|t| t.id() == id))
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.containers.get(self.index_of(id)?)?.as_tab()
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        let index = self.index_of(id)?;
        self.containers.get_mut(index)?.as_tab_mut()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.containers.get(index).map(TabContainer::label)
    }

    pub fn tooltip(&self, index: usize) -> Option<&str> {
        self.containers.get(index).map(TabContainer::tooltip)
    }

    pub fn containers(&self) -> &[TabContainer] {
        &self.containers
    }

    pub fn coordinator(&self) -> &ViewCoordinator {
        &self.coordinator
    }

    /// Status-bar text (hovered link preview).
    pub fn status_text(&self) -> &str {
        &self.status
    }

    // --- Document events ---

    /// Routes one document event to its tab. Events from tabs that are no
    /// longer in the session are dropped.
    pub fn handle_event(&mut self, event: TabEvent) -> bool {
        let TabEvent { tab: id, kind } = event;
        let Some(index) = self.index_of(id) else {
            log::debug!("[Session] Ignoring {:?} from closed tab {}", kind, id);
            return false;
        };
        let is_active = self.active == Some(index);
        let Some(tab) = self.containers[index].as_tab_mut() else {
            return false;
        };

        match kind {
            TabEventKind::TitleChanged(title) => tab.apply_title(title),
            TabEventKind::LocationChanged(location) => tab.apply_location(&location),
            TabEventKind::LinkHovered(location) => {
                if is_active {
                    self.status = format_url_preview(location.as_ref());
                }
            }
            TabEventKind::LoadFinished(outline) => tab.apply_outline(outline),
        }
        true
    }

    // --- User gestures ---

    /// Opens favourite `row` in a new focused tab. Invalid rows do nothing.
    pub fn activate_favourite(&mut self, row: usize) -> Option<TabId> {
        let location = self.settings.favourites.get(row)?;
        Some(self.add_new_tab(true, location))
    }

    /// Returns the active tab to history row `row`.
    pub fn activate_history_row(&mut self, row: usize) -> bool {
        match self.active_tab_mut() {
            Some(tab) => tab.navigate_back(row),
            None => false,
        }
    }

    pub fn refresh_active(&mut self) -> bool {
        match self.active_tab_mut() {
            Some(tab) => tab.reload(),
            None => false,
        }
    }

    /// Address-bar navigation: resolves `input` and loads it in the active
    /// tab, opening a tab first if none is active.
    pub fn open_input(&mut self, input: &str) -> TabId {
        let location = resolve_input(input, &self.settings);
        match self.active_tab_mut() {
            Some(tab) => {
                tab.navigate_to(location);
                tab.id()
            }
            None => self.add_new_tab(true, location),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::NewTab => {
                self.add_empty_tab(true);
                true
            }
            // Static pages only close by index, never by the close shortcut.
            Action::CloseTab => {
                let active = self.active_tab().map(Tab::id);
                active.is_some_and(|id| self.close_tab(id))
            }
            Action::Refresh => self.refresh_active(),
        }
    }

    /// Runs the action bound to `sequence`, if any.
    pub fn dispatch_shortcut(&mut self, sequence: &str) -> Option<bool> {
        let action = self.keymap.lookup(sequence)?;
        Some(self.dispatch(action))
    }

    // --- Settings ---

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn favourites(&self) -> &Favourites {
        &self.settings.favourites
    }
}
