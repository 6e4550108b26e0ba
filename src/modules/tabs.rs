// Tab module - one browsing context and the containers the tab strip holds.

use std::cell::RefCell;
use std::rc::Rc;

use crate::history::BrowsingHistory;
use crate::modules::document::Document;
use crate::modules::navigation::Location;
use crate::modules::outline::{Outline, OutlineModel};
use crate::state::TabId;

pub const DEFAULT_TITLE: &str = "Page";

/// One browsing context: back history, outline, document and labels.
///
/// The history and outline sit behind `Rc` so the shared panels can hold
/// `Weak` handles to them; the tab holds the only strong references, so both
/// models die with the tab.
pub struct Tab {
    id: TabId,
    title: String,
    tooltip: String,
    history: Rc<RefCell<BrowsingHistory>>,
    outline: Rc<RefCell<OutlineModel>>,
    /// History row the tab is showing. Behind the last row after a
    /// `navigate_back`.
    position: Option<usize>,
    document: Box<dyn Document>,
}

impl Tab {
    pub fn new(id: TabId, document: Box<dyn Document>) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            tooltip: String::new(),
            history: Rc::new(RefCell::new(BrowsingHistory::new())),
            outline: Rc::new(RefCell::new(OutlineModel::new())),
            position: None,
            document,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn history(&self) -> &Rc<RefCell<BrowsingHistory>> {
        &self.history
    }

    pub fn outline(&self) -> &Rc<RefCell<OutlineModel>> {
        &self.outline
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current_location(&self) -> Option<Location> {
        let position = self.position?;
        self.history.borrow().get(position).cloned()
    }

    /// Loads `location` and records it after the current position.
    pub fn navigate_to(&mut self, location: Location) {
        log::info!("[Tab {}] Navigating to {}", self.id, location);
        self.document.load(&location);
        let index = self.history.borrow_mut().push_url(self.position, location);
        self.position = Some(index);
    }

    /// Reloads history row `index` without recording a new visit.
    pub fn navigate_back(&mut self, index: usize) -> bool {
        let Some(location) = self.history.borrow().get(index).cloned() else {
            log::debug!("[Tab {}] No history row {}", self.id, index);
            return false;
        };
        log::info!("[Tab {}] Back to row {} ({})", self.id, index, location);
        self.document.load(&location);
        self.position = Some(index);
        true
    }

    pub fn reload(&mut self) -> bool {
        let Some(location) = self.current_location() else {
            return false;
        };
        log::info!("[Tab {}] Reloading {}", self.id, location);
        self.document.load(&location);
        true
    }

    pub(crate) fn apply_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn apply_location(&mut self, location: &Location) {
        self.tooltip = location.to_string();
    }

    pub(crate) fn apply_outline(&mut self, outline: Outline) {
        self.outline.borrow_mut().replace(outline);
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        self.document.cancel();
        log::debug!("[Tab {}] Released", self.id);
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("position", &self.position)
            .field("history_len", &self.history.borrow().len())
            .finish()
    }
}

/// A page in the tab strip that is not a browsing context (e.g. a built-in
/// help page). Has a label and nothing for the side panels to show.
#[derive(Debug, Clone)]
pub struct StaticPage {
    title: String,
}

impl StaticPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[derive(Debug)]
pub enum TabContainer {
    Browser(Tab),
    Static(StaticPage),
}

impl TabContainer {
    pub fn as_tab(&self) -> Option<&Tab> {
        match self {
            Self::Browser(tab) => Some(tab),
            Self::Static(_) => None,
        }
    }

    pub fn as_tab_mut(&mut self) -> Option<&mut Tab> {
        match self {
            Self::Browser(tab) => Some(tab),
            Self::Static(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Browser(tab) => tab.title(),
            Self::Static(page) => &page.title,
        }
    }

    pub fn tooltip(&self) -> &str {
        match self {
            Self::Browser(tab) => tab.tooltip(),
            Self::Static(_) => "",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Document that records what it was asked to load.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingDocument {
        pub loads: Rc<RefCell<Vec<String>>>,
        pub cancels: Rc<RefCell<usize>>,
    }

    impl Document for RecordingDocument {
        fn load(&mut self, location: &Location) {
            self.loads.borrow_mut().push(location.to_string());
        }

        fn cancel(&mut self) {
            *self.cancels.borrow_mut() += 1;
        }
    }

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn create_test_tab() -> (Tab, RecordingDocument) {
        let doc = RecordingDocument::default();
        (Tab::new(TabId::new(1), Box::new(doc.clone())), doc)
    }

    fn urls(tab: &Tab) -> Vec<String> {
        tab.history()
            .borrow()
            .entries()
            .iter()
            .map(|e| e.location().to_string())
            .collect()
    }

    #[test]
    fn test_new_tab_defaults() {
        let (tab, _) = create_test_tab();
        assert_eq!(tab.title(), "Page");
        assert_eq!(tab.tooltip(), "");
        assert!(tab.history().borrow().is_empty());
        assert!(tab.outline().borrow().outline().is_empty());
        assert_eq!(tab.position(), None);
        assert_eq!(tab.current_location(), None);
    }

    #[test]
    fn test_navigate_to_loads_and_records() {
        let (mut tab, doc) = create_test_tab();
        tab.navigate_to(loc("gemini://a/"));
        tab.navigate_to(loc("gemini://b/"));

        assert_eq!(*doc.loads.borrow(), vec!["gemini://a/", "gemini://b/"]);
        assert_eq!(urls(&tab), vec!["gemini://a/", "gemini://b/"]);
        assert_eq!(tab.position(), Some(1));
    }

    #[test]
    fn test_back_then_navigate_truncates() {
        let (mut tab, doc) = create_test_tab();
        for url in ["gemini://a/", "gemini://b/", "gemini://c/"] {
            tab.history().borrow_mut().push_url(None, loc(url));
        }
        assert_eq!(tab.history().borrow().len(), 3);

        assert!(tab.navigate_back(0));
        assert_eq!(doc.loads.borrow().last().map(String::as_str), Some("gemini://a/"));
        assert_eq!(tab.position(), Some(0));

        tab.navigate_to(loc("gemini://d/"));
        assert_eq!(urls(&tab), vec!["gemini://a/", "gemini://d/"]);
        assert_eq!(tab.history().borrow().get(1), Some(&loc("gemini://d/")));
    }

    #[test]
    fn test_navigate_back_out_of_range_is_noop() {
        let (mut tab, doc) = create_test_tab();
        tab.navigate_to(loc("gemini://a/"));

        assert!(!tab.navigate_back(5));
        assert_eq!(tab.position(), Some(0));
        assert_eq!(doc.loads.borrow().len(), 1);
    }

    #[test]
    fn test_reload_keeps_history() {
        let (mut tab, doc) = create_test_tab();
        assert!(!tab.reload());

        tab.navigate_to(loc("gemini://a/"));
        tab.navigate_to(loc("gemini://b/"));
        tab.navigate_back(0);
        assert!(tab.reload());

        assert_eq!(doc.loads.borrow().last().map(String::as_str), Some("gemini://a/"));
        assert_eq!(tab.history().borrow().len(), 2);
    }

    #[test]
    fn test_drop_cancels_document_and_releases_models() {
        let (tab, doc) = create_test_tab();
        let history = Rc::downgrade(tab.history());
        let outline = Rc::downgrade(tab.outline());

        drop(tab);

        assert_eq!(*doc.cancels.borrow(), 1);
        assert!(history.upgrade().is_none());
        assert!(outline.upgrade().is_none());
    }

    #[test]
    fn test_container_capability_query() {
        let (tab, _) = create_test_tab();
        let browser = TabContainer::Browser(tab);
        let page = TabContainer::Static(StaticPage::new("Help"));

        assert!(browser.as_tab().is_some());
        assert!(page.as_tab().is_none());
        assert_eq!(browser.label(), "Page");
        assert_eq!(page.label(), "Help");
        assert_eq!(page.tooltip(), "");
    }
}
