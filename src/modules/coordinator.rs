// Keeps the shared history and outline panels pointed at the active tab.

use std::rc::Rc;

use crate::modules::tabs::TabContainer;
use crate::modules::views::{HistoryView, OutlineView};
use crate::state::TabId;

pub struct ViewCoordinator {
    history_view: Rc<HistoryView>,
    outline_view: Rc<OutlineView>,
    bound: Option<TabId>,
}

impl ViewCoordinator {
    pub fn new(history_view: Rc<HistoryView>, outline_view: Rc<OutlineView>) -> Self {
        Self {
            history_view,
            outline_view,
            bound: None,
        }
    }

    /// Rebinds both panels to `active`, or clears them when there is no
    /// active container or it is not a browser tab.
    pub fn active_changed(&mut self, active: Option<&TabContainer>) {
        match active.and_then(TabContainer::as_tab) {
            Some(tab) => {
                self.outline_view.set_model(Some(tab.outline()));
                self.outline_view.expand_all();
                self.history_view.set_model(Some(tab.history()));
                if self.bound != Some(tab.id()) {
                    log::debug!("[Views] Bound to tab {}", tab.id());
                }
                self.bound = Some(tab.id());
            }
            None => self.unbind(),
        }
    }

    pub fn unbind(&mut self) {
        self.outline_view.set_model(None);
        self.history_view.set_model(None);
        if let Some(previous) = self.bound.take() {
            log::debug!("[Views] Unbound from tab {}", previous);
        }
    }

    pub fn bound_tab(&self) -> Option<TabId> {
        self.bound
    }

    pub fn history_view(&self) -> &Rc<HistoryView> {
        &self.history_view
    }

    pub fn outline_view(&self) -> &Rc<OutlineView> {
        &self.outline_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::navigation::Location;
    use crate::modules::outline::Outline;
    use crate::modules::tabs::tests::RecordingDocument;
    use crate::modules::tabs::{StaticPage, Tab};

    fn coordinator() -> ViewCoordinator {
        ViewCoordinator::new(HistoryView::new(), OutlineView::new())
    }

    fn browser(id: u64, urls: &[&str]) -> TabContainer {
        let mut tab = Tab::new(TabId::new(id), Box::new(RecordingDocument::default()));
        for url in urls {
            tab.navigate_to(Location::parse(url).unwrap());
        }
        TabContainer::Browser(tab)
    }

    #[test]
    fn test_binds_history_and_expanded_outline() {
        let mut c = coordinator();
        let mut container = browser(1, &["gemini://a/"]);
        if let Some(tab) = container.as_tab_mut() {
            tab.apply_outline(Outline::from_gemtext("# A\n## B\n"));
        }

        c.active_changed(Some(&container));

        assert_eq!(c.bound_tab(), Some(TabId::new(1)));
        assert_eq!(c.history_view().rows(), vec!["gemini://a/"]);
        assert!(c.outline_view().is_expanded());
        assert_eq!(c.outline_view().row_count(), 2);
    }

    #[test]
    fn test_static_page_clears_views() {
        let mut c = coordinator();
        let tab = browser(1, &["gemini://a/"]);
        c.active_changed(Some(&tab));

        let page = TabContainer::Static(StaticPage::new("Help"));
        c.active_changed(Some(&page));

        assert_eq!(c.bound_tab(), None);
        assert!(!c.history_view().is_bound());
        assert_eq!(c.history_view().row_count(), 0);
        assert_eq!(c.outline_view().row_count(), 0);
    }

    #[test]
    fn test_no_active_container_clears_views() {
        let mut c = coordinator();
        let tab = browser(1, &["gemini://a/"]);
        c.active_changed(Some(&tab));
        c.active_changed(None);

        assert_eq!(c.bound_tab(), None);
        assert_eq!(c.history_view().row_count(), 0);
    }

    #[test]
    fn test_switching_tabs_shows_only_new_history() {
        let mut c = coordinator();
        let a = browser(1, &["gemini://only-a/", "gemini://shared/"]);
        let b = browser(2, &["gemini://only-b/"]);

        c.active_changed(Some(&a));
        c.active_changed(Some(&b));

        let rows = c.history_view().rows();
        assert_eq!(rows, vec!["gemini://only-b/"]);
        assert!(!rows.iter().any(|r| r == "gemini://only-a/"));
    }
}
