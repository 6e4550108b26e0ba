// Shared identifiers and the tab event bus.
// Documents emit through a handle stamped with their tab's id, so the session
// can route events without knowing which object sent them.

use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::modules::navigation::Location;
use crate::modules::outline::Outline;

/// Stable identifier for a browser tab. Never reused within a session.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TabId(u64);

impl TabId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabEventKind {
    TitleChanged(String),
    LocationChanged(Location),
    /// Pointer entered (`Some`) or left (`None`) a link.
    LinkHovered(Option<Location>),
    LoadFinished(Outline),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabEvent {
    pub tab: TabId,
    pub kind: TabEventKind,
}

pub type EventReceiver = UnboundedReceiver<TabEvent>;

/// Creates the bus: the sender goes to the session, the receiver to whoever
/// runs the event loop.
pub fn event_bus() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender(tx), rx)
}

#[derive(Debug, Clone)]
pub struct EventSender(UnboundedSender<TabEvent>);

impl EventSender {
    /// Handle for the document of tab `tab`.
    pub fn for_tab(&self, tab: TabId) -> DocumentEvents {
        DocumentEvents {
            tab,
            tx: self.0.clone(),
        }
    }
}

/// What a document uses to report back to the session.
#[derive(Debug, Clone)]
pub struct DocumentEvents {
    tab: TabId,
    tx: UnboundedSender<TabEvent>,
}

impl DocumentEvents {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn title_changed(&self, title: impl Into<String>) {
        self.emit(TabEventKind::TitleChanged(title.into()));
    }

    pub fn location_changed(&self, location: Location) {
        self.emit(TabEventKind::LocationChanged(location));
    }

    pub fn link_hovered(&self, location: Option<Location>) {
        self.emit(TabEventKind::LinkHovered(location));
    }

    pub fn load_finished(&self, outline: Outline) {
        self.emit(TabEventKind::LoadFinished(outline));
    }

    fn emit(&self, kind: TabEventKind) {
        let event = TabEvent { tab: self.tab, kind };
        if let Err(e) = self.tx.send(event) {
            log::debug!("[Events] Event loop gone, dropped {:?}", e.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_carry_tab_identity() {
        let (sender, mut rx) = event_bus();
        let a = sender.for_tab(TabId::new(1));
        let b = sender.for_tab(TabId::new(2));

        b.title_changed("Second");
        a.title_changed("First");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.tab, TabId::new(2));
        assert_eq!(first.kind, TabEventKind::TitleChanged("Second".into()));
        assert_eq!(rx.try_recv().unwrap().tab, TabId::new(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (sender, rx) = event_bus();
        drop(rx);
        sender.for_tab(TabId::new(7)).title_changed("nobody listens");
    }
}
