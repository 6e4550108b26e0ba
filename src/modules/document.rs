// Document collaborator seam.
// A document loads locations for one tab and reports back via DocumentEvents.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::modules::navigation::Location;
use crate::modules::outline::Outline;
use crate::state::DocumentEvents;

pub trait Document {
    /// Starts loading `location`. Completion is reported asynchronously
    /// through the tab's event handle.
    fn load(&mut self, location: &Location);

    /// Abandons any load still in flight.
    fn cancel(&mut self) {}
}

pub trait DocumentFactory {
    fn create(&self, events: DocumentEvents) -> Box<dyn Document>;
}

/// Title shown before a page supplies its own heading.
pub fn fallback_title(location: &Location) -> String {
    if let Some(name) = location
        .url()
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
    {
        return name.to_string();
    }
    match location.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => location.to_string(),
    }
}

/// Document that completes loads on the tokio runtime after `latency`.
///
/// `file://` locations are read from disk and their gemtext headings become
/// the outline; other schemes finish with an empty outline. Starting a new
/// load or cancelling aborts the previous task, so no stale completion can
/// reach the session after the tab is gone.
pub struct DeferredDocument {
    events: DocumentEvents,
    latency: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DeferredDocument {
    pub fn new(events: DocumentEvents, latency: Duration) -> Self {
        Self {
            events,
            latency,
            pending: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Document for DeferredDocument {
    fn load(&mut self, location: &Location) {
        self.cancel();

        let events = self.events.clone();
        let latency = self.latency;
        let location = location.clone();
        log::debug!("[Document] Tab {} loading {}", events.tab(), location);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(latency).await;

            let mut outline = Outline::new();
            if let Some(path) = location.file_path() {
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => outline = Outline::from_gemtext(&text),
                    Err(e) => log::warn!("[Document] Failed to read {:?}: {}", path, e),
                }
            }

            let title = outline
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| fallback_title(&location));

            events.location_changed(location);
            events.title_changed(title);
            events.load_finished(outline);
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                log::debug!("[Document] Tab {} load cancelled", self.events.tab());
            }
            handle.abort();
        }
    }
}

impl Drop for DeferredDocument {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct DeferredDocuments {
    latency: Duration,
}

impl DeferredDocuments {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl DocumentFactory for DeferredDocuments {
    fn create(&self, events: DocumentEvents) -> Box<dyn Document> {
        Box::new(DeferredDocument::new(events, self.latency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{event_bus, TabEventKind, TabId};
    use rstest::rstest;
    use std::io::Write;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[rstest]
    #[case("gemini://example.com/docs/spec.gmi", "spec.gmi")]
    #[case("gemini://example.com/", "example.com")]
    #[case("gemini://example.com", "example.com")]
    #[case("about:blank", "about:blank")]
    fn test_fallback_title(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(fallback_title(&loc(input)), expected);
    }

    #[tokio::test]
    async fn test_load_reports_location_title_and_outline() {
        let (sender, mut rx) = event_bus();
        let mut doc = DeferredDocument::new(sender.for_tab(TabId::new(3)), Duration::ZERO);

        let mut file = tempfile::Builder::new().suffix(".gmi").tempfile().unwrap();
        writeln!(file, "# Notes\n## Todo").unwrap();
        let location = Location::from(url::Url::from_file_path(file.path()).unwrap());

        doc.load(&location);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.tab, TabId::new(3));
        assert_eq!(first.kind, TabEventKind::LocationChanged(location));
        assert_eq!(
            rx.recv().await.unwrap().kind,
            TabEventKind::TitleChanged("Notes".into())
        );
        match rx.recv().await.unwrap().kind {
            TabEventKind::LoadFinished(outline) => assert_eq!(outline.len(), 2),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropping_document_cancels_pending_load() {
        let (sender, mut rx) = event_bus();
        let mut doc = DeferredDocument::new(sender.for_tab(TabId::new(1)), Duration::from_millis(50));

        doc.load(&loc("gemini://example.com/"));
        assert!(doc.is_loading());
        drop(doc);

        let waited = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(waited.is_err(), "cancelled load still produced {:?}", waited);
    }

    #[tokio::test]
    async fn test_new_load_replaces_pending_one() {
        let (sender, mut rx) = event_bus();
        let mut doc = DeferredDocument::new(sender.for_tab(TabId::new(1)), Duration::from_millis(30));

        doc.load(&loc("gemini://first.example/"));
        doc.load(&loc("gemini://second.example/"));

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.kind,
            TabEventKind::LocationChanged(loc("gemini://second.example/"))
        );
    }
}
