use std::ops::Range;
use std::rc::Weak;

use chrono::{DateTime, Utc};

use crate::modules::model::{ItemRole, ListModel, ModelObserver, Observers};
use crate::modules::navigation::Location;

/// One recorded visit. Only [`BrowsingHistory::push_url`] creates these.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationEntry {
    location: Location,
    index: usize,
    visited_at: DateTime<Utc>,
}

impl NavigationEntry {
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn visited_at(&self) -> DateTime<Utc> {
        self.visited_at
    }
}

/// Per-tab back history.
///
/// Entries are append-only except for a truncating push, which discards
/// everything after the position the tab navigated back to. There is no
/// forward stack.
#[derive(Debug, Default)]
pub struct BrowsingHistory {
    entries: Vec<NavigationEntry>,
    observers: Observers<dyn ModelObserver>,
}

impl BrowsingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit to `location` and returns its index.
    ///
    /// When `position` names an existing entry, every entry after it is
    /// dropped first; otherwise the location is simply appended.
    pub fn push_url(&mut self, position: Option<usize>, location: Location) -> usize {
        let len = self.entries.len();
        if let Some(keep) = position.filter(|&p| p < len).map(|p| p + 1) {
            if keep < len {
                self.remove_rows(keep..len);
            }
        }

        let row = self.entries.len();
        let rows = row..row + 1;
        self.emit(|o, model| o.rows_about_to_be_inserted(model, rows.clone()));

        self.entries.push(NavigationEntry {
            location,
            index: row,
            visited_at: Utc::now(),
        });

        self.emit(|o, model| o.rows_inserted(model, rows.clone()));
        row
    }

    fn remove_rows(&mut self, rows: Range<usize>) {
        log::debug!("[History] Discarding rows {:?}", rows);
        self.emit(|o, model| o.rows_about_to_be_removed(model, rows.clone()));
        self.entries.truncate(rows.start);
        self.emit(|o, model| o.rows_removed(model, rows.clone()));
    }

    fn emit(&self, f: impl Fn(&dyn ModelObserver, &dyn ListModel)) {
        self.observers.notify(|o| f(o, self));
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.entries.get(index).map(NavigationEntry::location)
    }

    pub fn entry(&self, index: usize) -> Option<&NavigationEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty()
    }

    // Forward navigation is not supported: no forward stack is kept.
    pub fn can_go_forward(&self) -> bool {
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, observer: Weak<dyn ModelObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn unsubscribe(&mut self, observer: &Weak<dyn ModelObserver>) {
        self.observers.unsubscribe(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.live()
    }
}

impl ListModel for BrowsingHistory {
    fn row_count(&self) -> usize {
        self.entries.len()
    }

    fn data(&self, row: usize, role: ItemRole) -> Option<String> {
        if role != ItemRole::Display {
            return None;
        }
        self.get(row).map(Location::to_string)
    }

    fn set_data(&mut self, row: usize, _value: &str, _role: ItemRole) -> bool {
        log::debug!("[History] Rejected edit of row {}", row);
        false
    }
}
