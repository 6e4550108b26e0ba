// Shared side-panel views. Each mirrors at most one tab's model at a time and
// only ever holds a Weak handle to it.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

use crate::history::BrowsingHistory;
use crate::modules::model::{ItemRole, ListModel, ModelObserver};
use crate::modules::outline::{Outline, OutlineModel, OutlineObserver, OutlineRow};

/// History panel: a flat list of visited locations.
#[derive(Default)]
pub struct HistoryView {
    model: RefCell<Weak<RefCell<BrowsingHistory>>>,
    rows: RefCell<Vec<String>>,
}

impl HistoryView {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Binds to `model`, or to nothing. Unsubscribes from the previous model
    /// if it is still alive.
    pub fn set_model(self: &Rc<Self>, model: Option<&Rc<RefCell<BrowsingHistory>>>) {
        let this: Rc<dyn ModelObserver> = self.clone();
        let observer = Rc::downgrade(&this);

        if let Some(previous) = self.model.replace(Weak::new()).upgrade() {
            previous.borrow_mut().unsubscribe(&observer);
        }

        let mut rows = self.rows.borrow_mut();
        rows.clear();
        if let Some(model) = model {
            model.borrow_mut().subscribe(observer);
            let history = model.borrow();
            rows.extend((0..history.row_count()).filter_map(|r| history.data(r, ItemRole::Display)));
            *self.model.borrow_mut() = Rc::downgrade(model);
        }
    }

    pub fn is_bound(&self) -> bool {
        self.model.borrow().strong_count() > 0
    }

    /// Rows shown. Zero when unbound or when the bound model is gone.
    pub fn row_count(&self) -> usize {
        if self.is_bound() {
            self.rows.borrow().len()
        } else {
            0
        }
    }

    pub fn row(&self, index: usize) -> Option<String> {
        if !self.is_bound() {
            return None;
        }
        self.rows.borrow().get(index).cloned()
    }

    pub fn rows(&self) -> Vec<String> {
        if !self.is_bound() {
            return Vec::new();
        }
        self.rows.borrow().clone()
    }

    /// Forwards an in-place edit to the model; history rejects these.
    pub fn request_edit(&self, row: usize, value: &str) -> bool {
        match self.model.borrow().upgrade() {
            Some(model) => model.borrow_mut().set_data(row, value, ItemRole::Edit),
            None => false,
        }
    }
}

impl ModelObserver for HistoryView {
    fn rows_about_to_be_inserted(&self, model: &dyn ListModel, _rows: Range<usize>) {
        debug_assert_eq!(self.rows.borrow().len(), model.row_count());
    }

    fn rows_inserted(&self, model: &dyn ListModel, rows: Range<usize>) {
        let mut shown = self.rows.borrow_mut();
        for row in rows {
            shown.insert(row, model.data(row, ItemRole::Display).unwrap_or_default());
        }
    }

    fn rows_about_to_be_removed(&self, model: &dyn ListModel, _rows: Range<usize>) {
        debug_assert_eq!(self.rows.borrow().len(), model.row_count());
    }

    fn rows_removed(&self, _model: &dyn ListModel, rows: Range<usize>) {
        let mut shown = self.rows.borrow_mut();
        let end = rows.end.min(shown.len());
        shown.drain(rows.start.min(end)..end);
    }
}

/// Outline panel: a tree of headings, optionally fully expanded.
#[derive(Default)]
pub struct OutlineView {
    model: RefCell<Weak<RefCell<OutlineModel>>>,
    outline: RefCell<Outline>,
    expanded: Cell<bool>,
}

impl OutlineView {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Binds to `model`, or to nothing. A new model starts collapsed.
    pub fn set_model(self: &Rc<Self>, model: Option<&Rc<RefCell<OutlineModel>>>) {
        let this: Rc<dyn OutlineObserver> = self.clone();
        let observer = Rc::downgrade(&this);

        if let Some(previous) = self.model.replace(Weak::new()).upgrade() {
            previous.borrow_mut().unsubscribe(&observer);
        }

        self.expanded.set(false);
        let mut shown = self.outline.borrow_mut();
        *shown = Outline::new();
        if let Some(model) = model {
            model.borrow_mut().subscribe(observer);
            *shown = model.borrow().outline().clone();
            *self.model.borrow_mut() = Rc::downgrade(model);
        }
    }

    pub fn expand_all(&self) {
        self.expanded.set(true);
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn is_bound(&self) -> bool {
        self.model.borrow().strong_count() > 0
    }

    pub fn rows(&self) -> Vec<OutlineRow> {
        if !self.is_bound() {
            return Vec::new();
        }
        self.outline.borrow().rows(self.expanded.get())
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }
}

impl OutlineObserver for OutlineView {
    fn outline_reset(&self, outline: &Outline) {
        *self.outline.borrow_mut() = outline.clone();
    }
}
