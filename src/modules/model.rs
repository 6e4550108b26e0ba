// Observable list-model plumbing shared by the history and outline panels.
// Models own their rows; views subscribe with weak handles and mirror them.

use std::ops::Range;
use std::rc::Weak;

/// Which projection of a row a view asks for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ItemRole {
    Display,
    ToolTip,
    Edit,
}

/// Read side of a flat, row-based model.
pub trait ListModel {
    fn row_count(&self) -> usize;

    /// Projection of `row` for `role`; `None` for unknown rows or roles.
    fn data(&self, row: usize, role: ItemRole) -> Option<String>;

    /// Edit request coming from a view. Read-only models reject it.
    fn set_data(&mut self, _row: usize, _value: &str, _role: ItemRole) -> bool {
        false
    }
}

/// Change notifications for a [`ListModel`].
///
/// Every length change is bracketed: the `about_to` callback runs while the
/// model still has its old rows, the second one after the change. The model
/// is passed in so observers can read it mid-notification.
pub trait ModelObserver {
    fn rows_about_to_be_inserted(&self, _model: &dyn ListModel, _rows: Range<usize>) {}
    fn rows_inserted(&self, _model: &dyn ListModel, _rows: Range<usize>) {}
    fn rows_about_to_be_removed(&self, _model: &dyn ListModel, _rows: Range<usize>) {}
    fn rows_removed(&self, _model: &dyn ListModel, _rows: Range<usize>) {}
}

/// Weakly held subscriber list. Dropped observers are skipped on notify and
/// pruned on the next subscribe.
pub struct Observers<T: ?Sized> {
    list: Vec<Weak<T>>,
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self { list: Vec::new() }
    }
}

impl<T: ?Sized> Observers<T> {
    pub fn subscribe(&mut self, observer: Weak<T>) {
        self.list.retain(|w| w.strong_count() > 0);
        if !self.list.iter().any(|w| w.ptr_eq(&observer)) {
            self.list.push(observer);
        }
    }

    pub fn unsubscribe(&mut self, observer: &Weak<T>) {
        self.list
            .retain(|w| w.strong_count() > 0 && !w.ptr_eq(observer));
    }

    pub fn notify(&self, mut f: impl FnMut(&T)) {
        for weak in &self.list {
            if let Some(observer) = weak.upgrade() {
                f(&observer);
            }
        }
    }

    /// Number of observers still alive.
    pub fn live(&self) -> usize {
        self.list.iter().filter(|w| w.strong_count() > 0).count()
    }
}

impl<T: ?Sized> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("live", &self.live()).finish()
    }
}
