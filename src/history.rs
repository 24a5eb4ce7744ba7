use crate::stroke::StrokeRef;
use parking_lot::Mutex;
use std::sync::Arc;

/// Manages committed strokes for undo/redo
#[derive(Debug, Default, Clone)]
pub struct HistoryStack {
    /// Visible strokes, in drawing order
    active: Vec<StrokeRef>,
    /// Strokes removed by undo; the last one is redone first
    redo_stack: Vec<StrokeRef>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Append a finished stroke. Empty strokes are rejected.
    pub fn commit(&mut self, stroke: StrokeRef) -> bool {
        if stroke.is_empty() {
            log::trace!("Rejecting empty stroke");
            return false;
        }

        self.active.push(stroke);
        // A fresh stroke invalidates the redo branch
        self.redo_stack.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.active.pop() {
            Some(stroke) => {
                self.redo_stack.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(stroke) => {
                self.active.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Owned copy of the active strokes, safe to hand to another thread
    pub fn snapshot(&self) -> Vec<StrokeRef> {
        self.active.clone()
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.active
    }

    pub fn can_undo(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// A [`HistoryStack`] shared between threads.
///
/// Every operation takes the one lock for its own duration, so a snapshot
/// never observes a half-applied undo or commit.
#[derive(Debug, Default, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryStack>>,
}

impl SharedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, stroke: StrokeRef) -> bool {
        self.inner.lock().commit(stroke)
    }

    pub fn undo(&self) -> bool {
        self.inner.lock().undo()
    }

    pub fn redo(&self) -> bool {
        self.inner.lock().redo()
    }

    pub fn snapshot(&self) -> Vec<StrokeRef> {
        self.inner.lock().snapshot()
    }
}

impl From<HistoryStack> for SharedHistory {
    fn from(history: HistoryStack) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }
}
