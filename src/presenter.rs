//! The seam between the engine and whatever draws it.

use crate::state::GameStateView;

/// Implemented by the UI. The session calls `render` after every mutation
/// and `notify` for status and error text.
pub trait Presenter {
    fn render(&mut self, view: &GameStateView);
    fn notify(&mut self, message: &str);
}

/// Keeps everything it is handed. Clones share the same record.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    pub renders: std::rc::Rc<std::cell::RefCell<Vec<GameStateView>>>,
    pub notices: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

#[cfg(test)]
impl RecordingPresenter {
    pub fn render_count(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn last_notice(&self) -> Option<String> {
        self.notices.borrow().last().cloned()
    }

    pub fn last_view(&self) -> Option<GameStateView> {
        self.renders.borrow().last().cloned()
    }
}

#[cfg(test)]
impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &GameStateView) {
        self.renders.borrow_mut().push(view.clone());
    }

    fn notify(&mut self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}
