// libs/scheduling-cell/src/services/recording.rs
use navigation_cell::NavigationFrame;

use crate::models::{Notice, ScreenState};
use crate::services::controller::SchedulingView;

/// View that keeps what the controller reported instead of drawing it.
///
/// The HTTP adapter hands the recorded state back as JSON; tests use it to
/// observe the controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    last_render: Option<ScreenState>,
    render_count: usize,
    notices: Vec<Notice>,
    restored: Option<NavigationFrame>,
    exited: bool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_render(&self) -> Option<&ScreenState> {
        self.last_render.as_ref()
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Notices reported since the previous call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn take_restored(&mut self) -> Option<NavigationFrame> {
        self.restored.take()
    }

    pub fn take_exited(&mut self) -> bool {
        std::mem::replace(&mut self.exited, false)
    }
}

impl SchedulingView for RecordingView {
    fn render(&mut self, state: &ScreenState) {
        self.last_render = Some(state.clone());
        self.render_count += 1;
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn restore(&mut self, frame: &NavigationFrame) {
        self.restored = Some(frame.clone());
    }

    fn exit(&mut self) {
        self.exited = true;
    }
}
