use crate::model::{PageId, TelemetryFrame};

/// Decides page changes forced by the vehicle state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingReactor;

impl RoutingReactor {
    pub fn new() -> Self {
        Self
    }

    /// Reverse gear pulls the driver onto the camera page unless they are in
    /// settings. Nothing navigates back once reverse clears.
    pub fn decide(&self, frame: &TelemetryFrame, current: PageId) -> Option<PageId> {
        if frame.reverse && current != PageId::Settings {
            Some(PageId::Camera)
        } else {
            None
        }
    }
}

/// Holds the page currently on screen.
#[derive(Debug, Clone)]
pub struct PageRouter {
    current: PageId,
}

impl PageRouter {
    pub fn new(initial: PageId) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> PageId {
        self.current
    }

    /// Switches to `page`, returning whether the visible page changed.
    pub fn navigate(&mut self, page: PageId) -> bool {
        if self.current == page {
            return false;
        }
        self.current = page;
        true
    }
}

impl Default for PageRouter {
    fn default() -> Self {
        Self::new(PageId::default())
    }
}
