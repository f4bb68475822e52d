//! External authorization windows.

/// A window opened for the operator, e.g. an OAuth consent page.
pub trait ExternalWindow: Send {
    /// Whether the window is gone, by the operator's hand or ours.
    fn is_closed(&self) -> bool;

    fn close(&mut self);
}

/// Opens authorization pages in front of the operator.
pub trait WindowOpener: Send + Sync {
    /// `None` means the environment refused to open the window.
    fn open(&self, url: &str) -> Option<Box<dyn ExternalWindow>>;
}
