pub mod canvas;
pub mod history_panel;
pub mod response_panel;

pub use canvas::CanvasView;
pub use history_panel::HistoryPanel;
pub use response_panel::ResponsePanel;
