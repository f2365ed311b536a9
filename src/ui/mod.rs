//! egui presentation

mod label_overlay;

pub use label_overlay::{caption_position, LabelOverlayView};
