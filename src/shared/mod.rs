//! State shared between the analysis pipeline and the overlay

pub mod display;

pub use display::DisplayState;
