//! Domain types for SmartScreen

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::SeriesWindow;

/// Symbol type alias
pub type Symbol = String;
