pub mod catalog;
pub mod narrator;
pub mod pacing;
pub mod sheet_loader;
pub mod speech;
