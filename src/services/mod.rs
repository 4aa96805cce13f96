pub mod lifecycle;
pub mod listing;
