//! Services module
//!
//! Business logic that sits outside the database layer.

pub mod images;

pub use images::ImageService;
