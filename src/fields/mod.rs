//! Field extractors. Each reads one part of a product page and returns a
//! default when the page does not show it.

pub mod core;
pub mod details;
pub mod images;
pub mod reviews;
pub mod variations;


pub use self::core::{asin, breadcrumbs, price, title};
pub use details::{description, details, features};
pub use reviews::{questions, rating, reviews};
pub use variations::variations;
