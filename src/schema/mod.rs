pub mod dimensions;
pub mod story;
pub mod violation;
