pub mod constraint;
pub mod engine;
pub mod lexicon;
pub mod milestone;
pub mod tracker;
