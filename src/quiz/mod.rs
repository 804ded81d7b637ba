// src/quiz/mod.rs

pub mod machine;
pub mod parser;
pub mod results;

pub use machine::Advance;
pub use parser::parse_questions;
pub use results::{StudentResults, grade};
