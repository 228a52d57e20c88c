pub mod grid;
pub mod parse;
pub mod solver;
pub mod types;
pub mod variants;
