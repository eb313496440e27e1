//! Decoding pipeline: line source, scalar inference and the recursive parser.

pub mod parser;
pub mod resolve;
pub mod scanner;
