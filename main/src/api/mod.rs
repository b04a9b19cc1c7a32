pub mod element;
pub mod error;
pub mod filler;
pub mod matrix;
