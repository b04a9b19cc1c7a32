pub mod cell;
pub mod gates;
pub mod math;
