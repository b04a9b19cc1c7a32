// SAF (Simple API Facade) — re-exports for convenient access

// API traits and types
pub use crate::api::element::Element;
pub use crate::api::error::{CellError, CellResult};
pub use crate::api::filler::{ConstantFiller, Filler, GaussianFiller, UniformFiller, XavierFiller};
pub use crate::api::matrix::Matrix;

// The cell
pub use crate::core::cell::{CellConfig, CellGradients, LstmCell};
pub use crate::core::gates::{Gate, PerGate};

// Shared activation math
pub use crate::core::math;
