//! # LSTM Step Cell
//!
//! One timestep of a Long Short-Term Memory recurrent cell.
//!
//! Given an input batch, a previous memory state and four learned weight
//! matrices (input value, input gate, forget gate, output gate), the cell
//! produces the next hidden and next memory state, and computes exact
//! analytic gradients with respect to the input, the previous memory state
//! and every weight matrix. Recurrence over a sequence is the caller's job;
//! this crate is the single-step building block.
//!
//! ## Example
//!
//! ```rust
//! use lstm_step_cell::{CellConfig, ConstantFiller, Gate, LstmCell, Matrix};
//!
//! let config = CellConfig::<f32>::new(1, 1)
//!     .filler(Gate::InputValue, Box::new(ConstantFiller::new(1.0)))
//!     .filler(Gate::InputGate, Box::new(ConstantFiller::new(1.0)))
//!     .filler(Gate::ForgetGate, Box::new(ConstantFiller::new(1.0)))
//!     .filler(Gate::OutputGate, Box::new(ConstantFiller::new(1.0)));
//! let mut cell = LstmCell::setup(config).unwrap();
//!
//! let input = Matrix::from_vec(vec![1.0], 1, 1).unwrap();
//! let prev_memory = Matrix::zeros(1, 1);
//! let (next_hidden, next_memory) = cell.forward(&input, &prev_memory).unwrap();
//! assert!((next_hidden.get(0, 0) - 0.4070).abs() < 1e-4);
//! assert!((next_memory.get(0, 0) - 0.5568).abs() < 1e-4);
//! ```

pub mod api;
pub mod core;
mod saf;

pub use saf::*;
