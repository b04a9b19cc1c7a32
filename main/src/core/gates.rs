use crate::api::element::Element;
use crate::api::matrix::Matrix;

/// The four gates of the cell. `InputValue` is the tanh-activated candidate;
/// the other three are sigmoid gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    InputValue,
    InputGate,
    ForgetGate,
    OutputGate,
}

impl Gate {
    pub const ALL: [Gate; 4] = [
        Gate::InputValue,
        Gate::InputGate,
        Gate::ForgetGate,
        Gate::OutputGate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Gate::InputValue => "input_value",
            Gate::InputGate => "input_gate",
            Gate::ForgetGate => "forget_gate",
            Gate::OutputGate => "output_gate",
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per gate, addressed by `Gate` tag instead of channel-block
/// offsets into a flat 4*channels buffer.
#[derive(Debug)]
pub struct PerGate<B> {
    pub input_value: B,
    pub input_gate: B,
    pub forget_gate: B,
    pub output_gate: B,
}

impl<B> PerGate<B> {
    pub fn from_fn(mut f: impl FnMut(Gate) -> B) -> Self {
        Self {
            input_value: f(Gate::InputValue),
            input_gate: f(Gate::InputGate),
            forget_gate: f(Gate::ForgetGate),
            output_gate: f(Gate::OutputGate),
        }
    }

    pub fn get(&self, gate: Gate) -> &B {
        match gate {
            Gate::InputValue => &self.input_value,
            Gate::InputGate => &self.input_gate,
            Gate::ForgetGate => &self.forget_gate,
            Gate::OutputGate => &self.output_gate,
        }
    }

    pub fn get_mut(&mut self, gate: Gate) -> &mut B {
        match gate {
            Gate::InputValue => &mut self.input_value,
            Gate::InputGate => &mut self.input_gate,
            Gate::ForgetGate => &mut self.forget_gate,
            Gate::OutputGate => &mut self.output_gate,
        }
    }
}

impl<T: Element> PerGate<Matrix<T>> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(|_| Matrix::zeros(rows, cols))
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        for gate in Gate::ALL {
            self.get_mut(gate).resize(rows, cols);
        }
    }
}
