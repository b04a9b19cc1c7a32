use std::time::Instant;

use crate::api::element::Element;
use crate::api::error::{CellError, CellResult};
use crate::api::filler::Filler;
use crate::api::matrix::Matrix;
use crate::core::gates::{Gate, PerGate};
use crate::core::math;

/// Configuration for [`LstmCell::setup`]: dimensions plus one weight filler
/// per gate. Setup fails if any filler is left unset.
pub struct CellConfig<T: Element> {
    pub channels: usize,
    pub input_size: usize,
    pub fillers: PerGate<Option<Box<dyn Filler<T>>>>,
}

impl<T: Element> CellConfig<T> {
    pub fn new(channels: usize, input_size: usize) -> Self {
        Self {
            channels,
            input_size,
            fillers: PerGate::from_fn(|_| None),
        }
    }

    pub fn filler(mut self, gate: Gate, filler: Box<dyn Filler<T>>) -> Self {
        *self.fillers.get_mut(gate) = Some(filler);
        self
    }
}

/// Gradients produced by one [`LstmCell::backward`] call. Every buffer is
/// freshly zeroed and written from scratch; nothing accumulates across calls.
#[derive(Debug)]
pub struct CellGradients<T> {
    /// batch x input_size
    pub input: Matrix<T>,
    /// batch x channels
    pub prev_memory: Matrix<T>,
    /// channels x input_size each
    pub weights: PerGate<Matrix<T>>,
}

/// One timestep of an LSTM cell.
///
/// Forward: four bias-free gate projections of the input
/// (`proj = input * W_gate^T`), sigmoid/tanh activation in place, then
///
/// ```text
/// next_memory = prev_memory * forget_gate + input_gate * input_value
/// next_hidden = next_memory * output_gate
/// ```
///
/// Backward consumes the activated gate buffers cached by the immediately
/// preceding forward call, so a backward must always be paired with the
/// matching forward. Weights are read-only here; an external optimizer
/// mutates them between calls through [`LstmCell::weight_mut`].
pub struct LstmCell<T: Element> {
    channels: usize,
    input_size: usize,
    batch: usize,
    /// channels x input_size per gate, allocated once at setup.
    weights: PerGate<Matrix<T>>,
    /// Post-activation gate values, batch x channels per gate. Written by
    /// forward, read by the paired backward.
    gates: PerGate<Matrix<T>>,
    /// Local activation derivatives, recomputed every backward.
    gate_diffs: PerGate<Matrix<T>>,
    /// Combined upstream gradient on the memory state.
    total_state_diff: Matrix<T>,
    /// One gate's elementwise contribution, reused four times per backward.
    gate_contrib: Matrix<T>,
    /// Forward operands and output retained for the backward pass.
    input: Matrix<T>,
    prev_memory: Matrix<T>,
    next_memory: Matrix<T>,
    has_forward: bool,
}

impl<T: Element> LstmCell<T> {
    /// Validates the configuration, allocates the four weight buffers and
    /// fills each with its configured filler.
    pub fn setup(config: CellConfig<T>) -> CellResult<Self> {
        if config.channels == 0 {
            return Err(CellError::InvalidConfig("channels must be > 0".into()));
        }
        if config.input_size == 0 {
            return Err(CellError::InvalidConfig("input_size must be > 0".into()));
        }

        let mut weights = PerGate::<Matrix<T>>::zeros(config.channels, config.input_size);
        for gate in Gate::ALL {
            let filler = config.fillers.get(gate).as_ref().ok_or_else(|| {
                CellError::InvalidConfig(format!("missing weight filler for {gate}"))
            })?;
            filler.fill(weights.get_mut(gate));
        }

        log::debug!(
            "lstm cell setup: channels={} input_size={}",
            config.channels,
            config.input_size
        );

        Ok(Self {
            channels: config.channels,
            input_size: config.input_size,
            batch: 0,
            weights,
            gates: PerGate::zeros(0, config.channels),
            gate_diffs: PerGate::zeros(0, config.channels),
            total_state_diff: Matrix::zeros(0, config.channels),
            gate_contrib: Matrix::zeros(0, config.channels),
            input: Matrix::zeros(0, config.input_size),
            prev_memory: Matrix::zeros(0, config.channels),
            next_memory: Matrix::zeros(0, config.channels),
            has_forward: false,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn weight(&self, gate: Gate) -> &Matrix<T> {
        self.weights.get(gate)
    }

    /// Mutable weight access for the external optimizer. Must not be called
    /// between a forward and its paired backward.
    pub fn weight_mut(&mut self, gate: Gate) -> &mut Matrix<T> {
        self.weights.get_mut(gate)
    }

    /// Post-activation gate values of the last forward call.
    pub fn gate(&self, gate: Gate) -> &Matrix<T> {
        self.gates.get(gate)
    }

    /// Resize scratch for a new batch size, reusing allocations.
    fn reshape(&mut self, batch: usize) {
        if batch == self.batch {
            return;
        }
        self.batch = batch;
        self.gates.resize(batch, self.channels);
        self.gate_diffs.resize(batch, self.channels);
        self.total_state_diff.resize(batch, self.channels);
        self.gate_contrib.resize(batch, self.channels);
    }

    /// One forward step: `(input, prev_memory) -> (next_hidden, next_memory)`.
    ///
    /// Caches the activated gate buffers and operands for the paired
    /// backward call.
    pub fn forward(
        &mut self,
        input: &Matrix<T>,
        prev_memory: &Matrix<T>,
    ) -> CellResult<(Matrix<T>, Matrix<T>)> {
        let batch = input.rows();
        if batch == 0 {
            return Err(CellError::InvalidState("batch must be > 0".into()));
        }
        if input.cols() != self.input_size {
            return Err(CellError::ShapeMismatch {
                expected: vec![batch, self.input_size],
                got: vec![batch, input.cols()],
            });
        }
        if prev_memory.shape() != (batch, self.channels) {
            return Err(CellError::ShapeMismatch {
                expected: vec![batch, self.channels],
                got: vec![prev_memory.rows(), prev_memory.cols()],
            });
        }

        let start = Instant::now();
        self.reshape(batch);
        self.input.copy_from(input);
        self.prev_memory.copy_from(prev_memory);

        // The four projections are mutually independent: each one is a
        // bias-free gemm of the shared input against its own weight matrix,
        // activated in place. The projection buffer is repurposed to hold
        // the post-activation values; backward never needs pre-activations.
        let (m, n, k) = (batch, self.channels, self.input_size);
        let weights = &self.weights;
        let x = input.as_slice();
        let PerGate {
            input_value,
            input_gate,
            forget_gate,
            output_gate,
        } = &mut self.gates;

        rayon::join(
            || {
                rayon::join(
                    || project(m, n, k, x, &weights.input_value, &mut *input_value, math::tanh),
                    || project(m, n, k, x, &weights.input_gate, &mut *input_gate, math::sigmoid),
                )
            },
            || {
                rayon::join(
                    || project(m, n, k, x, &weights.forget_gate, &mut *forget_gate, math::sigmoid),
                    || project(m, n, k, x, &weights.output_gate, &mut *output_gate, math::sigmoid),
                )
            },
        );

        let mut next_memory = Matrix::zeros(batch, self.channels);
        let mut next_hidden = Matrix::zeros(batch, self.channels);
        {
            let prev = prev_memory.as_slice();
            let iv = input_value.as_slice();
            let ig = input_gate.as_slice();
            let fg = forget_gate.as_slice();
            let og = output_gate.as_slice();
            let mem = next_memory.as_mut_slice();
            let hid = next_hidden.as_mut_slice();
            for idx in 0..batch * self.channels {
                mem[idx] = prev[idx] * fg[idx] + ig[idx] * iv[idx];
                hid[idx] = mem[idx] * og[idx];
            }
        }

        self.next_memory.copy_from(&next_memory);
        self.has_forward = true;

        log::debug!(
            "[perf] lstm_cell::forward batch={} {:.3}ms",
            batch,
            start.elapsed().as_secs_f64() * 1e3
        );
        Ok((next_hidden, next_memory))
    }

    /// One backward step: gradients of the outputs in, gradients of every
    /// input and weight out.
    pub fn backward(
        &mut self,
        d_next_hidden: &Matrix<T>,
        d_next_memory: &Matrix<T>,
    ) -> CellResult<CellGradients<T>> {
        if !self.has_forward {
            return Err(CellError::InvalidState(
                "backward called without a matching forward".into(),
            ));
        }
        for grad in [d_next_hidden, d_next_memory] {
            if grad.shape() != (self.batch, self.channels) {
                return Err(CellError::ShapeMismatch {
                    expected: vec![self.batch, self.channels],
                    got: vec![grad.rows(), grad.cols()],
                });
            }
        }

        let start = Instant::now();
        let batch = self.batch;

        // Step 1: local activation derivatives, one buffer per gate,
        // independent of each other.
        {
            let PerGate {
                input_value,
                input_gate,
                forget_gate,
                output_gate,
            } = &mut self.gate_diffs;
            let gates = &self.gates;
            rayon::join(
                || {
                    rayon::join(
                        || local_diff(&gates.input_value, &mut *input_value, math::tanh_diff),
                        || local_diff(&gates.input_gate, &mut *input_gate, math::sigmoid_diff),
                    )
                },
                || {
                    rayon::join(
                        || local_diff(&gates.forget_gate, &mut *forget_gate, math::sigmoid_diff),
                        || local_diff(&gates.output_gate, &mut *output_gate, math::sigmoid_diff),
                    )
                },
            );
        }

        // Step 2: total state gradient. The hidden-path gradient is scaled
        // by the output gate; the memory-path gradient arrives as-is.
        math::mul(
            d_next_hidden.as_slice(),
            self.gates.output_gate.as_slice(),
            self.total_state_diff.as_mut_slice(),
        );
        math::add_assign(self.total_state_diff.as_mut_slice(), d_next_memory.as_slice());

        let mut grads = CellGradients {
            input: Matrix::zeros(batch, self.input_size),
            prev_memory: Matrix::zeros(batch, self.channels),
            weights: PerGate::zeros(self.channels, self.input_size),
        };

        // Step 3: the memory state propagates backward through the forget
        // gate only.
        math::mul(
            self.total_state_diff.as_slice(),
            self.gates.forget_gate.as_slice(),
            grads.prev_memory.as_mut_slice(),
        );

        // Step 4: per-gate contributions. Each gate's elementwise local
        // gradient lands in the shared contribution scratch, then two gemms
        // route it to the weight gradient (fresh) and the input gradient
        // (accumulated across all four gates, since the same input feeds
        // every projection).
        let tot = self.total_state_diff.as_slice();
        for gate in Gate::ALL {
            {
                let contrib = self.gate_contrib.as_mut_slice();
                match gate {
                    Gate::InputValue => {
                        // total * input_gate * d_tanh(input_value)
                        math::mul(
                            self.gates.input_gate.as_slice(),
                            self.gate_diffs.input_value.as_slice(),
                            contrib,
                        );
                        math::mul_assign(contrib, tot);
                    }
                    Gate::InputGate => {
                        // total * d_sigmoid(input_gate) * input_value
                        math::mul(
                            self.gate_diffs.input_gate.as_slice(),
                            self.gates.input_value.as_slice(),
                            contrib,
                        );
                        math::mul_assign(contrib, tot);
                    }
                    Gate::ForgetGate => {
                        // total * d_sigmoid(forget_gate) * prev_memory
                        math::mul(
                            self.gate_diffs.forget_gate.as_slice(),
                            self.prev_memory.as_slice(),
                            contrib,
                        );
                        math::mul_assign(contrib, tot);
                    }
                    Gate::OutputGate => {
                        // d(next_hidden) * d_sigmoid(output_gate) * next_memory.
                        // The output gate never touches the carried memory, so
                        // its gradient comes from the hidden path alone.
                        math::mul(
                            self.gate_diffs.output_gate.as_slice(),
                            self.next_memory.as_slice(),
                            contrib,
                        );
                        math::mul_assign(contrib, d_next_hidden.as_slice());
                    }
                }
            }

            let contrib = self.gate_contrib.as_slice();
            // weight_grad = contrib^T * input
            T::gemm(
                true,
                false,
                self.channels,
                self.input_size,
                batch,
                T::one(),
                contrib,
                self.input.as_slice(),
                T::zero(),
                grads.weights.get_mut(gate).as_mut_slice(),
            );
            // input_grad += contrib * weight
            T::gemm(
                false,
                false,
                batch,
                self.input_size,
                self.channels,
                T::one(),
                contrib,
                self.weights.get(gate).as_slice(),
                T::one(),
                grads.input.as_mut_slice(),
            );
        }

        log::debug!(
            "[perf] lstm_cell::backward batch={} {:.3}ms",
            batch,
            start.elapsed().as_secs_f64() * 1e3
        );
        Ok(grads)
    }
}

/// Project one gate (`out = input * weight^T`, m x n) and activate in place.
fn project<T: Element>(
    m: usize,
    n: usize,
    k: usize,
    input: &[T],
    weight: &Matrix<T>,
    out: &mut Matrix<T>,
    activate: fn(T) -> T,
) {
    T::gemm(
        false,
        true,
        m,
        n,
        k,
        T::one(),
        input,
        weight.as_slice(),
        T::zero(),
        out.as_mut_slice(),
    );
    for v in out.as_mut_slice() {
        *v = activate(*v);
    }
}

/// Elementwise local derivative of one gate, written from its activated
/// output values.
fn local_diff<T: Element>(gate: &Matrix<T>, diff: &mut Matrix<T>, d: fn(T) -> T) {
    let src = gate.as_slice();
    let dst = diff.as_mut_slice();
    for i in 0..dst.len() {
        dst[i] = d(src[i]);
    }
}
