use crate::api::element::Element;
use crate::api::matrix::Matrix;
use rand::Rng;

/// Weight-initialization strategy, invoked once per weight buffer at setup.
///
/// The cell treats fillers as opaque: `fill` overwrites the whole buffer.
pub trait Filler<T: Element>: Send + Sync {
    fn fill(&self, buffer: &mut Matrix<T>);
}

/// Fills every element with a fixed value.
pub struct ConstantFiller {
    value: f64,
}

impl ConstantFiller {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl<T: Element> Filler<T> for ConstantFiller {
    fn fill(&self, buffer: &mut Matrix<T>) {
        buffer.fill(T::from_f64(self.value));
    }
}

/// Uniform samples from `[min, max)`.
pub struct UniformFiller {
    min: f64,
    max: f64,
}

impl UniformFiller {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl<T: Element> Filler<T> for UniformFiller {
    fn fill(&self, buffer: &mut Matrix<T>) {
        let mut rng = rand::thread_rng();
        for v in buffer.as_mut_slice() {
            let u: f64 = rng.r#gen();
            *v = T::from_f64(self.min + u * (self.max - self.min));
        }
    }
}

/// Gaussian samples via Box-Muller.
pub struct GaussianFiller {
    mean: f64,
    std: f64,
}

impl GaussianFiller {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

impl<T: Element> Filler<T> for GaussianFiller {
    fn fill(&self, buffer: &mut Matrix<T>) {
        let mut rng = rand::thread_rng();
        for v in buffer.as_mut_slice() {
            let u1: f64 = rng.r#gen::<f64>().max(1e-12);
            let u2: f64 = rng.r#gen();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            *v = T::from_f64(self.mean + self.std * z);
        }
    }
}

/// Xavier uniform: scale = sqrt(6 / (fan_in + fan_out)), samples from
/// `[-scale, scale)`. fan_in is the buffer's column count, fan_out its rows.
pub struct XavierFiller;

impl<T: Element> Filler<T> for XavierFiller {
    fn fill(&self, buffer: &mut Matrix<T>) {
        let (rows, cols) = buffer.shape();
        let scale = (6.0 / (rows + cols) as f64).sqrt();
        let mut rng = rand::thread_rng();
        for v in buffer.as_mut_slice() {
            let u: f64 = rng.r#gen();
            *v = T::from_f64((2.0 * u - 1.0) * scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_filler() {
        let mut m = Matrix::<f32>::zeros(2, 3);
        ConstantFiller::new(0.25).fill(&mut m);
        assert!(m.as_slice().iter().all(|&v| v == 0.25));
    }

    #[test]
    fn test_uniform_filler_in_range() {
        let mut m = Matrix::<f64>::zeros(10, 10);
        UniformFiller::new(-0.5, 0.5).fill(&mut m);
        assert!(m.as_slice().iter().all(|&v| (-0.5..0.5).contains(&v)));
    }

    #[test]
    fn test_xavier_filler_in_range() {
        let mut m = Matrix::<f32>::zeros(8, 4);
        XavierFiller.fill(&mut m);
        let scale = (6.0f32 / 12.0).sqrt();
        assert!(m.as_slice().iter().all(|&v| v.abs() <= scale));
    }
}
