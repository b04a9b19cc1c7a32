//! Scalar activation math and flat elementwise primitives shared by the
//! forward and backward passes.

use crate::api::element::Element;

#[inline]
pub fn sigmoid<T: Element>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Sigmoid derivative expressed in terms of the sigmoid's own output.
#[inline]
pub fn sigmoid_diff<T: Element>(y: T) -> T {
    y * (T::one() - y)
}

/// Numerically stable tanh: for |x| >= 5 the exponential form would overflow
/// down the line, and tanh is already saturated, so return the sign exactly.
#[inline]
pub fn tanh<T: Element>(x: T) -> T {
    if x.abs() < T::from_f64(5.0) {
        let exp2x = (x + x).exp();
        (exp2x - T::one()) / (exp2x + T::one())
    } else if x > T::zero() {
        T::one()
    } else {
        -T::one()
    }
}

/// Tanh derivative expressed in terms of the tanh's own output.
#[inline]
pub fn tanh_diff<T: Element>(y: T) -> T {
    T::one() - y * y
}

/// out = a .* b
pub fn mul<T: Element>(a: &[T], b: &[T], out: &mut [T]) {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), out.len());
    for i in 0..out.len() {
        out[i] = a[i] * b[i];
    }
}

/// out .*= a
pub fn mul_assign<T: Element>(out: &mut [T], a: &[T]) {
    debug_assert_eq!(a.len(), out.len());
    for i in 0..out.len() {
        out[i] = out[i] * a[i];
    }
}

/// out .+= a
pub fn add_assign<T: Element>(out: &mut [T], a: &[T]) {
    debug_assert_eq!(a.len(), out.len());
    for i in 0..out.len() {
        out[i] = out[i] + a[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_bounds() {
        // Beyond |x| ~ 36 the f64 sigmoid saturates to exactly 0 or 1.
        for &x in &[-30.0f64, -5.0, -1.0, 0.0, 1.0, 5.0, 30.0] {
            let s = sigmoid(x);
            assert!(s > 0.0 && s < 1.0, "sigmoid({x}) = {s} out of (0,1)");
        }
        assert!((sigmoid(0.0f64) - 0.5).abs() < 1e-15);
        assert!((sigmoid(1.0f64) - 0.7310585786300049).abs() < 1e-12);
    }

    #[test]
    fn test_tanh_matches_std_inside_stable_range() {
        for i in -49..=49 {
            let x = i as f64 * 0.1;
            assert!(
                (tanh(x) - x.tanh()).abs() < 1e-12,
                "tanh({x}) diverges from std"
            );
        }
    }

    #[test]
    fn test_tanh_saturation_branch_is_exact() {
        for &x in &[5.0f64, 7.5, 100.0, 1e300] {
            assert_eq!(tanh(x), 1.0);
            assert_eq!(tanh(-x), -1.0);
        }
        assert_eq!(tanh(5.0f32), 1.0);
        assert_eq!(tanh(-5.0f32), -1.0);
    }

    #[test]
    fn test_tanh_bounds() {
        for i in -200..=200 {
            let t = tanh(i as f64 * 0.25);
            assert!((-1.0..=1.0).contains(&t));
        }
    }

    #[test]
    fn test_diff_forms() {
        // Derivatives are written in terms of the activation output.
        let x = 0.3f64;
        let s = sigmoid(x);
        let analytic = sigmoid_diff(s);
        let eps = 1e-6;
        let numeric = (sigmoid(x + eps) - sigmoid(x - eps)) / (2.0 * eps);
        assert!((analytic - numeric).abs() < 1e-8);

        let t = tanh(x);
        let analytic = tanh_diff(t);
        let numeric = (tanh(x + eps) - tanh(x - eps)) / (2.0 * eps);
        assert!((analytic - numeric).abs() < 1e-8);
    }

    #[test]
    fn test_elementwise_primitives() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [4.0f32, 5.0, 6.0];
        let mut out = [0.0f32; 3];
        mul(&a, &b, &mut out);
        assert_eq!(out, [4.0, 10.0, 18.0]);
        add_assign(&mut out, &a);
        assert_eq!(out, [5.0, 12.0, 21.0]);
        mul_assign(&mut out, &b);
        assert_eq!(out, [20.0, 60.0, 126.0]);
    }
}
