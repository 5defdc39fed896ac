//! Magnetising-field sweep generation.

use ndarray::Array1;

use crate::error::ModelError;

/// Generate `points` field samples linearly spaced over $[-H_{max}, H_{max}]$.
///
/// $H_i = -H_{max} + 2 H_{max} i / (N - 1)$, evaluated as
/// $H_{max} \cdot (2i - (N-1)) / (N-1)$ so that the endpoints are exactly
/// $\mp H_{max}$ and $H_i = -H_{N-1-i}$ holds bit-for-bit.
///
/// # Errors
/// [`ModelError::InvalidParameter`] when `points < 2` or `h_max` is not a
/// finite positive number. Nothing is allocated in that case.
pub fn field_sweep(h_max: f64, points: usize) -> Result<Array1<f64>, ModelError> {
    if points < 2 {
        return Err(ModelError::invalid("N", points as f64, "at least 2 samples"));
    }
    if !h_max.is_finite() || h_max <= 0.0 {
        return Err(ModelError::invalid("Hmax", h_max, "must be finite and positive"));
    }

    let span = (points - 1) as f64;
    Ok(Array1::from_shape_fn(points, |i| {
        let steps = 2.0 * i as f64 - span;
        h_max * (steps / span)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_endpoints_and_length() {
        let h = field_sweep(100.0, 101).unwrap();
        assert_eq!(h.len(), 101);
        assert_eq!(h[0], -100.0);
        assert_eq!(h[100], 100.0);
        assert_eq!(h[50], 0.0);
        assert!((h[1] - (-98.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_is_symmetric() {
        let h = field_sweep(37.3, 64).unwrap();
        let n = h.len();
        for i in 0..n {
            assert_eq!(h[i], -h[n - 1 - i], "asymmetry at index {}", i);
        }
    }

    #[test]
    fn test_two_points() {
        let h = field_sweep(5.0, 2).unwrap();
        assert_eq!(h.to_vec(), vec![-5.0, 5.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            field_sweep(100.0, 1),
            Err(ModelError::InvalidParameter { name: "N", .. })
        ));
        assert!(matches!(
            field_sweep(100.0, 0),
            Err(ModelError::InvalidParameter { name: "N", .. })
        ));
        assert!(matches!(
            field_sweep(0.0, 10),
            Err(ModelError::InvalidParameter { name: "Hmax", .. })
        ));
        assert!(matches!(
            field_sweep(f64::INFINITY, 10),
            Err(ModelError::InvalidParameter { name: "Hmax", .. })
        ));
    }
}
