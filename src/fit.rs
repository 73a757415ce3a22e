use crate::sample::Sample;
use crate::selection::Selection;
use crate::stats::{pearson_correlation, r2_from_predictions, rmse, LinReg};

use statrs::distribution::{ContinuousCDF, StudentsT};

use std::fmt;

#[derive(Debug)]
pub enum FitError {
    LengthMismatch { len_x: usize, len_y: usize },
    NotEnoughPoints { len: usize, needed: usize },
    DegenerateX,
    NonFiniteSigma,
    StatError(&'static str),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::LengthMismatch { len_x, len_y } => {
                write!(f, "x and y have different lengths: {len_x} vs {len_y}")
            },
            FitError::NotEnoughPoints { len, needed } => {
                write!(f, "not enough points: got {len}, need at least {needed}")
            },
            FitError::DegenerateX => {
                write!(f, "degenerate x: no variance in x")
            },
            FitError::NonFiniteSigma => {
                write!(f, "non-finite sigma during fit")
            },
            FitError::StatError(msg) => write!(f, "statistical error: {msg}"),
        }
    }
}

impl std::error::Error for FitError {}

pub type FitResult<T> = Result<T, FitError>;

/// Least-squares line over one selected sub-range of a sample's curve.
#[derive(Clone, Debug)]
pub struct StiffnessFit {
    pub model: LinReg,
    pub r: f64,
    pub r2: f64,
    pub sigma: f64,
    pub se_slope: f64,
    pub se_intercept: f64,
    pub p_value: f64,
    pub rmse: f64,
    pub n: usize,
    pub selection: Selection,
}

impl fmt::Display for StiffnessFit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "slope: {:.4}, intercept: {:.4}, r2: {:.4}, n: {}",
            self.model.slope, self.model.intercept, self.r2, self.n
        )
    }
}

impl StiffnessFit {
    pub fn from_selection(sample: &Sample, selection: Selection) -> FitResult<Self> {
        let x = selection.slice(&sample.deflection);
        let y = selection.slice(&sample.force);
        Self::from_xy(x, y, selection)
    }

    pub fn from_xy(x: &[f64], y: &[f64], selection: Selection) -> FitResult<Self> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch { len_x: x.len(), len_y: y.len() });
        }
        if x.len() < 2 {
            return Err(FitError::NotEnoughPoints { len: x.len(), needed: 2 });
        }

        let n = x.len() as f64;

        let x_mean = x.iter().copied().sum::<f64>() / n;
        let ss_xx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();

        // no variance in x, no meaningful regression
        if !ss_xx.is_finite() || ss_xx <= f64::EPSILON {
            return Err(FitError::DegenerateX);
        }

        let model = LinReg::train(x, y);

        let y_hat: Vec<f64> = x.iter().map(|&xi| model.calculate(xi)).collect();
        let residuals: Vec<f64> = y.iter().zip(&y_hat).map(|(&yi, &yhi)| yi - yhi).collect();
        let rss: f64 = residuals.iter().map(|r| r.powi(2)).sum();

        let rmse_val = rmse(y, &y_hat).unwrap_or(0.0);

        // with exactly two points the residual degrees of freedom are zero,
        // the line is exact and the error estimates collapse to zero
        let (sigma, se_slope, se_intercept, p_value) = if x.len() == 2 {
            (0.0, 0.0, 0.0, f64::NAN)
        } else {
            let sigma = (rss / (n - 2.0)).sqrt();
            if !sigma.is_finite() {
                return Err(FitError::NonFiniteSigma);
            }

            let se_slope = sigma / ss_xx.sqrt();
            let se_intercept = sigma * (1.0 / n + x_mean.powi(2) / ss_xx).sqrt();

            let p_value = if se_slope > 0.0 {
                let t_stat = model.slope / se_slope;
                let dist = StudentsT::new(0.0, 1.0, n - 2.0)
                    .map_err(|_| FitError::StatError("failed to construct StudentsT"))?;
                2.0 * (1.0 - dist.cdf(t_stat.abs()))
            } else if model.slope != 0.0 {
                // exact fit on a sloped line
                0.0
            } else {
                1.0
            };

            (sigma, se_slope, se_intercept, p_value)
        };

        let r = pearson_correlation(x, y).unwrap_or(0.0);
        let r2 = r2_from_predictions(y, &y_hat).unwrap_or(0.0);

        Ok(Self {
            model,
            r,
            r2,
            sigma,
            se_slope,
            se_intercept,
            p_value,
            rmse: rmse_val,
            n: x.len(),
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FitError, StiffnessFit};
    use crate::selection::Selection;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sel(n: usize) -> Selection {
        Selection { start_idx: 0, end_idx: n }
    }

    #[test]
    fn test_exact_line() {
        let x = [0.0, 0.5, 1.0, 1.5, 2.0];
        let y: Vec<f64> = x.iter().map(|xi| 3.0 * xi + 0.25).collect();

        let fit = StiffnessFit::from_xy(&x, &y, sel(x.len())).unwrap();
        assert!((fit.model.slope - 3.0).abs() < 1e-12);
        assert!((fit.model.intercept - 0.25).abs() < 1e-12);
        assert!((fit.r2 - 1.0).abs() < 1e-12);
        assert!(fit.sigma < 1e-9);
        assert!(fit.p_value < 1e-9);
    }

    #[test]
    fn test_noisy_line_recovers_parameters() {
        let mut rng = StdRng::seed_from_u64(42);
        let slope = 812.5;
        let intercept = -4.2;

        let x: Vec<f64> = (0..200).map(|i| i as f64 * 0.01).collect();
        let y: Vec<f64> =
            x.iter().map(|xi| slope * xi + intercept + rng.random_range(-0.5..0.5)).collect();

        let fit = StiffnessFit::from_xy(&x, &y, sel(x.len())).unwrap();
        assert!((fit.model.slope - slope).abs() < 1.0, "slope {} too far off", fit.model.slope);
        assert!((fit.model.intercept - intercept).abs() < 1.0);
        assert!(fit.r2 > 0.999);
        assert!(fit.r > 0.999);
        assert!(fit.se_slope > 0.0);
        assert!(fit.se_intercept > 0.0);
        assert!(fit.p_value < 1e-6);
    }

    #[test]
    fn test_two_points_is_exact() {
        let x = [1.0, 2.0];
        let y = [10.0, 30.0];

        let fit = StiffnessFit::from_xy(&x, &y, sel(2)).unwrap();
        assert!((fit.model.slope - 20.0).abs() < 1e-12);
        assert!((fit.model.intercept + 10.0).abs() < 1e-12);
        assert_eq!(fit.sigma, 0.0);
        assert_eq!(fit.se_slope, 0.0);
        assert!(fit.p_value.is_nan());
    }

    #[test]
    fn test_single_point_rejected() {
        let err = StiffnessFit::from_xy(&[1.0], &[2.0], sel(1)).unwrap_err();
        assert!(matches!(err, FitError::NotEnoughPoints { len: 1, needed: 2 }));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = StiffnessFit::from_xy(&[1.0, 2.0], &[2.0], sel(2)).unwrap_err();
        assert!(matches!(err, FitError::LengthMismatch { .. }));
    }

    #[test]
    fn test_degenerate_x_rejected() {
        let err = StiffnessFit::from_xy(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0], sel(3)).unwrap_err();
        assert!(matches!(err, FitError::DegenerateX));
    }

    #[test]
    fn test_descending_curve_has_negative_r() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [9.0, 7.1, 4.9, 3.0];

        let fit = StiffnessFit::from_xy(&x, &y, sel(4)).unwrap();
        assert!(fit.model.slope < 0.0);
        assert!(fit.r < -0.99);
        assert!(fit.r2 > 0.99);
    }
}
