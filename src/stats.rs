#[derive(Clone, Copy, Debug)]
pub struct LinReg {
    pub intercept: f64,
    pub slope: f64,
}

impl Default for LinReg {
    fn default() -> Self {
        Self::new()
    }
}

impl LinReg {
    pub fn new() -> Self {
        Self { intercept: 0., slope: 0. }
    }
    pub fn calculate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
    pub fn from_val(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    pub fn train(x: &[f64], y: &[f64]) -> Self {
        assert!(x.len() == y.len(), "Input vectors x and y must have the same length");

        let avg_x: f64 = x.iter().sum::<f64>() / x.len() as f64;
        let x_differences_to_average: Vec<f64> = x.iter().map(|value| value - avg_x).collect();

        let x_differences_to_average_squared: Vec<f64> =
            x_differences_to_average.iter().map(|value| value.powi(2)).collect();

        let ss_xx: f64 = x_differences_to_average_squared.iter().sum();

        let avg_y = y.iter().sum::<f64>() / y.len() as f64;
        let y_differences_to_average: Vec<f64> = y.iter().map(|value| value - avg_y).collect();
        let x_and_y_differences_multiplied: Vec<f64> = x_differences_to_average
            .iter()
            .zip(y_differences_to_average.iter())
            .map(|(a, b)| a * b)
            .collect();
        let ss_xy: f64 = x_and_y_differences_multiplied.iter().sum();
        let slope = ss_xy / ss_xx;
        let intercept = avg_y - slope * avg_x;

        Self { intercept, slope }
    }
}

/// Signed Pearson r. Two points are a legal selection here, and the sign has
/// to agree with the slope in the exported table.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let n = x.len() as f64;

    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let numerator: f64 =
        x.iter().zip(y.iter()).map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y)).sum();

    let denominator_x: f64 = x.iter().map(|&xi| (xi - mean_x).powi(2)).sum();
    let denominator_y: f64 = y.iter().map(|&yi| (yi - mean_y).powi(2)).sum();

    let denominator = (denominator_x * denominator_y).sqrt();

    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub fn rmse(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() || y.is_empty() {
        return None;
    }

    let sum_sq: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();

    Some((sum_sq / y.len() as f64).sqrt())
}

pub fn r2_from_predictions(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() || y.len() < 2 {
        return None;
    }

    let y_mean = y.iter().sum::<f64>() / y.len() as f64;

    let ss_res: f64 = y.iter().zip(y_hat).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return None;
    }

    Some(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::{pearson_correlation, r2_from_predictions, LinReg};

    #[test]
    fn test_train_recovers_line() {
        let x = [0., 1., 2., 3., 4.];
        let y = [1., 3., 5., 7., 9.]; // y = 2x + 1

        let model = LinReg::train(&x, &y);
        assert!((model.slope - 2.0).abs() < 1e-12);
        assert!((model.intercept - 1.0).abs() < 1e-12);
        assert!((model.calculate(10.) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_length() {
        let x = [1., 2., 3., 4., 5., 6.];
        let y = [1., 2., 3., 4., 5.];

        assert_eq!(pearson_correlation(&x, &y), None);
    }
    #[test]
    fn test_pearsons_single_point() {
        let x = [1.];
        let y = [2.];

        assert_eq!(pearson_correlation(&x, &y), None);
    }
    #[test]
    fn test_pearsons_pos() {
        let x = [1., 2., 3., 4., 5.];
        let y = [1., 2., 3., 4., 5.];

        assert_eq!(pearson_correlation(&x, &y), Some(1.));
    }
    #[test]
    // signed r, a descending line is -1
    fn test_pearsons_neg() {
        let x = [1., 2., 3., 4., 5.];
        let y = [5., 4., 3., 2., 1.];

        assert_eq!(pearson_correlation(&x, &y), Some(-1.));
    }
    #[test]
    fn test_pearsons_constant_y() {
        let x = [1., 2., 3., 4., 5.];
        let y = [2., 2., 2., 2., 2.];

        assert_eq!(pearson_correlation(&x, &y), None);
    }
    #[test]
    fn test_pearsons_non_finite() {
        let x = [1., 2., f64::NAN];
        let y = [1., 2., 3.];

        assert_eq!(pearson_correlation(&x, &y), None);
    }

    #[test]
    fn test_r2_perfect_fit() {
        let y = [1., 2., 3.];
        let y_hat = [1., 2., 3.];

        assert_eq!(r2_from_predictions(&y, &y_hat), Some(1.0));
    }
}
