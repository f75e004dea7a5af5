//! Descriptive statistics and two-sample t-tests.
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use serde::Serialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Arithmetic mean of a sample
pub fn mean(values: &[f64]) -> AnalysisResult<f64> {
    ensure_or!(!values.is_empty(), NoData, "cannot take the mean of no values");
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (denominator `n - 1`)
pub fn sample_variance(values: &[f64]) -> AnalysisResult<f64> {
    ensure_or!(
        values.len() >= 2,
        InsufficientData,
        "variance needs at least 2 values, got {}",
        values.len()
    );
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Percentage change from `baseline` to `value`
pub fn percentage_change(baseline: f64, value: f64) -> AnalysisResult<f64> {
    ensure_or!(
        baseline != 0.0 && baseline.is_finite(),
        InsufficientData,
        "percentage change is undefined for a baseline of {baseline}"
    );

    Ok((value - baseline) / baseline * 100.0)
}

/// The flavour of two-sample t-test to run
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum TTestMethod {
    /// Student's t-test, assuming equal variances (pooled)
    #[default]
    #[string = "student"]
    Student,
    /// Welch's t-test, not assuming equal variances
    #[string = "welch"]
    Welch,
}

/// The outcome of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTestResult {
    /// The t statistic (positive when the first sample has the larger mean)
    pub t_statistic: f64,
    /// Degrees of freedom of the reference t distribution
    pub degrees_of_freedom: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Run a two-sided, two-sample t-test comparing the means of `a` and `b`.
///
/// Both samples need at least two values. If both samples have zero variance the statistic is
/// degenerate: identical means give `t = 0, p = 1` and different means give an infinite `t`
/// with `p = 0`.
pub fn two_sample_t_test(a: &[f64], b: &[f64], method: TTestMethod) -> AnalysisResult<TTestResult> {
    ensure_or!(
        a.len() >= 2 && b.len() >= 2,
        InsufficientData,
        "t-test needs at least 2 values in each sample (got {} and {})",
        a.len(),
        b.len()
    );

    let (n_a, n_b) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (mean(a)?, mean(b)?);
    let (var_a, var_b) = (sample_variance(a)?, sample_variance(b)?);

    let (std_err, degrees_of_freedom) = match method {
        TTestMethod::Student => {
            let dof = n_a + n_b - 2.0;
            let pooled = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / dof;
            ((pooled * (1.0 / n_a + 1.0 / n_b)).sqrt(), dof)
        }
        TTestMethod::Welch => {
            let (se_a, se_b) = (var_a / n_a, var_b / n_b);
            let dof = (se_a + se_b).powi(2)
                / (se_a.powi(2) / (n_a - 1.0) + se_b.powi(2) / (n_b - 1.0));
            ((se_a + se_b).sqrt(), dof)
        }
    };

    let diff = mean_a - mean_b;
    if std_err <= 0.0 {
        let (t_statistic, p_value) = if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        };
        return Ok(TTestResult {
            t_statistic,
            degrees_of_freedom: n_a + n_b - 2.0,
            p_value,
        });
    }

    let t_statistic = diff / std_err;
    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|err| {
        AnalysisError::InsufficientData(format!("cannot build t distribution: {err}"))
    })?;
    let p_value = (2.0 * dist.sf(t_statistic.abs())).min(1.0);

    Ok(TTestResult {
        t_statistic,
        degrees_of_freedom,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_mean() {
        assert_approx_eq!(f64, mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert!(matches!(mean(&[]), Err(AnalysisError::NoData(_))));
    }

    #[test]
    fn test_sample_variance() {
        assert_approx_eq!(f64, sample_variance(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 5.0 / 3.0);
        assert!(matches!(
            sample_variance(&[1.0]),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[rstest]
    #[case(300.0, 250.0, -16.666666666666668)]
    #[case(200.0, 220.0, 10.0)]
    #[case(100.0, 100.0, 0.0)]
    fn test_percentage_change(#[case] baseline: f64, #[case] value: f64, #[case] expected: f64) {
        assert_approx_eq!(
            f64,
            percentage_change(baseline, value).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_percentage_change_zero_baseline() {
        assert!(matches!(
            percentage_change(0.0, 10.0),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0], TTestMethod::Student, -5.0, 8.0, 0.0010528257933674)]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0], TTestMethod::Welch, -5.0, 8.0, 0.0010528257933674)]
    #[case(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0, 8.0], TTestMethod::Student, -1.872563351797078, 5.0, 0.1200176377420003)]
    #[case(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0, 8.0], TTestMethod::Welch, -2.1213203435596424, 4.075471698113207, 0.0999128643118901)]
    fn test_two_sample_t_test(
        #[case] a: &[f64],
        #[case] b: &[f64],
        #[case] method: TTestMethod,
        #[case] t_statistic: f64,
        #[case] dof: f64,
        #[case] p_value: f64,
    ) {
        let result = two_sample_t_test(a, b, method).unwrap();
        assert_approx_eq!(f64, result.t_statistic, t_statistic, epsilon = 1e-9);
        assert_approx_eq!(f64, result.degrees_of_freedom, dof, epsilon = 1e-9);
        assert_approx_eq!(f64, result.p_value, p_value, epsilon = 1e-6);
    }

    #[test]
    fn test_two_sample_t_test_symmetric() {
        let a = [310.0, 295.0, 300.0, 305.0];
        let b = [250.0, 240.0, 262.0];
        let ab = two_sample_t_test(&a, &b, TTestMethod::Student).unwrap();
        let ba = two_sample_t_test(&b, &a, TTestMethod::Student).unwrap();
        assert_approx_eq!(f64, ab.t_statistic, -ba.t_statistic);
        assert_approx_eq!(f64, ab.p_value, ba.p_value);
    }

    #[test]
    fn test_two_sample_t_test_zero_variance() {
        let same = two_sample_t_test(&[5.0, 5.0], &[5.0, 5.0, 5.0], TTestMethod::Welch).unwrap();
        assert_eq!((same.t_statistic, same.p_value), (0.0, 1.0));

        let different = two_sample_t_test(&[5.0, 5.0], &[3.0, 3.0], TTestMethod::Student).unwrap();
        assert_eq!(different.t_statistic, f64::INFINITY);
        assert_eq!(different.p_value, 0.0);
    }

    #[test]
    fn test_two_sample_t_test_too_few_values() {
        assert_eq!(
            two_sample_t_test(&[1.0], &[2.0, 3.0], TTestMethod::Student),
            Err(AnalysisError::InsufficientData(
                "t-test needs at least 2 values in each sample (got 1 and 2)".into()
            ))
        );
    }
}
