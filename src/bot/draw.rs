use rand::Rng;
use rand_distr::{Distribution, Normal};

/* Score draw policies.
 * A draw turns a play into a raw score for the leaderboard engine.
 * The engine only consumes the number, so the distribution is swappable.
 */

pub const SCHMEE_MEAN_DEFAULT: f64 = 5.0;
pub const SCHMEE_SPREAD_DEFAULT: f64 = 10.0;

pub trait ScoreDraw: Send + Sync {
    fn draw(&self) -> u64;
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DrawError {
    #[error("Invalid draw parameters: mean {mean}, spread {spread}")]
    InvalidParameters { mean: f64, spread: f64 },
}

// Absolute value of a normal sample, truncated toward zero.
#[derive(Debug, Clone)]
pub struct NormalDraw {
    normal: Normal<f64>,
}

impl NormalDraw {
    pub fn new(mean: f64, spread: f64) -> Result<NormalDraw, DrawError> {
        // Normal::new accepts a negative std_dev, which would mirror the distribution.
        if !mean.is_finite() || !spread.is_finite() || spread < 0.0 {
            return Err(DrawError::InvalidParameters { mean, spread });
        }
        let normal =
            Normal::new(mean, spread).map_err(|_| DrawError::InvalidParameters { mean, spread })?;
        Ok(NormalDraw { normal })
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        score_from_sample(self.normal.sample(rng))
    }
}

impl ScoreDraw for NormalDraw {
    fn draw(&self) -> u64 {
        self.sample_with(&mut rand::rng())
    }
}

fn score_from_sample(sample: f64) -> u64 {
    // Saturating cast; NaN maps to 0.
    sample.trunc().abs() as u64
}

// Always draws the same score.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub u64);

impl ScoreDraw for FixedDraw {
    fn draw(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_score_from_sample_truncates_toward_zero() {
        assert_eq!(score_from_sample(7.9), 7);
        assert_eq!(score_from_sample(-7.9), 7);
        assert_eq!(score_from_sample(-0.4), 0);
        assert_eq!(score_from_sample(f64::NAN), 0);
    }

    #[test]
    fn test_normal_draw_rejects_bad_spread() {
        assert!(NormalDraw::new(5.0, -1.0).is_err());
        assert!(NormalDraw::new(5.0, f64::INFINITY).is_err());
        assert!(NormalDraw::new(f64::NAN, 1.0).is_err());
        assert!(NormalDraw::new(5.0, f64::NAN).is_err());
        assert_eq!(
            NormalDraw::new(5.0, -4.0).unwrap_err(),
            DrawError::InvalidParameters {
                mean: 5.0,
                spread: -4.0
            }
        );
    }

    #[test]
    fn test_zero_spread_draws_mean() {
        let draw = NormalDraw::new(-12.0, 0.0).unwrap();
        assert_eq!(draw.draw(), 12);
    }

    #[test]
    fn test_seeded_draws_are_reasonable() {
        let draw = NormalDraw::new(SCHMEE_MEAN_DEFAULT, SCHMEE_SPREAD_DEFAULT).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<u64> = (0..1000).map(|_| draw.sample_with(&mut rng)).collect();

        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        // |N(5, 10)| has a mean of roughly 9.
        assert!(mean > 6.0 && mean < 12.0, "mean was {mean}");
        assert!(samples.iter().any(|&s| s == 0 || s > 20));
    }

    #[test]
    fn test_fixed_draw() {
        assert_eq!(FixedDraw(3).draw(), 3);
    }
}
