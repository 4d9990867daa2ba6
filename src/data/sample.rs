//! Seeded synthetic applicant tables.
//!
//! Every generated applicant passes `Applicant::validate`, so a sample file can
//! be scored directly with `risk batch`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{bounds, Applicant, HomeOwnership, LoanIntent};
use crate::error::AppError;

/// Rough population mix for home ownership (RENT, MORTGAGE, OWN, OTHER).
const HOME_WEIGHTS: [(HomeOwnership, f64); 4] = [
    (HomeOwnership::Rent, 0.50),
    (HomeOwnership::Mortgage, 0.41),
    (HomeOwnership::Own, 0.08),
    (HomeOwnership::Other, 0.01),
];

const PRIOR_DEFAULT_RATE: f64 = 0.18;

#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self { count: 100, seed: 42 }
    }
}

pub fn generate_applicants(config: &SampleConfig) -> Result<Vec<Applicant>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let age_dist = Normal::<f64>::new(32.0, 9.0).map_err(|e| AppError::new(4, format!("Age distribution error: {e}")))?;
    let income_dist = LogNormal::new(55_000f64.ln(), 0.55)
        .map_err(|e| AppError::new(4, format!("Income distribution error: {e}")))?;
    let emp_dist = Normal::<f64>::new(5.0, 4.0).map_err(|e| AppError::new(4, format!("Employment distribution error: {e}")))?;
    let rate_dist = Normal::<f64>::new(11.0, 3.2).map_err(|e| AppError::new(4, format!("Rate distribution error: {e}")))?;

    let mut out = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let (age_lo, age_hi) = bounds::AGE;
        let age = (age_dist.sample(&mut rng).round() as i64).clamp(age_lo as i64, age_hi as i64) as u32;

        let income = round_step(income_dist.sample(&mut rng).clamp(4_000.0, 2_000_000.0), 500.0);

        let (emp_lo, emp_hi) = bounds::EMP_LENGTH;
        let max_emp = (age as f64 - 16.0).clamp(emp_lo, emp_hi);
        let emp_length = round_step(emp_dist.sample(&mut rng).clamp(emp_lo, max_emp), 0.5);

        let ratio: f64 = rng.gen_range(0.03..0.55);
        let loan_amount = round_step(income * ratio, 500.0).max(bounds::MIN_LOAN_AMOUNT);

        let (rate_lo, rate_hi) = bounds::INTEREST_RATE;
        let interest_rate = (rate_dist.sample(&mut rng).clamp(rate_lo, rate_hi) * 100.0).round() / 100.0;

        let (hist_lo, hist_hi) = bounds::CREDIT_HISTORY;
        let max_hist = (age.saturating_sub(18)).clamp(hist_lo, hist_hi);
        let credit_history_years = rng.gen_range(hist_lo..=max_hist);

        out.push(Applicant {
            age,
            income,
            home_ownership: pick_home(&mut rng),
            emp_length,
            loan_intent: LoanIntent::ALL[rng.gen_range(0..LoanIntent::ALL.len())],
            loan_amount,
            interest_rate,
            prior_default: rng.gen_bool(PRIOR_DEFAULT_RATE),
            credit_history_years,
        });
    }

    Ok(out)
}

fn pick_home(rng: &mut StdRng) -> HomeOwnership {
    let roll: f64 = rng.r#gen();
    let mut acc = 0.0;
    for (home, weight) in HOME_WEIGHTS {
        acc += weight;
        if roll < acc {
            return home;
        }
    }
    HomeOwnership::Rent
}

fn round_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}
