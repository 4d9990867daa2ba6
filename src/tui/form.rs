//! Applicant form fields: labels, display values, arrow-key steps and text entry.

use crate::domain::{bounds, Applicant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Income,
    HomeOwnership,
    EmpLength,
    LoanIntent,
    LoanAmount,
    InterestRate,
    PriorDefault,
    CreditHistory,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Age,
        Field::Income,
        Field::HomeOwnership,
        Field::EmpLength,
        Field::LoanIntent,
        Field::LoanAmount,
        Field::InterestRate,
        Field::PriorDefault,
        Field::CreditHistory,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Income => "Annual income ($)",
            Field::HomeOwnership => "Home ownership",
            Field::EmpLength => "Employment length (yrs)",
            Field::LoanIntent => "Loan intent",
            Field::LoanAmount => "Loan amount ($)",
            Field::InterestRate => "Interest rate (%)",
            Field::PriorDefault => "Prior default on file",
            Field::CreditHistory => "Credit history (yrs)",
        }
    }

    /// Numeric fields accept typed values; the rest only cycle.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Field::HomeOwnership | Field::LoanIntent | Field::PriorDefault)
    }

    pub fn value(self, a: &Applicant) -> String {
        match self {
            Field::Age => a.age.to_string(),
            Field::Income => format!("{:.0}", a.income),
            Field::HomeOwnership => a.home_ownership.as_str().to_string(),
            Field::EmpLength => format!("{:.1}", a.emp_length),
            Field::LoanIntent => a.loan_intent.as_str().to_string(),
            Field::LoanAmount => format!("{:.0}", a.loan_amount),
            Field::InterestRate => format!("{:.2}", a.interest_rate),
            Field::PriorDefault => a.prior_default_flag().to_string(),
            Field::CreditHistory => a.credit_history_years.to_string(),
        }
    }

    /// Step a field left/right, staying inside the form bounds.
    pub fn adjust(self, a: &mut Applicant, delta: i32) {
        let d = delta as f64;
        match self {
            Field::Age => {
                let (lo, hi) = bounds::AGE;
                a.age = (a.age as i64 + delta as i64).clamp(lo as i64, hi as i64) as u32;
            }
            Field::Income => a.income = (a.income + 500.0 * d).max(bounds::MIN_INCOME),
            Field::HomeOwnership => a.home_ownership = a.home_ownership.cycle(delta),
            Field::EmpLength => {
                let (lo, hi) = bounds::EMP_LENGTH;
                a.emp_length = (a.emp_length + 0.5 * d).clamp(lo, hi);
            }
            Field::LoanIntent => a.loan_intent = a.loan_intent.cycle(delta),
            Field::LoanAmount => a.loan_amount = (a.loan_amount + 500.0 * d).max(bounds::MIN_LOAN_AMOUNT),
            Field::InterestRate => {
                let (lo, hi) = bounds::INTEREST_RATE;
                let next = ((a.interest_rate + 0.25 * d) * 100.0).round() / 100.0;
                a.interest_rate = next.clamp(lo, hi);
            }
            Field::PriorDefault => a.prior_default = !a.prior_default,
            Field::CreditHistory => {
                let (lo, hi) = bounds::CREDIT_HISTORY;
                a.credit_history_years = (a.credit_history_years as i64 + delta as i64).clamp(lo as i64, hi as i64) as u32;
            }
        }
    }

    /// Apply typed text to a copy of the applicant; out-of-bounds values are rejected.
    pub fn apply_text(self, a: &Applicant, text: &str) -> Result<Applicant, String> {
        let text = text.trim();
        let mut next = a.clone();

        let number = || -> Result<f64, String> {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("'{text}' is not a number."))
        };
        let whole = || -> Result<u32, String> {
            text.parse::<u32>()
                .map_err(|_| format!("'{text}' is not a whole number."))
        };

        match self {
            Field::Age => next.age = whole()?,
            Field::Income => next.income = number()?,
            Field::EmpLength => next.emp_length = number()?,
            Field::LoanAmount => next.loan_amount = number()?,
            Field::InterestRate => next.interest_rate = number()?,
            Field::CreditHistory => next.credit_history_years = whole()?,
            Field::HomeOwnership | Field::LoanIntent | Field::PriorDefault => {
                return Err(format!("{} is not a typed field.", self.label()));
            }
        }

        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HomeOwnership, LoanIntent};

    #[test]
    fn arrows_stay_within_bounds() {
        let mut a = Applicant {
            age: 100,
            credit_history_years: 2,
            interest_rate: 24.9,
            ..Applicant::default()
        };
        Field::Age.adjust(&mut a, 1);
        Field::CreditHistory.adjust(&mut a, -1);
        Field::InterestRate.adjust(&mut a, 1);
        assert_eq!(a.age, 100);
        assert_eq!(a.credit_history_years, 2);
        assert_eq!(a.interest_rate, 25.0);

        a.loan_amount = 500.0;
        Field::LoanAmount.adjust(&mut a, -1);
        assert_eq!(a.loan_amount, 500.0);
    }

    #[test]
    fn choice_fields_cycle() {
        let mut a = Applicant::default();
        Field::HomeOwnership.adjust(&mut a, 1);
        assert_eq!(a.home_ownership, HomeOwnership::Own);
        Field::LoanIntent.adjust(&mut a, -1);
        assert_eq!(a.loan_intent, LoanIntent::DebtConsolidation);
        Field::PriorDefault.adjust(&mut a, 1);
        assert!(a.prior_default);
    }

    #[test]
    fn typed_values_are_validated() {
        let a = Applicant::default();
        assert_eq!(Field::Income.apply_text(&a, "72000").unwrap().income, 72_000.0);
        assert_eq!(Field::InterestRate.apply_text(&a, " 13.37 ").unwrap().interest_rate, 13.37);
        assert!(Field::Age.apply_text(&a, "150").unwrap_err().contains("age"));
        assert!(Field::Age.apply_text(&a, "30.5").is_err());
        assert!(Field::LoanAmount.apply_text(&a, "abc").unwrap_err().contains("not a number"));
        assert!(Field::HomeOwnership.apply_text(&a, "OWN").is_err());
    }
}
