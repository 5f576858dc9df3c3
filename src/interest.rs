//! Interest projection for term deposit requests
use crate::request::TermMonths;

/// Which formula the projection uses. Two variants shipped at different
/// times; both are kept behind an explicit switch so stored records can
/// be reproduced either way. `CompoundEffective` is the canonical basis,
/// it is what the deposit forms quote (tasa E.A.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterestBasis {
    /// `interest = amount * rate * months / 12`
    Simple,
    /// Effective-annual compounding over the term converted to days:
    /// `interest = amount * ((1 + rate)^(days/365) - 1)`
    #[default]
    CompoundEffective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub estimated_interest: u64,
    pub maturity_value: u64,
}

/// Project the interest earned and the total due at maturity, rounded to
/// whole pesos. Rates are basis points of the effective annual rate.
/// Inputs are unsigned, so negative amounts or rates cannot reach this
/// function.
pub fn project(
    amount: u64,
    annual_rate_bps: u32,
    term: TermMonths,
    basis: InterestBasis,
) -> Projection {
    let rate = f64::from(annual_rate_bps) / 10_000.0;
    let months = f64::from(term.months());

    let interest = match basis {
        InterestBasis::Simple => amount as f64 * rate * (months / 12.0),
        InterestBasis::CompoundEffective => {
            let days = (months / 12.0 * 365.0).round();
            let period_rate = (1.0 + rate).powf(days / 365.0) - 1.0;
            amount as f64 * period_rate
        }
    };

    let estimated_interest = interest.round() as u64;
    Projection {
        estimated_interest,
        maturity_value: amount + estimated_interest,
    }
}
