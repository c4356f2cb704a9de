//! Fundamental health scorer, 0-40 points: valuation (15) + profitability
//! (15) + financial stability (10).

use analyzer_core::{FundamentalBreakdown, FundamentalSnapshot};

use crate::tables::{band, grade, Band};
use crate::FUNDAMENTAL_MAX;

const PE_TABLE: [Band; 3] = [
    band(5.0, 25.0, 8, "Excellent"),
    band(f64::NEG_INFINITY, 5.0, 4, "Very Low (Risky)"),
    band(f64::NEG_INFINITY, 35.0, 3, "Acceptable"),
];

const PB_TABLE: [Band; 2] = [
    band(0.5, 3.0, 4, "Good"),
    band(f64::NEG_INFINITY, 5.0, 2, "Acceptable"),
];

const PEG_TABLE: [Band; 2] = [
    band(0.5, 1.5, 3, "Excellent"),
    band(f64::NEG_INFINITY, 2.0, 1, "Acceptable"),
];

const ROE_TABLE: [Band; 3] = [
    band(0.15, f64::INFINITY, 8, "Excellent (>15%)"),
    band(0.10, f64::INFINITY, 5, "Good (>10%)"),
    band(0.05, f64::INFINITY, 2, "Acceptable (>5%)"),
];

const MARGIN_TABLE: [Band; 3] = [
    band(0.15, f64::INFINITY, 4, "Excellent (>15%)"),
    band(0.08, f64::INFINITY, 2, "Good (>8%)"),
    band(0.03, f64::INFINITY, 1, "Acceptable (>3%)"),
];

const GROWTH_TABLE: [Band; 3] = [
    band(0.10, f64::INFINITY, 3, "Strong (>10%)"),
    band(0.05, f64::INFINITY, 2, "Good (>5%)"),
    band(0.0, f64::INFINITY, 1, "Positive"),
];

const DEBT_TABLE: [Band; 3] = [
    band(f64::NEG_INFINITY, 0.3, 5, "Low Debt (<30%)"),
    band(f64::NEG_INFINITY, 0.6, 3, "Moderate Debt (<60%)"),
    band(f64::NEG_INFINITY, 1.0, 1, "High Debt (<100%)"),
];

const DIVIDEND_TABLE: [Band; 3] = [
    band(0.02, 0.06, 3, "Healthy Yield"),
    band(0.0, 0.08, 2, "Good Yield"),
    band(0.0, f64::INFINITY, 1, "Dividend Paying"),
];

const PAYOUT_TABLE: [Band; 2] = [
    band(0.3, 0.6, 2, "Sustainable Payout"),
    band(0.0, 0.8, 1, "Moderate Payout"),
];

pub fn score(fundamentals: Option<&FundamentalSnapshot>) -> (i64, FundamentalBreakdown) {
    let Some(f) = fundamentals else {
        return (0, unknown_breakdown());
    };

    // Valuation (15 points)
    let (pe_points, pe_status) = grade(f.pe_ratio, &PE_TABLE, "Unknown", "High");
    let (pb_points, pb_status) = grade(f.price_to_book, &PB_TABLE, "Unknown", "High");
    let (peg_points, peg_status) = grade(f.peg_ratio, &PEG_TABLE, "Unknown", "High");
    let valuation_score = pe_points + pb_points + peg_points;

    // Profitability (15 points)
    let (roe_points, roe_status) = grade(f.roe, &ROE_TABLE, "Unknown", "Low");
    let (margin_points, margin_status) = grade(f.profit_margin, &MARGIN_TABLE, "Unknown", "Low");
    let (growth_points, growth_status) =
        grade(f.revenue_growth, &GROWTH_TABLE, "Unknown", "Declining");
    let profitability_score = roe_points + margin_points + growth_points;

    // Financial stability (10 points)
    let (debt_points, debt_status) =
        grade(f.debt_to_equity, &DEBT_TABLE, "Unknown", "Very High Debt");
    // A zero yield means no dividend is paid, which is the same state as the
    // field being absent.
    let dividend_yield = f.dividend_yield.filter(|v| *v > 0.0);
    let (dividend_points, dividend_status) =
        grade(dividend_yield, &DIVIDEND_TABLE, "No Dividend", "No Dividend");
    let payout_ratio = f.payout_ratio.filter(|v| *v > 0.0);
    let (payout_points, payout_status) =
        grade(payout_ratio, &PAYOUT_TABLE, "Unknown", "High Payout Risk");
    let stability_score = debt_points + dividend_points + payout_points;

    let total = (valuation_score + profitability_score + stability_score).min(FUNDAMENTAL_MAX);

    let breakdown = FundamentalBreakdown {
        pe_status,
        pb_status,
        peg_status,
        valuation_score,
        roe_status,
        margin_status,
        growth_status,
        profitability_score,
        debt_status,
        dividend_status,
        payout_status,
        stability_score,
    };

    (total, breakdown)
}

fn unknown_breakdown() -> FundamentalBreakdown {
    FundamentalBreakdown {
        pe_status: "Unknown",
        pb_status: "Unknown",
        peg_status: "Unknown",
        valuation_score: 0,
        roe_status: "Unknown",
        margin_status: "Unknown",
        growth_status: "Unknown",
        profitability_score: 0,
        debt_status: "Unknown",
        dividend_status: "Unknown",
        payout_status: "Unknown",
        stability_score: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot() -> FundamentalSnapshot {
        FundamentalSnapshot {
            symbol: "RY.TO".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn absent_fundamentals_score_zero_with_unknown_labels() {
        let (score, breakdown) = score(None);
        assert_eq!(score, 0);
        assert_eq!(breakdown.pe_status, "Unknown");
        assert_eq!(breakdown.roe_status, "Unknown");
        assert_eq!(breakdown.debt_status, "Unknown");
        assert_eq!(breakdown.dividend_status, "Unknown");
        assert_eq!(breakdown.valuation_score, 0);
        assert_eq!(breakdown.profitability_score, 0);
        assert_eq!(breakdown.stability_score, 0);
    }

    #[test]
    fn empty_snapshot_scores_zero() {
        let (total, breakdown) = score(Some(&snapshot()));
        assert_eq!(total, 0);
        assert_eq!(breakdown.pe_status, "Unknown");
        assert_eq!(breakdown.growth_status, "Unknown");
    }

    #[test]
    fn strong_company_maxes_out() {
        let mut f = snapshot();
        f.pe_ratio = Some(15.0);
        f.price_to_book = Some(1.5);
        f.peg_ratio = Some(1.0);
        f.roe = Some(0.20);
        f.profit_margin = Some(0.20);
        f.revenue_growth = Some(0.12);
        f.debt_to_equity = Some(0.2);
        f.dividend_yield = Some(0.04);
        f.payout_ratio = Some(0.45);

        let (total, breakdown) = score(Some(&f));
        assert_eq!(breakdown.valuation_score, 15);
        assert_eq!(breakdown.profitability_score, 15);
        assert_eq!(breakdown.stability_score, 10);
        assert_eq!(total, 40);
    }

    #[test]
    fn valuation_bands() {
        let mut f = snapshot();
        f.pe_ratio = Some(3.0);
        let (_, b) = score(Some(&f));
        assert_eq!(b.pe_status, "Very Low (Risky)");
        assert_eq!(b.valuation_score, 4);

        f.pe_ratio = Some(30.0);
        let (_, b) = score(Some(&f));
        assert_eq!(b.pe_status, "Acceptable");
        assert_eq!(b.valuation_score, 3);

        f.pe_ratio = Some(60.0);
        let (_, b) = score(Some(&f));
        assert_eq!(b.pe_status, "High");
        assert_eq!(b.valuation_score, 0);
    }

    #[test]
    fn zero_debt_is_a_real_low_debt_state() {
        let mut f = snapshot();
        f.debt_to_equity = Some(0.0);
        let (total, breakdown) = score(Some(&f));
        assert_eq!(breakdown.debt_status, "Low Debt (<30%)");
        assert_eq!(total, 5);

        // Unknown debt must not collect the low-debt points.
        let (total, breakdown) = score(Some(&snapshot()));
        assert_eq!(breakdown.debt_status, "Unknown");
        assert_eq!(total, 0);
    }

    #[test]
    fn small_yield_still_counts_as_good() {
        // The second dividend band starts at zero, so a 1% yield lands there.
        let mut f = snapshot();
        f.dividend_yield = Some(0.01);
        let (_, b) = score(Some(&f));
        assert_eq!(b.dividend_status, "Good Yield");
        assert_eq!(b.stability_score, 2);
    }

    #[test]
    fn zero_yield_means_no_dividend() {
        let mut f = snapshot();
        f.dividend_yield = Some(0.0);
        let (_, b) = score(Some(&f));
        assert_eq!(b.dividend_status, "No Dividend");
        assert_eq!(b.stability_score, 0);
    }

    #[test]
    fn high_yield_gets_one_point() {
        let mut f = snapshot();
        f.dividend_yield = Some(0.11);
        let (_, b) = score(Some(&f));
        assert_eq!(b.dividend_status, "Dividend Paying");
        assert_eq!(b.stability_score, 1);
    }

    #[test]
    fn stretched_payout_is_flagged() {
        let mut f = snapshot();
        f.payout_ratio = Some(0.95);
        let (_, b) = score(Some(&f));
        assert_eq!(b.payout_status, "High Payout Risk");
    }
}
