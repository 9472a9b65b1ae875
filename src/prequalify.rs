//! Pre-qualification: a non-binding estimate of which funding types a user
//! likely qualifies for, and at what amount. Pure function of the running
//! financial score and the count of successful (approved or funded)
//! applications; no external calls.

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_FINANCIAL_SCORE: i32 = 50;

const BASE_AMOUNT: f64 = 5000.0;

/// Eligibility flags per funding type plus a recommended request amount.
/// Field names match the funding-type identifiers used across the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PreQualification {
    pub microloan: bool,
    pub grant: bool,
    pub venture_capital: bool,
    pub peer_to_peer: bool,
    #[serde(rename = "recommendedAmount")]
    pub recommended_amount: i64,
}

impl PreQualification {
    /// Fixed conservative answer used when the backing queries fail.
    pub fn conservative_default() -> Self {
        PreQualification {
            microloan: true,
            grant: false,
            venture_capital: false,
            peer_to_peer: true,
            recommended_amount: BASE_AMOUNT as i64,
        }
    }
}

/// Compute eligibility from the financial score (default 50 when the user has
/// none yet) and the number of approved/funded applications. Score 60 unlocks
/// microloans and peer-to-peer lending, 75 grants, 85 venture capital; the
/// recommended amount scales with both score and track record.
pub fn prequalify(financial_score: Option<i32>, successful_applications: u64) -> PreQualification {
    let score = financial_score.unwrap_or(DEFAULT_FINANCIAL_SCORE);
    let score_multiplier = score as f64 / 50.0;
    let history_multiplier = 1.0 + 0.2 * successful_applications as f64;

    PreQualification {
        microloan: score >= 60,
        peer_to_peer: score >= 60,
        grant: score >= 75,
        venture_capital: score >= 85,
        recommended_amount: (BASE_AMOUNT * score_multiplier * history_multiplier).round() as i64,
    }
}

/// Fixed improvement advice for a score bracket.
pub fn score_recommendations(score: i32) -> Vec<&'static str> {
    if score < 50 {
        vec![
            "Consider reducing monthly expenses to improve your debt-to-income ratio",
            "Focus on building business revenue before seeking larger funding amounts",
            "Start with smaller funding options to build a positive funding history",
            "Complete your profile with all required documentation",
        ]
    } else if score < 70 {
        vec![
            "Develop a more detailed business plan with clear revenue projections",
            "Consider reducing the requested funding amount to improve approval odds",
            "Demonstrate how the funding will directly increase business revenue",
            "Build assets to improve your overall financial standing",
        ]
    } else {
        vec![
            "Continue maintaining a strong financial position",
            "Consider exploring larger funding options as your business grows",
            "Highlight your successful funding history in future applications",
            "Regularly update your financial information to maintain an accurate credit score",
        ]
    }
}
