use chrono::Utc;
use femfund::entities::funding_option::FundingType;
use femfund::evaluation::{
    blend_score, build_prompt, clamp_score, extract_json_object, financial_ratios, parse_reply,
    ApplicantProfile, CreditEvaluator, EvaluationInput, EvaluationOutcome, FinancialSnapshot,
    HistoryEntry, DEFAULT_SCORE, MODERATE_RISK_FEEDBACK, PARSE_FALLBACK_SCORE,
    PRE_APPROVAL_FEEDBACK,
};
use femfund::status::ApplicationStatus;

fn sample_input() -> EvaluationInput {
    EvaluationInput {
        funding_type: FundingType::Microloan,
        amount: 8000.0,
        purpose: "Buy a commercial oven for the bakery".to_string(),
        business_plan: None,
        financial: FinancialSnapshot {
            income: 2000.0,
            expenses: 1500.0,
            assets: 30000.0,
            liabilities: 12000.0,
        },
        profile: ApplicantProfile {
            is_verified: true,
            financial_score: Some(72),
            account_age_days: 400,
        },
        history: vec![],
    }
}

mod ratios {
    use super::*;

    #[test]
    fn annualizes_income_for_debt_to_income() {
        let ratios = financial_ratios(&FinancialSnapshot {
            income: 2000.0,
            expenses: 1500.0,
            assets: 30000.0,
            liabilities: 12000.0,
        });
        assert_eq!(ratios.monthly_net_income, 500.0);
        assert_eq!(ratios.debt_to_income, 0.5);
        assert_eq!(ratios.debt_to_asset, 0.4);
    }

    #[test]
    fn zero_denominators_fall_back_to_one() {
        let ratios = financial_ratios(&FinancialSnapshot {
            income: 0.0,
            expenses: 100.0,
            assets: 0.0,
            liabilities: 750.0,
        });
        assert_eq!(ratios.debt_to_income, 750.0);
        assert_eq!(ratios.debt_to_asset, 750.0);
    }
}

mod scores {
    use super::*;

    #[test]
    fn clamps_raw_scores_into_range() {
        assert_eq!(clamp_score(150.0), 100);
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(82.4), 82);
        assert_eq!(clamp_score(0.0), 0);
        assert_eq!(clamp_score(100.0), 100);
    }

    #[test]
    fn blends_with_prior_score_as_weighted_average() {
        assert_eq!(blend_score(Some(80), 60), 74);
        assert_eq!(blend_score(Some(50), 90), 62);
        assert_eq!(blend_score(None, 88), 88);
    }
}

mod json_extraction {
    use super::*;

    #[test]
    fn finds_object_inside_prose() {
        let reply = "Here is my assessment:\n{\"score\": 82, \"feedback\": \"Solid\"}\nThanks!";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"score\": 82, \"feedback\": \"Solid\"}")
        );
    }

    #[test]
    fn finds_object_inside_code_fence() {
        let reply = "```json\n{\"score\": 70, \"feedback\": \"ok\"}\n```";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"score\": 70, \"feedback\": \"ok\"}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let reply = r#"{"score": 80, "feedback": "strengths {cash flow} and \"grit\""} trailing }"#;
        let fragment = extract_json_object(reply).unwrap();
        assert_eq!(
            fragment,
            r#"{"score": 80, "feedback": "strengths {cash flow} and \"grit\""}"#
        );
        let value: serde_json::Value = serde_json::from_str(fragment).unwrap();
        assert_eq!(value["score"], 80);
    }

    #[test]
    fn returns_none_without_a_balanced_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"truncated\": "), None);
    }
}

mod reply_parsing {
    use super::*;

    #[test]
    fn valid_reply_is_evaluated() {
        let evaluation =
            parse_reply("{\"score\": 84, \"feedback\": \"Healthy margins, low debt.\"}");
        assert_eq!(evaluation.score, 84);
        assert_eq!(evaluation.feedback, "Healthy margins, low debt.");
        assert_eq!(evaluation.outcome, EvaluationOutcome::Evaluated);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let evaluation = parse_reply("{\"score\": 150, \"feedback\": \"excellent\"}");
        assert_eq!(evaluation.score, 100);
        assert_eq!(evaluation.outcome, EvaluationOutcome::Evaluated);

        let evaluation = parse_reply("{\"score\": -5, \"feedback\": \"poor\"}");
        assert_eq!(evaluation.score, 0);
    }

    #[test]
    fn malformed_reply_falls_back_to_moderate_risk() {
        for reply in [
            "I cannot evaluate this application.",
            "{\"score\": \"eighty\", \"feedback\": \"text\"}",
            "{\"score\": 75}",
            "{\"score\": 75, \"feedback\": \"\"}",
            "{\"feedback\": \"missing score\"}",
        ] {
            let evaluation = parse_reply(reply);
            assert_eq!(evaluation.score, PARSE_FALLBACK_SCORE, "reply: {}", reply);
            assert_eq!(evaluation.feedback, MODERATE_RISK_FEEDBACK);
            assert_eq!(evaluation.outcome, EvaluationOutcome::MalformedReply);
        }
    }
}

mod prompt {
    use super::*;

    #[test]
    fn embeds_ratios_and_profile() {
        let prompt = build_prompt(&sample_input());
        assert!(prompt.contains("Funding Type: microloan"));
        assert!(prompt.contains("Amount Requested: $8000"));
        assert!(prompt.contains("Monthly Net Income: $500"));
        assert!(prompt.contains("Debt-to-Income Ratio: 50.00%"));
        assert!(prompt.contains("Debt-to-Asset Ratio: 40.00%"));
        assert!(prompt.contains("Account Verified: Yes"));
        assert!(prompt.contains("Existing Financial Score: 72"));
        assert!(prompt.contains("- No previous applications"));
        assert!(prompt.contains("Business Plan Summary: Not provided"));
    }

    #[test]
    fn lists_decided_history_entries() {
        let mut input = sample_input();
        input.history = vec![HistoryEntry {
            funding_type: FundingType::Grant,
            amount: 5000.0,
            status: ApplicationStatus::Approved,
            date: Utc::now(),
        }];
        let prompt = build_prompt(&input);
        assert!(prompt.contains("approved grant for $5000"));
        assert!(!prompt.contains("No previous applications"));
    }
}

// Without a configured credential the evaluator must answer with the fixed
// pre-approval payload and perform no I/O at all.
#[tokio::test]
async fn missing_credential_returns_default_evaluation() {
    let evaluator = CreditEvaluator::new(None, "gpt-4".to_string());
    assert!(!evaluator.has_credential());

    let evaluation = evaluator.evaluate(&sample_input()).await;
    assert_eq!(evaluation.score, DEFAULT_SCORE);
    assert_eq!(evaluation.feedback, PRE_APPROVAL_FEEDBACK);
    assert_eq!(evaluation.outcome, EvaluationOutcome::MissingCredential);
}
