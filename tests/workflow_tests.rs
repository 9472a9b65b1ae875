use chrono::Utc;
use femfund::entities::funding_option::{self, FundingType};
use femfund::entities::application;
use femfund::error::AppError;
use femfund::status::{self, ApplicationStatus};
use femfund::workflow::{self, ApplicationForm, FinancialInfoForm};

fn sample_option(min_amount: f64, max_amount: f64) -> funding_option::Model {
    funding_option::Model {
        id: 1,
        name: "Community Microloan".to_string(),
        description: "Small loans with flexible terms".to_string(),
        funding_type: FundingType::Microloan,
        min_amount,
        max_amount,
        interest_rate: 5.5,
        term: Some("6-36 months".to_string()),
        eligibility_criteria: None,
        required_documents: None,
        application_process: None,
        provider: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_application(status: ApplicationStatus) -> application::Model {
    application::Model {
        id: 7,
        user_id: 3,
        funding_option_id: 1,
        amount: 8000.0,
        purpose: "Buy a commercial oven for the bakery".to_string(),
        business_plan: None,
        income: 4000.0,
        expenses: 2500.0,
        assets: 20000.0,
        liabilities: 6000.0,
        documents: None,
        status,
        ai_score: None,
        ai_feedback: None,
        ai_evaluated_at: None,
        reviewer_notes: None,
        submitted_at: None,
        decided_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn complete_form(amount: f64) -> ApplicationForm {
    ApplicationForm {
        amount: Some(amount),
        purpose: Some("Buy a commercial oven for the bakery".to_string()),
        business_plan: Some("Expand wholesale orders to three new cafes".to_string()),
        financial_info: Some(FinancialInfoForm {
            income: Some(4000.0),
            expenses: Some(2500.0),
            assets: Some(20000.0),
            liabilities: Some(6000.0),
        }),
        save_as_draft: false,
    }
}

mod transitions {
    use super::*;

    #[test]
    fn forward_path_is_legal() {
        use ApplicationStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Funded));
    }

    #[test]
    fn backward_and_skipping_steps_are_illegal() {
        use ApplicationStatus::*;
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Funded.can_transition_to(Submitted));
        assert!(!Funded.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Submitted.can_transition_to(Funded));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!UnderReview.can_transition_to(Submitted));
    }

    #[test]
    fn terminal_states_permit_nothing() {
        use ApplicationStatus::*;
        assert!(Rejected.is_terminal());
        assert!(Funded.is_terminal());
        for next in [Draft, Submitted, UnderReview, Approved, Rejected, Funded] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Funded.can_transition_to(next));
        }
    }

    #[test]
    fn only_review_outcomes_count_as_decided() {
        use ApplicationStatus::*;
        assert!(Approved.is_decided());
        assert!(Rejected.is_decided());
        assert!(Funded.is_decided());
        assert!(!Draft.is_decided());
        assert!(!Submitted.is_decided());
        assert!(!UnderReview.is_decided());
    }

    #[test]
    fn apply_transition_stamps_decision_time() {
        let now = Utc::now();
        let app = sample_application(ApplicationStatus::UnderReview);
        let active = workflow::apply_transition(
            app,
            ApplicationStatus::Rejected,
            Some("Debt load too high for the requested amount".to_string()),
            now,
        )
        .unwrap();

        assert_eq!(active.status.clone().unwrap(), ApplicationStatus::Rejected);
        assert_eq!(active.decided_at.clone().unwrap(), Some(now));
        assert_eq!(
            active.reviewer_notes.clone().unwrap().as_deref(),
            Some("Debt load too high for the requested amount")
        );
    }

    #[test]
    fn apply_transition_rejects_backward_moves() {
        let app = sample_application(ApplicationStatus::Rejected);
        let err = workflow::apply_transition(app, ApplicationStatus::Approved, None, Utc::now())
            .unwrap_err();
        match err {
            AppError::InvalidTransition { from, to } => {
                assert_eq!(from, ApplicationStatus::Rejected);
                assert_eq!(to, ApplicationStatus::Approved);
            }
            other => panic!("expected InvalidTransition, got {}", other),
        }
    }

    #[test]
    fn submission_stamps_submitted_at_only() {
        let now = Utc::now();
        let app = sample_application(ApplicationStatus::Draft);
        let active =
            workflow::apply_transition(app, ApplicationStatus::Submitted, None, now).unwrap();
        assert_eq!(active.submitted_at.clone().unwrap(), Some(now));
        assert!(matches!(active.decided_at, sea_orm::ActiveValue::Unchanged(None)));
    }
}

mod presentation {
    use super::*;

    #[test]
    fn every_status_has_a_badge() {
        assert_eq!(status::display(ApplicationStatus::Draft).label, "Draft");
        assert_eq!(
            status::display(ApplicationStatus::UnderReview).label,
            "Under Review"
        );
        assert_eq!(
            status::display(ApplicationStatus::Approved).color,
            "bg-green-100 text-green-800"
        );
        assert_eq!(
            status::display(ApplicationStatus::Funded).color,
            "bg-purple-100 text-purple-800"
        );
    }
}

mod validation {
    use super::*;

    #[test]
    fn accepts_a_complete_form_within_range() {
        let option = sample_option(1000.0, 50000.0);
        let submission = workflow::validate_submission(&complete_form(8000.0), &option).unwrap();
        assert_eq!(submission.amount, 8000.0);
        assert_eq!(submission.financial.income, 4000.0);
    }

    #[test]
    fn rejects_amount_just_below_minimum() {
        let option = sample_option(1000.0, 50000.0);
        let errors = workflow::validate_submission(&complete_form(999.0), &option).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
        assert_eq!(errors[0].message, "Amount must be between 1000 and 50000");
    }

    #[test]
    fn rejects_amount_just_above_maximum() {
        let option = sample_option(1000.0, 50000.0);
        let errors = workflow::validate_submission(&complete_form(50001.0), &option).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn boundary_amounts_are_accepted() {
        let option = sample_option(1000.0, 50000.0);
        assert!(workflow::validate_submission(&complete_form(1000.0), &option).is_ok());
        assert!(workflow::validate_submission(&complete_form(50000.0), &option).is_ok());
    }

    #[test]
    fn lists_every_offending_field_at_once() {
        let option = sample_option(1000.0, 50000.0);
        let form = ApplicationForm {
            amount: None,
            purpose: Some("too short".to_string()),
            business_plan: None,
            financial_info: Some(FinancialInfoForm {
                income: None,
                expenses: Some(-10.0),
                assets: Some(20000.0),
                liabilities: Some(6000.0),
            }),
            save_as_draft: false,
        };

        let errors = workflow::validate_submission(&form, &option).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "amount",
                "purpose",
                "financialInfo.income",
                "financialInfo.expenses"
            ]
        );
        assert_eq!(errors[0].message, "Amount is required");
        assert_eq!(
            errors[3].message,
            "Expenses must be a non-negative number"
        );
    }

    #[test]
    fn missing_financial_info_reports_all_four_fields() {
        let option = sample_option(1000.0, 50000.0);
        let form = ApplicationForm {
            financial_info: None,
            ..complete_form(8000.0)
        };
        let errors = workflow::validate_submission(&form, &option).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e.field.starts_with("financialInfo.")));
    }

    #[test]
    fn draft_round_trip_revalidates_empty_purpose() {
        let mut app = sample_application(ApplicationStatus::Draft);
        app.purpose = String::new();
        app.amount = 0.0;
        let option = sample_option(1000.0, 50000.0);

        let form = workflow::form_from_model(&app);
        let errors = workflow::validate_submission(&form, &option).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"amount"));
        assert!(fields.contains(&"purpose"));
    }
}
