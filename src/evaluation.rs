//! Credit evaluation of funding applications.
//!
//! The evaluator sends an applicant's profile, financial ratios, and
//! application history to a hosted language model and expects a JSON object
//! `{score, feedback}` somewhere in the reply. Every failure mode degrades to
//! a fixed payload instead of an error: submission must never fail because
//! evaluation did. [`EvaluationOutcome`] records which path produced the
//! result so the fallback that fired stays visible in the logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::entities::funding_option::FundingType;
use crate::status::ApplicationStatus;

const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Overall client timeout; the per-call timeout below is what normally fires.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);
const EVALUATION_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_SCORE: i32 = 75;
pub const PARSE_FALLBACK_SCORE: i32 = 70;
pub const SERVICE_FALLBACK_SCORE: i32 = 65;

pub const PRE_APPROVAL_FEEDBACK: &str =
    "This application has been pre-approved based on basic criteria. Manual review recommended.";
pub const MODERATE_RISK_FEEDBACK: &str = "This application has been evaluated based on the provided financial information. The debt-to-income ratio and business purpose suggest a moderate risk profile. Further manual review recommended.";
pub const TECHNICAL_ISSUE_FEEDBACK: &str = "Automated evaluation encountered a technical issue. Based on basic criteria, this application shows potential but requires manual review by our funding team.";

/// Which path produced the evaluation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// The external model replied with a usable `{score, feedback}` object.
    Evaluated,
    /// No API key configured; fixed pre-approval payload, no I/O performed.
    MissingCredential,
    /// The model replied but no valid JSON object could be recovered.
    MalformedReply,
    /// Transport or service failure (timeout, auth error, rate limit).
    ServiceUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Always within [0, 100].
    pub score: i32,
    pub feedback: String,
    pub outcome: EvaluationOutcome,
}

/// The applicant's financial disclosures for one application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FinancialSnapshot {
    pub income: f64,
    pub expenses: f64,
    pub assets: f64,
    pub liabilities: f64,
}

#[derive(Debug, Clone)]
pub struct ApplicantProfile {
    pub is_verified: bool,
    pub financial_score: Option<i32>,
    pub account_age_days: i64,
}

/// One previously decided application, newest first.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub funding_type: FundingType,
    pub amount: f64,
    pub status: ApplicationStatus,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub funding_type: FundingType,
    pub amount: f64,
    pub purpose: String,
    pub business_plan: Option<String>,
    pub financial: FinancialSnapshot,
    pub profile: ApplicantProfile,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialRatios {
    pub monthly_net_income: f64,
    pub debt_to_income: f64,
    pub debt_to_asset: f64,
}

/// Derived ratios embedded in the prompt. Zero denominators are replaced with
/// 1 so the ratios stay finite; income is treated as monthly and annualized
/// for the debt-to-income figure.
pub fn financial_ratios(financial: &FinancialSnapshot) -> FinancialRatios {
    let annual_income = financial.income * 12.0;
    FinancialRatios {
        monthly_net_income: financial.income - financial.expenses,
        debt_to_income: financial.liabilities
            / if annual_income == 0.0 { 1.0 } else { annual_income },
        debt_to_asset: financial.liabilities
            / if financial.assets == 0.0 {
                1.0
            } else {
                financial.assets
            },
    }
}

/// Clamp a raw model score into [0, 100] and round to an integer.
pub fn clamp_score(raw: f64) -> i32 {
    raw.clamp(0.0, 100.0).round() as i32
}

/// Fold a fresh evaluation into the user's running financial score as an
/// exponentially weighted moving average.
pub fn blend_score(previous: Option<i32>, new_score: i32) -> i32 {
    match previous {
        Some(old) => (old as f64 * 0.7 + new_score as f64 * 0.3).round() as i32,
        None => new_score,
    }
}

/// Find the first balanced `{...}` substring, respecting JSON strings and
/// escapes, so braces inside feedback text do not truncate the object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a raw model reply into an evaluation. A reply that carries no valid
/// `{score, feedback}` object yields the fixed moderate-risk payload.
pub fn parse_reply(reply: &str) -> Evaluation {
    let malformed = || {
        tracing::warn!("could not recover a valid evaluation object from model reply");
        Evaluation {
            score: PARSE_FALLBACK_SCORE,
            feedback: MODERATE_RISK_FEEDBACK.to_string(),
            outcome: EvaluationOutcome::MalformedReply,
        }
    };

    let Some(fragment) = extract_json_object(reply) else {
        return malformed();
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(fragment) else {
        return malformed();
    };

    let score = value.get("score").and_then(|v| v.as_f64());
    let feedback = value
        .get("feedback")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (score, feedback) {
        (Some(raw), Some(feedback)) => Evaluation {
            score: clamp_score(raw),
            feedback: feedback.to_string(),
            outcome: EvaluationOutcome::Evaluated,
        },
        _ => malformed(),
    }
}

/// Assemble the analyst prompt from the application, applicant profile,
/// derived ratios, and decided-application history.
pub fn build_prompt(input: &EvaluationInput) -> String {
    let ratios = financial_ratios(&input.financial);

    let history = if input.history.is_empty() {
        "- No previous applications".to_string()
    } else {
        input
            .history
            .iter()
            .map(|entry| {
                format!(
                    "- {} {} for ${} on {}",
                    entry.status.as_str(),
                    entry.funding_type.as_str(),
                    entry.amount,
                    entry.date.format("%Y-%m-%d")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an experienced financial analyst specializing in evaluating funding applications for women entrepreneurs.\n\
         Please evaluate the following funding application and provide:\n\
         1. A credit score from 0-100 (where 100 is excellent)\n\
         2. Detailed feedback explaining the evaluation\n\
         \n\
         Application Details:\n\
         - Funding Type: {funding_type}\n\
         - Amount Requested: ${amount}\n\
         - Purpose: {purpose}\n\
         - Business Plan Summary: {business_plan}\n\
         \n\
         Financial Information:\n\
         - Monthly Income: ${income}\n\
         - Monthly Expenses: ${expenses}\n\
         - Monthly Net Income: ${net_income}\n\
         - Total Assets: ${assets}\n\
         - Total Liabilities: ${liabilities}\n\
         - Debt-to-Income Ratio: {dti:.2}%\n\
         - Debt-to-Asset Ratio: {dta:.2}%\n\
         \n\
         Applicant Profile:\n\
         - Account Verified: {verified}\n\
         - Existing Financial Score: {existing_score}\n\
         - Account Age: {account_age} days\n\
         \n\
         Application History:\n\
         {history}\n\
         \n\
         Evaluate the application based on:\n\
         1. Financial health (income vs. expenses, debt ratios)\n\
         2. Business plan viability\n\
         3. Purpose alignment with funding type\n\
         4. Applicant history and profile\n\
         5. Risk assessment\n\
         \n\
         Provide your evaluation in JSON format:\n\
         {{\n\
           \"score\": [number between 0-100],\n\
           \"feedback\": [detailed explanation with strengths and weaknesses]\n\
         }}",
        funding_type = input.funding_type.as_str(),
        amount = input.amount,
        purpose = input.purpose,
        business_plan = input.business_plan.as_deref().unwrap_or("Not provided"),
        income = input.financial.income,
        expenses = input.financial.expenses,
        net_income = ratios.monthly_net_income,
        assets = input.financial.assets,
        liabilities = input.financial.liabilities,
        dti = ratios.debt_to_income * 100.0,
        dta = ratios.debt_to_asset * 100.0,
        verified = if input.profile.is_verified { "Yes" } else { "No" },
        existing_score = input.profile.financial_score.unwrap_or(0),
        account_age = input.profile.account_age_days,
        history = history,
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// Client for the hosted evaluation model. Constructed once at the
/// composition root and shared through `AppState`; without an API key every
/// call short-circuits to the fixed pre-approval payload.
pub struct CreditEvaluator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl CreditEvaluator {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            model,
            endpoint: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Evaluate one application. Never returns an error: every failure mode
    /// maps to a fixed payload and the outcome records which one fired.
    #[tracing::instrument(skip(self, input), fields(funding_type = input.funding_type.as_str()))]
    pub async fn evaluate(&self, input: &EvaluationInput) -> Evaluation {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("evaluation credential not configured, using default evaluation");
            return Evaluation {
                score: DEFAULT_SCORE,
                feedback: PRE_APPROVAL_FEEDBACK.to_string(),
                outcome: EvaluationOutcome::MissingCredential,
            };
        };

        let prompt = build_prompt(input);
        match self.request_completion(api_key, &prompt).await {
            Ok(reply) => parse_reply(&reply),
            Err(err) => {
                tracing::error!("credit evaluation call failed: {}", err);
                Evaluation {
                    score: SERVICE_FALLBACK_SCORE,
                    feedback: TECHNICAL_ISSUE_FEEDBACK.to_string(),
                    outcome: EvaluationOutcome::ServiceUnavailable,
                }
            }
        }
    }

    async fn request_completion(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content:
                        "You are a financial analyst specialized in evaluating funding applications.",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 1000,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(EVALUATION_TIMEOUT)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            tracing::error!("evaluation API error: status {}, body: {}", status, body);
            return Err(format!("evaluation API returned status {}", status).into());
        }

        let parsed = response.json::<ChatResponse>().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or("evaluation API returned no choices")?;
        Ok(choice.message.content)
    }
}
