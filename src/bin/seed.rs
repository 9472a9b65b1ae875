//! Seed the database with an admin user, a sample applicant, the starter
//! funding catalog, and the first learning resources. Destructive: existing
//! rows are cleared first, as a fresh demo environment expects.

use anyhow::Context;
use dotenvy::dotenv;
use sea_orm::{ActiveModelTrait, Database, EntityTrait, Set};
use std::env;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use femfund::entities::funding_option::FundingType;
use femfund::entities::learning_resource::{ResourceCategory, ResourceKind};
use femfund::entities::{
    funding_option, learning_resource, user, Application, FundingOption, LearningResource, User,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing (INFO level)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load .env (if present) so DATABASE_URL from file is visible
    let _ = dotenv();

    let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Database::connect(&url)
        .await
        .context("failed to connect to database")?;

    // Clear existing data; applications go first because of the references.
    Application::delete_many().exec(&db).await?;
    FundingOption::delete_many().exec(&db).await?;
    User::delete_many().exec(&db).await?;
    LearningResource::delete_many().exec(&db).await?;
    info!("Cleared existing data");

    let admin = user::ActiveModel {
        email: Set("admin@femfund.com".to_string()),
        first_name: Set("Admin".to_string()),
        last_name: Set("User".to_string()),
        is_verified: Set(true),
        financial_score: Set(Some(95)),
        ..Default::default()
    };
    admin.insert(&db).await?;
    info!("Admin user created");

    let sample = user::ActiveModel {
        email: Set("jane@example.com".to_string()),
        first_name: Set("Jane".to_string()),
        last_name: Set("Doe".to_string()),
        is_verified: Set(true),
        financial_score: Set(Some(82)),
        ..Default::default()
    };
    sample.insert(&db).await?;
    info!("Sample user created");

    let options = vec![
        funding_option::ActiveModel {
            name: Set("Community Microloan".to_string()),
            description: Set(
                "Small loans with flexible terms for early-stage businesses that need \
                 working capital or equipment."
                    .to_string(),
            ),
            funding_type: Set(FundingType::Microloan),
            min_amount: Set(1000.0),
            max_amount: Set(50000.0),
            interest_rate: Set(5.5),
            term: Set(Some("6-36 months".to_string())),
            eligibility_criteria: Set(Some(serde_json::json!([
                "Registered business or sole proprietorship",
                "At least 6 months of operating history",
                "No active bankruptcy proceedings"
            ]))),
            required_documents: Set(Some(serde_json::json!([
                "Government-issued ID",
                "Last 3 months of bank statements",
                "Business registration certificate"
            ]))),
            application_process: Set(Some(
                "Apply online, receive an automated pre-assessment, then a decision \
                 within five business days."
                    .to_string(),
            )),
            provider: Set(Some("FemFund Community Partners".to_string())),
            is_active: Set(true),
            ..Default::default()
        },
        funding_option::ActiveModel {
            name: Set("Women Founders Grant".to_string()),
            description: Set(
                "Non-repayable funds for specific growth projects led by women \
                 entrepreneurs."
                    .to_string(),
            ),
            funding_type: Set(FundingType::Grant),
            min_amount: Set(5000.0),
            max_amount: Set(25000.0),
            interest_rate: Set(0.0),
            term: Set(None),
            eligibility_criteria: Set(Some(serde_json::json!([
                "Majority woman-owned business",
                "Clear project plan and budget"
            ]))),
            required_documents: Set(Some(serde_json::json!([
                "Project proposal",
                "Most recent financial statements"
            ]))),
            application_process: Set(Some(
                "Quarterly application windows; shortlisted founders present to the \
                 grant committee."
                    .to_string(),
            )),
            provider: Set(Some("FemFund Foundation".to_string())),
            is_active: Set(true),
            ..Default::default()
        },
        funding_option::ActiveModel {
            name: Set("Growth Venture Capital".to_string()),
            description: Set(
                "Equity investment for high-growth startups ready to scale beyond \
                 their first market."
                    .to_string(),
            ),
            funding_type: Set(FundingType::VentureCapital),
            min_amount: Set(50000.0),
            max_amount: Set(500000.0),
            interest_rate: Set(0.0),
            term: Set(Some("Equity, 5-7 year horizon".to_string())),
            eligibility_criteria: Set(Some(serde_json::json!([
                "Incorporated company",
                "Demonstrated product-market fit",
                "Scalable business model"
            ]))),
            required_documents: Set(Some(serde_json::json!([
                "Pitch deck",
                "Cap table",
                "Three-year financial projections"
            ]))),
            application_process: Set(Some(
                "Submit a pitch deck; selected founders are invited to a partner \
                 meeting and due diligence."
                    .to_string(),
            )),
            provider: Set(Some("FemFund Ventures".to_string())),
            is_active: Set(true),
            ..Default::default()
        },
        funding_option::ActiveModel {
            name: Set("Peer Lending Circle".to_string()),
            description: Set(
                "Loans funded by individual investors through the platform, with \
                 community-set terms."
                    .to_string(),
            ),
            funding_type: Set(FundingType::PeerToPeer),
            min_amount: Set(500.0),
            max_amount: Set(20000.0),
            interest_rate: Set(7.9),
            term: Set(Some("3-24 months".to_string())),
            eligibility_criteria: Set(Some(serde_json::json!([
                "Verified platform account",
                "Complete business profile"
            ]))),
            required_documents: Set(Some(serde_json::json!([
                "Government-issued ID",
                "Proof of business activity"
            ]))),
            application_process: Set(Some(
                "Publish a funding request; investors pledge until the target is \
                 reached."
                    .to_string(),
            )),
            provider: Set(None),
            is_active: Set(true),
            ..Default::default()
        },
    ];
    let option_count = options.len();
    for option in options {
        option.insert(&db).await?;
    }
    info!("{} funding options created", option_count);

    let resources = vec![
        learning_resource::ActiveModel {
            title: Set("Reading a Cash Flow Statement".to_string()),
            description: Set(
                "Understand where money enters and leaves your business each month.".to_string(),
            ),
            content: Set(
                "A cash flow statement tracks operating, investing and financing \
                 activity. Start with operating cash flow: it tells you whether the \
                 core business pays for itself..."
                    .to_string(),
            ),
            category: Set(ResourceCategory::Basics),
            duration: Set(Some("10 min".to_string())),
            url: Set(None),
            resource_type: Set(ResourceKind::Article),
            is_published: Set(true),
            ..Default::default()
        },
        learning_resource::ActiveModel {
            title: Set("Pricing Your Product for Profit".to_string()),
            description: Set(
                "A practical walkthrough of cost-plus and value-based pricing.".to_string(),
            ),
            content: Set(
                "Most first-time founders underprice. Begin from your fully loaded \
                 costs, add the margin your growth plan needs, then test against what \
                 the market will bear..."
                    .to_string(),
            ),
            category: Set(ResourceCategory::Business),
            duration: Set(Some("25 min".to_string())),
            url: Set(None),
            resource_type: Set(ResourceKind::Course),
            is_published: Set(true),
            ..Default::default()
        },
        learning_resource::ActiveModel {
            title: Set("How Lenders Read Your Credit Profile".to_string()),
            description: Set(
                "What debt-to-income and debt-to-asset ratios say about your application."
                    .to_string(),
            ),
            content: Set(
                "Two ratios dominate most automated assessments: liabilities against \
                 annualized income, and liabilities against total assets. Keeping both \
                 low is the fastest way to improve your standing..."
                    .to_string(),
            ),
            category: Set(ResourceCategory::Credit),
            duration: Set(Some("8 min".to_string())),
            url: Set(None),
            resource_type: Set(ResourceKind::Article),
            is_published: Set(true),
            ..Default::default()
        },
    ];
    let resource_count = resources.len();
    for resource in resources {
        resource.insert(&db).await?;
    }
    info!("{} learning resources created", resource_count);

    info!("Seeding complete");
    Ok(())
}
