// Export all entity modules
pub mod application;
pub mod funding_option;
pub mod learning_resource;
pub mod user;

pub use application::Entity as Application;
pub use funding_option::Entity as FundingOption;
pub use learning_resource::Entity as LearningResource;
pub use user::Entity as User;
