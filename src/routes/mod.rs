// Export all route modules
pub mod applications;
pub mod funding;
pub mod learning;
