pub use sea_orm_migration::prelude::*;

mod m20250610_090000_create_users_table;
mod m20250610_090500_create_funding_options_table;
mod m20250610_091000_create_applications_table;
mod m20250610_091500_create_learning_resources_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250610_090000_create_users_table::Migration),
            Box::new(m20250610_090500_create_funding_options_table::Migration),
            Box::new(m20250610_091000_create_applications_table::Migration),
            Box::new(m20250610_091500_create_learning_resources_table::Migration),
        ]
    }
}
