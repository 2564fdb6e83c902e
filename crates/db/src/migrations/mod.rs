//! Database migrations.
//!
//! Tables are created in foreign key order; the category migration also
//! seeds the fixed category list.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_organization_table;
mod m20250101_000002_create_user_table;
mod m20250101_000003_create_category_table;
mod m20250101_000004_create_donation_request_table;
mod m20250101_000005_create_donation_table;
mod m20250101_000006_create_story_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_organization_table::Migration),
            Box::new(m20250101_000002_create_user_table::Migration),
            Box::new(m20250101_000003_create_category_table::Migration),
            Box::new(m20250101_000004_create_donation_request_table::Migration),
            Box::new(m20250101_000005_create_donation_table::Migration),
            Box::new(m20250101_000006_create_story_table::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_run_in_foreign_key_order() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(
            names,
            [
                "m20250101_000001_create_organization_table",
                "m20250101_000002_create_user_table",
                "m20250101_000003_create_category_table",
                "m20250101_000004_create_donation_request_table",
                "m20250101_000005_create_donation_table",
                "m20250101_000006_create_story_table",
            ]
        );
    }
}
