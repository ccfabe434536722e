pub use sea_orm_migration::prelude::*;

mod iden;
mod m20250301_000001_create_trip_tables;
mod m20250410_000002_trip_image_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_trip_tables::Migration),
            Box::new(m20250410_000002_trip_image_roles::Migration),
        ]
    }
}
