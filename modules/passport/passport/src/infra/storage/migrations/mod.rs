use sea_orm_migration::prelude::*;

mod m20260105_000001_create_passport_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260105_000001_create_passport_tables::Migration)]
    }

    // Per-module history table.
    fn migration_table_name() -> DynIden {
        Alias::new("passport_seaql_migrations").into_iden()
    }
}
