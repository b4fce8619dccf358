pub use sea_orm_migration::prelude::*;

mod m20261019_000000_bootstrap;
mod m20261019_000001_create_notes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000000_bootstrap::Migration),
            Box::new(m20261019_000001_create_notes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "m20261019_000000_bootstrap",
                "m20261019_000001_create_notes"
            ]
        );
    }
}
