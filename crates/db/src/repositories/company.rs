//! Company repository for database operations.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::companies;

/// Company repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a duplicate name.
    pub async fn create(
        &self,
        name: &str,
        base_currency_code: &str,
        country: Option<&str>,
    ) -> Result<companies::Model, DbErr> {
        let now = chrono::Utc::now().into();
        companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            base_currency_code: Set(base_currency_code.trim().to_uppercase()),
            country: Set(country.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Finds a company by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<companies::Model>, DbErr> {
        companies::Entity::find()
            .filter(companies::Column::Name.eq(name))
            .one(&self.db)
            .await
    }
}
