//! Document repository for database operations.
//!
//! Implements document CRUD operations using SeaORM.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use veritax_shared::Identity;

use crate::entities::{documents, sea_orm_active_enums::DocumentCategory as DbDocumentCategory};
use veritax_core::document::{
    Document, DocumentCategory, DocumentError, DocumentFilter, DocumentPatch, NewDocument,
    DocumentRepository as DocumentRepoTrait,
};

/// Document repository implementation.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl DocumentRepoTrait for DocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document, DocumentError> {
        let now = chrono::Utc::now();
        let active_model = documents::ActiveModel {
            owner_email: Set(document.owner.email().to_string()),
            category: Set(to_db_category(document.category)),
            document_name: Set(document.document_name),
            amount: Set(document.amount),
            relevant_tax_year: Set(document.relevant_tax_year),
            file_url: Set(document.file_url),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentError> {
        let model = documents::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_all(
        &self,
        owner: &Identity,
        filter: DocumentFilter,
    ) -> Result<Vec<Document>, DocumentError> {
        let mut query =
            documents::Entity::find().filter(documents::Column::OwnerEmail.eq(owner.email()));

        if let Some(category) = filter.category {
            query = query.filter(documents::Column::Category.eq(to_db_category(category)));
        }
        if let Some(year) = filter.tax_year {
            query = query.filter(documents::Column::RelevantTaxYear.eq(year));
        }

        let models = query
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn update(
        &self,
        id: i64,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, DocumentError> {
        let Some(model) = documents::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut active_model = model.into_active_model();
        if let Some(category) = patch.category {
            active_model.category = Set(to_db_category(category));
        }
        if let Some(document_name) = patch.document_name {
            active_model.document_name = Set(document_name);
        }
        if let Some(amount) = patch.amount {
            active_model.amount = Set(amount);
        }
        if let Some(year) = patch.relevant_tax_year {
            active_model.relevant_tax_year = Set(Some(year));
        }
        if let Some(file_url) = patch.file_url {
            active_model.file_url = Set(file_url);
        }
        active_model.updated_at = Set(chrono::Utc::now().into());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(Some(to_domain(model)))
    }

    async fn delete(&self, id: i64) -> Result<bool, DocumentError> {
        let result = documents::Entity::delete_many()
            .filter(documents::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert domain category to database enum.
fn to_db_category(category: DocumentCategory) -> DbDocumentCategory {
    match category {
        DocumentCategory::Receipt => DbDocumentCategory::Receipt,
        DocumentCategory::BankStatement => DbDocumentCategory::BankStatement,
        DocumentCategory::TaxForm => DbDocumentCategory::TaxForm,
        DocumentCategory::Invoice => DbDocumentCategory::Invoice,
        DocumentCategory::Other => DbDocumentCategory::Other,
    }
}

/// Convert database category to domain enum.
fn from_db_category(category: &DbDocumentCategory) -> DocumentCategory {
    match category {
        DbDocumentCategory::Receipt => DocumentCategory::Receipt,
        DbDocumentCategory::BankStatement => DocumentCategory::BankStatement,
        DbDocumentCategory::TaxForm => DocumentCategory::TaxForm,
        DbDocumentCategory::Invoice => DocumentCategory::Invoice,
        DbDocumentCategory::Other => DocumentCategory::Other,
    }
}

/// Convert database model to domain model.
fn to_domain(model: documents::Model) -> Document {
    Document {
        id: model.id,
        owner: Identity::new(model.owner_email),
        category: from_db_category(&model.category),
        document_name: model.document_name,
        amount: model.amount,
        relevant_tax_year: model.relevant_tax_year,
        file_url: model.file_url,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}
