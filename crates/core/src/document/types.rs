//! Document types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use veritax_shared::Identity;

/// Document category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Receipt for a deductible expense.
    Receipt,
    /// Bank statement.
    BankStatement,
    /// Official tax form.
    TaxForm,
    /// Invoice document.
    Invoice,
    /// Other document type.
    Other,
}

impl DocumentCategory {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::BankStatement => "bank_statement",
            Self::TaxForm => "tax_form",
            Self::Invoice => "invoice",
            Self::Other => "other",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(Self::Receipt),
            "bank_statement" => Some(Self::BankStatement),
            "tax_form" => Some(Self::TaxForm),
            "invoice" => Some(Self::Invoice),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Document domain model.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier.
    pub id: i64,
    /// Identity of the owning user.
    pub owner: Identity,
    /// Document category.
    pub category: DocumentCategory,
    /// Human-readable document name.
    pub document_name: String,
    /// Monetary amount associated with the document.
    pub amount: Decimal,
    /// Tax year the document relates to.
    pub relevant_tax_year: Option<i32>,
    /// Locator of the stored file.
    pub file_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a document record.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Identity of the owning user.
    pub owner: Identity,
    /// Document category.
    pub category: DocumentCategory,
    /// Human-readable document name.
    pub document_name: String,
    /// Monetary amount associated with the document.
    pub amount: Decimal,
    /// Tax year the document relates to.
    pub relevant_tax_year: Option<i32>,
    /// Locator of the stored file.
    pub file_url: String,
}

/// Partial update of a document record.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    /// New category.
    pub category: Option<DocumentCategory>,
    /// New document name.
    pub document_name: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New tax year.
    pub relevant_tax_year: Option<i32>,
    /// New file locator.
    pub file_url: Option<String>,
}

/// Filter criteria for listing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFilter {
    /// Restrict to one category.
    pub category: Option<DocumentCategory>,
    /// Restrict to one tax year.
    pub tax_year: Option<i32>,
}

/// An uploaded file payload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// MIME type of the file.
    pub content_type: String,
    /// Raw file content.
    pub content: Bytes,
}

/// Input for uploading a new document.
#[derive(Debug, Clone)]
pub struct UploadDocumentInput {
    /// Document category.
    pub category: DocumentCategory,
    /// Human-readable document name.
    pub document_name: String,
    /// Monetary amount associated with the document.
    pub amount: Decimal,
    /// Tax year the document relates to.
    pub relevant_tax_year: Option<i32>,
    /// The uploaded file.
    pub file: FileUpload,
}

/// Input for updating an existing document.
///
/// Every field is optional; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// New category.
    pub category: Option<DocumentCategory>,
    /// New document name.
    pub document_name: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New tax year.
    pub relevant_tax_year: Option<i32>,
    /// Replacement file.
    pub file: Option<FileUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_category_roundtrip() {
        let categories = [
            DocumentCategory::Receipt,
            DocumentCategory::BankStatement,
            DocumentCategory::TaxForm,
            DocumentCategory::Invoice,
            DocumentCategory::Other,
        ];

        for category in categories {
            let s = category.as_str();
            let parsed = DocumentCategory::parse(s);
            assert_eq!(parsed, Some(category));
        }
    }

    #[test]
    fn test_document_category_unknown() {
        assert_eq!(DocumentCategory::parse("payslip"), None);
        assert_eq!(DocumentCategory::parse(""), None);
        assert_eq!(DocumentCategory::parse("Receipt"), None);
    }

    #[test]
    fn test_document_category_serde_snake_case() {
        let json = serde_json::to_string(&DocumentCategory::BankStatement).unwrap();
        assert_eq!(json, "\"bank_statement\"");

        let parsed: DocumentCategory = serde_json::from_str("\"tax_form\"").unwrap();
        assert_eq!(parsed, DocumentCategory::TaxForm);
    }
}
