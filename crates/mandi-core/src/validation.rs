//! # Validation Module
//!
//! Input checks applied before a request is built.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / presentation                                           │
//! │  └── Parsing (clap types, numbers)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields present                                           │
//! │  └── Quantities, query length, upload file type                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (pydantic schemas, database)                         │
//! │  └── Authoritative: its `detail` message wins                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mandi_core::validation::{validate_quantity, validate_search_query};
//!
//! validate_quantity(5).unwrap();
//! assert_eq!(validate_search_query("  mango ").unwrap(), "mango");
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted value for free-text form fields.
pub const MAX_FIELD_LEN: usize = 200;

/// Longest accepted search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Spreadsheet extensions the product ingestion endpoint reads.
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a form field is present and not overly long.
///
/// ## Returns
/// The trimmed value.
///
/// ## Example
/// ```rust
/// use mandi_core::validation::validate_required;
///
/// assert_eq!(validate_required("city", " Pune ").unwrap(), "Pune");
/// assert!(validate_required("city", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FIELD_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address.
///
/// Only the shape `local@domain.tld` is checked; the backend has the final
/// word.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required("email", email)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(email)
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits, spaces, hyphens and a leading `+`
/// - Between 7 and 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_required("phone", phone)?;

    let body = phone.strip_prefix('+').unwrap_or(&phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain 7 to 15 digits".to_string(),
        });
    }

    Ok(phone)
}

/// Validates a search query.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.is_empty() {
        return Err(ValidationError::Required {
            field: "query".to_string(),
        });
    }

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a category name used as a path segment.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    let category = validate_required("category", category)?;

    if category.contains('/') {
        return Err(ValidationError::InvalidFormat {
            field: "category".to_string(),
            reason: "must not contain '/'".to_string(),
        });
    }

    Ok(category)
}

/// Checks that an upload is an Excel spreadsheet by its file name.
///
/// ## Example
/// ```rust
/// use mandi_core::validation::validate_spreadsheet_name;
///
/// assert!(validate_spreadsheet_name("products.xlsx").is_ok());
/// assert!(validate_spreadsheet_name("PRODUCTS.XLS").is_ok());
/// assert!(validate_spreadsheet_name("products.csv").is_err());
/// ```
pub fn validate_spreadsheet_name(file_name: &str) -> ValidationResult<()> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "file".to_string(),
            reason: "please upload an Excel file (.xlsx or .xls)".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity for a cart line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates pagination arguments for listing endpoints.
pub fn validate_page(skip: i64, limit: i64) -> ValidationResult<()> {
    if skip < 0 {
        return Err(ValidationError::OutOfRange {
            field: "skip".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if !(1..=100).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
