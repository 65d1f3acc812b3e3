//! # Validation Module
//!
//! Input validation utilities for Shopfloor.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                       │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation, before any query     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock_quantity >= 0) constraints                │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewProduct, ProductUpdate};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a store name.
///
/// ## Example
/// ```rust
/// use shopfloor_core::validation::validate_store_name;
///
/// assert!(validate_store_name("Corner Shop").is_ok());
/// assert!(validate_store_name("   ").is_err());
/// ```
pub fn validate_store_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

pub fn validate_fullname(name: &str) -> ValidationResult<()> {
    validate_name("fullname", name)
}

/// Validates an email address.
///
/// Deliberately shallow: one `@`, non-empty local part, a dot in the domain,
/// no whitespace. Deliverability is not our concern.
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required(field));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "not an email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a new product before insert.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_non_negative("priceCents", product.price_cents)?;
    validate_non_negative("costPriceCents", product.cost_price_cents)?;
    validate_non_negative("stockQuantity", product.stock_quantity)?;
    Ok(())
}

/// Validates the fields present in a product update.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_name("name", name)?;
    }
    if let Some(price) = update.price_cents {
        validate_non_negative("priceCents", price)?;
    }
    if let Some(cost) = update.cost_price_cents {
        validate_non_negative("costPriceCents", cost)?;
    }
    if let Some(stock) = update.stock_quantity {
        validate_non_negative("stockQuantity", stock)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "cashier@shop.io").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "no-at-sign").is_err());
        assert!(validate_email("email", "a@b").is_err());
        assert!(validate_email("email", "a b@c.io").is_err());
        assert!(validate_email("email", "@c.io").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::TooShort {
                field: "password".into(),
                min: 8
            })
        );
    }

    #[test]
    fn test_validate_new_product() {
        let mut product = NewProduct {
            name: "Cola".into(),
            price_cents: 100,
            cost_price_cents: 60,
            stock_quantity: 5,
            category_id: None,
        };
        assert!(validate_new_product(&product).is_ok());

        product.stock_quantity = -1;
        assert!(matches!(
            validate_new_product(&product),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_store_name_length() {
        assert!(validate_store_name(&"x".repeat(200)).is_ok());
        assert!(validate_store_name(&"x".repeat(201)).is_err());
    }
}
