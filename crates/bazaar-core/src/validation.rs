//! # Validation Module
//!
//! Input validation utilities for Bazaar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Shape checks (deserialization)                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Aggregates (Cart / Order)                                    │
//! │  └── THIS MODULE: Business rule validation before any mutation         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── PRIMARY KEY constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_owner_id, validate_quantity};
//!
//! validate_owner_id("u1").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted opaque identifier (owner or product).
const MAX_IDENTIFIER_LEN: usize = 128;

// =============================================================================
// Identifier Validators
// =============================================================================

fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

/// Validates an owner identifier supplied by the identity boundary.
///
/// The identifier is opaque: only emptiness and length are checked.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_owner_id;
///
/// assert!(validate_owner_id("u1").is_ok());
/// assert!(validate_owner_id("   ").is_err());
/// ```
pub fn validate_owner_id(owner_id: &str) -> ValidationResult<()> {
    validate_identifier("userId", owner_id)
}

/// Validates a product identifier.
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    validate_identifier("productId", product_id)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity to add or order.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ```text
/// add(u1, p1, qty)
///      │
///      ├── qty <= 0?   → MustBePositive
///      ├── qty > 999?  → OutOfRange
///      └── OK → merge into cart
/// ```
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

/// Validates an absolute quantity for `update`.
///
/// Zero is allowed here: it removes the line.
pub fn validate_new_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - At most `MAX_UNIT_PRICE` cents
///
/// ## Example
/// ```rust
/// use bazaar_core::money::Money;
/// use bazaar_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_ok());
/// assert!(validate_unit_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    Ok(())
}

/// Validates a caller-supplied order total.
///
/// ## Rules
/// - Must be present
/// - Must be non-negative
pub fn validate_order_total(total: Option<Money>) -> ValidationResult<Money> {
    let total = total.ok_or_else(|| ValidationError::Required {
        field: "total".to_string(),
    })?;

    if total.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "total".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_owner_id() {
        assert!(validate_owner_id("u1").is_ok());
        assert!(validate_owner_id("0b7f1c4e-auth-subject").is_ok());

        assert!(validate_owner_id("").is_err());
        assert!(validate_owner_id("   ").is_err());
        assert!(validate_owner_id(&"u".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("p1").is_ok());
        assert!(matches!(
            validate_product_id(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_new_quantity_allows_zero() {
        assert!(validate_new_quantity(0).is_ok());
        assert!(validate_new_quantity(3).is_ok());
        assert!(validate_new_quantity(-2).is_err());
    }

    #[test]
    fn test_validate_unit_price_bounds() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(MAX_UNIT_PRICE)).is_ok());

        assert!(matches!(
            validate_unit_price(Money::from_cents(MAX_UNIT_PRICE + 1)),
            Err(ValidationError::OutOfRange { max: MAX_UNIT_PRICE, .. })
        ));
        assert!(validate_unit_price(Money::from_cents(i64::MAX / 2 + 1)).is_err());
        assert!(validate_unit_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_order_total() {
        assert_eq!(
            validate_order_total(Some(Money::from_cents(9499))).unwrap(),
            Money::from_cents(9499)
        );
        assert!(validate_order_total(Some(Money::zero())).is_ok());
        assert!(matches!(
            validate_order_total(None),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_order_total(Some(Money::from_cents(-1))).is_err());
    }
}
