//! # Domain Types
//!
//! Core domain types used throughout Shopfloor.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐    owns     ┌─────────────┐   has many  ┌───────────┐ │
//! │  │    User     │────────────►│    Store    │◄────────────│ Membership│ │
//! │  │  plan       │             │  (tenant)   │             │  role     │ │
//! │  └─────────────┘             └──────┬──────┘             └───────────┘ │
//! │                                     │ every row below carries store_id │
//! │                  ┌──────────────────┼──────────────────┐               │
//! │                  ▼                  ▼                  ▼               │
//! │           ┌────────────┐     ┌────────────┐     ┌────────────┐         │
//! │           │  Category  │◄────│  Product   │◄────│  SaleItem  │         │
//! │           └────────────┘     │  stock ≥ 0 │     │ price_at_  │         │
//! │                              └────────────┘     │ sale frozen│         │
//! │                                                 └─────┬──────┘         │
//! │                                                       ▼                │
//! │                                                 ┌────────────┐         │
//! │                                                 │    Sale    │         │
//! │                                                 │ immutable  │         │
//! │                                                 └────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ids are UUID v4 strings. Money fields are integer cents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Role of a user within one store membership.
///
/// Roles are a property of the membership, never of the user: the same user
/// can be Admin in one store and have no access at all in another. The store
/// owner always resolves to Admin.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owner or administrator: structural and destructive operations.
    Admin,
    /// Sales and reads.
    Cashier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Subscription tier of a user. Caps how many stores the user may own.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Basic,
    Standard,
    Premium,
}

impl Plan {
    /// Maximum number of stores a user on this plan may own.
    pub const fn store_limit(self) -> i64 {
        match self {
            Plan::Basic => 1,
            Plan::Standard => 3,
            Plan::Premium => 10,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Basic => write!(f, "basic"),
            Plan::Standard => write!(f, "standard"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "standard" => Ok(Plan::Standard),
            "premium" => Ok(Plan::Premium),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

// =============================================================================
// Payment Type
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Card,
    Upi,
    Other,
}

// =============================================================================
// User
// =============================================================================

/// A registered user. The password hash and refresh token never leave the
/// server.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub fullname: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    #[serde(skip)]
    #[ts(skip)]
    pub refresh_token: Option<String>,
    pub plan: Plan,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Store
// =============================================================================

/// A tenant. Exactly one owner; members are kept in a join table.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A store as seen by one user: the store plus the caller's effective role.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreMembership {
    pub store_id: String,
    pub store_name: String,
    pub owner_id: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A member row joined with the user's public fields.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    pub email: String,
    pub fullname: String,
    pub role: Role,
}

/// The resolved (user, store, role) binding for one operation.
///
/// Never persisted and never cached: the access resolver computes it fresh
/// for every request, so a removed member loses access immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreScope {
    pub user_id: String,
    pub store_id: String,
    pub role: Role,
}

// =============================================================================
// Category
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale in one store.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub category_id: Option<String>,
    pub name: String,
    /// Selling price in cents.
    pub price_cents: i64,
    /// Purchase cost in cents (margin reporting).
    pub cost_price_cents: i64,
    /// Never negative; only the sale engine's conditional decrement and
    /// admin updates change it.
    pub stock_quantity: i64,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    pub category_id: Option<String>,
}

/// Partial update for a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub category_id: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once created; an admin may only hide it.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    /// The cashier who recorded the sale.
    pub user_id: String,
    pub payment_type: PaymentType,
    pub total_cents: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Line items in request order. Loaded separately from the sale row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a sale.
///
/// ## Snapshot Pattern
/// `price_at_sale_cents` and `product_name` are copied from the product when
/// the sale is recorded, so history stays accurate after price changes.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
    /// Zero-based position of the line in the original request.
    pub position: i64,
}

impl SaleItem {
    /// Line total (price_at_sale × quantity).
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents.saturating_mul(self.quantity))
    }
}
