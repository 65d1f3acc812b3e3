//! # Role Authorizer
//!
//! Pure, side-effect-free allow/deny decisions for store-scoped operations,
//! plus the plan-limit check that gates store creation.
//!
//! ## Allow Tables
//! ```text
//! ┌──────────────────────────────────────┬─────────┬─────────┐
//! │ Operation                            │  Admin  │ Cashier │
//! ├──────────────────────────────────────┼─────────┼─────────┤
//! │ RecordSale                           │   ✅    │   ✅    │
//! │ ViewSales / ViewProducts / ...       │   ✅    │   ✅    │
//! │ Create/Update/DeleteProduct          │   ✅    │   ❌    │
//! │ Create/Update/DeleteCategory         │   ✅    │   ❌    │
//! │ UpdateStore / DeleteStore            │   ✅    │   ❌    │
//! │ ManageMembers                        │   ✅    │   ❌    │
//! │ DeleteSale                           │   ✅    │   ❌    │
//! └──────────────────────────────────────┴─────────┴─────────┘
//! ```
//!
//! The check is membership in a per-operation allow-set, not a numeric
//! hierarchy. Adding a `Role` variant breaks every `match` below until the
//! new role is placed in each table.

use crate::error::CoreError;
use crate::types::{Plan, Role, StoreScope};

/// Every store-scoped operation the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RecordSale,
    ViewSales,
    DeleteSale,
    ViewProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ViewCategories,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    ViewStore,
    UpdateStore,
    DeleteStore,
    ManageMembers,
}

impl Operation {
    /// Whether `role` is in this operation's allow-set.
    pub const fn permits(self, role: Role) -> bool {
        match self {
            Operation::RecordSale
            | Operation::ViewSales
            | Operation::ViewProducts
            | Operation::ViewCategories
            | Operation::ViewStore => match role {
                Role::Admin => true,
                Role::Cashier => true,
            },
            Operation::DeleteSale
            | Operation::CreateProduct
            | Operation::UpdateProduct
            | Operation::DeleteProduct
            | Operation::CreateCategory
            | Operation::UpdateCategory
            | Operation::DeleteCategory
            | Operation::UpdateStore
            | Operation::DeleteStore
            | Operation::ManageMembers => match role {
                Role::Admin => true,
                Role::Cashier => false,
            },
        }
    }

    /// Short name used in denial messages and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::RecordSale => "record sale",
            Operation::ViewSales => "view sales",
            Operation::DeleteSale => "delete sale",
            Operation::ViewProducts => "view products",
            Operation::CreateProduct => "create product",
            Operation::UpdateProduct => "update product",
            Operation::DeleteProduct => "delete product",
            Operation::ViewCategories => "view categories",
            Operation::CreateCategory => "create category",
            Operation::UpdateCategory => "update category",
            Operation::DeleteCategory => "delete category",
            Operation::ViewStore => "view store",
            Operation::UpdateStore => "update store",
            Operation::DeleteStore => "delete store",
            Operation::ManageMembers => "manage members",
        }
    }
}

/// Authorizes `operation` for the resolved scope.
///
/// ## Returns
/// * `Ok(())` - the scope's role is in the operation's allow-set
/// * `Err(CoreError::AccessDenied)` - it is not
pub fn authorize(operation: Operation, scope: &StoreScope) -> Result<(), CoreError> {
    if operation.permits(scope.role) {
        Ok(())
    } else {
        Err(CoreError::access_denied(format!(
            "role '{}' may not {}",
            scope.role,
            operation.name()
        )))
    }
}

/// Checks that a user on `plan` who already owns `owned_stores` stores may
/// create one more.
///
/// Independent of role: any authenticated user can create a store within
/// their plan's ceiling.
pub fn check_store_limit(plan: Plan, owned_stores: i64) -> Result<(), CoreError> {
    let limit = plan.store_limit();
    if owned_stores >= limit {
        return Err(CoreError::PlanLimitExceeded {
            plan: plan.to_string(),
            limit,
        });
    }
    Ok(())
}
