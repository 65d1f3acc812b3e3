//! Fixtures shared by the repository tests.

use crate::pool::{Database, DbConfig};
use shopfloor_core::{NewProduct, Product, Store, StoreScope, User};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_user(db: &Database, email: &str) -> User {
    // Fixed hash: argon2 is slow and these tests never log in.
    db.users()
        .create(email, "Test User", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
        .await
        .unwrap()
}

pub async fn seed_store(db: &Database, owner_id: &str, name: &str) -> Store {
    db.stores().create(owner_id, name).await.unwrap()
}

pub async fn seed_product(db: &Database, store_id: &str, name: &str, price: i64, stock: i64) -> Product {
    db.products()
        .create(
            store_id,
            &NewProduct {
                name: name.to_string(),
                price_cents: price,
                cost_price_cents: 0,
                stock_quantity: stock,
                category_id: None,
            },
        )
        .await
        .unwrap()
}

/// Owner, their store, and the owner's admin scope.
pub async fn seed_shop(db: &Database) -> (User, Store, StoreScope) {
    let owner = seed_user(db, "owner@shop.io").await;
    let store = seed_store(db, &owner.id, "Corner Shop").await;
    let scope = db
        .access()
        .resolve_scope(&owner.id, Some(&store.id))
        .await
        .unwrap();
    (owner, store, scope)
}
