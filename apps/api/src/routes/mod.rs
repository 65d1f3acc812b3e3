//! HTTP routes, one module per resource.

pub mod categories;
pub mod health;
pub mod products;
pub mod sales;
pub mod stores;
pub mod users;
