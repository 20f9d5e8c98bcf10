//! Vitrine Client State
//!
//! The tenant context resolution and per-tenant state isolation core:
//! - `TenantResolver`: which tenant does this navigation belong to
//! - `SettingsCascade`: effective language/currency for that tenant
//! - `TenantCartStore`: one isolated, durable cart per tenant
//! - `Storefront`: wires the three together per navigation event

pub mod cart;
pub mod resolver;
pub mod settings;
pub mod storefront;

pub use cart::{CartLine, ProductSnapshot, TenantCart, TenantCartStore};
pub use resolver::{Navigation, TenantResolver};
pub use settings::SettingsCascade;
pub use storefront::{Activation, Storefront};
