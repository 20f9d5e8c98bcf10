//! Per-tenant shopping cart with durable, isolated storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vitrine_core::keyed_store::KeyedStore;
use vitrine_core::tenant::TenantCode;

/// The slice of a catalog product the cart captures at add time.
///
/// The cart is a price snapshot: once a line exists, later catalog price
/// changes never touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    /// Catalog product identifier
    pub product_id: String,

    /// Display name at add time
    pub name: String,

    /// USD reference price at add time
    pub unit_price: f64,
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog product identifier, unique within the cart
    pub product_id: String,

    /// Display name captured at add time
    pub name: String,

    /// USD reference price captured at add time, immutable afterwards
    pub unit_price: f64,

    /// Quantity, at least 1 (a zero-quantity line is removed instead)
    pub quantity: u32,

    /// Per-line discount, clamped so the subtotal never goes negative
    pub line_discount: f64,

    /// `quantity * unit_price - line_discount`, floored at zero
    pub subtotal: f64,
}

impl CartLine {
    fn recompute(&mut self) {
        let gross = f64::from(self.quantity) * self.unit_price;
        self.line_discount = self.line_discount.clamp(0.0, gross);
        self.subtotal = gross - self.line_discount;
    }
}

/// The persisted cart of one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCart {
    /// Tenant this cart belongs to; doubles as the storage namespace
    pub tenant_code: TenantCode,

    /// Cart lines, unique by product id
    pub lines: Vec<CartLine>,

    /// Order-level discount
    pub order_discount: f64,

    /// Order-level tax
    pub order_tax: f64,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl TenantCart {
    /// A fresh, empty cart for a tenant
    pub fn new(tenant_code: TenantCode) -> Self {
        Self {
            tenant_code,
            lines: Vec::new(),
            order_discount: 0.0,
            order_tax: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// Sum of line subtotals
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// `subtotal - order_discount + order_tax`
    pub fn total(&self) -> f64 {
        self.subtotal() - self.order_discount + self.order_tax
    }

    /// Sum of line quantities, saturating at `u32::MAX`
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }
}

/// Maintains exactly one in-memory cart, matching the currently resolved
/// tenant, backed by a `KeyedStore` under the tenant's code.
///
/// Every mutation is written through to storage before returning, so a
/// reload or duplicated tab never loses an acknowledged change. When storage
/// is unavailable the cart silently degrades to in-memory for the session;
/// cart operations themselves never fail.
pub struct TenantCartStore {
    store: Arc<dyn KeyedStore>,
    active: Mutex<Option<TenantCart>>,
}

impl TenantCartStore {
    /// Create a cart store over the given keyed store
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self {
            store,
            active: Mutex::new(None),
        }
    }

    /// Tenant of the currently active cart, if any
    pub async fn active_tenant(&self) -> Option<TenantCode> {
        let active = self.active.lock().await;
        active.as_ref().map(|cart| cart.tenant_code.clone())
    }

    /// Switch the active cart to `code`'s tenant.
    ///
    /// No-op when `code` is already active. Otherwise the current cart is
    /// flushed under the previous tenant's namespace, then `code`'s
    /// persisted cart is loaded (or a fresh one created lazily). The lock is
    /// held across the whole swap, so no caller ever observes a state mixing
    /// two tenants.
    pub async fn set_active_tenant(&self, code: &TenantCode) {
        let mut active = self.active.lock().await;

        if active.as_ref().is_some_and(|cart| &cart.tenant_code == code) {
            return;
        }

        if let Some(previous) = active.take() {
            debug!(from = %previous.tenant_code, to = %code, "switching tenant cart");
            self.persist(&previous).await;
        }

        *active = Some(self.load(code).await);
    }

    /// Add `qty` of a product. An existing line grows its quantity with its
    /// discount preserved; a new line starts without a discount.
    pub async fn add_item(&self, product: &ProductSnapshot, qty: u32) {
        if qty == 0 {
            return;
        }
        self.mutate(|cart| {
            match cart
                .lines
                .iter_mut()
                .find(|line| line.product_id == product.product_id)
            {
                Some(line) => {
                    line.quantity = line.quantity.saturating_add(qty);
                    line.recompute();
                }
                None => {
                    let mut line = CartLine {
                        product_id: product.product_id.clone(),
                        name: product.name.clone(),
                        unit_price: product.unit_price,
                        quantity: qty,
                        line_discount: 0.0,
                        subtotal: 0.0,
                    };
                    line.recompute();
                    cart.lines.push(line);
                }
            }
        })
        .await;
    }

    /// Remove a line; absent product ids are a no-op
    pub async fn remove_item(&self, product_id: &str) {
        self.mutate(|cart| {
            cart.lines.retain(|line| line.product_id != product_id);
        })
        .await;
    }

    /// Set a line's quantity; `qty <= 0` removes the line
    pub async fn update_quantity(&self, product_id: &str, qty: i64) {
        if qty <= 0 {
            self.remove_item(product_id).await;
            return;
        }
        let qty = u32::try_from(qty).unwrap_or(u32::MAX);
        self.mutate(|cart| {
            if let Some(line) = cart
                .lines
                .iter_mut()
                .find(|line| line.product_id == product_id)
            {
                line.quantity = qty;
                line.recompute();
            }
        })
        .await;
    }

    /// Set a line's discount, clamped so the subtotal never goes negative
    pub async fn update_line_discount(&self, product_id: &str, discount: f64) {
        self.mutate(|cart| {
            if let Some(line) = cart
                .lines
                .iter_mut()
                .find(|line| line.product_id == product_id)
            {
                line.line_discount = discount.max(0.0);
                line.recompute();
            }
        })
        .await;
    }

    /// Set the order-level discount
    pub async fn set_order_discount(&self, discount: f64) {
        self.mutate(|cart| cart.order_discount = discount.max(0.0))
            .await;
    }

    /// Set the order-level tax
    pub async fn set_order_tax(&self, tax: f64) {
        self.mutate(|cart| cart.order_tax = tax.max(0.0)).await;
    }

    /// Empty the cart and reset order-level discount/tax. The record and the
    /// active tenant stay.
    pub async fn clear(&self) {
        self.mutate(|cart| {
            cart.lines.clear();
            cart.order_discount = 0.0;
            cart.order_tax = 0.0;
        })
        .await;
    }

    /// Snapshot of the active cart's lines (the order-construction read model)
    pub async fn lines(&self) -> Vec<CartLine> {
        let active = self.active.lock().await;
        active.as_ref().map(|cart| cart.lines.clone()).unwrap_or_default()
    }

    /// Sum of line subtotals of the active cart
    pub async fn subtotal(&self) -> f64 {
        let active = self.active.lock().await;
        active.as_ref().map(TenantCart::subtotal).unwrap_or(0.0)
    }

    /// `subtotal - order_discount + order_tax` of the active cart
    pub async fn total(&self) -> f64 {
        let active = self.active.lock().await;
        active.as_ref().map(TenantCart::total).unwrap_or(0.0)
    }

    /// Sum of line quantities of the active cart
    pub async fn total_items(&self) -> u32 {
        let active = self.active.lock().await;
        active.as_ref().map(TenantCart::total_items).unwrap_or(0)
    }

    /// Apply a mutation to the active cart and write it through to storage.
    /// With no active tenant there is nothing to mutate; callers are
    /// expected to have awaited `set_active_tenant` first.
    async fn mutate(&self, f: impl FnOnce(&mut TenantCart)) {
        let mut active = self.active.lock().await;
        let Some(cart) = active.as_mut() else {
            warn!("cart mutation ignored: no active tenant");
            return;
        };
        f(cart);
        cart.updated_at = Utc::now();
        self.persist(cart).await;
    }

    /// Write a cart blob under its tenant's namespace. Storage failures are
    /// logged and swallowed: the session keeps its in-memory cart.
    async fn persist(&self, cart: &TenantCart) {
        let blob = match serde_json::to_vec(cart) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(tenant = %cart.tenant_code, error = %e, "failed to encode cart");
                return;
            }
        };
        if let Err(e) = self.store.set(cart.tenant_code.as_str(), blob).await {
            warn!(
                tenant = %cart.tenant_code,
                error = %e,
                "cart storage unavailable, keeping in-memory only"
            );
        }
    }

    /// Load a tenant's persisted cart, or create a fresh one lazily. An
    /// unreadable or corrupt blob degrades to an empty cart rather than
    /// failing the switch.
    async fn load(&self, code: &TenantCode) -> TenantCart {
        match self.store.get(code.as_str()).await {
            Ok(Some(blob)) => match serde_json::from_slice(&blob) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(tenant = %code, error = %e, "corrupt cart blob, starting empty");
                    TenantCart::new(code.clone())
                }
            },
            Ok(None) => TenantCart::new(code.clone()),
            Err(e) => {
                warn!(tenant = %code, error = %e, "cart storage unreadable, starting empty");
                TenantCart::new(code.clone())
            }
        }
    }
}
