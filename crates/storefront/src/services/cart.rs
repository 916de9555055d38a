//! Client-local cart, durable across restarts.
//!
//! The cart never touches the hosted backend: it lives in a JSON file under
//! the service data directory (storage key `snorty-cart`), mirroring the
//! browser-local cart of the shop client. The store is the single logical
//! owner of cart state - every mutation goes through its methods, so there
//! is no concurrent-writer hazard beyond the internal lock.
//!
//! Durability is write-behind: mutations snapshot the items and push the
//! snapshot through a debounced channel, so a burst of quantity changes
//! lands on disk as one write. [`CartStore::save`] flushes synchronously for
//! shutdown and tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snorty_core::{Price, ProductId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::backend::types::{Product, PLACEHOLDER_IMAGE};
use crate::debounce::debounce;

/// Storage key (file stem) for the serialized cart.
pub const CART_STORAGE_KEY: &str = "snorty-cart";

/// Quiet period before a mutation burst is flushed to disk.
const FLUSH_WINDOW: Duration = Duration::from_millis(500);

/// One line item in the cart.
///
/// Invariant: `quantity >= 1`. An item whose quantity would drop to zero is
/// removed from the collection instead of being stored at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
    pub seller: String,
}

impl CartItem {
    /// Build a line item (quantity 1) from a normalized product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            image: product
                .images
                .first()
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            quantity: 1,
            seller: product.seller.full_name.clone(),
        }
    }

    /// Line total for this item.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Durable client-local cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    path: PathBuf,
    items: Mutex<Vec<CartItem>>,
    flush: Mutex<Option<mpsc::Sender<Vec<CartItem>>>>,
}

impl CartStore {
    /// Open the cart file under `data_dir`, tolerating absence and damage.
    ///
    /// A missing file is an empty cart. Malformed JSON is discarded with a
    /// warning. Structurally invalid entries (missing id or title,
    /// non-numeric price or quantity, quantity < 1) are filtered out
    /// individually rather than failing the load.
    ///
    /// # Errors
    ///
    /// Returns an error only if the data directory cannot be created.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(format!("{CART_STORAGE_KEY}.json"));
        let items = load_items(&path);

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                path,
                items: Mutex::new(items),
                flush: Mutex::new(None),
            }),
        })
    }

    /// Start the debounced write-behind worker. Requires a tokio runtime.
    pub fn spawn_writer(&self) {
        let (tx, rx) = mpsc::channel::<Vec<CartItem>>(32);
        let mut snapshots = debounce(rx, FLUSH_WINDOW);
        let path = self.inner.path.clone();

        tokio::spawn(async move {
            while let Some(snapshot) = snapshots.recv().await {
                if let Err(error) = write_items(&path, &snapshot) {
                    warn!(%error, path = %path.display(), "cart flush failed");
                }
            }
        });

        if let Ok(mut slot) = self.inner.flush.lock() {
            *slot = Some(tx);
        }
    }

    /// Current line items, oldest first.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_items().clone()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock_items().iter().map(|item| item.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lock_items()
            .iter()
            .fold(Price::ZERO, |acc, item| acc.plus(item.line_total()))
    }

    /// Add a product to the cart.
    ///
    /// Adding a product already present increments that line's quantity
    /// instead of creating a second line.
    pub fn add(&self, item: CartItem) {
        {
            let mut items = self.lock_items();
            if let Some(existing) = items.iter_mut().find(|line| line.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity.max(1));
            } else {
                let mut item = item;
                item.quantity = item.quantity.max(1);
                items.push(item);
            }
        }
        self.queue_flush();
    }

    /// Set a line's quantity; non-positive values remove the line.
    ///
    /// Returns whether the line still exists afterwards.
    pub fn update_quantity(&self, id: &ProductId, quantity: i64) -> bool {
        let kept = {
            let mut items = self.lock_items();
            if quantity <= 0 {
                items.retain(|line| line.id != *id);
                false
            } else {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                match items.iter_mut().find(|line| line.id == *id) {
                    Some(line) => {
                        line.quantity = quantity;
                        true
                    }
                    None => false,
                }
            }
        };
        self.queue_flush();
        kept
    }

    /// Remove a line outright.
    pub fn remove(&self, id: &ProductId) {
        self.lock_items().retain(|line| line.id != *id);
        self.queue_flush();
    }

    /// Empty the cart (successful checkout, explicit clear).
    pub fn clear(&self) {
        self.lock_items().clear();
        self.queue_flush();
    }

    /// Write the cart to disk immediately.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the in-memory cart is unaffected.
    pub fn save(&self) -> io::Result<()> {
        let snapshot = self.items();
        write_items(&self.inner.path, &snapshot)
    }

    fn queue_flush(&self) {
        let snapshot = self.items();
        let Ok(slot) = self.inner.flush.lock() else {
            return;
        };
        if let Some(tx) = slot.as_ref()
            && let Err(error) = tx.try_send(snapshot)
        {
            // Channel full or writer gone; a later mutation will re-queue.
            debug!(%error, "cart flush queue unavailable");
        }
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        // Mutex poisoning cannot leave the cart in a torn state: every
        // critical section completes its mutation before unlocking.
        match self.inner.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Load and validate cart entries; anything unusable is dropped.
fn load_items(path: &Path) -> Vec<CartItem> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(error) => {
            warn!(%error, path = %path.display(), "cart file unreadable, starting empty");
            return Vec::new();
        }
    };

    let entries: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(%error, path = %path.display(), "cart file malformed, starting empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<CartItem>(entry) {
            Ok(item) if item.quantity >= 1 && !item.id.is_empty() && !item.title.is_empty() => {
                Some(item)
            }
            Ok(item) => {
                warn!(id = %item.id, "dropping cart entry violating invariants");
                None
            }
            Err(error) => {
                warn!(%error, "dropping structurally invalid cart entry");
                None
            }
        })
        .collect()
}

fn write_items(path: &Path, items: &[CartItem]) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(items).map_err(io::Error::other)?;
    fs::write(path, json)
}
