//! The cart store: a single owner of the cart behind a command queue.
//!
//! [`CartStore`] is a cheap handle. Every mutation is sent as a command to one
//! worker task which applies it to the current cart, publishes the result to
//! subscribers, and writes the full cart to storage before taking the next
//! command. Callers never mutate a snapshot they captured earlier, so
//! concurrent mutations cannot overwrite each other.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use pocket_cart_core::{LineItem, NewLineItem, ProductId};

use crate::cart::{Cart, CartAction, DecrementPolicy};
use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;

/// Handle to a running cart store.
///
/// Clones share the same cart. The worker stops once every handle has been
/// dropped or [`CartStore::shutdown`] is called.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Cart>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

enum Command {
    Apply {
        action: CartAction,
        reply: oneshot::Sender<Result<Cart>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

impl CartStore {
    /// Open a cart store over `storage`, hydrating it from the configured key.
    ///
    /// A missing, unreadable, or malformed stored cart is logged and replaced
    /// by an empty cart; opening never fails.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(storage, config), fields(key = %config.storage_key))]
    pub async fn open<S>(storage: S, config: CartConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let cart = hydrate(&storage, &config.storage_key).await;
        let (publisher, state) = watch::channel(cart.clone());
        let (commands, receiver) = mpsc::channel(config.queue_capacity.max(1));

        let worker = CartWorker {
            cart,
            storage,
            key: config.storage_key,
            policy: config.decrement_policy,
            commands: receiver,
            state: publisher,
        };
        let handle = tokio::spawn(worker.run());

        Self {
            inner: Arc::new(CartStoreInner {
                commands,
                state,
                worker: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Snapshot of the current line-items.
    #[must_use]
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.state.borrow().items().to_vec()
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to cart changes.
    ///
    /// The subscription starts at the current cart and yields each cart
    /// published after it was created. It ends when the worker stops.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        let mut receiver = self.inner.state.clone();
        receiver.mark_unchanged();
        CartSubscription { receiver }
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by one;
    /// otherwise it is appended with quantity one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the updated cart could not be
    /// written (the update is still applied in memory), or
    /// [`CartError::Closed`] if the store has shut down.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewLineItem) -> Result<Cart> {
        self.dispatch(CartAction::Add(item)).await
    }

    /// Add one unit of a product already in the cart. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_to_cart`].
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Result<Cart> {
        self.dispatch(CartAction::Increment(id.clone())).await
    }

    /// Take one unit of a product away. Unknown ids are ignored.
    ///
    /// What happens to the last unit depends on the configured
    /// [`DecrementPolicy`].
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_to_cart`].
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Result<Cart> {
        self.dispatch(CartAction::Decrement(id.clone())).await
    }

    /// Drop a product from the cart. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_to_cart`].
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<Cart> {
        self.dispatch(CartAction::Remove(id.clone())).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_to_cart`].
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart> {
        self.dispatch(CartAction::Clear).await
    }

    /// Stop the worker after it has processed every queued command.
    ///
    /// Operations issued afterwards on any handle return
    /// [`CartError::Closed`]. Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        let (reply, done) = oneshot::channel();
        if self
            .inner
            .commands
            .send(Command::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = done.await;
        }

        let handle = self.inner.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Cart worker terminated abnormally");
            }
        }
    }

    async fn dispatch(&self, action: CartAction) -> Result<Cart> {
        let (reply, response) = oneshot::channel();
        self.inner
            .commands
            .send(Command::Apply { action, reply })
            .await
            .map_err(|_| CartError::Closed)?;
        response.await.map_err(|_| CartError::Closed)?
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.inner.state.borrow().len())
            .field("closed", &self.inner.commands.is_closed())
            .finish()
    }
}

/// Stream of cart snapshots, one per applied change.
///
/// Intermediate snapshots may be skipped if the subscriber falls behind; the
/// next call to [`CartSubscription::changed`] always yields the latest cart.
#[derive(Debug, Clone)]
pub struct CartSubscription {
    receiver: watch::Receiver<Cart>,
}

impl CartSubscription {
    /// The most recently published cart.
    #[must_use]
    pub fn current(&self) -> Cart {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change and return the new cart.
    ///
    /// Returns `None` once the store has shut down.
    pub async fn changed(&mut self) -> Option<Cart> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

/// Read the stored cart, falling back to an empty one.
async fn hydrate<S: KeyValueStore>(storage: &S, key: &str) -> Cart {
    match storage.get(key).await {
        Ok(Some(blob)) => match Cart::from_json(&blob) {
            Ok(cart) => {
                info!(items = cart.len(), "Hydrated cart from storage");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Stored cart is malformed, starting empty");
                Cart::new()
            }
        },
        Ok(None) => {
            debug!("No stored cart, starting empty");
            Cart::new()
        }
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            Cart::new()
        }
    }
}

/// Owns the cart and applies commands one at a time.
struct CartWorker<S> {
    cart: Cart,
    storage: S,
    key: String,
    policy: DecrementPolicy,
    commands: mpsc::Receiver<Command>,
    // Only sender; dropping it with the worker ends every subscription.
    state: watch::Sender<Cart>,
}

impl<S: KeyValueStore> CartWorker<S> {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Apply { action, reply } => {
                    let result = self.apply(action).await;
                    // The caller may have gone away; the change stands regardless.
                    let _ = reply.send(result);
                }
                Command::Shutdown { reply } => {
                    self.commands.close();
                    self.drain().await;
                    let _ = reply.send(());
                    break;
                }
            }
        }
        debug!("Cart worker stopped");
    }

    /// Apply whatever was queued before the channel closed.
    async fn drain(&mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Apply { action, reply } => {
                    let result = self.apply(action).await;
                    let _ = reply.send(result);
                }
                Command::Shutdown { reply } => {
                    let _ = reply.send(());
                }
            }
        }
    }

    async fn apply(&mut self, action: CartAction) -> Result<Cart> {
        let name = action.name();
        if !self.cart.apply(action, self.policy) {
            debug!(action = name, "Cart unchanged");
            return Ok(self.cart.clone());
        }

        self.state.send_replace(self.cart.clone());
        debug!(action = name, items = self.cart.len(), "Cart updated");

        self.persist().await.inspect_err(|e| {
            error!(action = name, error = %e, "Failed to persist cart");
        })?;

        Ok(self.cart.clone())
    }

    async fn persist(&self) -> Result<()> {
        let blob = self.cart.to_json()?;
        self.storage.set(&self.key, &blob).await?;
        Ok(())
    }
}
