//! Carts service.
//!
//! The only writer of cart and cart line state. Every operation runs in a
//! single transaction: the cart is fetched (or lazily created), the stock
//! ledger is consulted before any quantity grows, the mutation is applied and
//! the lines are reloaded before commit. Any error drops the transaction
//! uncommitted, which rolls the whole operation back.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{NewCartItem, NewCartLine},
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid, calculate_total},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        products::stock::StockLedger,
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    stock: StockLedger,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            stock: StockLedger::new(),
        }
    }

    async fn cart_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        if let Some(cart) = self.carts_repository.find_cart_by_user(tx, user).await? {
            return Ok(cart);
        }

        let cart = self
            .carts_repository
            .create_cart(tx, CartUuid::new(), user)
            .await?;

        info!(cart = %cart.uuid, "cart created");

        Ok(cart)
    }

    /// Look up a line and confirm it sits in `cart`.
    async fn owned_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &CartRecord,
        line: CartItemUuid,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let item = self
            .items_repository
            .find_cart_item(tx, line)
            .await?
            .ok_or(CartsServiceError::LineNotFound)?;

        if item.cart_uuid != cart.uuid {
            return Err(CartsServiceError::OwnershipViolation);
        }

        Ok(item)
    }

    /// Reload the lines of a mutated cart and commit.
    async fn finish(
        &self,
        mut tx: Transaction<'static, Postgres>,
        mut cart: CartRecord,
    ) -> Result<CartRecord, CartsServiceError> {
        self.carts_repository.touch_cart(&mut tx, cart.uuid).await?;

        cart.items = self
            .items_repository
            .list_cart_items(&mut tx, cart.uuid)
            .await?;

        // A total that cannot be represented must never be committed.
        if cart.total().is_none() {
            return Err(CartsServiceError::Validation { field: "quantity" });
        }

        tx.commit().await?;

        Ok(cart)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[instrument(skip(self), fields(user = %user), err)]
    async fn get_or_create_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self.cart_for_user(&mut tx, user).await?;

        cart.items = self
            .items_repository
            .list_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[instrument(skip(self), fields(user = %user, product = %item.product_uuid), err)]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError> {
        let requested = item.requested_quantity()?;

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.cart_for_user(&mut tx, user).await?;

        let existing = self
            .items_repository
            .find_cart_item_for_product(&mut tx, cart.uuid, item.product_uuid)
            .await?;

        let held = existing.as_ref().map_or(0, |line| u64::from(line.quantity));
        let cumulative = held + u64::from(requested);

        let product = self
            .stock
            .check_available(&mut tx, item.product_uuid, cumulative)
            .await?;

        match existing {
            Some(line) => {
                // Bounded by the product's stock, so it fits a u32.
                let quantity = u32::try_from(cumulative)
                    .ok()
                    .ok_or(CartsServiceError::Validation { field: "quantity" })?;

                self.items_repository
                    .update_cart_item_quantity(&mut tx, line.uuid, quantity)
                    .await?;

                info!(cart = %cart.uuid, item = %line.uuid, quantity, "cart item incremented");
            }
            None => {
                let uuid = CartItemUuid::new();

                self.items_repository
                    .create_cart_item(
                        &mut tx,
                        NewCartLine {
                            uuid,
                            cart_uuid: cart.uuid,
                            product_uuid: product.uuid,
                            quantity: requested,
                            unit_price: product.price,
                        },
                    )
                    .await?;

                info!(
                    cart = %cart.uuid,
                    item = %uuid,
                    quantity = requested,
                    unit_price = product.price,
                    "cart item added"
                );
            }
        }

        self.finish(tx, cart).await
    }

    #[instrument(skip(self), fields(user = %user, item = %line), err)]
    async fn update_item_quantity(
        &self,
        user: UserUuid,
        line: CartItemUuid,
        new_quantity: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.cart_for_user(&mut tx, user).await?;
        let item = self.owned_line(&mut tx, &cart, line).await?;

        // The product lookup precedes the removal branch, so a zero or negative
        // update on a deleted product reports `ProductNotFound` and keeps the line.
        self.stock
            .check_available(&mut tx, item.product_uuid, new_quantity.max(0).unsigned_abs())
            .await?;

        if new_quantity <= 0 {
            self.items_repository
                .delete_cart_item(&mut tx, item.uuid)
                .await?;

            info!(cart = %cart.uuid, "cart item removed by quantity update");
        } else {
            let quantity = u32::try_from(new_quantity)
                .ok()
                .ok_or(CartsServiceError::Validation { field: "quantity" })?;

            self.items_repository
                .update_cart_item_quantity(&mut tx, item.uuid, quantity)
                .await?;

            info!(cart = %cart.uuid, quantity, "cart item quantity updated");
        }

        self.finish(tx, cart).await
    }

    #[instrument(skip(self), fields(user = %user, item = %line), err)]
    async fn remove_item(
        &self,
        user: UserUuid,
        line: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.cart_for_user(&mut tx, user).await?;
        let item = self.owned_line(&mut tx, &cart, line).await?;

        self.items_repository
            .delete_cart_item(&mut tx, item.uuid)
            .await?;

        info!(cart = %cart.uuid, "cart item removed");

        self.finish(tx, cart).await
    }

    #[instrument(skip(self), fields(user = %user), err)]
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.cart_for_user(&mut tx, user).await?;

        let removed = self
            .items_repository
            .clear_cart_items(&mut tx, cart.uuid)
            .await?;

        self.carts_repository.touch_cart(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(cart = %cart.uuid, removed, "cart cleared");

        Ok(())
    }

    #[instrument(skip(self), fields(user = %user), err)]
    async fn calculate_total(&self, user: UserUuid) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.cart_for_user(&mut tx, user).await?;

        let items = self
            .items_repository
            .list_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        calculate_total(&items).ok_or(CartsServiceError::Validation { field: "quantity" })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, creating an empty one on first use.
    async fn get_or_create_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add units of a product, merging into an existing line for that product.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Overwrite a line's quantity. Zero or less removes the line.
    async fn update_item_quantity(
        &self,
        user: UserUuid,
        line: CartItemUuid,
        new_quantity: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a line from the user's cart.
    async fn remove_item(
        &self,
        user: UserUuid,
        line: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every line, keeping the cart itself.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;

    /// Sum of `quantity * unit_price` over the cart's lines.
    async fn calculate_total(&self, user: UserUuid) -> Result<u64, CartsServiceError>;
}
