//! Fixtures shared by the service tests.

use crate::{
    auth::password::Password,
    domain::{
        carts::{CartsService, CartsServiceError, data::NewCartItem, records::CartRecord},
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        users::{
            UsersService, UsersServiceError,
            data::NewUser,
            records::{UserRecord, UserUuid},
        },
    },
};

use super::TestContext;

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: u64,
    stock: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    let uuid = ProductUuid::new();

    ctx.products
        .create_product(NewProduct {
            uuid,
            name: format!("Product {uuid}"),
            category: "General".to_string(),
            description: None,
            image: format!("https://img.example/{uuid}.png"),
            price,
            stock,
        })
        .await
}

pub(crate) async fn create_named_product(
    ctx: &TestContext,
    name: &str,
    category: &str,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            image: "https://img.example/product.png".to_string(),
            price: 1_000,
            stock: 10,
        })
        .await
}

/// A valid registration with the password `password123`.
pub(crate) fn new_user(email: &str, role: Option<&str>, admin: bool) -> NewUser {
    NewUser {
        uuid: UserUuid::new(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: Password::new("password123"),
        national_id: None,
        address: None,
        phone: None,
        region: None,
        commune: None,
        role: role.map(str::to_string),
        admin,
    }
}

pub(crate) async fn create_user(
    ctx: &TestContext,
    email: &str,
) -> Result<UserRecord, UsersServiceError> {
    ctx.users.create_user(new_user(email, None, false)).await
}

pub(crate) async fn add_item(
    ctx: &TestContext,
    user: UserUuid,
    product: ProductUuid,
    quantity: Option<i64>,
) -> Result<CartRecord, CartsServiceError> {
    ctx.carts
        .add_item(
            user,
            NewCartItem {
                product_uuid: product,
                quantity,
            },
        )
        .await
}
