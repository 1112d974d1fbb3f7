//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use tienda_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
        },
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        users::{
            MockUsersService,
            records::{RoleRecord, UserRecord, UserUuid},
        },
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

/// Service doubles keyed by concern; anything not configured rejects calls.
#[derive(Default)]
pub(crate) struct TestServices {
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) users: MockUsersService,
    pub(crate) auth: MockAuthService,
}

impl TestServices {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::shared(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            users: Arc::new(self.users),
            auth: Arc::new(self.auth),
        })
    }

    /// Serve `route` with the given caller already authenticated.
    pub(crate) fn serve_as(self, principal: Principal, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(InjectPrincipal(principal))
                .push(route),
        )
    }

    /// Serve `route` without an authenticated caller.
    pub(crate) fn serve_anonymous(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
    }
}

struct InjectPrincipal(Principal);

#[salvo::handler]
impl InjectPrincipal {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_principal(self.0.clone());
        ctrl.call_next(req, depot, res).await;
    }
}

pub(crate) fn principal_with(authorities: &[&str]) -> Principal {
    Principal {
        user_uuid: TEST_USER_UUID,
        email: "ada@example.com".to_string(),
        authorities: authorities.iter().map(ToString::to_string).collect(),
    }
}

pub(crate) fn customer() -> Principal {
    principal_with(&["ROLE_CUSTOMER", "PRODUCT_READ", "CART_MANAGE"])
}

pub(crate) fn admin() -> Principal {
    principal_with(&[
        "ROLE_ADMIN",
        "PRODUCT_CREATE",
        "PRODUCT_UPDATE",
        "PRODUCT_DELETE",
        "PRODUCT_READ",
        "USER_MANAGE",
        "USER_READ",
        "CART_MANAGE",
    ])
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Catan".to_string(),
        category: "Board Games".to_string(),
        description: None,
        image: "https://img.example/catan.png".to_string(),
        price: 1_000,
        stock: 5,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_cart(items: &[(ProductUuid, u32, u64)]) -> CartRecord {
    let cart_uuid = CartUuid::new();

    CartRecord {
        uuid: cart_uuid,
        user_uuid: TEST_USER_UUID,
        items: items
            .iter()
            .map(|&(product_uuid, quantity, unit_price)| CartItemRecord {
                uuid: CartItemUuid::new(),
                cart_uuid,
                product_uuid,
                quantity,
                unit_price,
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            })
            .collect(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_user(uuid: UserUuid, role: &str) -> UserRecord {
    UserRecord {
        uuid,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "$argon2id$not-a-real-hash".to_string(),
        national_id: None,
        address: None,
        phone: None,
        region: None,
        commune: None,
        role: role.to_string(),
        roles: vec![RoleRecord {
            name: role.to_string(),
            permissions: Vec::new(),
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
