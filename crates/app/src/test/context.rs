//! Test context for service-level integration tests.

use crate::{
    auth::{JwtSecret, PgAuthService, TokenSigner},
    database::Db,
    domain::{carts::PgCartsService, products::PgProductsService, users::PgUsersService},
};

use super::db::TestDb;

const TEST_JWT_SECRET: &str = "tienda-test-secret";
const TEST_JWT_TTL_SECONDS: u64 = 3600;

pub struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub carts: PgCartsService,
    pub users: PgUsersService,
    pub auth: PgAuthService,
    pub signer: TokenSigner,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let signer = TokenSigner::new(&JwtSecret::new(TEST_JWT_SECRET), TEST_JWT_TTL_SECONDS)
            .expect("test token settings should be valid");

        Self {
            products: PgProductsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            users: PgUsersService::new(db.clone()),
            auth: PgAuthService::new(db, signer.clone()),
            signer,
            db: test_db,
        }
    }
}
