//! Handler State

use std::sync::Arc;

use tienda_app::context::AppContext;

/// Services shared by every handler, injected once into the depot.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl State {
    #[must_use]
    pub(crate) fn shared(app: AppContext) -> Arc<Self> {
        Arc::new(Self { app })
    }
}
