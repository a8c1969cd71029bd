use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    action::ActionGroups,
    dispatcher::{ActionDispatcher, DispatchError},
    route::RouteContext,
};

pub(crate) struct NullDispatcher;

#[async_trait]
impl ActionDispatcher for NullDispatcher {
    async fn dispatch(
        &self,
        _groups: ActionGroups,
        _context: RouteContext,
    ) -> Result<(), DispatchError> {
        Ok(())
    }
}

pub(crate) fn null_dispatcher() -> Arc<dyn ActionDispatcher> {
    Arc::new(NullDispatcher)
}
