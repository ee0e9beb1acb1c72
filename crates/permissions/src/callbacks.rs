//! Consumer-supplied handlers notified when requests are raised.

use crate::{PermissionCategory, PermissionRequest};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Error a handler may report; it is logged and otherwise ignored.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// A request handler. It must not block; it resolves the request later
/// through a [`PermissionResponder`](crate::PermissionResponder).
pub type PermissionCallback =
    Arc<dyn Fn(&PermissionRequest) -> Result<(), CallbackError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Handlers = HashMap<PermissionCategory, Vec<(CallbackId, PermissionCallback)>>;

/// Handlers bound per permission category.
#[derive(Default)]
pub struct CallbackDispatcher {
    next_id: AtomicU64,
    handlers: Mutex<Handlers>,
}

impl CallbackDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn bind<F>(&self, category: PermissionCategory, handler: F) -> CallbackId
    where
        F: Fn(&PermissionRequest) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: PermissionCallback = Arc::new(handler);
        self.lock().entry(category).or_default().push((id, handler));
        id
    }

    /// Remove a handler. Returns `false` if it was not bound.
    pub fn unbind(&self, id: CallbackId) -> bool {
        let mut handlers = self.lock();
        for bound in handlers.values_mut() {
            if let Some(pos) = bound.iter().position(|(bound_id, _)| *bound_id == id) {
                bound.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invoke every handler bound for the request's category.
    ///
    /// Failing or panicking handlers are logged; the request stays pending
    /// for the remaining handlers or an explicit resolution.
    pub fn dispatch(&self, request: &PermissionRequest) -> usize {
        let handlers: Vec<_> = self
            .lock()
            .get(&request.category)
            .map(|bound| bound.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::warn!(
                request = %request.id,
                category = %request.category,
                "no handler bound; request stays pending until resolved or expired"
            );
        }

        for handler in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(request))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(request = %request.id, error = %e, "permission handler failed");
                }
                Err(_) => {
                    tracing::warn!(request = %request.id, "permission handler panicked");
                }
            }
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceDescriptor;
    use std::sync::atomic::AtomicUsize;

    fn request(category_basket: bool) -> PermissionRequest {
        let descriptor = if category_basket {
            ResourceDescriptor::Basket {
                basket: "todo tokens".to_string(),
                reason: None,
            }
        } else {
            ResourceDescriptor::Spending {
                amount: 5,
                line_items: Vec::new(),
                reason: None,
            }
        };
        PermissionRequest::new("app.example", descriptor)
    }

    fn counting(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn(&PermissionRequest) -> Result<(), CallbackError> + Send + Sync + 'static {
        let counter = counter.clone();
        move |_: &PermissionRequest| -> Result<(), CallbackError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn dispatch_reaches_only_matching_category() {
        let dispatcher = CallbackDispatcher::new();
        let baskets = Arc::new(AtomicUsize::new(0));
        let spending = Arc::new(AtomicUsize::new(0));
        dispatcher.bind(PermissionCategory::BasketInsertion, counting(&baskets));
        dispatcher.bind(PermissionCategory::BasketInsertion, counting(&baskets));
        dispatcher.bind(PermissionCategory::SpendingAuthorization, counting(&spending));

        assert_eq!(dispatcher.dispatch(&request(true)), 2);
        assert_eq!(baskets.load(Ordering::SeqCst), 2);
        assert_eq!(spending.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_handlers_do_not_stop_others() {
        let dispatcher = CallbackDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.bind(
            PermissionCategory::SpendingAuthorization,
            |_: &PermissionRequest| Err("ui unavailable".into()),
        );
        dispatcher.bind(
            PermissionCategory::SpendingAuthorization,
            |_: &PermissionRequest| -> Result<(), CallbackError> { panic!("handler bug") },
        );
        dispatcher.bind(PermissionCategory::SpendingAuthorization, counting(&counter));

        assert_eq!(dispatcher.dispatch(&request(false)), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unbind_removes_handler() {
        let dispatcher = CallbackDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = dispatcher.bind(PermissionCategory::BasketInsertion, counting(&counter));

        assert!(dispatcher.unbind(id));
        assert!(!dispatcher.unbind(id));
        assert_eq!(dispatcher.dispatch(&request(true)), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
