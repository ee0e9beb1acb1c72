//! In-flight permission requests and their resolution.

use crate::{GrantAmendments, PermissionRequest, RequestId, RequestStatus, ResourceDescriptor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// How a request left the pending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Granted(GrantAmendments),
    Denied { reason: Option<String> },
    Expired,
}

impl Resolution {
    pub fn status(&self) -> RequestStatus {
        match self {
            Resolution::Granted(_) => RequestStatus::Granted,
            Resolution::Denied { .. } => RequestStatus::Denied,
            Resolution::Expired => RequestStatus::Expired,
        }
    }
}

struct PendingEntry {
    request: PermissionRequest,
    reply: oneshot::Sender<Resolution>,
}

/// Pending requests keyed by id.
///
/// Removing an entry is the one terminal transition: whoever takes it
/// (grant, deny, or the waiter's timeout) decides the outcome.
#[derive(Default)]
pub struct RequestRegistry {
    pending: Mutex<HashMap<RequestId, PendingEntry>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, PendingEntry>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a pending request and the handle its caller waits on.
    pub(crate) fn open(
        self: &Arc<Self>,
        originator: &str,
        descriptor: ResourceDescriptor,
        timeout: Option<Duration>,
    ) -> RequestHandle {
        let request = PermissionRequest::new(originator, descriptor);
        let (reply, receiver) = oneshot::channel();
        self.lock().insert(
            request.id,
            PendingEntry {
                request: request.clone(),
                reply,
            },
        );
        RequestHandle {
            request,
            reply: receiver,
            registry: Arc::clone(self),
            timeout,
        }
    }

    /// Remove a pending request so the caller can resolve it.
    pub(crate) fn take(
        &self,
        id: RequestId,
    ) -> Option<(PermissionRequest, oneshot::Sender<Resolution>)> {
        self.lock()
            .remove(&id)
            .map(|entry| (entry.request, entry.reply))
    }

    pub fn get(&self, id: RequestId) -> Option<PermissionRequest> {
        self.lock().get(&id).map(|entry| entry.request.clone())
    }

    /// All pending requests, oldest first.
    pub fn pending(&self) -> Vec<PermissionRequest> {
        let mut requests: Vec<_> = self
            .lock()
            .values()
            .map(|entry| entry.request.clone())
            .collect();
        requests.sort_by_key(|request| request.created_at);
        requests
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Awaitable side of a raised request.
pub struct RequestHandle {
    request: PermissionRequest,
    reply: oneshot::Receiver<Resolution>,
    registry: Arc<RequestRegistry>,
    timeout: Option<Duration>,
}

impl RequestHandle {
    pub fn id(&self) -> RequestId {
        self.request.id
    }

    pub fn request(&self) -> &PermissionRequest {
        &self.request
    }

    /// Wait until the request is granted, denied, or its timeout elapses.
    pub async fn resolved(mut self) -> Resolution {
        let received = match self.timeout {
            None => (&mut self.reply).await,
            Some(limit) => match tokio::time::timeout(limit, &mut self.reply).await {
                Ok(received) => received,
                Err(_) => {
                    if self.registry.take(self.request.id).is_some() {
                        tracing::info!(
                            request = %self.request.id,
                            originator = %self.request.originator,
                            "permission request expired"
                        );
                        return Resolution::Expired;
                    }
                    // Resolved concurrently with the deadline; the reply is in flight.
                    (&mut self.reply).await
                }
            },
        };
        received.unwrap_or(Resolution::Denied {
            reason: Some("request abandoned".to_string()),
        })
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        if self.registry.take(self.request.id).is_some() {
            tracing::debug!(request = %self.request.id, "waiter dropped; discarding pending request");
        }
    }
}
