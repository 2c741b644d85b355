use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use shared::{domain::AdviceKind, error::TransportError};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::transport::{AdviceTransport, HttpTransport, RequestBody};

/// Serves `app` on an ephemeral loopback port and returns its base url.
pub(crate) async fn spawn_backend(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

pub(crate) async fn http_transport(app: Router) -> Arc<dyn AdviceTransport> {
    let base_url = spawn_backend(app).await;
    Arc::new(HttpTransport::new(&base_url).expect("transport"))
}

/// Holds every request until the test releases it.
#[derive(Clone, Default)]
pub(crate) struct Gate {
    pub(crate) hits: Arc<AtomicUsize>,
    pub(crate) arrived: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
}

impl Gate {
    pub(crate) async fn pass(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.arrived.notify_one();
        self.release.notified().await;
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// In-memory backend answering from a queue of canned replies.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, u16>>>,
    pub(crate) requests: Mutex<Vec<(AdviceKind, RequestBody)>>,
}

impl ScriptedTransport {
    pub(crate) fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn replying(replies: impl IntoIterator<Item = Result<Value, u16>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AdviceTransport for ScriptedTransport {
    async fn post(&self, kind: AdviceKind, body: RequestBody) -> Result<Value, TransportError> {
        self.requests.lock().await.push((kind, body));
        match self.replies.lock().await.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(status)) => Err(TransportError::Status {
                endpoint: kind.endpoint_path().to_string(),
                status,
            }),
            None => Err(TransportError::Status {
                endpoint: kind.endpoint_path().to_string(),
                status: 503,
            }),
        }
    }
}
