//! Shared fakes for integration testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use qi_gateway::backend::{FetchError, FunctionInvoke, InvokeError, ObjectFetch};
use qi_gateway::Dispatcher;

pub const ROUTES_PATH: &str = "qi/router.json";

/// Object store backed by an in-memory map.
#[derive(Default)]
pub struct MemoryStore {
    objects: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn with(path: &str, content: &str) -> Self {
        let mut objects = HashMap::new();
        objects.insert(path.to_string(), Bytes::copy_from_slice(content.as_bytes()));
        Self { objects }
    }
}

#[async_trait]
impl ObjectFetch for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        self.objects
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

/// Object store whose every fetch fails with an I/O error.
pub struct BrokenStore;

#[async_trait]
impl ObjectFetch for BrokenStore {
    async fn fetch(&self, _path: &str) -> Result<Bytes, FetchError> {
        Err(FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub service: String,
    pub function: String,
    pub payload: Bytes,
}

/// Invoker that records calls and answers with a fixed reply.
pub struct RecordingInvoker {
    reply: Result<Bytes, String>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl RecordingInvoker {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Bytes::copy_from_slice(reply.as_bytes())),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionInvoke for RecordingInvoker {
    async fn invoke(
        &self,
        service: &str,
        function: &str,
        payload: Bytes,
    ) -> Result<Bytes, InvokeError> {
        self.calls.lock().unwrap().push(Call {
            service: service.to_string(),
            function: function.to_string(),
            payload,
        });
        self.reply.clone().map_err(InvokeError::Other)
    }
}

/// Dispatcher reading `routes` from memory and invoking through `invoker`.
#[allow(dead_code)]
pub fn dispatcher(routes: &str, invoker: Arc<RecordingInvoker>) -> Dispatcher {
    Dispatcher::with_store(
        Arc::new(MemoryStore::with(ROUTES_PATH, routes)),
        ROUTES_PATH,
        invoker,
    )
}
