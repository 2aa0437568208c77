//! A newline-delimited JSON client for the odds service.
//!
//! Each call is written as one JSON object per line and tagged with an id;
//! replies may come back in any order and are matched to their calls by that
//! id. One task writes requests, another reads replies.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec};

use oddsboard_game::protocol::{Counts, OddsRequest, OddsResult, OddsService, RemoteError};

#[derive(Debug, Snafu)]
pub enum TransportError {
    #[snafu(display("could not connect to odds service at {addr}: {source}"))]
    Connect { addr: String, source: io::Error },

    #[snafu(display("could not encode request {id}: {source}"))]
    Encode { id: u64, source: serde_json::Error },

    #[snafu(display("connection to odds service is closed"))]
    Closed,
}

/// One call as it travels over the wire.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RpcRequest {
    pub id: u64,
    pub method: String,
    /// Holes, then community cards.
    pub params: (Vec<String>, Vec<String>),
}

impl RpcRequest {
    pub fn new(id: u64, request: OddsRequest) -> Self {
        RpcRequest {
            id,
            method: request.game.method().into(),
            params: (request.holes, request.community),
        }
    }
}

/// One reply as it travels over the wire; exactly one of `result` and
/// `error` is set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RpcResponse {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Counts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl RpcResponse {
    pub fn into_result(self) -> OddsResult {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RemoteError::new("reply carries neither result nor error")),
        }
    }
}

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<OddsResult>>>>;

/// A connection to the odds service. Cheap to clone; clones share the
/// connection.
#[derive(Clone)]
pub struct OddsClient {
    next_id: Arc<AtomicU64>,
    pending: Pending,
    closed: Arc<AtomicBool>,
    requests_tx: mpsc::UnboundedSender<String>,
}

impl OddsClient {
    /// Connect to the service and spawn the reader and writer tasks.
    ///
    /// The returned handle completes once the service closes the connection.
    pub async fn connect<A>(addr: A) -> Result<(OddsClient, JoinHandle<()>), TransportError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let stream = TcpStream::connect(&addr).await.context(ConnectSnafu {
            addr: addr.to_string(),
        })?;
        info!("connected to odds service at {}", addr);
        let (mut sink, mut lines) = Framed::new(stream, LinesCodec::new()).split();

        let (requests_tx, mut requests_rx) = mpsc::unbounded_channel::<String>();
        let pending: Pending = Arc::default();
        let closed = Arc::new(AtomicBool::new(false));

        let writer = tokio::spawn(async move {
            while let Some(line) = requests_rx.recv().await {
                if let Err(e) = sink.send(line).await {
                    error!("while sending odds request: {}", e);
                    break;
                }
            }
            debug!("odds request writer stopped");
        });

        let reader = {
            let pending = pending.clone();
            let closed = closed.clone();
            tokio::spawn(async move {
                while let Some(line) = lines.next().await {
                    match line {
                        Ok(line) => deliver(&pending, &line),
                        Err(e) => {
                            error!("reading line from odds service: {}", e);
                            break;
                        }
                    }
                }
                info!("odds service closed the connection");
                fail_all(&pending, &closed);
                writer.abort();
            })
        };

        let client = OddsClient {
            next_id: Arc::new(AtomicU64::new(1)),
            pending,
            closed,
            requests_tx,
        };
        Ok((client, reader))
    }

    /// Whether the service has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn send(&self, request: OddsRequest) -> Result<oneshot::Receiver<OddsResult>, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let line =
            serde_json::to_string(&RpcRequest::new(id, request)).context(EncodeSnafu { id })?;

        let (tx, rx) = oneshot::channel();
        {
            // Checked under the lock `fail_all` drains with, so a call either
            // sees the close or gets failed by it.
            let mut pending = lock(&self.pending);
            snafu::ensure!(!self.is_closed(), ClosedSnafu);
            pending.insert(id, tx);
        }
        if self.requests_tx.send(line).is_err() {
            lock(&self.pending).remove(&id);
            return ClosedSnafu.fail();
        }
        debug!("sent odds request {}", id);
        Ok(rx)
    }
}

impl OddsService for OddsClient {
    fn calculate_odds(&self, request: OddsRequest) -> BoxFuture<'static, OddsResult> {
        match self.send(request) {
            Ok(rx) => rx
                .map(|reply| reply.unwrap_or_else(|_| Err(closed_error())))
                .boxed(),
            Err(e) => {
                error!("{}", e);
                future::ready(Err(RemoteError::new(e.to_string()))).boxed()
            }
        }
    }
}

impl std::fmt::Debug for OddsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OddsClient")
            .field("pending", &lock(&self.pending).len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn lock(pending: &Pending) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<OddsResult>>> {
    // The map stays consistent even if a holder panicked.
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Just enough of a reply to find its caller.
#[derive(Deserialize)]
struct ReplyId {
    id: u64,
}

fn deliver(pending: &Pending, line: &str) {
    let id = match serde_json::from_str::<ReplyId>(line) {
        Ok(reply) => reply.id,
        Err(e) => {
            error!("odds reply {:?} carries no id: {}", line, e);
            return;
        }
    };
    let result = match serde_json::from_str::<RpcResponse>(line) {
        Ok(response) => response.into_result(),
        Err(e) => {
            error!("parsing odds reply {:?}: {}", line, e);
            Err(RemoteError::new(format!("malformed reply: {}", e)))
        }
    };
    match lock(pending).remove(&id) {
        // The receiver may be gone if nobody waits for this reply anymore.
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => error!("odds reply {} matches no request", id),
    }
}

fn fail_all(pending: &Pending, closed: &AtomicBool) {
    let mut pending = lock(pending);
    closed.store(true, Ordering::SeqCst);
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(closed_error()));
    }
}

fn closed_error() -> RemoteError {
    RemoteError::new(TransportError::Closed.to_string())
}
