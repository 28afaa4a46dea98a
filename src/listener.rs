//! Accepts connections on one endpoint, enforces the process-wide session cap,
//! and hands each accepted socket to a new [`Session`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener as TokioTcpListener;
use tokio::sync::Notify;

use crate::booker::BookerRegistry;
use crate::engine::ReservationEngine;
use crate::error::Result;
use crate::session::Session;

struct AdmissionState {
    current_connections: usize,
    sessions: HashMap<u64, Arc<Session>>,
}

/// One TCP endpoint's accept loop and admission control.
pub struct Listener {
    addr: SocketAddr,
    max_connections: usize,
    engine: Arc<ReservationEngine>,
    registry: Arc<BookerRegistry>,
    state: Mutex<AdmissionState>,
    next_session_id: AtomicU64,
    stop_accept: Notify,
}

impl Listener {
    pub fn new(addr: SocketAddr, max_connections: usize, engine: Arc<ReservationEngine>, registry: Arc<BookerRegistry>) -> Arc<Self> {
        Arc::new(Listener {
            addr,
            max_connections,
            engine,
            registry,
            state: Mutex::new(AdmissionState { current_connections: 0, sessions: HashMap::new() }),
            next_session_id: AtomicU64::new(1),
            stop_accept: Notify::new(),
        })
    }

    /// Binds the endpoint and accepts connections until [`Listener::stop_accepting`]
    /// is called.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let tcp_listener = TokioTcpListener::bind(self.addr).await?;
        log::info!("listening on {}", self.addr);

        loop {
            tokio::select! {
                biased;
                _ = self.stop_accept.notified() => {
                    log::info!("listener on {} no longer accepting", self.addr);
                    break;
                }
                accepted = tcp_listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => self.clone().admit(stream, peer_addr),
                        Err(e) => log::warn!("accept failed on {}: {e}", self.addr),
                    }
                }
            }
        }

        Ok(())
    }

    fn admit(self: Arc<Self>, stream: tokio::net::TcpStream, peer_addr: SocketAddr) {
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let session = Session::new(id, peer_addr, self.engine.clone(), self.registry.clone());

        {
            let mut state = self.state.lock().expect("listener admission mutex poisoned");
            if state.current_connections >= self.max_connections {
                log::warn!("connection from {peer_addr} refused, at capacity ({})", self.max_connections);
                return; // `session` and `stream` drop here, closing the socket
            }
            state.current_connections += 1;
            state.sessions.insert(id, session.clone());
        }

        let listener = self.clone();
        session.set_on_close(move |id| {
            listener.state.lock().expect("listener admission mutex poisoned").sessions.remove(&id);
        });

        tokio::spawn(async move {
            if let Err(e) = Arc::clone(&session).start(stream).await {
                log::warn!("session {id} from {peer_addr} failed to start: {e}");
                session.close();
            }
        });
    }

    /// Stops accepting new connections. Already-active sessions are untouched;
    /// call [`Listener::close_sessions`] separately once the shutdown coordinator's
    /// grace period has elapsed.
    pub fn stop_accepting(&self) {
        self.stop_accept.notify_one();
    }

    /// Closes every currently active session on this listener.
    pub fn close_sessions(&self) {
        let sessions: Vec<Arc<Session>> = self.state.lock().expect("listener admission mutex poisoned").sessions.values().cloned().collect();
        for session in sessions {
            session.close();
        }
    }

    pub fn active_session_count(&self) -> usize {
        self.state.lock().expect("listener admission mutex poisoned").sessions.len()
    }
}
