//! One connected client, from accept to close.
//!
//! A `Session` is driven by two cooperative tasks sharing one `Arc<Session>`:
//! a receive loop that reads bytes, feeds them through the telnet protocol
//! state machine, and dispatches complete lines to the CLI; and a send loop
//! that drains the outbound queue and writes it to the socket. Both tasks call
//! [`Session::close`], which is idempotent.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Notify;

use crate::booker::{BookerId, BookerRegistry};
use crate::cli::{CliState, CommandTree};
use crate::engine::ReservationEngine;
use crate::error::Result;
use crate::telnet::TelnetProtocol;

const READ_CHUNK: usize = 1024;

/// Drives one accepted connection.
pub struct Session {
    id: u64,
    peer_addr: SocketAddr,
    engine: Arc<ReservationEngine>,
    registry: Arc<BookerRegistry>,
    booker: BookerId,
    tree: CommandTree,
    cli_state: Mutex<CliState>,
    outbound: Mutex<VecDeque<Vec<u8>>>,
    notify: Notify,
    should_close: AtomicBool,
    closed: AtomicBool,
    on_close: OnceLock<Box<dyn Fn(u64) + Send + Sync>>,
}

impl Session {
    pub fn new(id: u64, peer_addr: SocketAddr, engine: Arc<ReservationEngine>, registry: Arc<BookerRegistry>) -> Arc<Self> {
        let tree = CommandTree::from_catalog(engine.catalog());
        Arc::new(Session {
            id,
            peer_addr,
            engine,
            registry,
            booker: BookerId::new(),
            tree,
            cli_state: Mutex::new(CliState::new()),
            outbound: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            should_close: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            on_close: OnceLock::new(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Registers the callback invoked exactly once, from [`Session::close`], so
    /// the owning listener can drop its reference to this session.
    pub fn set_on_close(&self, f: impl Fn(u64) + Send + Sync + 'static) {
        let _ = self.on_close.set(Box::new(f));
    }

    /// Joins the booker registry, composes the UID, and launches the receive and
    /// send loops. The caller retains ownership of `self` via the `Arc` already
    /// installed in the listener's active-set map.
    pub async fn start(self: Arc<Self>, stream: TcpStream) -> Result<()> {
        let seq = self.registry.join(self.booker.clone())?;
        self.booker.set_uid(format!("{}:{}@{}", self.peer_addr.ip(), self.peer_addr.port(), seq));
        log::info!("session {} ({}) joined", self.id, self.booker.uid());

        let (read_half, write_half) = stream.into_split();

        let recv_session = Arc::clone(&self);
        tokio::spawn(async move { recv_session.receive_loop(read_half).await });

        tokio::spawn(async move { self.send_loop(write_half).await });

        Ok(())
    }

    fn greeting(&self) -> Vec<u8> {
        let state = self.cli_state.lock().expect("cli state mutex poisoned");
        let mut out = String::new();
        out.push_str(&self.tree.banner());
        out.push_str("\r\n");
        out.push_str(&self.tree.prompt(&state));
        out.into_bytes()
    }

    async fn receive_loop(self: Arc<Self>, mut read_half: OwnedReadHalf) {
        let mut protocol = TelnetProtocol::new();
        self.enqueue(protocol.initial_negotiation());
        self.enqueue(self.greeting());

        let mut line_buf: Vec<u8> = Vec::new();
        let mut read_buf = vec![0u8; READ_CHUNK];

        loop {
            let n = match read_half.read(&mut read_buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    log::debug!("session {} read error: {e}", self.id);
                    break;
                }
            };

            let processed = protocol.process(&read_buf[..n]);
            if !processed.reply.is_empty() {
                self.enqueue(processed.reply);
            }

            line_buf.extend_from_slice(&processed.application_data);
            while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = line_buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim_end_matches(['\r', '\n']);
                self.dispatch_line(line);
                if self.should_close.load(Ordering::SeqCst) {
                    break;
                }
            }

            if self.should_close.load(Ordering::SeqCst) {
                break;
            }
        }

        self.close();
    }

    fn dispatch_line(&self, line: &str) {
        let mut state = self.cli_state.lock().expect("cli state mutex poisoned");
        let outcome = self.tree.dispatch(&mut state, &self.engine, &self.booker, line);

        let mut out = outcome.text;
        out.push_str("\r\n");
        if !outcome.should_exit {
            out.push_str(&self.tree.prompt(&state));
        }
        drop(state);

        self.enqueue(out.into_bytes());

        if outcome.should_exit {
            self.should_close.store(true, Ordering::SeqCst);
            self.notify.notify_one();
        }
    }

    fn enqueue(&self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        self.outbound.lock().expect("outbound queue mutex poisoned").push_back(bytes);
        self.notify.notify_one();
    }

    async fn send_loop(self: Arc<Self>, mut write_half: OwnedWriteHalf) {
        loop {
            let next = self.outbound.lock().expect("outbound queue mutex poisoned").pop_front();
            match next {
                Some(bytes) => {
                    if let Err(e) = write_half.write_all(&bytes).await {
                        log::debug!("session {} write error: {e}", self.id);
                        break;
                    }
                }
                None => {
                    if self.should_close.load(Ordering::SeqCst) {
                        break;
                    }
                    self.notify.notified().await;
                }
            }
        }

        let _ = write_half.shutdown().await;
        self.close();
    }

    /// Tears down the session: deregisters from the booker registry, arms the
    /// close flag so the sibling loop also stops, and invokes the on-close
    /// callback exactly once. Safe to call from either loop or from the listener.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry.leave(&self.booker);
        self.should_close.store(true, Ordering::SeqCst);
        self.notify.notify_one();
        log::info!("session {} closed", self.id);
        if let Some(cb) = self.on_close.get() {
            cb(self.id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            log::warn!("session {} dropped without going through close()", self.id);
        }
    }
}
