use crate::config::Config;
use crate::dispatcher::run_connection;
use engine::Engine;
use protocol::Codec;
use std::collections::HashSet;
use std::io::{BufReader, BufWriter};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread;

const FIRST_CONNECTION_ID: u32 = 10000;
const SOCKET_BUFFER_CAPACITY: usize = 2048;

/// A counting semaphore bounding concurrent command dispatch across the
/// whole process (spec 5: "Admission bucket"). Every command acquires one
/// token before dispatch and releases it after, regardless of which
/// connection issued it.
pub struct AdmissionBucket {
    available: Mutex<usize>,
    condvar: Condvar,
}

impl AdmissionBucket {
    pub fn new(capacity: usize) -> Self {
        AdmissionBucket {
            available: Mutex::new(capacity),
            condvar: Condvar::new(),
        }
    }

    pub fn acquire(&self) -> AdmissionToken<'_> {
        let mut available = self.available.lock().unwrap();
        while *available == 0 {
            available = self.condvar.wait(available).unwrap();
        }
        *available -= 1;
        AdmissionToken { bucket: self }
    }

    fn release(&self) {
        let mut available = self.available.lock().unwrap();
        *available += 1;
        self.condvar.notify_one();
    }
}

/// RAII guard returned by `AdmissionBucket::acquire`; releasing the token on drop.
pub struct AdmissionToken<'a> {
    bucket: &'a AdmissionBucket,
}

impl Drop for AdmissionToken<'_> {
    fn drop(&mut self) {
        self.bucket.release();
    }
}

/// Accepts connections, assigns monotonic ids, and bounds concurrent command
/// dispatch with an admission bucket and a cooperative shutdown lock
/// (spec 4.10/5).
pub struct Server {
    config: Config,
    engine: Arc<dyn Engine>,
    next_connection_id: AtomicU32,
    connections: Mutex<HashSet<u32>>,
    admission: Arc<AdmissionBucket>,
    shutdown_lock: Arc<RwLock<()>>,
    closing: AtomicBool,
}

impl Server {
    pub fn new(config: Config, engine: Arc<dyn Engine>) -> Self {
        let concurrency_limit = config.concurrency_limit;
        Server {
            config,
            engine,
            next_connection_id: AtomicU32::new(FIRST_CONNECTION_ID),
            connections: Mutex::new(HashSet::new()),
            admission: Arc::new(AdmissionBucket::new(concurrency_limit)),
            shutdown_lock: Arc::new(RwLock::new(())),
            closing: AtomicBool::new(false),
        }
    }

    /// Binds and runs the accept loop until the listener is closed or
    /// accepting fails unrecoverably. Each accepted socket gets its own
    /// thread running the full connection lifecycle.
    pub fn listen(self: Arc<Self>) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.listen_address)?;
        log::info!("listening on {}", self.config.listen_address);

        for stream in listener.incoming() {
            if self.closing.load(Ordering::SeqCst) {
                break;
            }
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("accept failed: {}", e);
                    continue;
                }
            };
            let server = Arc::clone(&self);
            thread::spawn(move || server.handle_connection(stream));
        }
        Ok(())
    }

    /// Takes the writer side of the shutdown lock so in-flight commands
    /// finish before returning; existing connections then drain naturally
    /// via read errors once their sockets are closed by their clients.
    pub fn shutdown(&self) {
        self.closing.store(true, Ordering::SeqCst);
        let _guard = self.shutdown_lock.write().unwrap();
    }

    fn handle_connection(&self, stream: TcpStream) {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::SeqCst);
        self.connections.lock().unwrap().insert(connection_id);
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        log::debug!("conn {} accepted from {}", connection_id, peer_addr);

        let reader = BufReader::with_capacity(SOCKET_BUFFER_CAPACITY, stream.try_clone().unwrap());
        let writer = BufWriter::with_capacity(SOCKET_BUFFER_CAPACITY, stream);
        let codec = Codec::from_parts(reader, writer);

        // Lives outside the `catch_unwind` closure so the command that was
        // in flight is still readable after a panic unwinds through it.
        let last_cmd = AtomicU8::new(0);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_connection(
                codec,
                connection_id,
                &peer_addr,
                self.engine.as_ref(),
                &self.config.user,
                &self.config.password,
                self.config.skip_auth,
                &self.admission,
                &self.shutdown_lock,
                &last_cmd,
            )
        }));
        if let Err(payload) = result {
            log::error!(
                "conn {} panicked on cmd {}: {:?}",
                connection_id,
                last_cmd.load(Ordering::Relaxed),
                panic_message(&payload)
            );
        }

        self.connections.lock().unwrap().remove(&connection_id);
        log::debug!("conn {} closed", connection_id);
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
