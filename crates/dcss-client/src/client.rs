//! Bus client: login handshake, master arbitration, readiness tracking,
//! and operation correlation.
//!
//! [`DcssClient`] drives one logical session. Every frame the client pumps
//! -- whether or not a caller is waiting on it -- is routed through the
//! dispatch chain first: session flags fold in, then the attached
//! [`FrameObserver`] runs. Only after dispatch is a wait-predicate
//! evaluated against the frame. This ordering is the core invariant of the
//! client: out-of-band notifications (loss of master, readiness, registry
//! updates) are never missed even while a caller is blocked on an
//! unrelated reply.

use dcss_core::{Error, Frame, FrameVariant, Result, Transport};
use tracing::debug;

use crate::engine::FrameEngine;

/// Per-frame dispatch hook.
///
/// Implementations attach behavior that runs once for every frame the
/// client observes, before any wait-predicate is evaluated against it.
/// The default body is a no-op, so observers only override what they
/// watch for.
pub trait FrameObserver: Send {
    fn on_frame(&mut self, frame: &Frame) {
        let _ = frame;
    }
}

/// No-op observer for clients without an attached consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl FrameObserver for NullObserver {}

/// Identity presented to the bus at login.
///
/// The bus requires all four fields even though only the session id is
/// meaningful to it; the remaining defaults match what the control scripts
/// have always sent.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// User name the session runs as.
    pub user: String,
    /// Session credential issued by the authentication service.
    pub session_id: String,
    /// Hostname reported at login.
    pub host: String,
    /// X display reported at login.
    pub display: String,
}

impl ClientOptions {
    pub fn new(session_id: impl Into<String>) -> Self {
        ClientOptions {
            user: "blctl".to_string(),
            session_id: session_id.into(),
            host: "localhost".to_string(),
            display: ":0.0".to_string(),
        }
    }
}

/// Session-scoped state for one connection.
///
/// Owned exclusively by the client and mutated only from the dispatch
/// path or explicit request methods. All of it is lost on disconnect.
#[derive(Debug, Clone, Default)]
pub struct Session {
    client_id: Option<String>,
    master: bool,
    ready: bool,
    operation_no: u64,
}

impl Session {
    /// Client identifier assigned by the bus at login.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Whether this peer currently holds master write privilege.
    pub fn is_master(&self) -> bool {
        self.master
    }

    /// Whether the bus has completed its initial full device update.
    /// Monotone: once set it stays set for the life of the connection.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Next operation number to be allocated. Starts at 0, never reused,
    /// never decreases.
    pub fn operation_no(&self) -> u64 {
        self.operation_no
    }

    fn observe(&mut self, frame: &Frame) {
        match frame.name() {
            "stog_become_master" => {
                if !self.master {
                    debug!("master privilege granted");
                }
                self.master = true;
            }
            "stog_other_master" | "stog_become_slave" => {
                if self.master {
                    debug!(frame = frame.name(), "master privilege lost");
                }
                self.master = false;
            }
            "stog_dcss_end_update_all_device" => {
                if !self.ready {
                    debug!("initial device update complete");
                }
                self.ready = true;
            }
            _ => {}
        }
    }

    fn next_operation_no(&mut self) -> u64 {
        let no = self.operation_no;
        self.operation_no += 1;
        no
    }
}

/// Client for one DCSS control-bus session.
///
/// Generic over the transport and over the dispatch observer; the
/// observer defaults to [`NullObserver`]. Every public operation is a
/// plain awaited call on the invoking task -- "blocking" means suspension
/// on the next incoming line, and there is no internal timeout.
pub struct DcssClient<T: Transport, O: FrameObserver = NullObserver> {
    engine: FrameEngine<T>,
    session: Session,
    options: ClientOptions,
    observer: O,
}

impl<T: Transport> DcssClient<T> {
    pub fn new(transport: T, options: ClientOptions) -> Self {
        Self::with_observer(transport, options, NullObserver)
    }
}

impl<T: Transport, O: FrameObserver> DcssClient<T, O> {
    /// Build a client with an attached dispatch observer.
    pub fn with_observer(transport: T, options: ClientOptions, observer: O) -> Self {
        DcssClient {
            engine: FrameEngine::new(transport),
            session: Session::default(),
            options,
            observer,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn transport(&self) -> &T {
        self.engine.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.engine.transport_mut()
    }

    /// Run one frame through the dispatch chain: session flags first, then
    /// the attached observer.
    fn dispatch(&mut self, frame: &Frame) {
        self.session.observe(frame);
        self.observer.on_frame(frame);
    }

    /// Read one frame without dispatching it. Used only by the login
    /// handshake, where the frame shapes are fixed and carry no session
    /// state of their own.
    async fn read_frame(&mut self) -> Result<Frame> {
        self.engine.read_frame().await
    }

    /// Read one frame and route it through the dispatch chain.
    pub async fn pump(&mut self) -> Result<Frame> {
        let frame = self.engine.read_frame().await?;
        self.dispatch(&frame);
        Ok(frame)
    }

    /// Lazy, unbounded sequence of frame names.
    ///
    /// Every pulled frame is dispatched before its name is yielded. The
    /// consumer may stop pulling at any time; calling `frames()` again
    /// later continues from the live stream -- nothing is buffered or
    /// replayed.
    pub fn frames(&mut self) -> Frames<'_, T, O> {
        Frames { client: self }
    }

    /// Pump frames until one satisfies `predicate`, dispatching every
    /// frame observed along the way (including the matching one).
    pub async fn wait_for_frame<P>(&mut self, mut predicate: P) -> Result<Frame>
    where
        P: FnMut(&Frame) -> bool,
    {
        loop {
            let frame = self.pump().await?;
            if predicate(&frame) {
                return Ok(frame);
            }
        }
    }

    /// Pump frames until one whose text begins with `prefix` arrives;
    /// returns that frame's full text.
    pub async fn wait_for_prefix(&mut self, prefix: &str) -> Result<String> {
        let frame = self
            .wait_for_frame(|frame| frame.text().starts_with(prefix))
            .await?;
        Ok(frame.into_text())
    }

    /// Perform the login handshake.
    ///
    /// The bus prompts with `stoc_send_client_type`, the client answers
    /// with its identity frame, and the bus closes the exchange with
    /// `stog_login_complete <client_id>`. Any other shape fails with
    /// [`Error::ProtocolViolation`].
    pub async fn login(&mut self) -> Result<()> {
        let prompt = self.read_frame().await?;
        if prompt.name() != "stoc_send_client_type" {
            return Err(Error::ProtocolViolation(format!(
                "expected stoc_send_client_type, got: {}",
                prompt.text()
            )));
        }

        let identity = format!(
            "gtos_client_is_gui {} {} {} {}",
            self.options.user, self.options.session_id, self.options.host, self.options.display
        );
        self.engine
            .send_frame(FrameVariant::Handshake, &identity)
            .await?;

        let reply = self.read_frame().await?;
        if reply.name() != "stog_login_complete" {
            return Err(Error::ProtocolViolation(format!(
                "login failed, unexpected reply: {}",
                reply.text()
            )));
        }
        let client_id = reply.args().split_whitespace().next().ok_or_else(|| {
            Error::ProtocolViolation("stog_login_complete carried no client id".to_string())
        })?;
        self.session.client_id = Some(client_id.to_string());
        debug!(client_id, "login complete");
        Ok(())
    }

    /// Contend for master write privilege.
    ///
    /// Short-circuits to success without touching the wire if this peer is
    /// already master. Otherwise sends `gtos_become_master` and pumps
    /// frames until the bus answers the contention: `stog_become_master`
    /// means success, `stog_other_master` or `stog_become_slave` means a
    /// rival peer holds the privilege.
    pub async fn become_master(&mut self, force: bool) -> Result<bool> {
        if self.session.master {
            return Ok(true);
        }

        let mode = if force { "force" } else { "noforce" };
        self.engine
            .send_frame(FrameVariant::Command, &format!("gtos_become_master {mode}"))
            .await?;

        loop {
            let frame = self.pump().await?;
            match frame.name() {
                "stog_become_master" => return Ok(true),
                "stog_other_master" | "stog_become_slave" => return Ok(false),
                _ => {}
            }
        }
    }

    /// Acquire master privilege or fail with [`Error::MasterUnavailable`].
    pub(crate) async fn require_master(&mut self) -> Result<()> {
        if self.become_master(true).await? {
            Ok(())
        } else {
            Err(Error::MasterUnavailable)
        }
    }

    /// Pump frames until the bus has completed its initial full update.
    ///
    /// This is a blocking precondition, not a timed wait: if the bus never
    /// finishes synchronizing, the call suspends indefinitely.
    pub async fn ensure_ready(&mut self) -> Result<()> {
        while !self.session.ready {
            self.pump().await?;
        }
        Ok(())
    }

    /// Start a named operation and block until the bus reports it
    /// complete.
    ///
    /// Requires master privilege, auto-acquiring it if absent. Allocates
    /// the next operation number, sends
    /// `gtos_start_operation <name> <client_id>.<op_no> <args...>`, and
    /// pumps frames until a `stog_operation_completed <name>` frame
    /// arrives. Returns the full text of that completion frame.
    ///
    /// Master loss observed while the operation is in flight does not
    /// abort the wait -- the bus is expected to still answer -- but any
    /// subsequent master-gated call will re-contend.
    pub async fn run_operation(&mut self, name: &str, args: &[&str]) -> Result<String> {
        self.require_master().await?;
        let client_id = self
            .session
            .client_id
            .clone()
            .ok_or_else(|| {
                Error::ProtocolViolation("cannot start an operation before login".to_string())
            })?;
        let operation_no = self.session.next_operation_no();

        let mut line = format!("gtos_start_operation {name} {client_id}.{operation_no}");
        if !args.is_empty() {
            line.push(' ');
            line.push_str(&args.join(" "));
        }
        self.engine.send_frame(FrameVariant::Command, &line).await?;

        self.wait_for_prefix(&format!("stog_operation_completed {name}"))
            .await
    }

    /// Set a named bus string and block until the bus echoes acceptance.
    pub async fn set_string(&mut self, name: &str, data: &str) -> Result<()> {
        self.engine
            .send_frame(
                FrameVariant::Command,
                &format!("gtos_set_string {name} {data}"),
            )
            .await?;
        self.wait_for_prefix(&format!("stog_set_string_completed {name}"))
            .await?;
        Ok(())
    }

    /// Send a pre-formatted command frame. Used by operation handles.
    pub(crate) async fn send_command(&mut self, line: &str) -> Result<()> {
        self.engine.send_frame(FrameVariant::Command, line).await
    }
}

/// Restartable pull sequence over the live frame stream.
///
/// Produced by [`DcssClient::frames`]. Each `next()` pumps exactly one
/// frame through the dispatch chain and yields its name; dropping the
/// sequence leaves the stream untouched.
pub struct Frames<'c, T: Transport, O: FrameObserver> {
    client: &'c mut DcssClient<T, O>,
}

impl<T: Transport, O: FrameObserver> Frames<'_, T, O> {
    pub async fn next(&mut self) -> Result<String> {
        let frame = self.client.pump().await?;
        Ok(frame.name().to_string())
    }
}
