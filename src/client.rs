//! The session core: connection ownership and the two directional pumps.
//!
//! One task reads lines from the server and feeds decoded events to the
//! registered handlers; another reads lines from a local source and writes
//! them to the server. The two directions share nothing beyond the
//! connection itself: the inbound pump takes the read half, writes
//! serialize on the write half.

use std::sync::Mutex as StdMutex;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{ClientError, Direction, PumpError, Result};
use crate::event::Event;
use crate::handler::HandlerRegistry;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// An IRC client bound to one server address.
///
/// Lifecycle is [`new`] → [`connect`] (or [`attach`]) → commands and pumps →
/// [`close`]. Connecting twice replaces the previous connection; running an
/// operation with no connection installed reports
/// [`ClientError::NotConnected`].
///
/// [`new`]: Client::new
/// [`connect`]: Client::connect
/// [`attach`]: Client::attach
/// [`close`]: Client::close
pub struct Client {
    addr: String,
    reader: StdMutex<Option<BufReader<BoxedReader>>>,
    writer: Mutex<Option<BoxedWriter>>,
    handlers: HandlerRegistry,
    shutdown: StdMutex<CancellationToken>,
}

impl Client {
    /// Create a client for the given `host:port` address. No connection is
    /// made until [`Client::connect`].
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            reader: StdMutex::new(None),
            writer: Mutex::new(None),
            handlers: HandlerRegistry::new(),
            shutdown: StdMutex::new(CancellationToken::new()),
        }
    }

    /// Open a TCP connection to the configured address.
    ///
    /// # Errors
    ///
    /// Returns the dial failure when the endpoint is unreachable.
    pub async fn connect(&self) -> Result<()> {
        let stream = TcpStream::connect(&self.addr).await?;
        debug!(addr = %self.addr, "connected");
        self.attach(stream).await;
        Ok(())
    }

    /// Install an already-established duplex byte stream as the connection.
    ///
    /// Replaces any previous connection and arms a fresh shutdown signal.
    pub async fn attach<S>(&self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        *self.reader.lock().expect("reader slot poisoned") =
            Some(BufReader::new(Box::new(read_half) as BoxedReader));
        *self.writer.lock().await = Some(Box::new(write_half));
        *self.shutdown.lock().expect("shutdown token poisoned") = CancellationToken::new();
    }

    /// The handler registry, for sans-IO dispatch or registration through a
    /// shared reference to it.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Register a handler for a named command. Last registration wins.
    pub fn on_command<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers.on_command(name, handler);
    }

    /// Register a handler for a numeric reply code. Last registration wins.
    pub fn on_reply<F>(&self, code: i32, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers.on_reply(code, handler);
    }

    /// Format and send one command: `name` followed by space-joined
    /// `params`, CRLF-terminated, written as a single frame.
    ///
    /// Multi-word trailing parameters are not colon-prefixed automatically;
    /// pass the colon yourself (`[..., ":Ben Davies"]`).
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] with no connection installed, or the
    /// write failure. Partially written bytes are not rolled back.
    pub async fn command<I>(&self, name: &str, params: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut line = String::from(name);
        for param in params {
            line.push(' ');
            line.push_str(param.as_ref());
        }
        self.send_line(&line).await
    }

    /// Send one raw line, normalizing its terminator to CRLF.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Client::command`].
    pub async fn raw(&self, line: &str) -> Result<()> {
        self.send_line(line.trim_end_matches(['\r', '\n'])).await
    }

    /// Pump lines from the connection to the handlers and `sink` until the
    /// connection fails, reaches end of stream, or [`Client::close`] is
    /// called.
    ///
    /// Each line is decoded and dispatched to at most one handler, then
    /// written to `sink` verbatim whether or not a handler ran. A line that
    /// fails to decode is reported to `sink` as the error text plus CRLF
    /// and the loop continues; decode failures are never fatal, and neither
    /// are sink write failures — only the connection ends the loop.
    ///
    /// Returns `Ok(bytes_read)` when stopped by `close`; otherwise a
    /// [`PumpError`] carrying the bytes read before the failure.
    pub async fn run_inbound<W>(&self, mut sink: W) -> Result<u64, PumpError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut reader = match self.reader.lock().expect("reader slot poisoned").take() {
            Some(reader) => reader,
            None => {
                return Err(PumpError::new(
                    Direction::Inbound,
                    0,
                    ClientError::NotConnected,
                ))
            }
        };
        let shutdown = self.shutdown_token();

        let mut bytes: u64 = 0;
        let mut line = String::new();
        loop {
            line.clear();
            let n = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(bytes),
                read = reader.read_line(&mut line) => match read {
                    Ok(0) => {
                        return Err(PumpError::new(Direction::Inbound, bytes, ClientError::Closed))
                    }
                    Ok(n) => n,
                    Err(e) => return Err(PumpError::new(Direction::Inbound, bytes, e.into())),
                },
            };
            bytes += n as u64;

            match Event::parse(&line) {
                Ok(event) => {
                    let handled = self.handlers.dispatch(&event);
                    trace!(raw = line.trim_end(), handled, "inbound line");
                    // Sink failures do not stop the pump.
                    let _ = sink.write_all(line.as_bytes()).await;
                }
                Err(err) => {
                    debug!(raw = line.trim_end(), "discarding malformed line");
                    let mut report = err.to_string();
                    report.push_str("\r\n");
                    let _ = sink.write_all(report.as_bytes()).await;
                }
            }
        }
    }

    /// Pump lines from `source` to the connection until `source` ends, a
    /// write fails, or [`Client::close`] is called.
    ///
    /// Each source line has its terminator normalized to CRLF before it is
    /// written. Returns `Ok(bytes_read)` when stopped by `close`; otherwise
    /// a [`PumpError`] carrying the bytes read from `source` before the
    /// failure.
    pub async fn run_outbound<R>(&self, source: R) -> Result<u64, PumpError>
    where
        R: AsyncRead + Unpin,
    {
        let mut source = BufReader::new(source);
        let shutdown = self.shutdown_token();

        let mut bytes: u64 = 0;
        let mut line = String::new();
        loop {
            line.clear();
            let n = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(bytes),
                read = source.read_line(&mut line) => match read {
                    Ok(0) => {
                        return Err(PumpError::new(Direction::Outbound, bytes, ClientError::Closed))
                    }
                    Ok(n) => n,
                    Err(e) => return Err(PumpError::new(Direction::Outbound, bytes, e.into())),
                },
            };
            bytes += n as u64;

            if let Err(e) = self.send_line(line.trim_end_matches(['\r', '\n'])).await {
                return Err(PumpError::new(Direction::Outbound, bytes, e));
            }
        }
    }

    /// Shut the connection down.
    ///
    /// Cancels both pumps (they return `Ok` with their byte counts) and
    /// closes the write half. A second call reports
    /// [`ClientError::NotConnected`].
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] with no connection installed, or the
    /// shutdown failure from the stream.
    pub async fn close(&self) -> Result<()> {
        self.shutdown_token().cancel();
        let mut slot = self.writer.lock().await;
        match slot.take() {
            Some(mut writer) => {
                writer.shutdown().await?;
                debug!("connection closed");
                Ok(())
            }
            None => Err(ClientError::NotConnected),
        }
    }

    /// One line onto the wire: payload plus CRLF in a single `write_all`
    /// under the writer lock, so concurrent senders interleave whole lines.
    async fn send_line(&self, line: &str) -> Result<()> {
        let mut frame = String::with_capacity(line.len() + 2);
        frame.push_str(line);
        frame.push_str("\r\n");

        let mut slot = self.writer.lock().await;
        match slot.as_mut() {
            Some(writer) => {
                writer.write_all(frame.as_bytes()).await?;
                Ok(())
            }
            None => Err(ClientError::NotConnected),
        }
    }

    fn shutdown_token(&self) -> CancellationToken {
        self.shutdown
            .lock()
            .expect("shutdown token poisoned")
            .clone()
    }
}
