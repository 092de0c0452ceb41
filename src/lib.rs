//! # slirc-client
//!
//! A lightweight asynchronous IRC client core built around three pieces:
//! a pure decoder that turns one raw protocol line into a structured
//! [`Event`], a registry that routes decoded events to caller-supplied
//! handlers, and a [`Client`] that pumps lines in both directions over a
//! single connection.
//!
//! ## Decoding events
//!
//! ```rust
//! use slirc_client::Event;
//!
//! let event: Event = ":irc.example.net 001 ben :Welcome to the network"
//!     .parse()
//!     .unwrap();
//! assert!(event.is_reply());
//! assert_eq!(event.code(), Some(1));
//! assert_eq!(event.sender.as_deref(), Some("irc.example.net"));
//! assert_eq!(event.recipient, "ben");
//!
//! let ping: Event = "PING :irc.example.net".parse().unwrap();
//! assert_eq!(ping.command(), Some("PING"));
//! assert_eq!(ping.content_text().as_deref(), Some("irc.example.net"));
//! ```
//!
//! ## Running a client
//!
//! Handlers are registered up front; the two pumps then move lines
//! concurrently over the same connection until it fails, reaches end of
//! stream, or [`Client::close`] cancels them.
//!
//! ```no_run
//! use slirc_client::Client;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("irc.libera.chat:6667");
//! client.connect().await?;
//!
//! client.on_command("PING", |event| {
//!     println!("server ping: {:?}", event.content_text());
//! });
//! client.on_reply(1, |_| println!("registered"));
//!
//! client.command("NICK", ["ben"]).await?;
//! client.command("USER", ["ben", "0", "*", ":Ben Davies"]).await?;
//!
//! let (inbound, outbound) = tokio::join!(
//!     client.run_inbound(tokio::io::stdout()),
//!     client.run_outbound(tokio::io::stdin()),
//! );
//! # let _ = (inbound, outbound);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod event;
pub mod handler;

#[cfg(feature = "tokio")]
pub mod client;

pub use self::error::{ClientError, Direction, EventParseError, PumpError, Result};
pub use self::event::{Event, EventKind};
pub use self::handler::HandlerRegistry;

#[cfg(feature = "tokio")]
pub use self::client::Client;
