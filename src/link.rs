//! Remote command link supervision
//!
//! The broker connection itself belongs to the platform. The supervisor only
//! decides when to try connecting, announces the prop once per connection,
//! and moves incoming payloads into the command queue. It never blocks: a
//! failed connect is retried after [`DEFAULT_RETRY_INTERVAL`] on a later tick.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::command::{CommandSender, RemoteCommand};

/// Longest payload the link hands over
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Status message published after every successful connect
pub const CONNECTED_STATUS: &str = "Alchemy Machine Connected!";

/// Delay between connection attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(5_000);

/// Raw payload received from the link
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// Connection to the remote command broker
///
/// Implement this trait on top of the platform network stack. None of the
/// methods may block for longer than a single attempt.
pub trait CommandLink {
    type Error: core::fmt::Debug;

    fn is_connected(&self) -> bool;

    /// Make one connection attempt
    fn connect(&mut self) -> Result<(), Self::Error>;

    /// Publish a status message to the host
    fn publish(&mut self, message: &str) -> Result<(), Self::Error>;

    /// Take the next received payload, if any
    fn receive(&mut self) -> Option<Payload>;
}

/// Keeps the link up and feeds the command queue
pub struct LinkSupervisor<'a, const SIZE: usize> {
    commands: CommandSender<'a, SIZE>,
    retry_interval: Duration,
    next_attempt: Option<Instant>,
    announced: bool,
    dropped: u32,
}

impl<'a, const SIZE: usize> LinkSupervisor<'a, SIZE> {
    pub const fn new(commands: CommandSender<'a, SIZE>) -> Self {
        Self::with_retry_interval(commands, DEFAULT_RETRY_INTERVAL)
    }

    pub const fn with_retry_interval(commands: CommandSender<'a, SIZE>, retry_interval: Duration) -> Self {
        Self {
            commands,
            retry_interval,
            next_attempt: None,
            announced: false,
            dropped: 0,
        }
    }

    /// Number of commands dropped because the queue was full
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Service the link once
    ///
    /// Call once per tick, after the frame has been committed.
    pub fn service<L: CommandLink>(&mut self, link: &mut L, now: Instant) {
        if !link.is_connected() {
            if self.announced {
                log!("[LinkSupervisor] connection lost");
                self.announced = false;
            }
            self.try_connect(link, now);
            return;
        }

        if !self.announced {
            self.announce(link);
        }

        while let Some(payload) = link.receive() {
            self.dispatch(&payload);
        }
    }

    fn try_connect<L: CommandLink>(&mut self, link: &mut L, now: Instant) {
        if self.next_attempt.is_some_and(|at| now < at) {
            return;
        }

        match link.connect() {
            Ok(()) => {
                log!("[LinkSupervisor] connected");
                self.next_attempt = None;
                self.announce(link);
            }
            Err(err) => {
                log!(
                    "[LinkSupervisor] connect failed: {:?}, retrying in {} ms",
                    err,
                    self.retry_interval.as_millis()
                );
                self.next_attempt = Some(now + self.retry_interval);
            }
        }
    }

    fn announce<L: CommandLink>(&mut self, link: &mut L) {
        if let Err(err) = link.publish(CONNECTED_STATUS) {
            log!("[LinkSupervisor] status publish failed: {:?}", err);
        }
        self.announced = true;
    }

    fn dispatch(&mut self, payload: &[u8]) {
        let Some(command) = RemoteCommand::parse(payload) else {
            log!(
                "[LinkSupervisor] unknown message ignored: {:?}",
                core::str::from_utf8(payload).unwrap_or("<binary>")
            );
            return;
        };

        log!("[LinkSupervisor] {} received", command.as_str());
        if self.commands.try_send(command).is_err() {
            log!("[LinkSupervisor] command queue full, {} dropped", command.as_str());
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}
