//! Remote command intake
//!
//! The network side parses incoming payloads into [`RemoteCommand`]s and
//! queues them; the control loop drains the queue at the start of each tick.
//! The queue is a `heapless::Deque` behind a `critical-section` mutex, so it
//! can be fed from another task or an interrupt handler.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Commands accepted over the remote channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteCommand {
    /// Run the solve sequence regardless of the sensors
    Solve,
    /// Same as presenting the reset tag
    Reset,
}

impl RemoteCommand {
    /// Parse a payload, ignoring case and surrounding whitespace
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let payload = payload.trim_ascii();
        if payload.eq_ignore_ascii_case(b"solve") {
            Some(Self::Solve)
        } else if payload.eq_ignore_ascii_case(b"reset") {
            Some(Self::Reset)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solve => "solve",
            Self::Reset => "reset",
        }
    }
}

/// Returned when the queue is full; carries the rejected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull(pub RemoteCommand);

/// Bounded queue of remote commands
pub struct CommandChannel<const SIZE: usize> {
    queue: Mutex<RefCell<Deque<RemoteCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for the network side
    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { channel: self }
    }

    /// Handle for the control loop
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { channel: self }
    }

    fn push(&self, command: RemoteCommand) -> Result<(), QueueFull> {
        critical_section::with(|cs| {
            self.queue
                .borrow_ref_mut(cs)
                .push_back(command)
                .map_err(QueueFull)
        })
    }

    fn pop(&self) -> Option<RemoteCommand> {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).pop_front())
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for CommandChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of a [`CommandChannel`]
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    channel: &'a CommandChannel<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    /// Queue a command; fails without blocking when the queue is full
    pub fn try_send(&self, command: RemoteCommand) -> Result<(), QueueFull> {
        self.channel.push(command)
    }
}

/// Receiving half of a [`CommandChannel`]
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const SIZE: usize> {
    channel: &'a CommandChannel<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    /// Take the oldest queued command, if any
    pub fn try_receive(&self) -> Option<RemoteCommand> {
        self.channel.pop()
    }
}
