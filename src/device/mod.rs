//! Streaming device abstraction for the AXI-Stream FIFO.
//!
//! This module provides:
//! - The [`StreamDevice`] capability trait consumed by the test harness
//! - Device configuration lookup ([`DeviceConfig`])
//! - The register-backed production adapter ([`MmioFifo`])
//! - The in-memory simulator used by tests ([`SimFifo`])
//!
//! # Design
//!
//! The harness never touches registers directly. Everything it needs from
//! the hardware is expressed as a capability query or a single-word
//! push/pop, so the same transmit/receive state machine runs against a
//! mapped register block in production and against [`SimFifo`] in tests:
//!
//! ```text
//!   StreamHarness ──► StreamDevice (trait)
//!                        ├── MmioFifo   volatile register access
//!                        └── SimFifo    in-memory FIFOs + fault injection
//! ```

pub mod mmio;
pub mod registers;
pub mod sim;

pub use mmio::MmioFifo;
pub use sim::SimFifo;

use thiserror::Error;

/// Bytes per stream word. The FIFO data path is 32 bits wide.
pub const WORD_BYTES: u32 = 4;

/// Errors raised while binding a device adapter to its configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No entry in the device table for the requested id.
    #[error("no device configuration found for id {0}")]
    NotFound(u16),

    /// The configuration describes a device the adapter cannot bind to.
    #[error("device initialization failed: {0}")]
    Init(String),
}

/// Static configuration for one FIFO instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device id, as the board support package numbers instances.
    pub device_id: u16,
    /// Physical base address of the register block.
    pub base_address: usize,
    /// Transmit FIFO depth in words.
    pub tx_fifo_depth: u32,
    /// Receive FIFO depth in words.
    pub rx_fifo_depth: u32,
}

/// Compiled-in device table. One FIFO instance on the reference design.
static DEVICE_TABLE: &[DeviceConfig] = &[DeviceConfig {
    device_id: 0,
    base_address: 0x43C0_0000,
    tx_fifo_depth: 512,
    rx_fifo_depth: 512,
}];

impl DeviceConfig {
    /// Look up the configuration for a device id.
    ///
    /// Returns `None` when the id is not in the table; the harness maps
    /// that to a configuration error before any register access happens.
    pub fn lookup(device_id: u16) -> Option<&'static DeviceConfig> {
        DEVICE_TABLE.iter().find(|c| c.device_id == device_id)
    }

    /// All known device configurations.
    pub fn all() -> &'static [DeviceConfig] {
        DEVICE_TABLE
    }
}

/// Capability interface of a packet-framed streaming device.
///
/// One committed transmit burst produces one receive packet. Completion and
/// occupancy are exposed as queries, never as blocking calls, so the caller
/// owns all waiting policy (see `harness::PollBudget`).
pub trait StreamDevice {
    /// Current status/error flags as a bit pattern.
    fn status(&mut self) -> u32;

    /// Clear all pending status bits matching `mask`.
    fn clear_interrupts(&mut self, mask: u32);

    /// True if at least one more word may be pushed into the transmit side.
    fn tx_has_vacancy(&mut self) -> bool;

    /// Enqueue one word into the transmit FIFO.
    ///
    /// Callers must have observed vacancy first; pushing into a full FIFO
    /// is a hardware overrun.
    fn tx_push_word(&mut self, word: u32);

    /// Commit the pushed words as one packet of `byte_length` bytes.
    ///
    /// This is the stream end-marker: the device starts sending only after
    /// the length is written.
    fn tx_commit(&mut self, byte_length: u32);

    /// True once the committed packet has been fully sent.
    fn tx_is_done(&mut self) -> bool;

    /// True if at least one receivable packet is pending.
    fn rx_has_data(&mut self) -> bool;

    /// Byte length of the next receivable packet.
    fn rx_packet_byte_length(&mut self) -> u32;

    /// Dequeue one word from the receive FIFO.
    fn rx_pop_word(&mut self) -> u32;

    /// True once the current packet has been fully drained.
    fn rx_is_done(&mut self) -> bool;
}
