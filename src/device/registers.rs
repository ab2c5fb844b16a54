//! AXI-Stream FIFO register map.
//!
//! Byte offsets and interrupt bits for the memory-mapped register interface
//! of the AXI-Stream FIFO core. Only the registers the self-test harness
//! touches are defined here; the full core has more (interrupt enable,
//! destination/ID routing) that the polling protocol never reads.
//!
//! All registers are 32 bits wide and word-aligned. The ISR is
//! write-one-to-clear.

/// Interrupt Status Register. Write-one-to-clear.
pub const ISR: u32 = 0x00;
/// Interrupt Enable Register. Unused by the polling harness.
pub const IER: u32 = 0x04;
/// Transmit Data FIFO Reset. Write [`FIFO_RESET_KEY`] to reset.
pub const TDFR: u32 = 0x08;
/// Transmit Data FIFO Vacancy, in words.
pub const TDFV: u32 = 0x0C;
/// Transmit Data FIFO Data. Each write enqueues one word.
pub const TDFD: u32 = 0x10;
/// Transmit Length Register. Writing the byte length commits the packet.
pub const TLR: u32 = 0x14;
/// Receive Data FIFO Reset. Write [`FIFO_RESET_KEY`] to reset.
pub const RDFR: u32 = 0x18;
/// Receive Data FIFO Occupancy, in words.
pub const RDFO: u32 = 0x1C;
/// Receive Data FIFO Data. Each read dequeues one word.
pub const RDFD: u32 = 0x20;
/// Receive Length Register. Byte length of the next receivable packet.
pub const RLR: u32 = 0x24;
/// AXI4-Stream Reset Register. Write [`FIFO_RESET_KEY`] to reset both sides.
pub const SRR: u32 = 0x28;

/// Magic value for the reset registers (TDFR, RDFR, SRR).
pub const FIFO_RESET_KEY: u32 = 0x0000_00A5;

/// ISR bits consumed by the harness.
pub mod isr {
    /// Transmit Complete: the committed packet has fully left the FIFO.
    pub const TC: u32 = 1 << 27;
    /// Receive Complete: a full packet (up to TLAST) has been drained.
    pub const RC: u32 = 1 << 26;
    /// Transmit Reset Complete. Pending after core reset.
    pub const TRC: u32 = 1 << 24;
    /// Receive Reset Complete. Pending after core reset.
    pub const RRC: u32 = 1 << 23;

    /// Every ISR bit; the mask the harness clears before the reset check.
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Flags left pending by a core reset, before any interrupt clear.
    pub const RESET_PENDING: u32 = TRC | RRC;
}

/// ISR value of an idle, error-free device after clearing interrupts.
pub const STATUS_IDLE: u32 = 0x0;
