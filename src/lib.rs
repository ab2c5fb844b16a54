//! axis-selftest library
//!
//! Self-checking test harness for a coprocessor behind an AXI-Stream FIFO.
//!
//! The harness pushes fixed input vectors into the FIFO's transmit side,
//! waits for the coprocessor's response packets, and compares the drained
//! words against a software reference model. All device access goes through
//! the [`device::StreamDevice`] capability trait, so the same run logic
//! drives a mapped register block ([`device::MmioFifo`]) or the in-memory
//! simulator ([`device::SimFifo`]).
//!
//! # Example
//!
//! ```
//! use axis_selftest::device::{DeviceConfig, SimFifo};
//! use axis_selftest::harness::{StreamHarness, VectorSet};
//!
//! let config = DeviceConfig::lookup(0).unwrap();
//! let device = SimFifo::initialize(config).unwrap();
//!
//! let mut harness = StreamHarness::new(device, VectorSet::canonical());
//! let report = harness.run().unwrap();
//! assert!(report.passed());
//! ```

pub mod config;
pub mod device;
pub mod harness;

pub use config::HarnessConfig;
pub use device::{DeviceConfig, MmioFifo, SimFifo, StreamDevice};
pub use harness::{HarnessError, RunReport, StreamHarness, VectorSet, Verdict};
