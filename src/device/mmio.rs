//! Register-backed [`StreamDevice`] adapter.
//!
//! [`MmioFifo`] drives a mapped AXI-Stream FIFO register block with volatile
//! word accesses. The completion flags (transmit complete, receive complete)
//! live in the write-one-to-clear ISR; the adapter consumes a flag when it
//! observes it, so each `tx_is_done`/`rx_is_done` answer refers to the
//! packet in flight and a stale flag cannot satisfy the next wait.

use super::registers::{self, isr};
use super::{DeviceConfig, DeviceError, StreamDevice};

/// AXI-Stream FIFO behind a mapped register block.
pub struct MmioFifo {
    base: *mut u32,
    config: DeviceConfig,
}

impl MmioFifo {
    /// Bind an adapter to a configured register block.
    ///
    /// # Safety
    ///
    /// `config.base_address` must be the virtual address of a mapped
    /// AXI-Stream FIFO register block that stays mapped for the adapter's
    /// lifetime, and nothing else may access those registers concurrently.
    pub unsafe fn initialize(config: &DeviceConfig) -> Result<Self, DeviceError> {
        if config.base_address == 0 {
            return Err(DeviceError::Init("base address is null".to_string()));
        }
        if config.base_address % 4 != 0 {
            return Err(DeviceError::Init(format!(
                "base address 0x{:X} is not word aligned",
                config.base_address
            )));
        }

        log::debug!(
            "binding fifo device {} at 0x{:08X}",
            config.device_id,
            config.base_address
        );

        Ok(Self {
            base: config.base_address as *mut u32,
            config: *config,
        })
    }

    /// Configuration this adapter was bound with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn read_reg(&self, offset: u32) -> u32 {
        // Offsets come from `registers` and are in bounds of the block.
        unsafe { self.base.add((offset / 4) as usize).read_volatile() }
    }

    fn write_reg(&mut self, offset: u32, value: u32) {
        unsafe { self.base.add((offset / 4) as usize).write_volatile(value) }
    }

    /// Check an ISR completion flag, consuming it when set.
    fn take_isr_flag(&mut self, flag: u32) -> bool {
        if self.read_reg(registers::ISR) & flag != 0 {
            self.write_reg(registers::ISR, flag);
            true
        } else {
            false
        }
    }
}

impl StreamDevice for MmioFifo {
    fn status(&mut self) -> u32 {
        self.read_reg(registers::ISR)
    }

    fn clear_interrupts(&mut self, mask: u32) {
        self.write_reg(registers::ISR, mask);
    }

    fn tx_has_vacancy(&mut self) -> bool {
        self.read_reg(registers::TDFV) > 0
    }

    fn tx_push_word(&mut self, word: u32) {
        log::trace!("tx push 0x{:08X}", word);
        self.write_reg(registers::TDFD, word);
    }

    fn tx_commit(&mut self, byte_length: u32) {
        log::debug!("tx commit {} bytes", byte_length);
        self.write_reg(registers::TLR, byte_length);
    }

    fn tx_is_done(&mut self) -> bool {
        self.take_isr_flag(isr::TC)
    }

    fn rx_has_data(&mut self) -> bool {
        self.read_reg(registers::RDFO) > 0
    }

    fn rx_packet_byte_length(&mut self) -> u32 {
        self.read_reg(registers::RLR)
    }

    fn rx_pop_word(&mut self) -> u32 {
        let word = self.read_reg(registers::RDFD);
        log::trace!("rx pop 0x{:08X}", word);
        word
    }

    fn rx_is_done(&mut self) -> bool {
        self.take_isr_flag(isr::RC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_rejects_null_base() {
        let config = DeviceConfig {
            device_id: 9,
            base_address: 0,
            tx_fifo_depth: 512,
            rx_fifo_depth: 512,
        };
        let result = unsafe { MmioFifo::initialize(&config) };
        assert!(matches!(result, Err(DeviceError::Init(_))));
    }

    #[test]
    fn test_initialize_rejects_misaligned_base() {
        let config = DeviceConfig {
            device_id: 9,
            base_address: 0x43C0_0002,
            tx_fifo_depth: 512,
            rx_fifo_depth: 512,
        };
        let result = unsafe { MmioFifo::initialize(&config) };
        assert!(matches!(result, Err(DeviceError::Init(_))));
    }

    #[test]
    fn test_initialize_binds_to_backing_memory() {
        // A word-aligned in-process buffer stands in for the register block.
        let mut block = [0u32; 16];
        let base = block.as_mut_ptr();
        let config = DeviceConfig {
            device_id: 9,
            base_address: base as usize,
            tx_fifo_depth: 512,
            rx_fifo_depth: 512,
        };

        let mut fifo = unsafe { MmioFifo::initialize(&config) }.unwrap();
        assert_eq!(fifo.config(), &config);

        let poke = |offset: u32, value: u32| unsafe {
            base.add((offset / 4) as usize).write_volatile(value)
        };
        let peek = |offset: u32| unsafe { base.add((offset / 4) as usize).read_volatile() };

        poke(registers::RDFO, 4);
        assert!(fifo.rx_has_data());

        fifo.tx_push_word(0xCAFE_F00D);
        assert_eq!(peek(registers::TDFD), 0xCAFE_F00D);

        poke(registers::ISR, isr::TC);
        assert!(fifo.tx_is_done());
    }
}
