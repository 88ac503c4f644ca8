//! Serial transport to the host calculator.
//!
//! Implements [`Transport`] over a UART. The protocol runs on its own
//! UART (see [`crate::pins`]) so ESP-IDF log output on the console UART
//! never interleaves with response lines.
//!
//! - **`target_os = "espidf"`**: `esp_idf_hal::uart::UartDriver`, non-blocking reads.
//! - **all targets**: [`MemorySerial`], an in-memory transport for tests
//!   and host simulation.

use std::collections::VecDeque;

use crate::app::ports::Transport;

/// Baud rate of the calculator link.
pub const BAUD_RATE: u32 = 115_200;

// ───────────────────────────────────────────────────────────────
// ESP-IDF UART
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::UartSerial;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
    use esp_idf_hal::uart::UartDriver;
    use esp_idf_svc::sys::EspError;

    use crate::app::ports::Transport;

    pub struct UartSerial<'d> {
        uart: UartDriver<'d>,
    }

    impl<'d> UartSerial<'d> {
        pub fn new(uart: UartDriver<'d>) -> Self {
            Self { uart }
        }
    }

    impl Transport for UartSerial<'_> {
        type Error = EspError;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
            self.uart.read(buf, NON_BLOCK)
        }

        fn write(&mut self, data: &[u8]) -> Result<(), EspError> {
            let mut sent = 0;
            while sent < data.len() {
                sent += self.uart.write(&data[sent..])?;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), EspError> {
            self.uart.wait_tx_done(BLOCK)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory transport
// ───────────────────────────────────────────────────────────────

/// In-memory transport: bytes pushed with [`inject`](Self::inject) are
/// read by the dispatcher, everything it writes is collected.
#[derive(Debug, Default)]
pub struct MemorySerial {
    input: VecDeque<u8>,
    output: Vec<u8>,
    flushes: u32,
}

impl MemorySerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Take everything written so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output)
    }

    /// Written output split into lines, without `\r\n`.
    pub fn take_lines(&mut self) -> Vec<String> {
        String::from_utf8_lossy(&self.take_output())
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn flushes(&self) -> u32 {
        self.flushes
    }
}

impl Transport for MemorySerial {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.input.len());
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.output.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}
