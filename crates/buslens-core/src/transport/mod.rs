//! Blocking-with-timeout command transport to measurement instruments.
//!
//! A `TransportSession` owns one device handle and at most one in-flight
//! operation. The OS specifics sit behind `DeviceDriver`: operations are
//! submitted, waited on with a deadline and cancelled explicitly. A timed
//! out operation is always cancelled before the error reaches the caller;
//! a stale operation left in the driver would otherwise complete into the
//! next exchange.

mod error;
#[cfg(windows)]
mod overlapped;
mod serial;

use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::TransportError;
#[cfg(windows)]
pub use overlapped::OverlappedDriver;
pub use serial::SerialDriver;

/// Immediate result of submitting an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Finished synchronously with this many bytes transferred.
    Done(usize),
    /// Accepted by the driver; call `wait`.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed(usize),
    /// Still in flight; the caller must cancel it.
    TimedOut,
}

/// OS seam of the transport.
pub trait DeviceDriver {
    fn submit_write(&mut self, bytes: &[u8]) -> io::Result<Completion>;
    fn submit_read(&mut self, capacity: usize) -> io::Result<Completion>;
    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome>;
    /// Bytes delivered by the last completed read.
    fn read_data(&self) -> &[u8];
    /// Abort the in-flight operation, if any, and wait for the driver to
    /// release it.
    fn cancel(&mut self) -> io::Result<()>;
    fn release_event(&mut self) -> io::Result<()>;
    fn release_handle(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub baud_rate: u32,
    pub timeout_ms: u64,
    /// Receive buffer size for one reply.
    pub read_len: usize,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout_ms: 2000,
            read_len: 4096,
        }
    }
}

/// One open device. Closing releases the wait primitive and the handle;
/// dropping an open session closes it.
pub struct TransportSession<D: DeviceDriver> {
    name: String,
    driver: Option<D>,
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn cancel_quietly<D: DeviceDriver>(name: &str, driver: &mut D) {
    if let Err(err) = driver.cancel() {
        log::debug!("{name}: cancel failed: {err}");
    }
}

impl TransportSession<SerialDriver> {
    pub fn open_serial(path: &str, config: &TransportConfig) -> Result<Self, TransportError> {
        let driver = SerialDriver::open(path, config.baud_rate)?;
        Ok(Self::from_driver(path, driver))
    }
}

#[cfg(windows)]
impl TransportSession<OverlappedDriver> {
    pub fn open_device(path: &str) -> Result<Self, TransportError> {
        let driver = OverlappedDriver::open(path)?;
        Ok(Self::from_driver(path, driver))
    }
}

impl<D: DeviceDriver> TransportSession<D> {
    pub fn from_driver(name: impl Into<String>, driver: D) -> Self {
        Self {
            name: name.into(),
            driver: Some(driver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    pub fn driver(&self) -> Option<&D> {
        self.driver.as_ref()
    }

    /// Write all of `bytes`. Any operation left over from an earlier
    /// exchange is cancelled first.
    pub fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError> {
        let driver = self.driver.as_mut().ok_or(TransportError::Closed)?;
        cancel_quietly(&self.name, driver);

        let written = match driver
            .submit_write(bytes)
            .map_err(|err| TransportError::from_io("write", err))?
        {
            Completion::Done(n) => n,
            Completion::Pending => await_completion(&self.name, driver, "write", timeout)?,
        };
        log::trace!("{}: wrote {} of {} bytes", self.name, written, bytes.len());
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                expected: bytes.len(),
                written,
            });
        }
        Ok(())
    }

    /// Read one reply into `buffer`; the count may be short.
    pub fn receive(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let driver = self.driver.as_mut().ok_or(TransportError::Closed)?;
        let reported = match driver
            .submit_read(buffer.len())
            .map_err(|err| TransportError::from_io("read", err))?
        {
            Completion::Done(n) => n,
            Completion::Pending => await_completion(&self.name, driver, "read", timeout)?,
        };
        let data = driver.read_data();
        let n = reported.min(data.len()).min(buffer.len());
        buffer[..n].copy_from_slice(&data[..n]);
        log::trace!("{}: read {} bytes", self.name, n);
        Ok(n)
    }

    /// Best effort; failures are logged and swallowed.
    pub fn cancel(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            cancel_quietly(&self.name, driver);
        }
    }

    /// Release the wait primitive and the handle. Both are attempted even if
    /// the first fails; the first error is returned. Closing twice is a
    /// no-op.
    pub fn close(&mut self) -> Result<(), TransportError> {
        let Some(mut driver) = self.driver.take() else {
            return Ok(());
        };
        let event = driver.release_event();
        let handle = driver.release_handle();
        log::debug!("{}: closed", self.name);
        event
            .and(handle)
            .map_err(|err| TransportError::from_io("close", err))
    }

    /// Send `command` and read one reply of at most `config.read_len` bytes.
    pub fn query(
        &mut self,
        command: &[u8],
        config: &TransportConfig,
    ) -> Result<Vec<u8>, TransportError> {
        self.send(command, config.timeout())?;
        let mut reply = vec![0u8; config.read_len];
        let n = self.receive(&mut reply, config.timeout())?;
        reply.truncate(n);
        Ok(reply)
    }
}

fn await_completion<D: DeviceDriver>(
    name: &str,
    driver: &mut D,
    operation: &'static str,
    timeout: Duration,
) -> Result<usize, TransportError> {
    match driver.wait(timeout) {
        Ok(WaitOutcome::Completed(n)) => Ok(n),
        Ok(WaitOutcome::TimedOut) => {
            log::debug!("{name}: {operation} timed out, cancelling");
            cancel_quietly(name, driver);
            Err(TransportError::Timeout {
                operation,
                timeout_ms: millis(timeout),
            })
        }
        Err(err) => {
            cancel_quietly(name, driver);
            Err(TransportError::from_io(operation, err))
        }
    }
}

impl<D: DeviceDriver> Drop for TransportSession<D> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("{}: close failed: {}", self.name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TransportConfig;

    #[test]
    fn config_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout().as_millis(), 2000);
        assert_eq!(config.read_len, 4096);
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: TransportConfig = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.read_len, 4096);
    }
}
