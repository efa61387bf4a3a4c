use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use super::error::TransportError;
use super::{Completion, DeviceDriver, WaitOutcome};

/// Poll interval the port is opened with; `wait` overrides it per call.
const OPEN_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
enum PendingOp {
    Write(Vec<u8>),
    Read(usize),
}

/// Serial port backend. Submitted operations are deferred and executed by
/// `wait` under the port timeout, so a timed-out operation stays in flight
/// until it is cancelled.
pub struct SerialDriver {
    port: Option<Box<dyn SerialPort>>,
    pending: Option<PendingOp>,
    read_buf: Vec<u8>,
}

impl SerialDriver {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(OPEN_TIMEOUT)
            .open()
            .map_err(|err| match err.kind() {
                serialport::ErrorKind::NoDevice => TransportError::DeviceNotFound {
                    path: path.to_string(),
                },
                _ => TransportError::from_open(path, io::Error::from(err)),
            })?;
        log::debug!("opened serial port {path} at {baud_rate} baud");
        Ok(Self::from_port(port))
    }

    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self {
            port: Some(port),
            pending: None,
            read_buf: Vec::new(),
        }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port released"))
    }

    fn submit(&mut self, op: PendingOp) -> io::Result<Completion> {
        if self.pending.is_some() {
            return Err(io::Error::other("an operation is already in flight"));
        }
        self.port()?;
        self.pending = Some(op);
        Ok(Completion::Pending)
    }
}

impl DeviceDriver for SerialDriver {
    fn submit_write(&mut self, bytes: &[u8]) -> io::Result<Completion> {
        self.submit(PendingOp::Write(bytes.to_vec()))
    }

    fn submit_read(&mut self, capacity: usize) -> io::Result<Completion> {
        self.read_buf.clear();
        self.submit(PendingOp::Read(capacity))
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        let Some(op) = self.pending.take() else {
            return Err(io::Error::other("no operation in flight"));
        };
        let port = self.port()?;
        port.set_timeout(timeout).map_err(io::Error::from)?;

        let result = match &op {
            PendingOp::Write(bytes) => port.write(bytes).and_then(|n| port.flush().map(|()| n)),
            PendingOp::Read(capacity) => {
                let mut buf = vec![0u8; *capacity];
                let read = port.read(&mut buf);
                if let Ok(n) = read {
                    buf.truncate(n);
                    self.read_buf = buf;
                }
                read
            }
        };
        match result {
            Ok(n) => Ok(WaitOutcome::Completed(n)),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                self.pending = Some(op);
                Ok(WaitOutcome::TimedOut)
            }
            Err(err) => Err(err),
        }
    }

    fn read_data(&self) -> &[u8] {
        &self.read_buf
    }

    fn cancel(&mut self) -> io::Result<()> {
        self.pending = None;
        match self.port.as_mut() {
            Some(port) => port.clear(ClearBuffer::All).map_err(io::Error::from),
            None => Ok(()),
        }
    }

    fn release_event(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn release_handle(&mut self) -> io::Result<()> {
        self.pending = None;
        self.port = None;
        Ok(())
    }
}
