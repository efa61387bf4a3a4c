use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use std::time::Duration;

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_IO_PENDING, GENERIC_READ, GENERIC_WRITE, GetLastError, HANDLE,
    INVALID_HANDLE_VALUE, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAG_OVERLAPPED, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING, ReadFile,
    WriteFile,
};
use windows_sys::Win32::System::IO::{CancelIoEx, GetOverlappedResult, OVERLAPPED};
use windows_sys::Win32::System::Threading::{CreateEventW, ResetEvent, WaitForSingleObject};

use super::error::TransportError;
use super::{Completion, DeviceDriver, WaitOutcome};

/// Kernel driver handle opened for overlapped I/O (USB TMC instruments and
/// similar device interfaces).
///
/// One manual-reset event signals completion of the single in-flight
/// operation. The `OVERLAPPED` block and the read buffer are boxed so their
/// addresses stay fixed while the kernel owns them.
pub struct OverlappedDriver {
    handle: HANDLE,
    event: HANDLE,
    overlapped: Box<OVERLAPPED>,
    write_buf: Vec<u8>,
    read_buf: Box<[u8]>,
    read_len: usize,
    in_flight: bool,
}

fn last_error() -> io::Error {
    io::Error::last_os_error()
}

fn to_wide(path: &str) -> Vec<u16> {
    OsStr::new(path).encode_wide().chain(Some(0)).collect()
}

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX - 1)
}

impl OverlappedDriver {
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let wide = to_wide(path);
        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                FILE_FLAG_OVERLAPPED,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(TransportError::from_open(path, last_error()));
        }

        // SAFETY: no attributes or name; manual reset, initially unsignaled.
        let event = unsafe { CreateEventW(ptr::null(), 1, 0, ptr::null()) };
        if event.is_null() {
            let err = last_error();
            // SAFETY: `handle` was returned by CreateFileW above.
            unsafe { CloseHandle(handle) };
            return Err(TransportError::from_open(path, err));
        }

        log::debug!("opened device {path} for overlapped I/O");
        Ok(Self {
            handle,
            event,
            // SAFETY: OVERLAPPED is plain data; all-zero is its initial state.
            overlapped: Box::new(unsafe { std::mem::zeroed() }),
            write_buf: Vec::new(),
            read_buf: Box::default(),
            read_len: 0,
            in_flight: false,
        })
    }

    fn handle(&self) -> io::Result<HANDLE> {
        if self.handle.is_null() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "device handle released"));
        }
        Ok(self.handle)
    }

    fn prepare(&mut self) -> io::Result<()> {
        if self.in_flight {
            return Err(io::Error::other("an operation is already in flight"));
        }
        // SAFETY: `event` is a live event handle owned by this driver.
        if unsafe { ResetEvent(self.event) } == 0 {
            return Err(last_error());
        }
        // SAFETY: as in `open`.
        *self.overlapped = unsafe { std::mem::zeroed() };
        self.overlapped.hEvent = self.event;
        Ok(())
    }

    /// Map the immediate result of ReadFile/WriteFile. The byte count of a
    /// synchronous completion comes from the OVERLAPPED block; the count
    /// argument of those calls is unreliable on overlapped handles.
    fn started(&mut self, handle: HANDLE, ok: i32) -> io::Result<Completion> {
        if ok != 0 {
            let mut transferred = 0u32;
            // SAFETY: the operation tied to `overlapped` already completed.
            let done =
                unsafe { GetOverlappedResult(handle, &*self.overlapped, &mut transferred, 0) };
            if done == 0 {
                return Err(last_error());
            }
            return Ok(Completion::Done(transferred as usize));
        }
        // SAFETY: reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        if code == ERROR_IO_PENDING {
            self.in_flight = true;
            Ok(Completion::Pending)
        } else {
            Err(io::Error::from_raw_os_error(code as i32))
        }
    }
}

impl DeviceDriver for OverlappedDriver {
    fn submit_write(&mut self, bytes: &[u8]) -> io::Result<Completion> {
        let handle = self.handle()?;
        self.prepare()?;
        self.write_buf = bytes.to_vec();
        let len = u32::try_from(self.write_buf.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "write too large"))?;
        // SAFETY: `write_buf` and `overlapped` are owned by self and stay in
        // place until the operation completes or is cancelled.
        let ok = unsafe {
            WriteFile(
                handle,
                self.write_buf.as_ptr(),
                len,
                ptr::null_mut(),
                &mut *self.overlapped,
            )
        };
        self.started(handle, ok)
    }

    fn submit_read(&mut self, capacity: usize) -> io::Result<Completion> {
        let handle = self.handle()?;
        self.prepare()?;
        if self.read_buf.len() != capacity {
            self.read_buf = vec![0u8; capacity].into_boxed_slice();
        }
        self.read_len = 0;
        let len = u32::try_from(capacity)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "read too large"))?;
        // SAFETY: see `submit_write`.
        let ok = unsafe {
            ReadFile(
                handle,
                self.read_buf.as_mut_ptr(),
                len,
                ptr::null_mut(),
                &mut *self.overlapped,
            )
        };
        let completion = self.started(handle, ok)?;
        if let Completion::Done(n) = completion {
            self.read_len = n;
        }
        Ok(completion)
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        let handle = self.handle()?;
        if !self.in_flight {
            return Err(io::Error::other("no operation in flight"));
        }
        // SAFETY: `event` is a live event handle.
        let waited = unsafe { WaitForSingleObject(self.event, timeout_ms(timeout)) };
        if waited == WAIT_TIMEOUT {
            return Ok(WaitOutcome::TimedOut);
        }
        if waited != WAIT_OBJECT_0 {
            return Err(last_error());
        }

        let mut transferred = 0u32;
        // SAFETY: the operation identified by `overlapped` has signaled.
        let ok = unsafe { GetOverlappedResult(handle, &*self.overlapped, &mut transferred, 0) };
        self.in_flight = false;
        if ok == 0 {
            return Err(last_error());
        }
        self.read_len = transferred as usize;
        Ok(WaitOutcome::Completed(transferred as usize))
    }

    fn read_data(&self) -> &[u8] {
        &self.read_buf[..self.read_len.min(self.read_buf.len())]
    }

    fn cancel(&mut self) -> io::Result<()> {
        if !self.in_flight {
            return Ok(());
        }
        let handle = self.handle()?;
        // SAFETY: cancels only the operation tied to our OVERLAPPED block.
        unsafe { CancelIoEx(handle, &*self.overlapped) };
        let mut transferred = 0u32;
        // Block until the kernel has let go of the buffers.
        // SAFETY: same OVERLAPPED block as the cancelled operation.
        unsafe { GetOverlappedResult(handle, &*self.overlapped, &mut transferred, 1) };
        self.in_flight = false;
        Ok(())
    }

    fn release_event(&mut self) -> io::Result<()> {
        if self.event.is_null() {
            return Ok(());
        }
        // SAFETY: `event` was created by CreateEventW and is closed once.
        let ok = unsafe { CloseHandle(self.event) };
        self.event = ptr::null_mut();
        if ok == 0 { Err(last_error()) } else { Ok(()) }
    }

    fn release_handle(&mut self) -> io::Result<()> {
        if self.handle.is_null() {
            return Ok(());
        }
        // SAFETY: `handle` was created by CreateFileW and is closed once.
        let ok = unsafe { CloseHandle(self.handle) };
        self.handle = ptr::null_mut();
        self.in_flight = false;
        if ok == 0 { Err(last_error()) } else { Ok(()) }
    }
}

impl Drop for OverlappedDriver {
    fn drop(&mut self) {
        let _ = self.cancel();
        let _ = self.release_event();
        let _ = self.release_handle();
    }
}
