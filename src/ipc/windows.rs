#![cfg(windows)]

//! Windows named-pipe channel endpoint.
//!
//! One outbound byte-mode pipe instance per consumer session. The pipe is
//! created with a max instance count of 1, so a second simultaneous
//! consumer is rejected by the OS object itself.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_PIPE_CONNECTED, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{FlushFileBuffers, WriteFile, PIPE_ACCESS_OUTBOUND};
use windows_sys::Win32::System::Pipes::{
    ConnectNamedPipe, CreateNamedPipeA, DisconnectNamedPipe, PIPE_READMODE_BYTE, PIPE_TYPE_BYTE,
    PIPE_WAIT,
};

use super::ChannelAddr;

const PIPE_BUFFER: u32 = 16 * 1024;

/// One created pipe instance waiting for a consumer; consumed by `accept`.
pub struct ChannelEndpoint {
    handle: HANDLE,
}

/// Connected write half of a pipe instance.
pub struct ChannelStream {
    handle: HANDLE,
}

// Pipe handles are plain kernel object references; each one is only ever
// used from the server thread that created it.
unsafe impl Send for ChannelEndpoint {}
unsafe impl Send for ChannelStream {}

impl ChannelEndpoint {
    /// Create a fresh pipe instance under the channel's well-known name.
    pub fn bind(addr: &ChannelAddr) -> io::Result<Self> {
        let mut name = addr.to_string().into_bytes();
        name.push(0);
        let handle = unsafe {
            CreateNamedPipeA(
                name.as_ptr(),
                PIPE_ACCESS_OUTBOUND,
                PIPE_TYPE_BYTE | PIPE_READMODE_BYTE | PIPE_WAIT,
                1, // one consumer per channel instance
                PIPE_BUFFER,
                PIPE_BUFFER,
                0,
                std::ptr::null(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }

    /// Block until a consumer attaches, then hand the handle over to the
    /// streaming half.
    ///
    /// `ConnectNamedPipe` has no cooperative cancellation; a shutdown that
    /// arrives while nobody ever attaches is resolved by the daemon's
    /// bounded grace period.
    pub fn accept(self, shutdown: &AtomicBool) -> io::Result<Option<ChannelStream>> {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(None);
        }
        let ok = unsafe { ConnectNamedPipe(self.handle, std::ptr::null_mut()) };
        // A consumer racing ahead of ConnectNamedPipe reports
        // ERROR_PIPE_CONNECTED; that still counts as attached.
        let connected = ok != 0 || unsafe { GetLastError() } == ERROR_PIPE_CONNECTED;
        if !connected {
            let err = io::Error::last_os_error();
            return Err(err);
        }
        let stream = ChannelStream {
            handle: self.handle,
        };
        std::mem::forget(self); // ownership moved to the stream
        Ok(Some(stream))
    }
}

impl Drop for ChannelEndpoint {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

impl Write for ChannelStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written: u32 = 0;
        let ok = unsafe {
            WriteFile(
                self.handle,
                buf.as_ptr(),
                buf.len() as u32,
                &mut written,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(written as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        if unsafe { FlushFileBuffers(self.handle) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        unsafe {
            FlushFileBuffers(self.handle);
            DisconnectNamedPipe(self.handle);
            CloseHandle(self.handle);
        }
    }
}
