//! Named, cross-process shared-memory regions.
//!
//! This is deliberately kept outside the wait-free core: nothing here is on
//! the hot reserve/commit/peek/advance path, so it can afford `io::Result`,
//! heap allocation, syscalls, and fallible cleanup.

use std::ffi::CString;
use std::io;
use std::ptr::{self, NonNull};

use libc::{c_void, mode_t};
use tracing::{debug, warn};

/// Backend abstraction over a mapped region, so the core types only ever see
/// a `&[u8]`/`&mut [u8]` regardless of what produced it.
pub trait SharedMemoryBackend: Send + Sync {
    fn as_ptr(&self) -> *mut u8;
    fn size(&self) -> usize;
    fn raw_handle(&self) -> RawHandle;
}

#[derive(Debug, Clone, Copy)]
pub enum RawHandle {
    Fd(i32),
}

/// Whether a mapping may be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Validates a shared-memory name: 1-255 alphanumeric characters, no leading
/// `/` (one is added internally to satisfy `shm_open`). Any non-alphanumeric
/// or empty name is rejected.
fn validate_name(name: &str) -> io::Result<CString> {
    if name.is_empty() || name.len() > 255 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "shared memory name must be 1-255 bytes",
        ));
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "shared memory name must be alphanumeric",
        ));
    }
    CString::new(format!("/{name}")).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// A POSIX `shm_open` + `mmap` region, named so a second process can attach
/// to it by the same name.
pub struct PosixSharedMemory {
    ptr: NonNull<u8>,
    size: usize,
    fd: i32,
}

unsafe impl Send for PosixSharedMemory {}
unsafe impl Sync for PosixSharedMemory {}

const DEFAULT_MODE: mode_t = 0o600;

impl PosixSharedMemory {
    /// Creates a new named region, failing if one already exists under that
    /// name (`O_CREAT | O_EXCL`).
    pub fn create(name: &str, size: usize) -> io::Result<Self> {
        let c_name = validate_name(name)?;
        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                DEFAULT_MODE,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(name, size, "created shared memory region");
        Self::finish_mapping(fd, size, Access::ReadWrite)
    }

    /// Attaches to a region created by `create`, either by some other
    /// process or earlier in this one.
    pub fn attach(name: &str, size: usize, access: Access) -> io::Result<Self> {
        let c_name = validate_name(name)?;
        let flags = match access {
            Access::ReadOnly => libc::O_RDONLY,
            Access::ReadWrite => libc::O_RDWR,
        };
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), flags, DEFAULT_MODE) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(name, size, "attached to shared memory region");
        Self::finish_mapping(fd, size, access)
    }

    /// Creates the region if it doesn't exist, otherwise attaches to it —
    /// the common "first peer initializes, later peers attach" pattern.
    pub fn create_or_attach(name: &str, size: usize) -> io::Result<(Self, bool)> {
        match Self::create(name, size) {
            Ok(shm) => Ok((shm, true)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Ok((Self::attach(name, size, Access::ReadWrite)?, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Unlinks a named region so no further `attach` can find it. Succeeds
    /// whether or not the region currently exists; existing mappings stay
    /// valid until their last holder drops.
    pub fn destroy(name: &str) -> io::Result<()> {
        let c_name = validate_name(name)?;
        let result = unsafe { libc::shm_unlink(c_name.as_ptr()) };
        if result != 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::NotFound {
                return Ok(());
            }
            return Err(err);
        }
        Ok(())
    }

    fn finish_mapping(fd: i32, size: usize, access: Access) -> io::Result<Self> {
        if unsafe { libc::ftruncate(fd, size as libc::off_t) } != 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }

        let prot = match access {
            Access::ReadOnly => libc::PROT_READ,
            Access::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        };
        let ptr = unsafe { libc::mmap(ptr::null_mut(), size, prot, libc::MAP_SHARED, fd, 0) };
        if ptr == libc::MAP_FAILED {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }

        Ok(Self {
            ptr: NonNull::new(ptr as *mut u8).expect("mmap returned a null non-failure pointer"),
            size,
            fd,
        })
    }

    /// The mapped region as a byte slice, for handing to `Header::view`.
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }

    /// The mapped region as a mutable byte slice, for handing to
    /// `Header::create`. Only meaningful if this handle was opened
    /// read-write.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

impl Drop for PosixSharedMemory {
    fn drop(&mut self) {
        unsafe {
            if libc::munmap(self.ptr.as_ptr() as *mut c_void, self.size) != 0 {
                warn!(error = %io::Error::last_os_error(), "munmap failed");
            }
            libc::close(self.fd);
        }
    }
}

impl SharedMemoryBackend for PosixSharedMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn size(&self) -> usize {
        self.size
    }

    fn raw_handle(&self) -> RawHandle {
        RawHandle::Fd(self.fd)
    }
}
