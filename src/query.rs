// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Two-call info protocol.
//!
//! Variable-length info (names, logs, handle lists) is fetched in two native
//! calls: one with a null destination that reports the size, then one with a
//! destination of exactly that size. [`InfoRequest::size`] performs the first
//! call and returns a [`SizedInfo`] token; the token performs the second call
//! with the *same* target and selector, so the identifying parameters cannot
//! drift between the two calls. A result that changes between the calls is
//! not detected; the first size is trusted.
//!
//! Most callers use the one-shot helpers ([`InfoRequest::string`],
//! [`InfoRequest::scalar`], [`InfoRequest::vec`], ...) and never see the size.

use bytemuck::Pod;

use crate::api::{InfoTarget, Runtime};
use crate::classify::{self, require, Operation};
use crate::error::Result;
use crate::sys::{NAME_VERSION_MAX_NAME_SIZE, NAME_VERSION_RECORD_SIZE};

/// A pending info query: target object plus selector.
#[derive(Debug, Clone, Copy)]
pub struct InfoRequest<'a> {
    runtime: &'a Runtime,
    target: InfoTarget,
    param: u32,
}

/// Size of a query result, as reported by the first native call.
#[derive(Debug, Clone, Copy)]
pub struct SizedInfo<'a> {
    request: InfoRequest<'a>,
    size: usize,
}

impl<'a> InfoRequest<'a> {
    /// Address `param` on `target`.
    #[must_use]
    pub fn new(runtime: &'a Runtime, target: InfoTarget, param: u32) -> Self {
        Self {
            runtime,
            target,
            param,
        }
    }

    fn operation(&self) -> &'static Operation {
        classify::info_operation(&self.target)
    }

    /// First call: ask for the result size.
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying `clGet*Info`.
    pub fn size(self) -> Result<SizedInfo<'a>> {
        let mut size = 0usize;
        let status = self
            .runtime
            .api()
            .get_info(self.target, self.param, None, Some(&mut size));
        self.operation().check(status)?;
        tracing::trace!(object = ?self.target, param = self.param, size, "info size");
        Ok(SizedInfo {
            request: self,
            size,
        })
    }

    /// First call, for selectors whose data may legitimately be missing.
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying `clGet*Info`.
    pub fn size_if_available(self) -> Result<Option<SizedInfo<'a>>> {
        let mut size = 0usize;
        let status = self
            .runtime
            .api()
            .get_info(self.target, self.param, None, Some(&mut size));
        if !self.operation().check_present(status)? {
            return Ok(None);
        }
        Ok(Some(SizedInfo {
            request: self,
            size,
        }))
    }

    /// Whole result as raw bytes.
    ///
    /// # Errors
    ///
    /// Recoverable native statuses, or host allocation failure.
    pub fn bytes(self) -> Result<Vec<u8>> {
        self.size()?.to_vec()
    }

    /// Result as a string, cut at the first NUL.
    ///
    /// # Errors
    ///
    /// See [`InfoRequest::bytes`].
    pub fn string(self) -> Result<String> {
        Ok(nul_terminated(&self.bytes()?))
    }

    /// Fixed-size scalar result, fetched in a single call.
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying `clGet*Info`.
    ///
    /// # Panics
    ///
    /// If the runtime reports a result size different from `size_of::<T>()`,
    /// i.e. the selector does not denote a `T`.
    pub fn scalar<T: Pod>(self) -> Result<T> {
        let mut value = T::zeroed();
        let mut size = 0usize;
        let status = self.runtime.api().get_info(
            self.target,
            self.param,
            Some(bytemuck::bytes_of_mut(&mut value)),
            Some(&mut size),
        );
        self.operation().check(status)?;
        self.expect_scalar_size::<T>(size);
        Ok(value)
    }

    /// Like [`InfoRequest::scalar`], for selectors that may be unavailable.
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying `clGet*Info`.
    pub fn scalar_if_available<T: Pod>(self) -> Result<Option<T>> {
        let mut value = T::zeroed();
        let mut size = 0usize;
        let status = self.runtime.api().get_info(
            self.target,
            self.param,
            Some(bytemuck::bytes_of_mut(&mut value)),
            Some(&mut size),
        );
        if !self.operation().check_present(status)? {
            return Ok(None);
        }
        self.expect_scalar_size::<T>(size);
        Ok(Some(value))
    }

    fn expect_scalar_size<T>(&self, size: usize) {
        require!(
            size == std::mem::size_of::<T>(),
            self.operation().name(),
            "selector {:#x} yields {size} bytes, expected {}",
            self.param,
            std::mem::size_of::<T>()
        );
    }

    /// Array result of `T`.
    ///
    /// # Errors
    ///
    /// See [`InfoRequest::bytes`].
    ///
    /// # Panics
    ///
    /// If the byte size is not a multiple of `size_of::<T>()`.
    pub fn vec<T: Pod>(self) -> Result<Vec<T>> {
        let operation = self.operation().name();
        let param = self.param;
        let bytes = self.bytes()?;
        let width = std::mem::size_of::<T>();
        require!(
            bytes.len() % width == 0,
            operation,
            "selector {param:#x} yields {} bytes, not a multiple of {width}",
            bytes.len()
        );
        let mut out = Vec::new();
        out.try_reserve_exact(bytes.len() / width)?;
        out.extend(bytes.chunks_exact(width).map(bytemuck::pod_read_unaligned::<T>));
        Ok(out)
    }

    /// List of `cl_name_version` records.
    ///
    /// # Errors
    ///
    /// See [`InfoRequest::bytes`].
    ///
    /// # Panics
    ///
    /// If the byte size is not a whole number of records.
    pub fn name_versions(self) -> Result<Vec<NameVersion>> {
        let operation = self.operation().name();
        let bytes = self.bytes()?;
        require!(
            bytes.len() % NAME_VERSION_RECORD_SIZE == 0,
            operation,
            "{} bytes is not a whole number of {NAME_VERSION_RECORD_SIZE}-byte name/version records",
            bytes.len()
        );
        Ok(bytes
            .chunks_exact(NAME_VERSION_RECORD_SIZE)
            .map(NameVersion::from_record)
            .collect())
    }
}

impl SizedInfo<'_> {
    /// Byte size reported by the runtime.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Second call: copy the result into `dst`.
    ///
    /// Returns the number of bytes written (always [`SizedInfo::size`]).
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying `clGet*Info`.
    ///
    /// # Panics
    ///
    /// If `dst` is shorter than the reported size. This is checked before the
    /// native call is made.
    pub fn fill(&self, dst: &mut [u8]) -> Result<usize> {
        let operation = self.request.operation();
        require!(
            dst.len() >= self.size,
            operation.name(),
            "destination holds {} bytes, runtime reported {}",
            dst.len(),
            self.size
        );
        let status = self.request.runtime.api().get_info(
            self.request.target,
            self.request.param,
            Some(&mut dst[..self.size]),
            None,
        );
        operation.check(status)?;
        Ok(self.size)
    }

    /// Second call into a freshly allocated buffer of exactly the reported size.
    ///
    /// # Errors
    ///
    /// Recoverable native statuses, or host allocation failure.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(self.size)?;
        buf.resize(self.size, 0);
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

/// One `cl_name_version` record: a packed version and a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameVersion {
    /// Packed `cl_version`; see [`crate::sys::split_version`].
    pub version: u32,
    /// Name, read from the fixed-width NUL-terminated slot.
    pub name: String,
}

impl NameVersion {
    fn from_record(record: &[u8]) -> Self {
        let (version, name) = record.split_at(4);
        let mut raw = [0u8; 4];
        raw.copy_from_slice(version);
        Self {
            version: u32::from_ne_bytes(raw),
            name: nul_terminated(&name[..NAME_VERSION_MAX_NAME_SIZE]),
        }
    }

    /// `(major, minor, patch)` of [`NameVersion::version`].
    #[must_use]
    pub fn version_triple(&self) -> (u32, u32, u32) {
        crate::sys::split_version(self.version)
    }
}

/// Text up to the first NUL (or the whole slice), lossily decoded.
pub(crate) fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockApi;
    use crate::sys::{device_info, make_version, RawHandle};

    #[test]
    fn test_nul_terminated() {
        assert_eq!(nul_terminated(b"abc\0def"), "abc");
        assert_eq!(nul_terminated(b"abc"), "abc");
        assert_eq!(nul_terminated(b"\0"), "");
    }

    #[test]
    fn test_name_version_record() {
        let mut record = vec![0u8; NAME_VERSION_RECORD_SIZE];
        record[..4].copy_from_slice(&make_version(1, 2, 3).to_ne_bytes());
        record[4..4 + 12].copy_from_slice(b"cl_khr_fp64\0");
        let nv = NameVersion::from_record(&record);
        assert_eq!(nv.name, "cl_khr_fp64");
        assert_eq!(nv.version_triple(), (1, 2, 3));
    }

    fn gpu_name(runtime: &Runtime) -> InfoRequest<'_> {
        InfoRequest::new(
            runtime,
            InfoTarget::Device(RawHandle::from_addr(0x200)),
            device_info::NAME,
        )
    }

    #[test]
    fn test_two_call_string() {
        let runtime = Runtime::new(MockApi::new());
        let sized = gpu_name(&runtime).size().unwrap();
        assert_eq!(sized.size(), "Mock GPU Device".len() + 1);
        assert_eq!(gpu_name(&runtime).string().unwrap(), "Mock GPU Device");
    }

    #[test]
    #[should_panic(expected = "precondition violated")]
    fn test_short_fill_panics() {
        let runtime = Runtime::new(MockApi::new());
        let sized = gpu_name(&runtime).size().unwrap();
        let mut dst = vec![0u8; sized.size() - 1];
        let _ = sized.fill(&mut dst);
    }

    #[test]
    fn test_short_fill_makes_no_native_call() {
        let mock = MockApi::new();
        let runtime = Runtime::new(mock.clone());
        let sized = gpu_name(&runtime).size().unwrap();
        let before = mock.calls();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut dst = [0u8; 4];
            let _ = sized.fill(&mut dst);
        }));
        assert!(result.is_err());
        assert_eq!(mock.calls(), before);

        let mut dst = vec![0u8; sized.size() + 8];
        assert_eq!(sized.fill(&mut dst).unwrap(), sized.size());
        assert_eq!(mock.calls(), before + 1);
    }
}
