// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Queue operations: kernel launches, transfers, copies and markers.
//!
//! Offsets and lengths are in **elements** here and converted to bytes in
//! [`crate::memory`] before the native call.
//!
//! ## Blocking and non-blocking transfers
//!
//! A non-blocking transfer lets the device touch host memory after the call
//! returns, so the host storage must stay put until the command finishes.
//! The two flavours encode that in their signatures:
//!
//! - [`CommandQueue::enqueue_read_buffer`] / [`CommandQueue::enqueue_write_buffer`]
//!   borrow a slice and block until the transfer is done.
//! - [`CommandQueue::enqueue_read_buffer_async`] /
//!   [`CommandQueue::enqueue_write_buffer_async`] take a `Vec` by value and return a
//!   [`PendingRead`] / [`PendingWrite`] that owns it until completion. Dropping
//!   the pending value waits for the command.
//!
//! Both go through the same internal transfer with the native `blocking`
//! flag set accordingly.

use crate::buffer::Buffer;
use crate::classify::{ops, require, Operation};
use crate::dtype::Element;
use crate::error::Result;
use crate::event::{raw_handles, Event};
use crate::kernel::Kernel;
use crate::logging::{log_transfer, TransferDirection};
use crate::memory::byte_range;
use crate::queue::CommandQueue;
use crate::sys::RawHandle;
use crate::traits::RefCounted;

impl CommandQueue {
    /// Launch `kernel` over an N-dimensional range.
    ///
    /// The dimension count is `global_size.len()`; `local_size` and
    /// `global_offset`, when given, must have the same length. `None` for
    /// `local_size` lets the runtime choose the work-group shape.
    ///
    /// The returned event completes after every event in `wait_list` and the
    /// kernel itself.
    ///
    /// # Errors
    ///
    /// `InvalidOperation`, `OutOfDeviceMemory`, or resource and host allocation
    /// failures.
    ///
    /// # Panics
    ///
    /// If the dimension count is not 1, 2 or 3 or the lengths disagree. Both
    /// are checked before the native call.
    pub fn enqueue_nd_range_kernel(
        &self,
        kernel: &Kernel,
        global_offset: Option<&[usize]>,
        global_size: &[usize],
        local_size: Option<&[usize]>,
        wait_list: &[&Event],
    ) -> Result<Event> {
        let operation = ops::ENQUEUE_ND_RANGE_KERNEL.name();
        let dims = global_size.len();
        require!(
            (1..=3).contains(&dims),
            operation,
            "work dimension {dims} outside 1..=3"
        );
        if let Some(local) = local_size {
            require!(
                local.len() == dims,
                operation,
                "local size has {} dimensions, global size has {dims}",
                local.len()
            );
        }
        if let Some(offset) = global_offset {
            require!(
                offset.len() == dims,
                operation,
                "global offset has {} dimensions, global size has {dims}",
                offset.len()
            );
        }

        let waits = raw_handles(wait_list);
        let mut event = RawHandle::NULL;
        let status = self.runtime.api().enqueue_nd_range_kernel(
            self.raw,
            kernel.as_raw(),
            global_offset,
            global_size,
            local_size,
            &waits,
            &mut event,
        );
        self.finish_enqueue(&ops::ENQUEUE_ND_RANGE_KERNEL, status, event)
    }

    /// Read `dst.len()` elements starting at element `offset`, blocking until done.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the buffer's host-access flags forbid reads,
    /// `ExecStatusErrorForEvents` if a wait-list event failed, or resource and
    /// allocation failures.
    ///
    /// # Panics
    ///
    /// If the range is empty or does not fit inside the buffer.
    pub fn enqueue_read_buffer<T: Element>(
        &self,
        buffer: &Buffer<T>,
        offset: usize,
        dst: &mut [T],
        wait_list: &[&Event],
    ) -> Result<Event> {
        // SAFETY: the transfer is blocking, so `dst` is not touched after return.
        unsafe {
            self.read_raw(
                buffer,
                true,
                offset,
                dst.len(),
                dst.as_mut_ptr(),
                wait_list,
            )
        }
    }

    /// Write `src` starting at element `offset`, blocking until done.
    ///
    /// # Errors
    ///
    /// See [`CommandQueue::enqueue_read_buffer`].
    ///
    /// # Panics
    ///
    /// If the range is empty or does not fit inside the buffer.
    pub fn enqueue_write_buffer<T: Element>(
        &self,
        buffer: &Buffer<T>,
        offset: usize,
        src: &[T],
        wait_list: &[&Event],
    ) -> Result<Event> {
        // SAFETY: the transfer is blocking, so `src` is not read after return.
        unsafe { self.write_raw(buffer, true, offset, src.len(), src.as_ptr(), wait_list) }
    }

    /// Start reading into `dst` without blocking.
    ///
    /// `dst` is owned by the returned [`PendingRead`] until the read completes.
    ///
    /// # Errors
    ///
    /// See [`CommandQueue::enqueue_read_buffer`].
    ///
    /// # Panics
    ///
    /// If the range is empty or does not fit inside the buffer.
    pub fn enqueue_read_buffer_async<T: Element>(
        &self,
        buffer: &Buffer<T>,
        offset: usize,
        mut dst: Vec<T>,
        wait_list: &[&Event],
    ) -> Result<PendingRead<T>> {
        // SAFETY: the heap storage of `dst` moves into the returned
        // PendingRead, which does not expose it before the event is terminal.
        let event = unsafe {
            self.read_raw(
                buffer,
                false,
                offset,
                dst.len(),
                dst.as_mut_ptr(),
                wait_list,
            )?
        };
        Ok(PendingRead(InFlight::new(event, dst)))
    }

    /// Start writing `src` without blocking.
    ///
    /// `src` is owned by the returned [`PendingWrite`] until the write completes.
    ///
    /// # Errors
    ///
    /// See [`CommandQueue::enqueue_read_buffer`].
    ///
    /// # Panics
    ///
    /// If the range is empty or does not fit inside the buffer.
    pub fn enqueue_write_buffer_async<T: Element>(
        &self,
        buffer: &Buffer<T>,
        offset: usize,
        src: Vec<T>,
        wait_list: &[&Event],
    ) -> Result<PendingWrite<T>> {
        // SAFETY: as for enqueue_read_buffer_async.
        let event = unsafe {
            self.write_raw(buffer, false, offset, src.len(), src.as_ptr(), wait_list)?
        };
        Ok(PendingWrite(InFlight::new(event, src)))
    }

    /// Copy `count` elements between buffers on the device.
    ///
    /// # Errors
    ///
    /// `OutOfDeviceMemory`, or resource and host allocation failures.
    ///
    /// # Panics
    ///
    /// If either range is out of bounds, `count` is zero, or the ranges
    /// overlap within the same buffer.
    pub fn enqueue_copy_buffer<T: Element>(
        &self,
        src: &Buffer<T>,
        dst: &Buffer<T>,
        src_offset: usize,
        dst_offset: usize,
        count: usize,
        wait_list: &[&Event],
    ) -> Result<Event> {
        let operation = ops::ENQUEUE_COPY_BUFFER.name();
        require!(count > 0, operation, "empty copy");
        let (src_bytes, size) = byte_range::<T>(operation, src.len(), src_offset, count);
        let (dst_bytes, _) = byte_range::<T>(operation, dst.len(), dst_offset, count);
        require!(
            src.as_raw() != dst.as_raw()
                || src_offset + count <= dst_offset
                || dst_offset + count <= src_offset,
            operation,
            "source and destination ranges overlap"
        );
        let waits = raw_handles(wait_list);
        let mut event = RawHandle::NULL;
        let status = self.runtime.api().enqueue_copy_buffer(
            self.raw,
            src.as_raw(),
            dst.as_raw(),
            src_bytes,
            dst_bytes,
            size,
            &waits,
            &mut event,
        );
        self.finish_enqueue(&ops::ENQUEUE_COPY_BUFFER, status, event)
    }

    /// An event that completes once every event in `wait_list` has, or, for
    /// an empty list, once every command enqueued before it has.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn enqueue_marker(&self, wait_list: &[&Event]) -> Result<Event> {
        let waits = raw_handles(wait_list);
        let mut event = RawHandle::NULL;
        let status = self
            .runtime
            .api()
            .enqueue_marker(self.raw, &waits, &mut event);
        self.finish_enqueue(&ops::ENQUEUE_MARKER, status, event)
    }

    unsafe fn read_raw<T: Element>(
        &self,
        buffer: &Buffer<T>,
        blocking: bool,
        offset: usize,
        count: usize,
        dst: *mut T,
        wait_list: &[&Event],
    ) -> Result<Event> {
        let operation = ops::ENQUEUE_READ_BUFFER.name();
        require!(count > 0, operation, "empty read");
        let (offset_bytes, size) = byte_range::<T>(operation, buffer.len(), offset, count);
        let waits = raw_handles(wait_list);
        let mut event = RawHandle::NULL;
        let status = self.runtime.api().enqueue_read_buffer(
            self.raw,
            buffer.as_raw(),
            blocking,
            offset_bytes,
            size,
            dst.cast::<u8>(),
            &waits,
            &mut event,
        );
        let event = self.finish_enqueue(&ops::ENQUEUE_READ_BUFFER, status, event)?;
        log_transfer(TransferDirection::DeviceToHost, size, blocking);
        Ok(event)
    }

    unsafe fn write_raw<T: Element>(
        &self,
        buffer: &Buffer<T>,
        blocking: bool,
        offset: usize,
        count: usize,
        src: *const T,
        wait_list: &[&Event],
    ) -> Result<Event> {
        let operation = ops::ENQUEUE_WRITE_BUFFER.name();
        require!(count > 0, operation, "empty write");
        let (offset_bytes, size) = byte_range::<T>(operation, buffer.len(), offset, count);
        let waits = raw_handles(wait_list);
        let mut event = RawHandle::NULL;
        let status = self.runtime.api().enqueue_write_buffer(
            self.raw,
            buffer.as_raw(),
            blocking,
            offset_bytes,
            size,
            src.cast::<u8>(),
            &waits,
            &mut event,
        );
        let event = self.finish_enqueue(&ops::ENQUEUE_WRITE_BUFFER, status, event)?;
        log_transfer(TransferDirection::HostToDevice, size, blocking);
        Ok(event)
    }

    #[track_caller]
    fn finish_enqueue(&self, operation: &Operation, status: crate::sys::Status, event: RawHandle) -> Result<Event> {
        operation.check(status)?;
        tracing::trace!(queue = ?self.raw, ?event, operation = operation.name(), "enqueued");
        Ok(Event::from_raw(self.runtime.clone(), event))
    }
}

/// Host storage plus the event of the command still using it.
struct InFlight<T> {
    event: Option<Event>,
    data: Option<Vec<T>>,
}

impl<T> InFlight<T> {
    fn new(event: Event, data: Vec<T>) -> Self {
        Self {
            event: Some(event),
            data: Some(data),
        }
    }

    fn event(&self) -> &Event {
        match &self.event {
            Some(event) => event,
            None => unreachable!("event is only taken on drop"),
        }
    }

    fn wait(mut self) -> Result<Vec<T>> {
        self.event().wait()?;
        match self.data.take() {
            Some(data) => Ok(data),
            None => unreachable!("data is only taken once"),
        }
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            if self.data.is_some() {
                if let Err(err) = event.wait() {
                    tracing::debug!(%err, "pending transfer ended abnormally");
                }
            }
            event.release();
        }
    }
}

/// A non-blocking read in progress. Owns the destination until completion.
#[must_use = "dropping a pending read blocks until it completes"]
pub struct PendingRead<T>(InFlight<T>);

impl<T> PendingRead<T> {
    /// Event of the read, usable in wait-lists.
    pub fn event(&self) -> &Event {
        self.0.event()
    }

    /// Block until the read completes and return the filled storage.
    ///
    /// # Errors
    ///
    /// `ExecStatusErrorForEvents` if the read terminated abnormally; the
    /// storage is then dropped.
    pub fn wait(self) -> Result<Vec<T>> {
        self.0.wait()
    }
}

/// A non-blocking write in progress. Owns the source until completion.
#[must_use = "dropping a pending write blocks until it completes"]
pub struct PendingWrite<T>(InFlight<T>);

impl<T> PendingWrite<T> {
    /// Event of the write, usable in wait-lists.
    pub fn event(&self) -> &Event {
        self.0.event()
    }

    /// Block until the write completes and return the source storage.
    ///
    /// # Errors
    ///
    /// `ExecStatusErrorForEvents` if the write terminated abnormally.
    pub fn wait(self) -> Result<Vec<T>> {
        self.0.wait()
    }
}
