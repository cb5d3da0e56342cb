// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Deferred command execution for the mock runtime.
//!
//! Enqueued commands are not run at once. They wait in one global pending
//! list until the host synchronizes (`clFlush`, `clFinish`, `clWaitForEvents`,
//! a blocking transfer, or setting a user event status). The scheduler then
//! runs every command whose dependencies are complete, in enqueue order, until
//! nothing more can make progress.
//!
//! Timestamps come from a virtual clock that only moves when something
//! happens, so profiling results are reproducible across runs.

use std::sync::Arc;

use bytemuck::Pod;

use super::state::{Body, State};
use crate::sys::{execution_status, Status};

/// Behaviour of a kernel, run when its launch command executes.
pub type KernelFn = Arc<dyn Fn(&mut KernelInvocation<'_>) + Send + Sync>;

/// Kernel argument as captured at enqueue time.
#[derive(Debug, Clone)]
pub(crate) enum ArgSnapshot {
    Bytes(Vec<u8>),
    Buffer(Option<usize>),
    Local(usize),
}

/// Host destination of a deferred read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostDst(pub *mut u8);

/// Host source of a deferred write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostSrc(pub *const u8);

// SAFETY: the enqueue contract keeps the host memory valid and untouched by
// the caller until the command's event is terminal; the scheduler only
// dereferences the pointer while running that command.
unsafe impl Send for HostDst {}
// SAFETY: see HostDst.
unsafe impl Send for HostSrc {}

#[derive(Debug)]
pub(crate) enum Command {
    Kernel {
        name: String,
        args: Vec<ArgSnapshot>,
        global_offset: Vec<usize>,
        global_size: Vec<usize>,
        local_size: Option<Vec<usize>>,
    },
    Read {
        buffer: usize,
        offset: usize,
        size: usize,
        dst: HostDst,
    },
    Write {
        buffer: usize,
        offset: usize,
        size: usize,
        src: HostSrc,
    },
    Copy {
        src: usize,
        dst: usize,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
    },
    Marker,
}

impl Command {
    /// Virtual nanoseconds the command occupies the device.
    fn cost(&self) -> u64 {
        let cost = match self {
            Self::Kernel { global_size, .. } => 1_000 + global_size.iter().product::<usize>(),
            Self::Read { size, .. } | Self::Write { size, .. } => 200 + size / 8,
            Self::Copy { size, .. } => 100 + size / 16,
            Self::Marker => 0,
        };
        cost as u64
    }
}

/// View of one kernel launch handed to a registered [`KernelFn`].
///
/// Buffer arguments are exposed as bytes; what they contain is up to the
/// kernel and the host code that filled them.
pub struct KernelInvocation<'a> {
    name: &'a str,
    global_offset: &'a [usize],
    global_size: &'a [usize],
    local_size: Option<&'a [usize]>,
    args: &'a [ArgSnapshot],
    buffers: &'a mut [(usize, Vec<u8>)],
}

impl KernelInvocation<'_> {
    /// Kernel function name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Global work size per dimension.
    #[must_use]
    pub fn global_size(&self) -> &[usize] {
        self.global_size
    }

    /// Global work offset per dimension (zeros when none was given).
    #[must_use]
    pub fn global_offset(&self) -> &[usize] {
        self.global_offset
    }

    /// Work-group size, if the launch specified one.
    #[must_use]
    pub fn local_size(&self) -> Option<&[usize]> {
        self.local_size
    }

    /// Total number of work items.
    #[must_use]
    pub fn work_items(&self) -> usize {
        self.global_size.iter().product()
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// By-value argument `index` read as a `T`.
    #[must_use]
    pub fn scalar<T: Pod>(&self, index: usize) -> Option<T> {
        match self.args.get(index)? {
            ArgSnapshot::Bytes(bytes) if bytes.len() == std::mem::size_of::<T>() => {
                Some(bytemuck::pod_read_unaligned(bytes))
            }
            _ => None,
        }
    }

    /// Byte size of the `__local` argument `index`.
    #[must_use]
    pub fn local_bytes(&self, index: usize) -> Option<usize> {
        match self.args.get(index)? {
            ArgSnapshot::Local(size) => Some(*size),
            _ => None,
        }
    }

    fn slot(&self, index: usize) -> Option<usize> {
        let ArgSnapshot::Buffer(Some(handle)) = self.args.get(index)? else {
            return None;
        };
        self.buffers.iter().position(|(h, _)| h == handle)
    }

    /// Contents of the buffer bound to argument `index`.
    #[must_use]
    pub fn buffer(&self, index: usize) -> Option<&[u8]> {
        let slot = self.slot(index)?;
        Some(&self.buffers[slot].1)
    }

    /// Mutable contents of the buffer bound to argument `index`.
    pub fn buffer_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let slot = self.slot(index)?;
        Some(&mut self.buffers[slot].1)
    }

    /// Buffer argument `index` decoded as elements of `T`.
    #[must_use]
    pub fn read<T: Pod>(&self, index: usize) -> Option<Vec<T>> {
        let bytes = self.buffer(index)?;
        Some(
            bytes
                .chunks_exact(std::mem::size_of::<T>())
                .map(bytemuck::pod_read_unaligned)
                .collect(),
        )
    }

    /// Store `data` at the start of buffer argument `index`.
    ///
    /// Returns the number of elements written, clipped to the buffer size.
    pub fn write<T: Pod>(&mut self, index: usize, data: &[T]) -> usize {
        let Some(dst) = self.buffer_mut(index) else {
            return 0;
        };
        let width = std::mem::size_of::<T>();
        let count = data.len().min(dst.len() / width);
        dst[..count * width].copy_from_slice(bytemuck::cast_slice(&data[..count]));
        count
    }
}

/// Built-in `copy`: argument 0 is copied into argument 1, clipped to the
/// shorter buffer.
pub(crate) fn builtin_copy(invocation: &mut KernelInvocation<'_>) {
    let Some(src) = invocation.buffer(0).map(<[u8]>::to_vec) else {
        return;
    };
    if let Some(dst) = invocation.buffer_mut(1) {
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
    }
}

enum Readiness {
    Wait,
    Run,
    Failed,
}

impl State {
    /// Run everything that can run.
    pub(crate) fn drain(&mut self) {
        loop {
            let mut progressed = false;
            let mut i = 0;
            while i < self.pending.len() {
                let id = self.pending[i];
                match self.readiness(id) {
                    Readiness::Wait => i += 1,
                    Readiness::Run => {
                        self.pending.remove(i);
                        self.run(id);
                        progressed = true;
                    }
                    Readiness::Failed => {
                        self.pending.remove(i);
                        self.complete(id, Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST.0, 0);
                        progressed = true;
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn readiness(&self, id: usize) -> Readiness {
        let Some(Body::Event(event)) = self.objects.get(&id).map(|o| &o.body) else {
            return Readiness::Failed;
        };
        let mut ready = true;
        for dep in &event.deps {
            match self.event_status(*dep) {
                Some(status) if status < 0 => return Readiness::Failed,
                Some(execution_status::COMPLETE) => {}
                _ => ready = false,
            }
        }
        if ready {
            Readiness::Run
        } else {
            Readiness::Wait
        }
    }

    pub(crate) fn event_status(&self, id: usize) -> Option<i32> {
        match self.objects.get(&id).map(|o| &o.body) {
            Some(Body::Event(event)) => Some(event.status),
            _ => None,
        }
    }

    fn run(&mut self, id: usize) {
        let command = match self.objects.get_mut(&id).map(|o| &mut o.body) {
            Some(Body::Event(event)) => event.command.take(),
            _ => None,
        };
        let Some(command) = command else {
            return;
        };
        let cost = command.cost();

        match command {
            Command::Kernel {
                name,
                args,
                global_offset,
                global_size,
                local_size,
            } => self.run_kernel(&name, &args, &global_offset, &global_size, local_size.as_deref()),
            Command::Read {
                buffer,
                offset,
                size,
                dst,
            } => {
                if let Some(data) = self.mem_data(buffer) {
                    // SAFETY: the enqueue contract keeps `dst` valid for `size`
                    // bytes until this command completes; the range was
                    // bounds-checked against the buffer at enqueue.
                    unsafe { std::ptr::copy_nonoverlapping(data[offset..].as_ptr(), dst.0, size) };
                }
            }
            Command::Write {
                buffer,
                offset,
                size,
                src,
            } => {
                if let Some(data) = self.mem_data_mut(buffer) {
                    // SAFETY: as for reads, with `src` valid for reads.
                    let host = unsafe { std::slice::from_raw_parts(src.0, size) };
                    data[offset..offset + size].copy_from_slice(host);
                }
            }
            Command::Copy {
                src,
                dst,
                src_offset,
                dst_offset,
                size,
            } => {
                if src == dst {
                    if let Some(data) = self.mem_data_mut(src) {
                        data.copy_within(src_offset..src_offset + size, dst_offset);
                    }
                } else if let Some(chunk) = self
                    .mem_data(src)
                    .map(|data| data[src_offset..src_offset + size].to_vec())
                {
                    if let Some(data) = self.mem_data_mut(dst) {
                        data[dst_offset..dst_offset + size].copy_from_slice(&chunk);
                    }
                }
            }
            Command::Marker => {}
        }

        self.complete(id, execution_status::COMPLETE, cost);
    }

    fn run_kernel(
        &mut self,
        name: &str,
        args: &[ArgSnapshot],
        global_offset: &[usize],
        global_size: &[usize],
        local_size: Option<&[usize]>,
    ) {
        let Some(behaviour) = self.kernels.get(name).cloned() else {
            return;
        };

        let mut buffers: Vec<(usize, Vec<u8>)> = Vec::new();
        for arg in args {
            if let ArgSnapshot::Buffer(Some(handle)) = arg {
                if buffers.iter().all(|(h, _)| h != handle) {
                    if let Some(data) = self.mem_data_mut(*handle) {
                        buffers.push((*handle, std::mem::take(data)));
                    }
                }
            }
        }

        let mut invocation = KernelInvocation {
            name,
            global_offset,
            global_size,
            local_size,
            args,
            buffers: &mut buffers,
        };
        behaviour(&mut invocation);

        for (handle, contents) in buffers {
            if let Some(data) = self.mem_data_mut(handle) {
                *data = contents;
            }
        }
    }

    /// Terminal transition: stamp times, drop the command's internal references.
    fn complete(&mut self, id: usize, status: i32, cost: u64) {
        let submitted = self.tick(10);
        let started = self.tick(10);
        let ended = self.tick(cost);
        let links = match self.objects.get_mut(&id).map(|o| &mut o.body) {
            Some(Body::Event(event)) => {
                event.status = status;
                event.command = None;
                event.times[1] = submitted;
                event.times[2] = started;
                event.times[3] = ended;
                event.times[4] = ended;
                let mut links = std::mem::take(&mut event.deps);
                links.append(&mut event.resources);
                links
            }
            _ => return,
        };
        tracing::trace!(event = id, status, "mock command finished");
        for link in links {
            self.release_internal(link);
        }
        // the pending command's hold on its own event
        self.release_internal(id);
    }

    /// Whether any command of `queue` (or of any queue, for `None`) is pending.
    pub(crate) fn has_pending(&self, queue: Option<usize>) -> bool {
        self.pending.iter().any(|id| match self.objects.get(id).map(|o| &o.body) {
            Some(Body::Event(event)) => queue.is_none() || event.queue == queue,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_accessors() {
        let args = vec![
            ArgSnapshot::Buffer(Some(1)),
            ArgSnapshot::Buffer(Some(2)),
            ArgSnapshot::Bytes(7u32.to_ne_bytes().to_vec()),
            ArgSnapshot::Local(64),
        ];
        let mut buffers = vec![
            (1, bytemuck::cast_slice::<f32, u8>(&[1.0, 2.0]).to_vec()),
            (2, vec![0u8; 8]),
        ];
        let mut invocation = KernelInvocation {
            name: "copy",
            global_offset: &[0],
            global_size: &[2],
            local_size: None,
            args: &args,
            buffers: &mut buffers,
        };
        assert_eq!(invocation.scalar::<u32>(2), Some(7));
        assert_eq!(invocation.scalar::<u64>(2), None);
        assert_eq!(invocation.local_bytes(3), Some(64));
        assert_eq!(invocation.work_items(), 2);

        builtin_copy(&mut invocation);
        assert_eq!(invocation.read::<f32>(1), Some(vec![1.0, 2.0]));
        assert_eq!(invocation.write(1, &[5.0f32, 6.0, 7.0]), 2);
        assert_eq!(invocation.read::<f32>(1), Some(vec![5.0, 6.0]));
    }
}
