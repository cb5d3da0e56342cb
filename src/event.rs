// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Completion events, waits and profiling.
//!
//! Every enqueue returns an [`Event`]. Passing events as the wait-list of a
//! later enqueue builds a dependency graph; the graph is acyclic by
//! construction because an event can only depend on events that already
//! exist. Waiting is the only host-side suspension besides
//! [`crate::CommandQueue::finish`] and blocking transfers.

use std::ops::Deref;

use crate::api::{InfoTarget, Runtime};
use crate::classify::{ops, require};
use crate::context::Context;
use crate::error::Result;
use crate::query::InfoRequest;
use crate::sys::{command_type, event_info, execution_status, profiling_info, ObjectKind, RawHandle, Status};
use crate::traits::{impl_ref_counted, RefCounted};

/// Execution state of the command behind an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Enqueued, not yet submitted to the device.
    Queued,
    /// Submitted to the device.
    Submitted,
    /// Running.
    Running,
    /// Finished successfully.
    Complete,
    /// Terminated abnormally with the given (negative) status.
    Error(Status),
}

impl ExecutionStatus {
    /// Interpret a `CL_EVENT_COMMAND_EXECUTION_STATUS` value.
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            execution_status::COMPLETE => Self::Complete,
            execution_status::RUNNING => Self::Running,
            execution_status::SUBMITTED => Self::Submitted,
            execution_status::QUEUED => Self::Queued,
            other => Self::Error(Status(other)),
        }
    }

    /// Whether the command will make no further progress.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error(_))
    }
}

/// Kind of command an event stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// `clEnqueueNDRangeKernel`
    NdRangeKernel,
    /// `clEnqueueReadBuffer`
    ReadBuffer,
    /// `clEnqueueWriteBuffer`
    WriteBuffer,
    /// `clEnqueueCopyBuffer`
    CopyBuffer,
    /// `clEnqueueMarkerWithWaitList`
    Marker,
    /// `clCreateUserEvent`
    User,
    /// A command type this crate does not name.
    Other(u32),
}

impl From<u32> for CommandType {
    fn from(raw: u32) -> Self {
        match raw {
            command_type::NDRANGE_KERNEL => Self::NdRangeKernel,
            command_type::READ_BUFFER => Self::ReadBuffer,
            command_type::WRITE_BUFFER => Self::WriteBuffer,
            command_type::COPY_BUFFER => Self::CopyBuffer,
            command_type::MARKER => Self::Marker,
            command_type::USER => Self::User,
            other => Self::Other(other),
        }
    }
}

/// One profiling timestamp of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingInfo {
    /// Enqueued by the host.
    Queued,
    /// Submitted to the device.
    Submitted,
    /// Started executing.
    Started,
    /// Finished executing.
    Ended,
    /// Command and its child commands finished.
    Completed,
}

impl ProfilingInfo {
    fn selector(self) -> u32 {
        match self {
            Self::Queued => profiling_info::QUEUED,
            Self::Submitted => profiling_info::SUBMIT,
            Self::Started => profiling_info::START,
            Self::Ended => profiling_info::END,
            Self::Completed => profiling_info::COMPLETE,
        }
    }
}

/// All five timestamps of a profiled command, in device nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfilingTimes {
    /// See [`ProfilingInfo::Queued`].
    pub queued: u64,
    /// See [`ProfilingInfo::Submitted`].
    pub submitted: u64,
    /// See [`ProfilingInfo::Started`].
    pub started: u64,
    /// See [`ProfilingInfo::Ended`].
    pub ended: u64,
    /// See [`ProfilingInfo::Completed`].
    pub completed: u64,
}

impl ProfilingTimes {
    /// Execution time on the device.
    #[must_use]
    pub fn duration_ns(&self) -> u64 {
        self.ended.saturating_sub(self.started)
    }

    /// Time between enqueue and start of execution.
    #[must_use]
    pub fn latency_ns(&self) -> u64 {
        self.started.saturating_sub(self.queued)
    }
}

/// Completion token of one enqueued command.
pub struct Event {
    runtime: Runtime,
    raw: RawHandle,
}

impl_ref_counted!(Event, ObjectKind::Event);

impl Event {
    pub(crate) fn from_raw(runtime: Runtime, raw: RawHandle) -> Self {
        Self { runtime, raw }
    }

    fn info(&self, param: u32) -> InfoRequest<'_> {
        InfoRequest::new(&self.runtime, InfoTarget::Event(self.raw), param)
    }

    /// Current execution state. Does not block.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn status(&self) -> Result<ExecutionStatus> {
        Ok(ExecutionStatus::from_raw(
            self.info(event_info::COMMAND_EXECUTION_STATUS)
                .scalar::<i32>()?,
        ))
    }

    /// Command the event stands for.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn command_type(&self) -> Result<CommandType> {
        Ok(self.info(event_info::COMMAND_TYPE).scalar::<u32>()?.into())
    }

    /// Block until this event is complete.
    ///
    /// # Errors
    ///
    /// `ExecStatusErrorForEvents` if the command terminated abnormally.
    pub fn wait(&self) -> Result<()> {
        wait_for_events(&[self])
    }

    /// One profiling timestamp.
    ///
    /// `None` when the queue was created without
    /// [`crate::QueueProperties::PROFILING_ENABLE`] or the command has not
    /// completed.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn profiling_info(&self, which: ProfilingInfo) -> Result<Option<u64>> {
        InfoRequest::new(
            &self.runtime,
            InfoTarget::EventProfiling(self.raw),
            which.selector(),
        )
        .scalar_if_available::<u64>()
    }

    /// All profiling timestamps, or `None` if profiling data is unavailable.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn profile(&self) -> Result<Option<ProfilingTimes>> {
        let mut stamps = [0u64; 5];
        let which = [
            ProfilingInfo::Queued,
            ProfilingInfo::Submitted,
            ProfilingInfo::Started,
            ProfilingInfo::Ended,
            ProfilingInfo::Completed,
        ];
        for (slot, which) in stamps.iter_mut().zip(which) {
            match self.profiling_info(which)? {
                Some(stamp) => *slot = stamp,
                None => return Ok(None),
            }
        }
        let [queued, submitted, started, ended, completed] = stamps;
        Ok(Some(ProfilingTimes {
            queued,
            submitted,
            started,
            ended,
            completed,
        }))
    }
}

/// Block until every event in `events` is complete.
///
/// An empty list returns immediately without a native call.
///
/// # Errors
///
/// `ExecStatusErrorForEvents` if any listed command terminated abnormally.
///
/// # Panics
///
/// If the events belong to different runtimes.
pub fn wait_for_events(events: &[&Event]) -> Result<()> {
    let Some(first) = events.first() else {
        return Ok(());
    };
    require!(
        events.iter().all(|e| e.runtime.same_as(&first.runtime)),
        ops::WAIT_FOR_EVENTS.name(),
        "events belong to different runtimes"
    );
    let handles = raw_handles(events);
    tracing::trace!(count = handles.len(), "waiting for events");
    ops::WAIT_FOR_EVENTS.check(first.runtime.api().wait_for_events(&handles))
}

pub(crate) fn raw_handles(events: &[&Event]) -> Vec<RawHandle> {
    events.iter().map(|e| e.raw).collect()
}

/// An event whose completion the host sets.
///
/// Useful as a gate: commands waiting on it stay queued until
/// [`UserEvent::set_complete`] or [`UserEvent::set_failed`] is called.
#[derive(Debug)]
pub struct UserEvent {
    event: Event,
}

impl UserEvent {
    /// Create a user event in `context`, initially [`ExecutionStatus::Submitted`].
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    pub fn create(context: &Context) -> Result<Self> {
        let runtime = context.runtime().clone();
        let raw = runtime
            .api()
            .create_user_event(context.as_raw())
            .map_err(|status| ops::CREATE_USER_EVENT.fail(status))?;
        tracing::debug!(event = ?raw, "user event created");
        Ok(Self {
            event: Event::from_raw(runtime, raw),
        })
    }

    /// Mark complete, releasing dependent commands.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If the status was already set.
    pub fn set_complete(&self) -> Result<()> {
        self.set_status(execution_status::COMPLETE)
    }

    /// Mark failed with a negative `code`; dependent commands fail too.
    ///
    /// # Errors
    ///
    /// Resource or host allocation failures.
    ///
    /// # Panics
    ///
    /// If `code` is not negative or the status was already set.
    pub fn set_failed(&self, code: i32) -> Result<()> {
        require!(
            code < 0,
            ops::SET_USER_EVENT_STATUS.name(),
            "failure code {code} is not negative"
        );
        self.set_status(code)
    }

    fn set_status(&self, status: i32) -> Result<()> {
        let native = self
            .event
            .runtime
            .api()
            .set_user_event_status(self.event.raw, status);
        ops::SET_USER_EVENT_STATUS.check(native)
    }

    /// The underlying event.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }
}

impl Deref for UserEvent {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}

impl RefCounted for UserEvent {
    const KIND: ObjectKind = ObjectKind::Event;

    fn as_raw(&self) -> RawHandle {
        self.event.raw
    }

    fn runtime(&self) -> &Runtime {
        &self.event.runtime
    }

    fn alias(&self) -> Self {
        Self {
            event: self.event.alias(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_status_from_raw() {
        assert_eq!(ExecutionStatus::from_raw(0), ExecutionStatus::Complete);
        assert_eq!(ExecutionStatus::from_raw(3), ExecutionStatus::Queued);
        assert_eq!(
            ExecutionStatus::from_raw(-14),
            ExecutionStatus::Error(Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST)
        );
        assert!(ExecutionStatus::Error(Status(-5)).is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[test]
    fn test_command_type_from_raw() {
        assert_eq!(CommandType::from(0x11F0), CommandType::NdRangeKernel);
        assert_eq!(CommandType::from(0x1204), CommandType::User);
        assert_eq!(CommandType::from(0x1), CommandType::Other(1));
    }

    #[test]
    fn test_profiling_durations() {
        let times = ProfilingTimes {
            queued: 10,
            submitted: 20,
            started: 30,
            ended: 75,
            completed: 75,
        };
        assert_eq!(times.duration_ns(), 45);
        assert_eq!(times.latency_ns(), 20);
    }
}
