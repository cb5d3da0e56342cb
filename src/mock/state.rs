// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Object tables and entry point semantics of the mock runtime.
//!
//! Every object carries two counts: `refs`, the references handed out
//! through the API, and `internal`, references the runtime itself holds
//! (a queue on its context, a kernel on its program, a pending command on
//! the buffers it touches). An object is usable through the API while `refs`
//! is positive and is destroyed once both counts reach zero. The
//! `REFERENCE_COUNT` queries report `refs` only.

use std::collections::HashMap;
use std::ffi::CStr;

use super::compiler::{self, KernelDecl, ParamKind};
use super::scheduler::{builtin_copy, ArgSnapshot, Command, HostDst, HostSrc, KernelFn};
use crate::api::InfoTarget;
use crate::sys::{
    command_type, context_info, device_info, event_info, execution_status, kernel_info,
    make_version, mem_info, platform_info, profiling_info, program_build_info, program_info,
    queue_info, ObjectKind, RawHandle, Status, CONTEXT_PLATFORM, NAME_VERSION_MAX_NAME_SIZE,
    QUEUE_PROPERTIES,
};

const FIRST_OBJECT: usize = 0x1000;
const HANDLE_STRIDE: usize = 0x10;

const DEVICE_TYPE_ALL: u64 = 0xFFFF_FFFF;
const DEVICE_TYPE_KNOWN: u64 = 0x1F;
const DEVICE_TYPE_DEFAULT: u64 = 1;

const QUEUE_OUT_OF_ORDER: u64 = 1;
const QUEUE_PROFILING: u64 = 2;
const QUEUE_ON_DEVICE: u64 = 4 | 8;
const QUEUE_KNOWN: u64 = 0xF;

const MEM_READ_WRITE: u64 = 1;
const MEM_WRITE_ONLY: u64 = 2;
const MEM_READ_ONLY: u64 = 4;
const MEM_USE_HOST_PTR: u64 = 8;
const MEM_ALLOC_HOST_PTR: u64 = 16;
const MEM_COPY_HOST_PTR: u64 = 32;
const MEM_HOST_WRITE_ONLY: u64 = 128;
const MEM_HOST_READ_ONLY: u64 = 256;
const MEM_HOST_NO_ACCESS: u64 = 512;
const MEM_KNOWN: u64 = 0x3BF;
const MEM_OBJECT_BUFFER: u32 = 0x10F0;

const GPU_EXTENSIONS: &[(&str, u32)] = &[
    ("cl_khr_byte_addressable_store", make_version(1, 0, 0)),
    ("cl_khr_fp16", make_version(1, 0, 0)),
    ("cl_khr_il_program", make_version(1, 0, 0)),
];

const CPU_EXTENSIONS: &[(&str, u32)] = &[
    ("cl_khr_byte_addressable_store", make_version(1, 0, 0)),
    ("cl_khr_fp64", make_version(1, 0, 0)),
    ("cl_khr_il_program", make_version(1, 0, 0)),
];

const PLATFORM_EXTENSIONS: &[(&str, u32)] = &[
    ("cl_khr_icd", make_version(1, 0, 0)),
    ("cl_khr_il_program", make_version(1, 0, 0)),
];

#[derive(Debug)]
pub(crate) struct PlatformSpec {
    pub handle: usize,
    pub name: &'static str,
}

#[derive(Debug)]
pub(crate) struct DeviceSpec {
    pub handle: usize,
    pub platform: usize,
    pub name: &'static str,
    pub device_type: u64,
    pub vendor_id: u32,
    pub compute_units: u32,
    pub max_work_group_size: usize,
    pub max_work_item_sizes: [usize; 3],
    pub clock_mhz: u32,
    pub global_mem: u64,
    pub max_alloc: u64,
    pub local_mem: u64,
    pub compiler: bool,
    pub extensions: &'static [(&'static str, u32)],
}

#[derive(Debug)]
pub(crate) struct Object {
    pub refs: u32,
    pub internal: u32,
    pub body: Body,
}

#[derive(Debug)]
pub(crate) enum Body {
    Context(ContextObj),
    Queue(QueueObj),
    Program(ProgramObj),
    Kernel(KernelObj),
    Mem(MemObj),
    Event(EventObj),
}

impl Body {
    fn kind(&self) -> ObjectKind {
        match self {
            Self::Context(_) => ObjectKind::Context,
            Self::Queue(_) => ObjectKind::CommandQueue,
            Self::Program(_) => ObjectKind::Program,
            Self::Kernel(_) => ObjectKind::Kernel,
            Self::Mem(_) => ObjectKind::Mem,
            Self::Event(_) => ObjectKind::Event,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ContextObj {
    pub devices: Vec<usize>,
    pub properties: Vec<isize>,
}

#[derive(Debug)]
pub(crate) struct QueueObj {
    pub context: usize,
    pub device: usize,
    pub properties: u64,
    pub last: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct BuildRecord {
    pub device: usize,
    pub status: i32,
    pub options: String,
    pub log: String,
}

#[derive(Debug)]
pub(crate) struct ProgramObj {
    pub context: usize,
    pub source: String,
    pub il: Vec<u8>,
    pub builds: Vec<BuildRecord>,
    pub kernels: Option<Vec<KernelDecl>>,
    pub attached: u32,
}

#[derive(Debug)]
pub(crate) struct KernelObj {
    pub program: usize,
    pub context: usize,
    pub decl: KernelDecl,
    pub args: Vec<Option<ArgSnapshot>>,
}

#[derive(Debug)]
pub(crate) struct MemObj {
    pub context: usize,
    pub flags: u64,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub(crate) struct EventObj {
    pub context: usize,
    pub queue: Option<usize>,
    pub command_type: u32,
    pub status: i32,
    pub profiling: bool,
    /// queued, submitted, started, ended, completed
    pub times: [u64; 5],
    pub command: Option<Command>,
    pub deps: Vec<usize>,
    pub resources: Vec<usize>,
}

pub(crate) struct State {
    pub calls: u64,
    pub failures: Vec<(String, Status)>,
    pub platforms: Vec<PlatformSpec>,
    pub devices: Vec<DeviceSpec>,
    pub objects: HashMap<usize, Object>,
    pub kernels: HashMap<String, KernelFn>,
    pub pending: Vec<usize>,
    clock: u64,
    next_handle: usize,
}

fn invalid(kind: ObjectKind) -> Status {
    match kind {
        ObjectKind::Platform => Status::INVALID_PLATFORM,
        ObjectKind::Device => Status::INVALID_DEVICE,
        ObjectKind::Context => Status::INVALID_CONTEXT,
        ObjectKind::CommandQueue => Status::INVALID_COMMAND_QUEUE,
        ObjectKind::Program => Status::INVALID_PROGRAM,
        ObjectKind::Kernel => Status::INVALID_KERNEL,
        ObjectKind::Mem => Status::INVALID_MEM_OBJECT,
        ObjectKind::Event => Status::INVALID_EVENT,
    }
}

/// Copy an info result out following the `clGet*Info` conventions.
fn answer(data: &[u8], value: Option<&mut [u8]>, size_ret: Option<&mut usize>) -> Status {
    if let Some(value) = value {
        if value.len() < data.len() {
            return Status::INVALID_VALUE;
        }
        value[..data.len()].copy_from_slice(data);
    }
    if let Some(size_ret) = size_ret {
        *size_ret = data.len();
    }
    Status::SUCCESS
}

/// Fill a handle array following the `clGet*IDs` conventions.
fn list_handles(ids: &[usize], entries: Option<&mut [RawHandle]>, num: Option<&mut u32>) -> Status {
    if let Some(entries) = entries {
        for (slot, id) in entries.iter_mut().zip(ids) {
            *slot = RawHandle::from_addr(*id);
        }
    }
    if let Some(num) = num {
        *num = u32::try_from(ids.len()).unwrap_or(u32::MAX);
    }
    Status::SUCCESS
}

fn text(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len() + 1);
    bytes.extend_from_slice(value.as_bytes());
    bytes.push(0);
    bytes
}

fn scalar<T: bytemuck::Pod>(value: T) -> Vec<u8> {
    bytemuck::bytes_of(&value).to_vec()
}

fn handles(ids: &[usize]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_ne_bytes()).collect()
}

fn name_versions(list: &[(&str, u32)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (name, version) in list {
        bytes.extend_from_slice(&version.to_ne_bytes());
        let mut slot = [0u8; NAME_VERSION_MAX_NAME_SIZE];
        let len = name.len().min(NAME_VERSION_MAX_NAME_SIZE - 1);
        slot[..len].copy_from_slice(&name.as_bytes()[..len]);
        bytes.extend_from_slice(&slot);
    }
    bytes
}

fn extension_names(list: &[(&str, u32)]) -> String {
    list.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(" ")
}

#[cold]
fn deadlock(what: &str) -> ! {
    tracing::error!(what, "mock runtime deadlock");
    panic!("mock runtime deadlock: {what} waits on a command that can never run");
}

impl State {
    pub(crate) fn new(with_platform: bool, compiler: bool) -> Self {
        let mut state = Self {
            calls: 0,
            failures: Vec::new(),
            platforms: Vec::new(),
            devices: Vec::new(),
            objects: HashMap::new(),
            kernels: HashMap::new(),
            pending: Vec::new(),
            clock: 1_000,
            next_handle: FIRST_OBJECT,
        };
        state
            .kernels
            .insert("copy".to_string(), std::sync::Arc::new(builtin_copy));
        if with_platform {
            state.platforms.push(PlatformSpec {
                handle: 0x100,
                name: "Mock Platform",
            });
            state.devices.push(DeviceSpec {
                handle: 0x200,
                platform: 0x100,
                name: "Mock GPU Device",
                device_type: 1 << 2,
                vendor_id: 0x1234,
                compute_units: 16,
                max_work_group_size: 256,
                max_work_item_sizes: [256, 256, 64],
                clock_mhz: 1_200,
                global_mem: 4 << 30,
                max_alloc: 1 << 30,
                local_mem: 64 << 10,
                compiler,
                extensions: GPU_EXTENSIONS,
            });
            state.devices.push(DeviceSpec {
                handle: 0x210,
                platform: 0x100,
                name: "Mock CPU Device",
                device_type: 1 << 1,
                vendor_id: 0x5678,
                compute_units: 8,
                max_work_group_size: 1024,
                max_work_item_sizes: [1024, 1024, 1024],
                clock_mhz: 3_000,
                global_mem: 8 << 30,
                max_alloc: 2 << 30,
                local_mem: 32 << 10,
                compiler,
                extensions: CPU_EXTENSIONS,
            });
        }
        state
    }

    pub(crate) fn take_failure(&mut self, entry: &str) -> Option<Status> {
        let index = self.failures.iter().position(|(name, _)| name == entry)?;
        Some(self.failures.remove(index).1)
    }

    pub(crate) fn tick(&mut self, by: u64) -> u64 {
        self.clock += by;
        self.clock
    }

    fn insert(&mut self, body: Body, internal: u32) -> usize {
        let id = self.next_handle;
        self.next_handle += HANDLE_STRIDE;
        tracing::trace!(handle = id, kind = %body.kind(), "mock object created");
        self.objects.insert(
            id,
            Object {
                refs: 1,
                internal,
                body,
            },
        );
        id
    }

    pub(crate) fn retain_internal(&mut self, id: usize) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.internal += 1;
        }
    }

    pub(crate) fn release_internal(&mut self, id: usize) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.internal = obj.internal.saturating_sub(1);
        }
        self.collect(id);
    }

    fn collect(&mut self, id: usize) {
        let dead = self
            .objects
            .get(&id)
            .is_some_and(|obj| obj.refs == 0 && obj.internal == 0);
        if !dead {
            return;
        }
        let Some(obj) = self.objects.remove(&id) else {
            return;
        };
        tracing::trace!(handle = id, kind = %obj.body.kind(), "mock object destroyed");
        let links = match obj.body {
            Body::Context(_) => Vec::new(),
            Body::Queue(queue) => std::iter::once(queue.context).chain(queue.last).collect(),
            Body::Program(program) => vec![program.context],
            Body::Kernel(kernel) => {
                if let Some(Body::Program(program)) =
                    self.objects.get_mut(&kernel.program).map(|o| &mut o.body)
                {
                    program.attached = program.attached.saturating_sub(1);
                }
                vec![kernel.program]
            }
            Body::Mem(mem) => vec![mem.context],
            Body::Event(event) => {
                let mut links = vec![event.context];
                links.extend(event.deps);
                links.extend(event.resources);
                links
            }
        };
        for link in links {
            self.release_internal(link);
        }
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.objects.len()
    }

    fn body(&self, id: usize, kind: ObjectKind) -> Result<&Body, Status> {
        match self.objects.get(&id) {
            Some(obj) if obj.refs > 0 && obj.body.kind() == kind => Ok(&obj.body),
            _ => Err(invalid(kind)),
        }
    }

    fn body_mut(&mut self, id: usize, kind: ObjectKind) -> Result<&mut Body, Status> {
        match self.objects.get_mut(&id) {
            Some(obj) if obj.refs > 0 && obj.body.kind() == kind => Ok(&mut obj.body),
            _ => Err(invalid(kind)),
        }
    }

    fn context(&self, id: usize) -> Result<&ContextObj, Status> {
        match self.body(id, ObjectKind::Context)? {
            Body::Context(context) => Ok(context),
            _ => Err(Status::INVALID_CONTEXT),
        }
    }

    fn queue(&self, id: usize) -> Result<&QueueObj, Status> {
        match self.body(id, ObjectKind::CommandQueue)? {
            Body::Queue(queue) => Ok(queue),
            _ => Err(Status::INVALID_COMMAND_QUEUE),
        }
    }

    fn program(&self, id: usize) -> Result<&ProgramObj, Status> {
        match self.body(id, ObjectKind::Program)? {
            Body::Program(program) => Ok(program),
            _ => Err(Status::INVALID_PROGRAM),
        }
    }

    fn kernel(&self, id: usize) -> Result<&KernelObj, Status> {
        match self.body(id, ObjectKind::Kernel)? {
            Body::Kernel(kernel) => Ok(kernel),
            _ => Err(Status::INVALID_KERNEL),
        }
    }

    fn mem(&self, id: usize) -> Result<&MemObj, Status> {
        match self.body(id, ObjectKind::Mem)? {
            Body::Mem(mem) => Ok(mem),
            _ => Err(Status::INVALID_MEM_OBJECT),
        }
    }

    fn event(&self, id: usize) -> Result<&EventObj, Status> {
        match self.body(id, ObjectKind::Event)? {
            Body::Event(event) => Ok(event),
            _ => Err(Status::INVALID_EVENT),
        }
    }

    fn device(&self, id: usize) -> Result<&DeviceSpec, Status> {
        self.devices
            .iter()
            .find(|d| d.handle == id)
            .ok_or(Status::INVALID_DEVICE)
    }

    fn platform(&self, id: usize) -> Result<&PlatformSpec, Status> {
        self.platforms
            .iter()
            .find(|p| p.handle == id)
            .ok_or(Status::INVALID_PLATFORM)
    }

    /// Buffer contents, also for buffers only the runtime still holds.
    pub(crate) fn mem_data(&self, id: usize) -> Option<&Vec<u8>> {
        match self.objects.get(&id).map(|o| &o.body) {
            Some(Body::Mem(mem)) => Some(&mem.data),
            _ => None,
        }
    }

    pub(crate) fn mem_data_mut(&mut self, id: usize) -> Option<&mut Vec<u8>> {
        match self.objects.get_mut(&id).map(|o| &mut o.body) {
            Some(Body::Mem(mem)) => Some(&mut mem.data),
            _ => None,
        }
    }

    // ---- discovery ----

    pub(crate) fn get_platform_ids(
        &self,
        entries: Option<&mut [RawHandle]>,
        num: Option<&mut u32>,
    ) -> Status {
        if entries.is_none() && num.is_none() {
            return Status::INVALID_VALUE;
        }
        if entries.as_ref().is_some_and(|e| e.is_empty()) {
            return Status::INVALID_VALUE;
        }
        let ids: Vec<usize> = self.platforms.iter().map(|p| p.handle).collect();
        if ids.is_empty() {
            if let Some(num) = num {
                *num = 0;
            }
            return Status::PLATFORM_NOT_FOUND_KHR;
        }
        list_handles(&ids, entries, num)
    }

    pub(crate) fn get_device_ids(
        &self,
        platform: usize,
        device_type: u64,
        entries: Option<&mut [RawHandle]>,
        num: Option<&mut u32>,
    ) -> Status {
        if self.platform(platform).is_err() {
            return Status::INVALID_PLATFORM;
        }
        if device_type != DEVICE_TYPE_ALL
            && (device_type == 0 || device_type & !DEVICE_TYPE_KNOWN != 0)
        {
            return Status::INVALID_DEVICE_TYPE;
        }
        if entries.is_none() && num.is_none() {
            return Status::INVALID_VALUE;
        }
        if entries.as_ref().is_some_and(|e| e.is_empty()) {
            return Status::INVALID_VALUE;
        }
        let on_platform = self.devices.iter().filter(|d| d.platform == platform);
        let ids: Vec<usize> = on_platform
            .enumerate()
            .filter(|(index, d)| {
                device_type == DEVICE_TYPE_ALL
                    || d.device_type & device_type != 0
                    || (device_type & DEVICE_TYPE_DEFAULT != 0 && *index == 0)
            })
            .map(|(_, d)| d.handle)
            .collect();
        if ids.is_empty() {
            if let Some(num) = num {
                *num = 0;
            }
            return Status::DEVICE_NOT_FOUND;
        }
        list_handles(&ids, entries, num)
    }

    // ---- info ----

    pub(crate) fn get_info(
        &self,
        target: InfoTarget,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: Option<&mut usize>,
    ) -> Status {
        let data = match target {
            InfoTarget::Platform(h) => self.platform_info(h.addr(), param),
            InfoTarget::Device(h) => self.device_info(h.addr(), param),
            InfoTarget::Context(h) => self.context_info(h.addr(), param),
            InfoTarget::CommandQueue(h) => self.queue_info(h.addr(), param),
            InfoTarget::Mem(h) => self.mem_info(h.addr(), param),
            InfoTarget::Program(h) => self.program_info(h.addr(), param),
            InfoTarget::ProgramBuild { program, device } => {
                self.build_info(program.addr(), device.addr(), param)
            }
            InfoTarget::Kernel(h) => self.kernel_info(h.addr(), param),
            InfoTarget::Event(h) => self.event_info(h.addr(), param),
            InfoTarget::EventProfiling(h) => self.profiling_info(h.addr(), param),
        };
        match data {
            Ok(data) => answer(&data, value, size_ret),
            Err(status) => status,
        }
    }

    fn platform_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let platform = self.platform(id)?;
        Ok(match param {
            platform_info::PROFILE => text("FULL_PROFILE"),
            platform_info::VERSION => text("OpenCL 3.0 rust-cl-core mock"),
            platform_info::NAME => text(platform.name),
            platform_info::VENDOR => text("rust-cl-core"),
            platform_info::EXTENSIONS => text(&extension_names(PLATFORM_EXTENSIONS)),
            platform_info::NUMERIC_VERSION => scalar(make_version(3, 0, 0)),
            platform_info::EXTENSIONS_WITH_VERSION => name_versions(PLATFORM_EXTENSIONS),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn device_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let d = self.device(id)?;
        Ok(match param {
            device_info::TYPE => scalar(d.device_type),
            device_info::VENDOR_ID => scalar(d.vendor_id),
            device_info::MAX_COMPUTE_UNITS => scalar(d.compute_units),
            device_info::MAX_WORK_ITEM_DIMENSIONS => scalar(3u32),
            device_info::MAX_WORK_GROUP_SIZE => scalar(d.max_work_group_size),
            device_info::MAX_WORK_ITEM_SIZES => d
                .max_work_item_sizes
                .iter()
                .flat_map(|s| s.to_ne_bytes())
                .collect(),
            device_info::MAX_CLOCK_FREQUENCY => scalar(d.clock_mhz),
            device_info::MAX_MEM_ALLOC_SIZE => scalar(d.max_alloc),
            device_info::GLOBAL_MEM_SIZE => scalar(d.global_mem),
            device_info::LOCAL_MEM_SIZE => scalar(d.local_mem),
            device_info::PROFILING_TIMER_RESOLUTION => scalar(1usize),
            device_info::AVAILABLE => scalar(1u32),
            device_info::COMPILER_AVAILABLE => scalar(u32::from(d.compiler)),
            device_info::NAME => text(d.name),
            device_info::VENDOR => text("rust-cl-core"),
            device_info::DRIVER_VERSION => text("mock 1.0"),
            device_info::PROFILE => text("FULL_PROFILE"),
            device_info::VERSION => text("OpenCL 3.0 mock"),
            device_info::EXTENSIONS => text(&extension_names(d.extensions)),
            device_info::PLATFORM => scalar(d.platform),
            device_info::IL_VERSION => text("SPIR-V_1.0"),
            device_info::NUMERIC_VERSION => scalar(make_version(3, 0, 0)),
            device_info::EXTENSIONS_WITH_VERSION => name_versions(d.extensions),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn refs(&self, id: usize) -> u32 {
        self.objects.get(&id).map_or(0, |o| o.refs)
    }

    fn context_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let context = self.context(id)?;
        Ok(match param {
            context_info::REFERENCE_COUNT => scalar(self.refs(id)),
            context_info::DEVICES => handles(&context.devices),
            context_info::PROPERTIES => context
                .properties
                .iter()
                .flat_map(|p| p.to_ne_bytes())
                .collect(),
            context_info::NUM_DEVICES => {
                scalar(u32::try_from(context.devices.len()).unwrap_or(u32::MAX))
            }
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn queue_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let queue = self.queue(id)?;
        Ok(match param {
            queue_info::CONTEXT => scalar(queue.context),
            queue_info::DEVICE => scalar(queue.device),
            queue_info::REFERENCE_COUNT => scalar(self.refs(id)),
            queue_info::PROPERTIES => scalar(queue.properties),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn mem_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let mem = self.mem(id)?;
        Ok(match param {
            mem_info::TYPE => scalar(MEM_OBJECT_BUFFER),
            mem_info::FLAGS => scalar(mem.flags),
            mem_info::SIZE => scalar(mem.data.len()),
            mem_info::REFERENCE_COUNT => scalar(self.refs(id)),
            mem_info::CONTEXT => scalar(mem.context),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn program_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let program = self.program(id)?;
        let devices = &self.context(program.context)?.devices;
        Ok(match param {
            program_info::REFERENCE_COUNT => scalar(self.refs(id)),
            program_info::CONTEXT => scalar(program.context),
            program_info::NUM_DEVICES => scalar(u32::try_from(devices.len()).unwrap_or(u32::MAX)),
            program_info::DEVICES => handles(devices),
            program_info::SOURCE => text(&program.source),
            program_info::IL => program.il.clone(),
            program_info::NUM_KERNELS => {
                let kernels = program
                    .kernels
                    .as_ref()
                    .ok_or(Status::INVALID_PROGRAM_EXECUTABLE)?;
                scalar(kernels.len())
            }
            program_info::KERNEL_NAMES => {
                let kernels = program
                    .kernels
                    .as_ref()
                    .ok_or(Status::INVALID_PROGRAM_EXECUTABLE)?;
                let names: Vec<&str> = kernels.iter().map(|k| k.name.as_str()).collect();
                text(&names.join(";"))
            }
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn build_info(&self, id: usize, device: usize, param: u32) -> Result<Vec<u8>, Status> {
        let program = self.program(id)?;
        if !self.context(program.context)?.devices.contains(&device) {
            return Err(Status::INVALID_DEVICE);
        }
        let record = program.builds.iter().find(|b| b.device == device);
        Ok(match param {
            program_build_info::STATUS => {
                scalar(record.map_or(crate::sys::build_status::NONE, |b| b.status))
            }
            program_build_info::OPTIONS => text(record.map_or("", |b| b.options.as_str())),
            program_build_info::LOG => text(record.map_or("", |b| b.log.as_str())),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn kernel_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let kernel = self.kernel(id)?;
        Ok(match param {
            kernel_info::FUNCTION_NAME => text(&kernel.decl.name),
            kernel_info::NUM_ARGS => {
                scalar(u32::try_from(kernel.decl.params.len()).unwrap_or(u32::MAX))
            }
            kernel_info::REFERENCE_COUNT => scalar(self.refs(id)),
            kernel_info::CONTEXT => scalar(kernel.context),
            kernel_info::PROGRAM => scalar(kernel.program),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn event_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let event = self.event(id)?;
        Ok(match param {
            event_info::COMMAND_QUEUE => scalar(event.queue.unwrap_or(0)),
            event_info::COMMAND_TYPE => scalar(event.command_type),
            event_info::REFERENCE_COUNT => scalar(self.refs(id)),
            event_info::COMMAND_EXECUTION_STATUS => scalar(event.status),
            event_info::CONTEXT => scalar(event.context),
            _ => return Err(Status::INVALID_VALUE),
        })
    }

    fn profiling_info(&self, id: usize, param: u32) -> Result<Vec<u8>, Status> {
        let event = self.event(id)?;
        let index = match param {
            profiling_info::QUEUED => 0,
            profiling_info::SUBMIT => 1,
            profiling_info::START => 2,
            profiling_info::END => 3,
            profiling_info::COMPLETE => 4,
            _ => return Err(Status::INVALID_VALUE),
        };
        if !event.profiling || event.status != execution_status::COMPLETE {
            return Err(Status::PROFILING_INFO_NOT_AVAILABLE);
        }
        Ok(scalar(event.times[index]))
    }

    // ---- reference counting ----

    pub(crate) fn retain(&mut self, kind: ObjectKind, id: usize) -> Status {
        match kind {
            ObjectKind::Platform => self.platform(id).map_or_else(|s| s, |_| Status::SUCCESS),
            ObjectKind::Device => self.device(id).map_or_else(|s| s, |_| Status::SUCCESS),
            _ => match self.objects.get_mut(&id) {
                Some(obj) if obj.refs > 0 && obj.body.kind() == kind => {
                    obj.refs += 1;
                    Status::SUCCESS
                }
                _ => invalid(kind),
            },
        }
    }

    pub(crate) fn release(&mut self, kind: ObjectKind, id: usize) -> Status {
        match kind {
            ObjectKind::Platform => self.platform(id).map_or_else(|s| s, |_| Status::SUCCESS),
            ObjectKind::Device => self.device(id).map_or_else(|s| s, |_| Status::SUCCESS),
            _ => {
                let remaining = match self.objects.get_mut(&id) {
                    Some(obj) if obj.refs > 0 && obj.body.kind() == kind => {
                        obj.refs -= 1;
                        obj.refs
                    }
                    _ => return invalid(kind),
                };
                // releasing the last queue reference implies a flush
                if remaining == 0 && kind == ObjectKind::CommandQueue {
                    self.drain();
                }
                self.collect(id);
                Status::SUCCESS
            }
        }
    }

    // ---- creation ----

    pub(crate) fn create_context(
        &mut self,
        properties: &[isize],
        devices: &[RawHandle],
    ) -> Result<usize, Status> {
        let mut platform = None;
        let mut i = 0;
        while let Some(&key) = properties.get(i) {
            if key == 0 {
                break;
            }
            let value = *properties.get(i + 1).ok_or(Status::INVALID_PROPERTY)?;
            match key {
                CONTEXT_PLATFORM if platform.is_none() => {
                    let id = usize::try_from(value).map_err(|_| Status::INVALID_PLATFORM)?;
                    self.platform(id)?;
                    platform = Some(id);
                }
                _ => return Err(Status::INVALID_PROPERTY),
            }
            i += 2;
        }

        if devices.is_empty() {
            return Err(Status::INVALID_VALUE);
        }
        let mut ids = Vec::with_capacity(devices.len());
        for handle in devices {
            let device = self.device(handle.addr())?;
            if platform.is_some_and(|p| p != device.platform) {
                return Err(Status::INVALID_DEVICE);
            }
            if ids
                .first()
                .and_then(|first| self.device(*first).ok())
                .is_some_and(|first| first.platform != device.platform)
            {
                return Err(Status::INVALID_DEVICE);
            }
            if !ids.contains(&device.handle) {
                ids.push(device.handle);
            }
        }

        let mut stored: Vec<isize> = properties[..i].to_vec();
        if !stored.is_empty() {
            stored.push(0);
        }
        Ok(self.insert(
            Body::Context(ContextObj {
                devices: ids,
                properties: stored,
            }),
            0,
        ))
    }

    pub(crate) fn create_command_queue(
        &mut self,
        context: usize,
        device: usize,
        properties: &[u64],
    ) -> Result<usize, Status> {
        if !self.context(context)?.devices.contains(&device) {
            return Err(Status::INVALID_DEVICE);
        }
        let mut bits = 0;
        let mut i = 0;
        while let Some(&key) = properties.get(i) {
            if key == 0 {
                break;
            }
            let value = *properties.get(i + 1).ok_or(Status::INVALID_VALUE)?;
            if key != QUEUE_PROPERTIES {
                return Err(Status::INVALID_VALUE);
            }
            bits = value;
            i += 2;
        }
        if bits & !QUEUE_KNOWN != 0 {
            return Err(Status::INVALID_VALUE);
        }
        if bits & QUEUE_ON_DEVICE != 0 {
            return Err(Status::INVALID_QUEUE_PROPERTIES);
        }
        self.retain_internal(context);
        Ok(self.insert(
            Body::Queue(QueueObj {
                context,
                device,
                properties: bits,
                last: None,
            }),
            0,
        ))
    }

    fn new_program(&mut self, context: usize, source: String, il: Vec<u8>) -> usize {
        self.retain_internal(context);
        self.insert(
            Body::Program(ProgramObj {
                context,
                source,
                il,
                builds: Vec::new(),
                kernels: None,
                attached: 0,
            }),
            0,
        )
    }

    pub(crate) fn create_program_with_source(
        &mut self,
        context: usize,
        sources: &[&[u8]],
    ) -> Result<usize, Status> {
        self.context(context)?;
        if sources.is_empty() {
            return Err(Status::INVALID_VALUE);
        }
        let source: String = sources
            .iter()
            .map(|fragment| String::from_utf8_lossy(fragment))
            .collect();
        Ok(self.new_program(context, source, Vec::new()))
    }

    pub(crate) fn create_program_with_il(&mut self, context: usize, il: &[u8]) -> Result<usize, Status> {
        self.context(context)?;
        if !compiler::looks_like_spirv(il) {
            return Err(Status::INVALID_VALUE);
        }
        Ok(self.new_program(context, String::new(), il.to_vec()))
    }

    pub(crate) fn build_program(&mut self, id: usize, devices: &[RawHandle], options: &CStr) -> Status {
        let (context, attached, from_il) = match self.program(id) {
            Ok(p) => (p.context, p.attached, !p.il.is_empty()),
            Err(status) => return status,
        };
        let context_devices = match self.context(context) {
            Ok(c) => c.devices.clone(),
            Err(_) => return Status::INVALID_PROGRAM,
        };
        let targets: Vec<usize> = if devices.is_empty() {
            context_devices.clone()
        } else {
            devices.iter().map(|d| d.addr()).collect()
        };
        if targets.iter().any(|d| !context_devices.contains(d)) {
            return Status::INVALID_DEVICE;
        }
        if attached > 0 {
            return Status::INVALID_OPERATION;
        }
        let options = options.to_string_lossy().into_owned();
        if !valid_build_options(&options) {
            return Status::INVALID_BUILD_OPTIONS;
        }
        if targets
            .iter()
            .any(|d| self.device(*d).map_or(true, |d| !d.compiler))
        {
            return Status::COMPILER_NOT_AVAILABLE;
        }

        let result = match self.program(id) {
            Ok(p) if from_il => compiler::compile_il(&p.il),
            Ok(p) => compiler::compile_source(&p.source),
            Err(status) => return status,
        };
        let (status, log, kernels) = match result {
            Ok(kernels) => (crate::sys::build_status::SUCCESS, String::new(), Some(kernels)),
            Err(log) => (crate::sys::build_status::ERROR, log, None),
        };

        let Ok(Body::Program(program)) = self.body_mut(id, ObjectKind::Program) else {
            return Status::INVALID_PROGRAM;
        };
        for device in targets {
            program.builds.retain(|b| b.device != device);
            program.builds.push(BuildRecord {
                device,
                status,
                options: options.clone(),
                log: log.clone(),
            });
        }
        let failed = kernels.is_none();
        program.kernels = kernels;
        if failed {
            Status::BUILD_PROGRAM_FAILURE
        } else {
            Status::SUCCESS
        }
    }

    pub(crate) fn create_kernel(&mut self, program_id: usize, name: &CStr) -> Result<usize, Status> {
        let program = self.program(program_id)?;
        let kernels = program
            .kernels
            .as_ref()
            .ok_or(Status::INVALID_PROGRAM_EXECUTABLE)?;
        let name = name.to_string_lossy();
        let decl = kernels
            .iter()
            .find(|k| k.name == name)
            .cloned()
            .ok_or(Status::INVALID_KERNEL_NAME)?;
        if decl
            .params
            .iter()
            .any(|p| p.kind == ParamKind::Value(0))
        {
            return Err(Status::INVALID_KERNEL_DEFINITION);
        }
        let context = program.context;
        let args = vec![None; decl.params.len()];

        self.retain_internal(program_id);
        if let Ok(Body::Program(program)) = self.body_mut(program_id, ObjectKind::Program) {
            program.attached += 1;
        }
        Ok(self.insert(
            Body::Kernel(KernelObj {
                program: program_id,
                context,
                decl,
                args,
            }),
            0,
        ))
    }

    pub(crate) fn set_kernel_arg(
        &mut self,
        id: usize,
        index: u32,
        size: usize,
        value: Option<&[u8]>,
    ) -> Status {
        let kernel = match self.kernel(id) {
            Ok(kernel) => kernel,
            Err(status) => return status,
        };
        let Some(param) = usize::try_from(index)
            .ok()
            .and_then(|i| kernel.decl.params.get(i))
        else {
            return Status::INVALID_ARG_INDEX;
        };

        let snapshot = match (param.kind, value) {
            (ParamKind::Local, Some(_)) => return Status::INVALID_ARG_VALUE,
            (ParamKind::Local, None) if size == 0 => return Status::INVALID_ARG_SIZE,
            (ParamKind::Local, None) => ArgSnapshot::Local(size),
            (_, None) => return Status::INVALID_ARG_VALUE,
            (_, Some(bytes)) if Some(size) != param.arg_size() || bytes.len() != size => {
                return Status::INVALID_ARG_SIZE
            }
            (_, Some(bytes)) if param.is_memory() => {
                let mut raw = [0u8; std::mem::size_of::<usize>()];
                raw.copy_from_slice(bytes);
                match usize::from_ne_bytes(raw) {
                    0 => ArgSnapshot::Buffer(None),
                    handle if self.mem(handle).is_ok() => ArgSnapshot::Buffer(Some(handle)),
                    _ => return Status::INVALID_MEM_OBJECT,
                }
            }
            (_, Some(bytes)) => ArgSnapshot::Bytes(bytes.to_vec()),
        };

        if let Ok(Body::Kernel(kernel)) = self.body_mut(id, ObjectKind::Kernel) {
            if let Some(slot) = kernel.args.get_mut(index as usize) {
                *slot = Some(snapshot);
            }
        }
        Status::SUCCESS
    }

    pub(crate) fn create_buffer(
        &mut self,
        context: usize,
        flags: u64,
        size: usize,
        host: Option<&[u8]>,
    ) -> Result<usize, Status> {
        let devices = self.context(context)?.devices.clone();
        let count = |mask: &[u64]| mask.iter().filter(|bit| flags & **bit != 0).count();
        if flags & !MEM_KNOWN != 0
            || count(&[MEM_READ_WRITE, MEM_WRITE_ONLY, MEM_READ_ONLY]) > 1
            || count(&[MEM_HOST_WRITE_ONLY, MEM_HOST_READ_ONLY, MEM_HOST_NO_ACCESS]) > 1
            || (flags & MEM_USE_HOST_PTR != 0
                && flags & (MEM_ALLOC_HOST_PTR | MEM_COPY_HOST_PTR) != 0)
        {
            return Err(Status::INVALID_VALUE);
        }
        let max_alloc = devices
            .iter()
            .filter_map(|d| self.device(*d).ok())
            .map(|d| d.max_alloc)
            .min()
            .unwrap_or(0);
        if size == 0 || size as u64 > max_alloc {
            return Err(Status::INVALID_BUFFER_SIZE);
        }
        let wants_host = flags & (MEM_USE_HOST_PTR | MEM_COPY_HOST_PTR) != 0;
        if wants_host != host.is_some() || host.is_some_and(|h| h.len() != size) {
            return Err(Status::INVALID_HOST_PTR);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| Status::MEM_OBJECT_ALLOCATION_FAILURE)?;
        match host {
            Some(host) => data.extend_from_slice(host),
            None => data.resize(size, 0),
        }
        self.retain_internal(context);
        Ok(self.insert(
            Body::Mem(MemObj {
                context,
                flags,
                data,
            }),
            0,
        ))
    }

    pub(crate) fn create_user_event(&mut self, context: usize) -> Result<usize, Status> {
        self.context(context)?;
        self.retain_internal(context);
        Ok(self.insert(
            Body::Event(EventObj {
                context,
                queue: None,
                command_type: command_type::USER,
                status: execution_status::SUBMITTED,
                profiling: false,
                times: [0; 5],
                command: None,
                deps: Vec::new(),
                resources: Vec::new(),
            }),
            0,
        ))
    }

    pub(crate) fn set_user_event_status(&mut self, id: usize, status: i32) -> Status {
        let event = match self.event(id) {
            Ok(event) => event,
            Err(status) => return status,
        };
        if event.command_type != command_type::USER || event.queue.is_some() {
            return Status::INVALID_EVENT;
        }
        if status != execution_status::COMPLETE && status >= 0 {
            return Status::INVALID_VALUE;
        }
        if event.status != execution_status::SUBMITTED {
            return Status::INVALID_OPERATION;
        }
        if let Ok(Body::Event(event)) = self.body_mut(id, ObjectKind::Event) {
            event.status = status;
        }
        self.drain();
        Status::SUCCESS
    }

    // ---- commands ----

    /// Record a command. The new event starts with one API reference plus the
    /// pending command's own hold on it.
    fn enqueue(
        &mut self,
        queue_id: usize,
        command_type: u32,
        command: Command,
        wait_list: &[RawHandle],
        mut resources: Vec<usize>,
    ) -> Result<usize, Status> {
        let mut deps = Vec::with_capacity(wait_list.len() + 1);
        for handle in wait_list {
            let id = handle.addr();
            self.event(id).map_err(|_| Status::INVALID_EVENT_WAIT_LIST)?;
            if !deps.contains(&id) {
                deps.push(id);
            }
        }
        let queue = self.queue(queue_id)?;
        let (context, properties, last) = (queue.context, queue.properties, queue.last);

        if properties & QUEUE_OUT_OF_ORDER == 0 {
            if let Some(last) = last {
                if !deps.contains(&last) {
                    deps.push(last);
                }
            }
        }
        if matches!(command, Command::Marker) && wait_list.is_empty() {
            let earlier: Vec<usize> = self
                .pending
                .iter()
                .copied()
                .filter(|id| {
                    matches!(self.objects.get(id).map(|o| &o.body),
                        Some(Body::Event(e)) if e.queue == Some(queue_id))
                })
                .collect();
            for id in earlier {
                if !deps.contains(&id) {
                    deps.push(id);
                }
            }
        }

        resources.push(queue_id);
        for id in deps.iter().chain(&resources) {
            self.retain_internal(*id);
        }
        self.retain_internal(context);
        let queued = self.tick(10);
        let id = self.insert(
            Body::Event(EventObj {
                context,
                queue: Some(queue_id),
                command_type,
                status: execution_status::QUEUED,
                profiling: properties & QUEUE_PROFILING != 0,
                times: [queued, 0, 0, 0, 0],
                command: Some(command),
                deps,
                resources,
            }),
            1,
        );

        self.retain_internal(id);
        let previous = match self.body_mut(queue_id, ObjectKind::CommandQueue) {
            Ok(Body::Queue(queue)) => queue.last.replace(id),
            _ => None,
        };
        if let Some(previous) = previous {
            self.release_internal(previous);
        }
        self.pending.push(id);
        Ok(id)
    }

    /// Synchronize on one freshly enqueued command for a blocking call.
    fn block_on(&mut self, id: usize) -> Status {
        self.drain();
        match self.event_status(id) {
            Some(status) if status < 0 => {
                // the caller never sees this event
                let _ = self.release(ObjectKind::Event, id);
                Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST
            }
            Some(execution_status::COMPLETE) => Status::SUCCESS,
            _ => deadlock("blocking transfer"),
        }
    }

    fn queue_context(&self, queue: usize) -> Result<usize, Status> {
        Ok(self.queue(queue)?.context)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_nd_range_kernel(
        &mut self,
        queue: usize,
        kernel_id: usize,
        global_offset: Option<&[usize]>,
        global_size: &[usize],
        local_size: Option<&[usize]>,
        wait_list: &[RawHandle],
    ) -> Result<usize, Status> {
        let queue_obj = self.queue(queue)?;
        let device = self.device(queue_obj.device)?;
        let kernel = self.kernel(kernel_id)?;
        if kernel.context != queue_obj.context {
            return Err(Status::INVALID_CONTEXT);
        }

        let dims = global_size.len();
        if !(1..=3).contains(&dims) {
            return Err(Status::INVALID_WORK_DIMENSION);
        }
        if global_offset.is_some_and(|o| o.len() != dims) || local_size.is_some_and(|l| l.len() != dims) {
            return Err(Status::INVALID_VALUE);
        }
        if global_size.contains(&0) {
            return Err(Status::INVALID_GLOBAL_WORK_SIZE);
        }
        if let Some(local) = local_size {
            if local
                .iter()
                .zip(global_size)
                .any(|(l, g)| *l == 0 || g % l != 0)
                || local.iter().product::<usize>() > device.max_work_group_size
            {
                return Err(Status::INVALID_WORK_GROUP_SIZE);
            }
            if local
                .iter()
                .zip(device.max_work_item_sizes)
                .any(|(l, max)| *l > max)
            {
                return Err(Status::INVALID_WORK_ITEM_SIZE);
            }
        }

        let mut args = Vec::with_capacity(kernel.args.len());
        let mut resources = Vec::new();
        for arg in &kernel.args {
            let arg = arg.clone().ok_or(Status::INVALID_KERNEL_ARGS)?;
            if let ArgSnapshot::Buffer(Some(handle)) = arg {
                self.mem(handle).map_err(|_| Status::INVALID_KERNEL_ARGS)?;
                if !resources.contains(&handle) {
                    resources.push(handle);
                }
            }
            args.push(arg);
        }

        let command = Command::Kernel {
            name: kernel.decl.name.clone(),
            args,
            global_offset: global_offset.map_or_else(|| vec![0; dims], <[usize]>::to_vec),
            global_size: global_size.to_vec(),
            local_size: local_size.map(<[usize]>::to_vec),
        };
        self.enqueue(queue, command_type::NDRANGE_KERNEL, command, wait_list, resources)
    }

    fn check_transfer(
        &self,
        queue: usize,
        buffer: usize,
        offset: usize,
        size: usize,
        forbidden: u64,
    ) -> Result<(), Status> {
        let context = self.queue_context(queue)?;
        let mem = self.mem(buffer)?;
        if mem.context != context {
            return Err(Status::INVALID_CONTEXT);
        }
        if size == 0 || offset.checked_add(size).map_or(true, |end| end > mem.data.len()) {
            return Err(Status::INVALID_VALUE);
        }
        if mem.flags & forbidden != 0 {
            return Err(Status::INVALID_OPERATION);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_read_buffer(
        &mut self,
        queue: usize,
        buffer: usize,
        blocking: bool,
        offset: usize,
        size: usize,
        dst: *mut u8,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        if dst.is_null() {
            return Status::INVALID_VALUE;
        }
        if let Err(status) =
            self.check_transfer(queue, buffer, offset, size, MEM_HOST_WRITE_ONLY | MEM_HOST_NO_ACCESS)
        {
            return status;
        }
        let command = Command::Read {
            buffer,
            offset,
            size,
            dst: HostDst(dst),
        };
        self.finish_transfer(queue, command_type::READ_BUFFER, command, buffer, blocking, wait_list, event)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_write_buffer(
        &mut self,
        queue: usize,
        buffer: usize,
        blocking: bool,
        offset: usize,
        size: usize,
        src: *const u8,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        if src.is_null() {
            return Status::INVALID_VALUE;
        }
        if let Err(status) =
            self.check_transfer(queue, buffer, offset, size, MEM_HOST_READ_ONLY | MEM_HOST_NO_ACCESS)
        {
            return status;
        }
        let command = Command::Write {
            buffer,
            offset,
            size,
            src: HostSrc(src),
        };
        self.finish_transfer(queue, command_type::WRITE_BUFFER, command, buffer, blocking, wait_list, event)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_transfer(
        &mut self,
        queue: usize,
        command_type: u32,
        command: Command,
        buffer: usize,
        blocking: bool,
        wait_list: &[RawHandle],
        event: &mut RawHandle,
    ) -> Status {
        let id = match self.enqueue(queue, command_type, command, wait_list, vec![buffer]) {
            Ok(id) => id,
            Err(status) => return status,
        };
        if blocking {
            let status = self.block_on(id);
            if !status.is_success() {
                return status;
            }
        }
        *event = RawHandle::from_addr(id);
        Status::SUCCESS
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_copy_buffer(
        &mut self,
        queue: usize,
        src: usize,
        dst: usize,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
        wait_list: &[RawHandle],
    ) -> Result<usize, Status> {
        let context = self.queue_context(queue)?;
        let (src_len, dst_len) = {
            let s = self.mem(src)?;
            let d = self.mem(dst)?;
            if s.context != context || d.context != context {
                return Err(Status::INVALID_CONTEXT);
            }
            (s.data.len(), d.data.len())
        };
        let fits = |offset: usize, len: usize| offset.checked_add(size).is_some_and(|end| end <= len);
        if size == 0 || !fits(src_offset, src_len) || !fits(dst_offset, dst_len) {
            return Err(Status::INVALID_VALUE);
        }
        if src == dst && src_offset < dst_offset + size && dst_offset < src_offset + size {
            return Err(Status::MEM_COPY_OVERLAP);
        }
        let command = Command::Copy {
            src,
            dst,
            src_offset,
            dst_offset,
            size,
        };
        let resources = if src == dst { vec![src] } else { vec![src, dst] };
        self.enqueue(queue, command_type::COPY_BUFFER, command, wait_list, resources)
    }

    pub(crate) fn enqueue_marker(&mut self, queue: usize, wait_list: &[RawHandle]) -> Result<usize, Status> {
        self.queue(queue)?;
        self.enqueue(queue, command_type::MARKER, Command::Marker, wait_list, Vec::new())
    }

    pub(crate) fn finish(&mut self, queue: usize) -> Status {
        if let Err(status) = self.queue(queue) {
            return status;
        }
        self.drain();
        if self.has_pending(Some(queue)) {
            deadlock("clFinish");
        }
        Status::SUCCESS
    }

    pub(crate) fn flush(&mut self, queue: usize) -> Status {
        if let Err(status) = self.queue(queue) {
            return status;
        }
        self.drain();
        Status::SUCCESS
    }

    pub(crate) fn wait_for_events(&mut self, events: &[RawHandle]) -> Status {
        if events.is_empty() {
            return Status::INVALID_VALUE;
        }
        let mut context = None;
        for handle in events {
            let event = match self.event(handle.addr()) {
                Ok(event) => event,
                Err(status) => return status,
            };
            if context.is_some_and(|c| c != event.context) {
                return Status::INVALID_CONTEXT;
            }
            context = Some(event.context);
        }
        self.drain();
        let mut failed = false;
        for handle in events {
            match self.event_status(handle.addr()) {
                Some(status) if status < 0 => failed = true,
                Some(execution_status::COMPLETE) => {}
                _ => deadlock("clWaitForEvents"),
            }
        }
        if failed {
            Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST
        } else {
            Status::SUCCESS
        }
    }
}

/// Options are flags; `-D` and `-I` take the following word as their value.
fn valid_build_options(options: &str) -> bool {
    let mut words = options.split_whitespace();
    while let Some(word) = words.next() {
        if !word.starts_with('-') {
            return false;
        }
        if (word == "-D" || word == "-I") && words.next().is_none() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(state: &mut State) -> usize {
        state
            .create_context(&[CONTEXT_PLATFORM, 0x100, 0], &[RawHandle::from_addr(0x200)])
            .unwrap()
    }

    #[test]
    fn test_internal_references_keep_parents_alive() {
        let mut state = State::new(true, true);
        let context = ctx(&mut state);
        let queue = state.create_command_queue(context, 0x200, &[0]).unwrap();
        assert_eq!(state.release(ObjectKind::Context, context), Status::SUCCESS);
        // no longer usable, but kept by the queue
        assert_eq!(state.context(context).unwrap_err(), Status::INVALID_CONTEXT);
        assert_eq!(state.live_objects(), 2);
        assert_eq!(state.release(ObjectKind::CommandQueue, queue), Status::SUCCESS);
        assert_eq!(state.live_objects(), 0);
    }

    #[test]
    fn test_answer_rejects_short_destination() {
        let mut small = [0u8; 2];
        assert_eq!(answer(b"abcd", Some(&mut small), None), Status::INVALID_VALUE);
        let mut size = 0;
        assert_eq!(answer(b"abcd", None, Some(&mut size)), Status::SUCCESS);
        assert_eq!(size, 4);
    }

    #[test]
    fn test_buffer_flag_validation() {
        let mut state = State::new(true, true);
        let context = ctx(&mut state);
        assert_eq!(
            state.create_buffer(context, MEM_READ_ONLY | MEM_WRITE_ONLY, 4, None),
            Err(Status::INVALID_VALUE)
        );
        assert_eq!(
            state.create_buffer(context, MEM_COPY_HOST_PTR, 4, None),
            Err(Status::INVALID_HOST_PTR)
        );
        assert_eq!(
            state.create_buffer(context, MEM_READ_WRITE, 0, None),
            Err(Status::INVALID_BUFFER_SIZE)
        );
        assert!(state.create_buffer(context, MEM_READ_WRITE, 4, None).is_ok());
    }

    #[test]
    fn test_in_order_chain() {
        let mut state = State::new(true, true);
        let context = ctx(&mut state);
        let queue = state.create_command_queue(context, 0x200, &[0]).unwrap();
        let gate = state.create_user_event(context).unwrap();
        let first = state
            .enqueue_marker(queue, &[RawHandle::from_addr(gate)])
            .unwrap();
        let second = state.enqueue_marker(queue, &[]).unwrap();
        state.drain();
        assert_eq!(state.event_status(first), Some(execution_status::QUEUED));
        assert_eq!(state.event_status(second), Some(execution_status::QUEUED));

        assert_eq!(state.set_user_event_status(gate, -5), Status::SUCCESS);
        assert_eq!(
            state.event_status(first),
            Some(Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST.0)
        );
        assert_eq!(
            state.event_status(second),
            Some(Status::EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST.0)
        );
    }

    #[test]
    fn test_build_options() {
        assert!(valid_build_options(""));
        assert!(valid_build_options("-cl-std=CL3.0 -D N=4 -Werror"));
        assert!(!valid_build_options("fast"));
        assert!(!valid_build_options("-D"));
    }
}
