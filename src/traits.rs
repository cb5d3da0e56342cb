// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Common traits shared by the wrapper types.
//!
//! ## Core Traits
//!
//! - [`RefCounted`] - retain/release protocol of reference-counted native objects
//! - [`ValidatableConfig`] - configuration validation interface
//!
//! ## Ownership rules
//!
//! A wrapper value stands for exactly one reference held on the native object.
//! `create` produces a value holding the initial reference; [`RefCounted::release`]
//! consumes the value and gives that reference back. Wrappers do **not** release
//! on drop: the runtime, not this crate, tracks the count, and a leaked wrapper
//! only leaks a reference. Use [`RefCounted::scoped`] for guaranteed release on
//! every exit path.

use crate::api::{InfoTarget, Runtime};
use crate::classify;
use crate::error::Result;
use crate::handle::Scoped;
use crate::query::InfoRequest;
use crate::sys::{
    context_info, event_info, kernel_info, mem_info, program_info, queue_info, ObjectKind,
    RawHandle,
};

/// Configuration validation trait.
///
/// # Example
///
/// ```rust
/// use rust_cl_core::{Error, Result, ValidatableConfig};
///
/// #[derive(Clone)]
/// struct LaunchConfig {
///     work_group: usize,
/// }
///
/// impl ValidatableConfig for LaunchConfig {
///     fn validate(&self) -> Result<()> {
///         if self.work_group == 0 {
///             return Err(Error::invalid_config("work_group must be > 0"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ValidatableConfig: Clone + Send + Sync {
    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if validation fails.
    fn validate(&self) -> Result<()>;
}

/// A wrapper around one reference to a reference-counted native object.
pub trait RefCounted: Sized {
    /// Native object kind, used to route retain/release/info calls.
    const KIND: ObjectKind;

    /// The wrapped handle.
    fn as_raw(&self) -> RawHandle;

    /// Runtime the object belongs to.
    fn runtime(&self) -> &Runtime;

    /// A second wrapper for the same handle that does not own a reference.
    ///
    /// Only [`RefCounted::try_clone`] calls this, immediately after a retain.
    #[doc(hidden)]
    fn alias(&self) -> Self;

    /// Increment the native reference count.
    ///
    /// Each successful call must eventually be matched by one release of a
    /// wrapper for this handle.
    ///
    /// # Errors
    ///
    /// Only allocation or resource errors.
    fn retain(&self) -> Result<()> {
        let status = self.runtime().api().retain(Self::KIND, self.as_raw());
        tracing::trace!(kind = %Self::KIND, handle = ?self.as_raw(), "retain");
        classify::retain_operation(Self::KIND).check(status)
    }

    /// Give this wrapper's reference back to the runtime.
    ///
    /// Whatever status the runtime reports is ignored: release runs on cleanup
    /// paths where an error has nowhere useful to go. Releasing the same
    /// reference twice is a usage bug this crate cannot detect.
    fn release(self) {
        let status = self.runtime().api().release(Self::KIND, self.as_raw());
        if status.is_success() {
            tracing::debug!(kind = %Self::KIND, handle = ?self.as_raw(), "released");
        } else {
            tracing::debug!(
                kind = %Self::KIND,
                handle = ?self.as_raw(),
                operation = classify::release_name(Self::KIND),
                %status,
                "release status ignored"
            );
        }
    }

    /// Retain and return a second owner of the same object.
    ///
    /// # Errors
    ///
    /// See [`RefCounted::retain`].
    fn try_clone(&self) -> Result<Self> {
        self.retain()?;
        Ok(self.alias())
    }

    /// Current native reference count.
    ///
    /// The value is a snapshot; other owners may change it at any time.
    ///
    /// # Errors
    ///
    /// Recoverable statuses of the underlying info query.
    fn reference_count(&self) -> Result<u32> {
        let param = match Self::KIND {
            ObjectKind::Context => context_info::REFERENCE_COUNT,
            ObjectKind::CommandQueue => queue_info::REFERENCE_COUNT,
            ObjectKind::Program => program_info::REFERENCE_COUNT,
            ObjectKind::Kernel => kernel_info::REFERENCE_COUNT,
            ObjectKind::Mem => mem_info::REFERENCE_COUNT,
            ObjectKind::Event => event_info::REFERENCE_COUNT,
            ObjectKind::Platform | ObjectKind::Device => classify::violated(
                "reference_count",
                format_args!("{} objects are not reference counted", Self::KIND),
            ),
        };
        InfoRequest::new(
            self.runtime(),
            InfoTarget::for_object(Self::KIND, self.as_raw()),
            param,
        )
        .scalar::<u32>()
    }

    /// Wrap in a guard that releases on drop.
    fn scoped(self) -> Scoped<Self> {
        Scoped::new(self)
    }
}

/// `RefCounted` for wrappers shaped `{ runtime: Runtime, raw: RawHandle }`.
macro_rules! impl_ref_counted {
    ($ty:ty, $kind:expr) => {
        impl $crate::traits::RefCounted for $ty {
            const KIND: $crate::sys::ObjectKind = $kind;

            fn as_raw(&self) -> $crate::sys::RawHandle {
                self.raw
            }

            fn runtime(&self) -> &$crate::api::Runtime {
                &self.runtime
            }

            fn alias(&self) -> Self {
                Self {
                    runtime: self.runtime.clone(),
                    raw: self.raw,
                }
            }
        }

        impl ::std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($ty)).field(&self.raw).finish()
            }
        }
    };
}
pub(crate) use impl_ref_counted;
