//! Execution-context registry of log BIOs
//!
//! Each execution context (an in-flight request, a worker thread) owns at
//! most one BIO per channel. The first acquisition creates it, later ones
//! rebind it, and ending the context releases both.

use super::bio::{BioId, Binding, Channel, LogBio};
use crate::core::{
    AdapterConfig, AdapterMetrics, LogKind, LogLevel, Logger, RequestContext, Result,
    TlsLogError,
};
use std::cell::RefCell;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Called with each live BIO when its context ends, before its state is freed
pub type ReleaseHook = Arc<dyn Fn(Channel, BioId) + Send + Sync>;

thread_local! {
    static CURRENT: RefCell<Option<ExecutionContext>> = const { RefCell::new(None) };
}

pub struct ExecutionContext {
    config: AdapterConfig,
    request_bio: Option<LogBio>,
    global_bio: Option<LogBio>,
    metrics: Arc<AdapterMetrics>,
    release_hook: Option<ReleaseHook>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig::default(),
            request_bio: None,
            global_bio: None,
            metrics: Arc::new(AdapterMetrics::new()),
            release_hook: None,
        }
    }

    /// Create a context with validated buffer bounds and verbosity rules
    pub fn with_config(config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            request_bio: None,
            global_bio: None,
            metrics: Arc::new(AdapterMetrics::new()),
            release_hook: None,
        })
    }

    /// Share a metrics instance, e.g. across all contexts of a worker pool
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<AdapterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_release_hook(mut self, hook: ReleaseHook) -> Self {
        self.release_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<AdapterMetrics> {
        &self.metrics
    }

    /// The BIO of `channel`, if one has been acquired
    pub fn bio(&self, channel: Channel) -> Option<&LogBio> {
        match channel {
            Channel::Request => self.request_bio.as_ref(),
            Channel::Global => self.global_bio.as_ref(),
        }
    }

    /// Get the BIO of `channel`, creating it on first use and rebinding it
    /// otherwise.
    ///
    /// A request channel acquisition without a request in `binding` fails
    /// with [`TlsLogError::MissingRequest`].
    #[track_caller]
    pub fn acquire(&mut self, channel: Channel, binding: Binding) -> Result<&mut LogBio> {
        if channel == Channel::Request && binding.request.is_none() {
            return Err(TlsLogError::missing_request(channel.to_str()));
        }
        Ok(self.bind(channel, binding, Location::caller()))
    }

    /// Acquire the request channel BIO bound to `request`
    #[track_caller]
    pub fn request_log_bio(
        &mut self,
        logger: &Arc<Logger>,
        request: &Arc<RequestContext>,
        kind: LogKind,
        level: LogLevel,
    ) -> &mut LogBio {
        let binding = Binding::request(logger.clone(), request.clone(), kind, level);
        self.bind(Channel::Request, binding, Location::caller())
    }

    /// Acquire the global channel BIO
    #[track_caller]
    pub fn global_log_bio(
        &mut self,
        logger: &Arc<Logger>,
        kind: LogKind,
        level: LogLevel,
    ) -> &mut LogBio {
        let binding = Binding::global(logger.clone(), kind, level);
        self.bind(Channel::Global, binding, Location::caller())
    }

    fn bind(
        &mut self,
        channel: Channel,
        binding: Binding,
        site: &'static Location<'static>,
    ) -> &mut LogBio {
        let slot = match channel {
            Channel::Request => &mut self.request_bio,
            Channel::Global => &mut self.global_bio,
        };
        let config = &self.config;
        let metrics = &self.metrics;

        let mut created = false;
        let bio = slot.get_or_insert_with(|| {
            created = true;
            LogBio::new(channel, config, binding.clone(), site, metrics.clone())
        });

        if created {
            metrics.record_created();
        } else {
            bio.rebind(binding, site);
        }
        bio
    }

    /// Run `f` against this thread's context, creating it on first use.
    ///
    /// The context is torn down when the thread exits. Calling this again
    /// from inside `f` fails with [`TlsLogError::ContextBusy`].
    ///
    /// # Example
    ///
    /// ```
    /// use tls_log_adapter::prelude::*;
    ///
    /// let logger = Logger::builder().build_shared();
    /// let id = ExecutionContext::with_current(|ctx| {
    ///     ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1).id()
    /// }).unwrap();
    ///
    /// let again = ExecutionContext::with_current(|ctx| {
    ///     ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl2).id()
    /// }).unwrap();
    /// assert_eq!(id, again);
    /// ```
    pub fn with_current<R>(f: impl FnOnce(&mut ExecutionContext) -> R) -> Result<R> {
        CURRENT
            .try_with(|cell| -> Result<R> {
                let mut slot = cell
                    .try_borrow_mut()
                    .map_err(|_| TlsLogError::context_busy())?;
                Ok(f(slot.get_or_insert_with(ExecutionContext::new)))
            })
            .map_err(|_| TlsLogError::other("thread execution context already destroyed"))?
    }

    /// Replace this thread's context, tearing down the previous one
    pub fn install_current(ctx: ExecutionContext) -> Result<()> {
        let previous = Self::swap_current(Some(ctx))?;
        drop(previous);
        Ok(())
    }

    /// End this thread's context now instead of at thread exit
    pub fn end_current() -> Result<bool> {
        Ok(Self::swap_current(None)?.is_some())
    }

    fn swap_current(next: Option<ExecutionContext>) -> Result<Option<ExecutionContext>> {
        CURRENT
            .try_with(|cell| -> Result<Option<ExecutionContext>> {
                let mut slot = cell
                    .try_borrow_mut()
                    .map_err(|_| TlsLogError::context_busy())?;
                Ok(std::mem::replace(&mut *slot, next))
            })
            .map_err(|_| TlsLogError::other("thread execution context already destroyed"))?
    }

    fn release(&mut self) {
        let slots = [
            (Channel::Request, self.request_bio.take()),
            (Channel::Global, self.global_bio.take()),
        ];

        for (channel, bio) in slots {
            let Some(bio) = bio else { continue };

            if let Some(hook) = &self.release_hook {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    hook(channel, bio.id())
                }));
                if result.is_err() {
                    eprintln!(
                        "[TLS LOG ERROR] Release hook panicked for {} ({} channel)",
                        bio.id(),
                        channel
                    );
                }
            }

            self.metrics.record_released();
            drop(bio);
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("config", &self.config)
            .field("request_bio", &self.request_bio.as_ref().map(LogBio::id))
            .field("global_bio", &self.global_bio.as_ref().map(LogBio::id))
            .field("release_hook", &self.release_hook.is_some())
            .finish()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.release();
    }
}
