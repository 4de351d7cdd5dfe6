//! # beacon-bundler
//!
//! CommandBundler, the three bundling-rule families, and the
//! application-state proxies that gate commands on their way in.

pub mod bundler;
pub mod proxy;
pub mod rules;

pub use bundler::{BundleSink, CommandBundler};
pub use proxy::{BundlerProxy, StateBundlerProxy, ThroughBundlerProxy};
pub use rules::{
    AsyncBundleRule, BundleRule, CommandCountBundleRule, SceneBundleRule, TimeWindowBundleRule,
    UserBundleRule,
};

pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
