//! Activity-to-graph materialization.
//!
//! Receives activity-stream records, classifies them once by
//! (activity, object, target) type, and applies them to the graph and stream
//! stores, optionally notifying a peer connector about document arrivals.

pub mod classify;
pub mod collaborators;
pub mod descriptor;
pub mod dispatcher;
pub mod handlers;
pub mod locks;
pub mod notify;
pub mod stream_resolver;

#[cfg(feature = "test-support")]
pub mod testing;

pub use classify::{classify, ActivityVerb, ClassifiedActivity};
pub use collaborators::{
    Directory, HttpNotifierFactory, Notifier, NotifierFactory, UnconfiguredDirectory,
};
pub use descriptor::{ActivityQuery, AppDescriptor, APP_ID};
pub use dispatcher::{ActivityOutcome, Dispatcher, DispatcherDeps, DispatcherSettings};
pub use handlers::{DocumentAdded, EventAdded};
pub use locks::KeyLocks;
pub use notify::{ExportRule, NotificationTrigger, NotifyOutcome, SkipReason};
pub use stream_resolver::{ResolvedStream, StreamResolver};
