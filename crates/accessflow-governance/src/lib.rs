//! Access request governance domain logic.
//!
//! This crate owns the access-request workflow: employees submit a
//! selection from the fixed access catalog, an approver grants a subset of
//! it or rejects the request, and the outcome is announced by email and
//! chat.
//!
//! # Modules
//!
//! - [`catalog`] - the compiled-in access catalog (five categories)
//! - [`store`] - [`store::RequestStore`] trait and an in-memory backend
//! - [`notification`] - sender traits and [`notification::RequestNotifier`]
//! - [`services::RequestLifecycleService`] - submit, approve, reject, read
//!
//! State changes are committed to the store first; notification is a
//! separate best-effort step whose failures are only logged.

pub mod catalog;
pub mod error;
pub mod notification;
pub mod services;
pub mod store;
pub mod types;

pub use error::{GovernanceError, Result};
pub use notification::{
    ChatFact, ChatMessage, ChatSender, EmailMessage, EmailSender, InMemoryChatSender,
    InMemoryEmailSender, NotificationError, NotificationResult, RequestNotifier,
};
pub use services::{
    ActivityEntry, ActivityKind, ListOptions, RequestLifecycleService, RequestPage,
    RequestStats, SubmitRequestInput,
};
pub use store::{
    InMemoryRequestStore, RequestFilter, RequestStore, StatusPatch, UpdateOutcome,
};
pub use types::{
    AccessRequest, Category, Department, RequestId, RequestStatus, RequestedItems, Requester,
};
