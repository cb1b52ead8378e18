//! Business services for the access request domain.

pub mod lifecycle;

pub use lifecycle::{
    ActivityEntry, ActivityKind, ListOptions, RequestLifecycleService, RequestPage,
    RequestStats, SubmitRequestInput, DEFAULT_ACTIVITY_LIMIT, DEFAULT_PAGE_LIMIT,
    MAX_ACTIVITY_LIMIT, MAX_PAGE_LIMIT,
};
