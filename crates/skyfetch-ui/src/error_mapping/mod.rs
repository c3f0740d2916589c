//! Maps UI service errors to skyfetch_core::AppError for consistent user-facing messages.

mod search;
