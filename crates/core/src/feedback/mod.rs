//! Feedback module - stores user feedback and relays it to the operator.

mod feedback_service;

pub use feedback_service::FeedbackService;
