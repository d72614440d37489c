//! Pure domain logic shared by the pages: triage workflow, analytics
//! reducers and form validation.

pub mod analytics;
pub mod triage;
pub mod validation;
