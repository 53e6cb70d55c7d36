//! Cross-crate integration tests for the keel orchestrator.
//!
//! The crate body is empty — everything lives under `tests/`, exercising
//! the manifest → loader → lifecycle → router flow end to end.
