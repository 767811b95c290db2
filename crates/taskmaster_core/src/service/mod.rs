//! External service contracts and use-case orchestration.
//!
//! # Responsibility
//! - Define the Task Service and Category Service boundaries.
//! - Apply service results to the task store as use-case level APIs.
//!
//! # Invariants
//! - The store only ever receives canonical objects returned by the service.
//! - Authorization failures are delegated to the session collaborator.

pub mod category_service;
pub mod memory;
pub mod task_manager;
pub mod task_service;
