//! Integration Tests Module
//!
//! End-to-end tests for Study Buddy against a JSON subject store in a
//! temporary directory and a scripted model provider.

// Shared fixtures (scripted tutor, seeded stores)
mod support;

// Subject cache, eviction and primary-subject tests
mod loader_test;

// Flashcard extraction through the subject entity
mod flashcard_test;

// JSON subject store tests
mod store_test;

// Catalog, chat flow and app state wiring tests
mod app_flow_test;
