//! Integration tests for the circulation core

mod memory_store;
mod postgres;
