//! End-to-end tests for the jmm backend
//!
//! These tests build a class with the tree builders, run the whole pipeline
//! and check the resulting tree and IR text.

mod harness;

mod control_flow;
mod dispatch;
mod folding;
mod propagation;
mod types;
mod varargs;
