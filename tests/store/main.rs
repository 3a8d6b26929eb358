//! Store integration tests against the in-process backend.
#![cfg(feature = "memory")]

mod support;

mod lifecycle;
