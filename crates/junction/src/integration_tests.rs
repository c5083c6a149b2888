//! Integration tests for the junction controller using the `TestJunction`
//! harness.
//!
//! These tests run the plugin inside a headless Bevy App and check how the
//! feed, scheduler, actuator and history work together across cycles.

mod run_loop_tests;
mod trace_feed_tests;
