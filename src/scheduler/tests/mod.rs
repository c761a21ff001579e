//! Scheduler tests

mod helpers;

mod continuation_tests;
