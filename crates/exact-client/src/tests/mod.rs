//! Behavioural suites for the EXACT client.

mod support;
