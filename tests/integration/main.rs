//! Integration tests against a mockito HTTP server.
//!
//! Each mock's `expect(n)` is the count of real transport invocations.

mod caching;
mod hooks;
mod mock_server;
