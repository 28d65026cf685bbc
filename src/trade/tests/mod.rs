//! Unit tests for the trade bounded context.
