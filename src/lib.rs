//! A RESP-speaking in-memory server in Rust.
//!
//! This crate provides a server that is wire-compatible with a subset of
//! the Redis command surface:
//!
//! - Basic key-value operations with expiry (GET, SET with PX)
//! - List operations (LPUSH, RPUSH, LPOP, BLPOP, LRANGE, LLEN)
//! - Stream appends (XADD)
//! - Server commands (PING, ECHO, TYPE, COMMAND, FLUSHDB)
//!
//! Clients speak the Redis Serialization Protocol (RESP2) over TCP and may
//! pipeline requests; replies are always delivered in request order.
//! Blocking pops are coordinated through per-key waiter queues so that a
//! push hands its value directly to the longest-waiting client.

pub mod commands;
pub mod connection;
pub mod key_value_store;
pub mod resp;
pub mod server;
pub mod state;
pub mod stream;
