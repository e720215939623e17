// SPDX-License-Identifier: MIT

//! edge-wire: serde types for the configuration-document envelope (§6.4).
//!
//! The envelope's `req_info`/`ai_models` are strongly typed; `common_settings`
//! and `custom_settings` stay as `serde_json::Value` subtrees, because
//! `edge-dtdl`'s `PropertyNode` tree is what owns and validates their shape
//! (§3.1, §4.1) — duplicating that shape here as Rust structs would fight
//! the node tree's per-field apply/verify contract instead of feeding it.

mod document;
mod errors;

pub use document::{AiModelEntry, ConfigDocument, ReqInfo, ResponseDocument, MAX_AI_MODELS};
pub use errors::EnvelopeError;
