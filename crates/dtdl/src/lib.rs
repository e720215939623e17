// SPDX-License-Identifier: MIT

//! edge-dtdl: the `PropertyNode` tree (§4.1) and the concrete configuration
//! model (`DtdlModel`) it assembles into — `req_info`, `res_info`,
//! `common_settings` (with `pq_settings`/`port_settings`/`codec_settings`/
//! `inference_settings`), `custom_settings`, `ai_models`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod common_settings;
pub mod error;
pub mod leaf;
pub mod model;
pub mod node;
pub mod port_settings;
pub mod pq_settings;
pub mod rule;
pub mod sensor_map;

pub use common_settings::CommonSettings;
pub use error::{NodeError, NodeErrorCode};
pub use model::DtdlModel;
pub use node::{ApplyContext, PropertyNode};
pub use port_settings::PortSettings;
pub use pq_settings::PqSettings;
pub use rule::{JsonType, RuleKind, ValidationRule};
