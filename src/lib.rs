//! Email classifier: sorts incoming emails into Produtivo/Improdutivo and
//! drafts a signed reply, served over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod pipeline;
