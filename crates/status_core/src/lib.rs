//! # Status Core
//!
//! Crate compartilhada do servidor de status do microfone: registro de
//! status, escada de thresholds, configuração TOML e a página HTTP.
//!
//! ## Módulos
//! - [`types`] – [`StatusRecord`] e snapshot
//! - [`levels`] – Classificação por thresholds e conversão ADC
//! - [`shared`] – Célula `Arc<Mutex<_>>` injetada nas tarefas
//! - [`protocol`] – Resposta HTTP da página de status
//! - [`config`] – Configuração unificada via TOML
//! - [`hardware`] – Canal analógico e superfície do display

pub mod config;
pub mod hardware;
pub mod levels;
pub mod protocol;
pub mod shared;
pub mod types;

// Re-exports convenientes
pub use config::AppConfig;
pub use levels::classify;
pub use protocol::encode_response;
pub use shared::SharedStatus;
pub use types::{ButtonEvent, SoundLevel, StatusRecord, StatusSnapshot};
