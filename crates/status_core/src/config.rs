//! Configuração unificada via TOML.
//!
//! Os valores padrão são as constantes fixas do firmware; um `config.toml`
//! parcial sobrescreve só as chaves presentes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Erros de leitura/escrita do arquivo de configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro ao ler {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Erro ao parsear {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao gravar {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Amostragem do microfone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Intervalo de polling do botão (ms)
    pub period_ms: u64,
    /// Valor máximo do ADC (12 bits)
    pub adc_max: u16,
    /// Tensão de referência do ADC (V)
    pub v_ref: f32,
    /// Tensão de repouso do microfone (V)
    pub quiescent_offset: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            adc_max: 4095,
            v_ref: 3.3,
            quiescent_offset: 1.65,
        }
    }
}

/// Thresholds de intensidade, em volts de desvio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundThresholds {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for SoundThresholds {
    fn default() -> Self {
        Self {
            low: 0.02,
            medium: 1.0,
            high: 1.3,
        }
    }
}

/// Atualização do display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub period_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { period_ms: 100 }
    }
}

/// Servidor HTTP de status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// IP local para bind
    pub bind_ip: String,
    /// Porta TCP
    pub port: u16,
    /// Conexão ociosa por mais que isso é fechada (ms)
    pub idle_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: "0.0.0.0".into(),
            port: 80,
            idle_timeout_ms: 30_000,
        }
    }
}

/// Subida do link de rede.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout de cada tentativa de conexão (ms)
    pub connect_timeout_ms: u64,
    /// Espera entre tentativas (ms)
    pub retry_delay_ms: u64,
    /// Intervalo de polling do serviço de rede (ms)
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            retry_delay_ms: 5_000,
            poll_interval_ms: 10,
        }
    }
}

/// Placa simulada usada quando não há hardware real.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tempo com o botão pressionado (ms)
    pub press_ms: u64,
    /// Tempo com o botão solto (ms)
    pub release_ms: u64,
    /// Amplitude máxima do sinal sintético (V)
    pub amplitude: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            press_ms: 3_000,
            release_ms: 2_000,
            amplitude: 1.5,
        }
    }
}

/// Configuração raiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub sampler: SamplerConfig,
    pub thresholds: SoundThresholds,
    pub display: DisplayConfig,
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML, caindo no padrão em caso de erro.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match Self::try_load(path) {
                Ok(config) => {
                    info!("Configuração carregada de {}", path.display());
                    return config;
                }
                Err(e) => warn!("{e}"),
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml (ao lado do executável).
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sampler.period_ms == 0 {
            errors.push("Intervalo do sampler não pode ser 0".into());
        }
        if self.sampler.adc_max == 0 {
            errors.push("adc_max não pode ser 0".into());
        }
        if self.sampler.v_ref <= 0.0 {
            errors.push(format!("v_ref inválido: {}", self.sampler.v_ref));
        }
        let t = &self.thresholds;
        if !(t.low < t.medium && t.medium < t.high) {
            errors.push(format!(
                "Thresholds devem ser crescentes: low={} medium={} high={}",
                t.low, t.medium, t.high
            ));
        }
        if self.display.period_ms == 0 {
            errors.push("Intervalo do display não pode ser 0".into());
        }
        if self.server.port == 0 {
            errors.push("Porta do servidor não pode ser 0".into());
        }
        if self.server.idle_timeout_ms == 0 {
            errors.push("idle_timeout_ms não pode ser 0".into());
        }
        if self.server.bind_ip.parse::<std::net::IpAddr>().is_err() {
            errors.push(format!("bind_ip inválido: {:?}", self.server.bind_ip));
        }
        if self.network.poll_interval_ms == 0 {
            errors.push("Intervalo de polling da rede não pode ser 0".into());
        }

        errors
    }
}
