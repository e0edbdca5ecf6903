//! # Status Server
//!
//! Monitora o microfone enquanto o botão está pressionado, mantém o pico da
//! sessão com classificação por thresholds, mostra nível e pico no display e
//! serve o estado numa página HTTP com auto-refresh.
//!
//! Tarefas:
//! - `sample` (50 ms) – borda do botão, LED e amostragem do ADC
//! - `display` (100 ms) – desenha o snapshot enquanto pressionado
//! - `network` – sobe o link, abre o listener e atende as requisições
//!
//! ## Uso
//! ```bash
//! RUST_LOG=debug status_server
//! ```

mod display;
mod network;
mod responder;
mod sampler;
mod scheduler;
mod sim;

use display::DisplayTask;
use network::{HostLink, NetworkTask};
use sampler::SampleTask;
use scheduler::{DISPLAY_TASK, NETWORK_TASK, SAMPLE_TASK, shutdown_pair, spawn_task};
use sim::{LogSurface, PressCycle, SimButton, SimLed, SimMicrophone};
use status_core::SharedStatus;
use status_core::config::AppConfig;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> std::io::Result<()> {
    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let mut config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        warn!("Usando configuração padrão");
        config = AppConfig::default();
    }

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🎤 STATUS SERVER – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  HTTP:       {}:{}", config.server.bind_ip, config.server.port);
    println!("  Amostragem: {} ms", config.sampler.period_ms);
    println!("  Display:    {} ms", config.display.period_ms);
    println!(
        "  Thresholds: {:.2} / {:.2} / {:.2} V",
        config.thresholds.low, config.thresholds.medium, config.thresholds.high
    );
    println!("══════════════════════════════════════════════");
    println!();

    let shared = SharedStatus::new();
    let (handle, shutdown) = shutdown_pair();

    // ── Ctrl+C → parada graciosa ──
    let handle = Mutex::new(Some(handle));
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Encerrando...");
        if let Some(h) = handle.lock().ok().and_then(|mut h| h.take()) {
            h.trigger();
        }
    }) {
        warn!("Não foi possível instalar handler de Ctrl+C: {e}");
    }

    // ── Placa simulada ──
    let cycle = PressCycle::new(&config.simulation);
    let sample_task = SampleTask::new(
        SimButton::new(cycle),
        SimLed::default(),
        SimMicrophone::new(cycle, config.simulation.amplitude, config.sampler.clone()),
        shared.clone(),
        config.sampler.clone(),
        config.thresholds.clone(),
    );
    let display_task = DisplayTask::new(
        LogSurface::default(),
        shared.clone(),
        Duration::from_millis(config.display.period_ms),
    );
    let bind_ip: IpAddr = config
        .server
        .bind_ip
        .parse()
        .unwrap_or(IpAddr::from([0, 0, 0, 0]));
    let network_task = NetworkTask::new(
        HostLink::new(bind_ip),
        shared,
        config.network.clone(),
        config.server.clone(),
    );

    // ── Tarefas ──
    let mut tasks = Vec::with_capacity(3);
    {
        let shutdown = shutdown.clone();
        tasks.push(spawn_task(NETWORK_TASK, move || network_task.run(&shutdown))?);
    }
    {
        let shutdown = shutdown.clone();
        tasks.push(spawn_task(SAMPLE_TASK, move || sample_task.run(&shutdown))?);
    }
    tasks.push(spawn_task(DISPLAY_TASK, move || display_task.run(&shutdown))?);

    for task in tasks {
        if task.join().is_err() {
            error!("Uma tarefa terminou com panic");
        }
    }
    info!("Status server encerrado");
    Ok(())
}
