//! Responde cada requisição com a página de status.

use status_core::{SharedStatus, encode_response};
use tracing::debug;

/// Evento de dados recebidos numa conexão.
///
/// `None` é fim de stream: nenhuma resposta, o chamador fecha a conexão.
/// Com dados, o conteúdo é descartado e toda requisição recebe a mesma
/// página. O snapshot é copiado sob o lock; a formatação acontece fora dele.
pub fn respond(shared: &SharedStatus, payload: Option<&[u8]>) -> Option<Vec<u8>> {
    let payload = payload?;
    debug!("Requisição de {} bytes", payload.len());

    let snapshot = shared.snapshot();
    Some(encode_response(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SampleTask;
    use crate::sampler::tests::{ScriptedButton, ScriptedMic, SharedLed};
    use crate::scheduler::{SAMPLE_TASK, shutdown_pair, spawn_task};
    use status_core::config::{SamplerConfig, SoundThresholds};
    use std::time::{Duration, Instant};

    #[test]
    fn end_of_stream_yields_no_response() {
        let shared = SharedStatus::new();
        assert!(respond(&shared, None).is_none());
    }

    #[test]
    fn any_payload_gets_the_status_page() {
        let shared = SharedStatus::new();
        shared.with(|r| {
            r.begin_session(&SoundThresholds::default());
            r.record_sample(1.65, &SoundThresholds::default());
        });

        for request in [
            &b"GET / HTTP/1.1\r\n\r\n"[..],
            &b"POST /qualquer HTTP/1.1\r\n\r\nabc"[..],
            &b"lixo"[..],
        ] {
            let response = String::from_utf8(respond(&shared, Some(request)).unwrap()).unwrap();
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
            assert!(response.contains("Botão pressionado!"));
            assert!(response.contains("Intensidade alta captada!"));
            assert!(response.contains("Máximo captado: 1.65 V"));
        }
    }

    #[test]
    fn responder_is_live_under_sampler_contention() {
        let shared = SharedStatus::new();
        let (handle, shutdown) = shutdown_pair();
        let sampler = SamplerConfig {
            period_ms: 1,
            ..SamplerConfig::default()
        };
        let task = SampleTask::new(
            ScriptedButton::new(&[Some(true)]),
            SharedLed::default(),
            ScriptedMic::new(&[Some(0), Some(4095), Some(2048)]),
            shared.clone(),
            sampler,
            SoundThresholds::default(),
        );
        let worker = spawn_task(SAMPLE_TASK, move || task.run(&shutdown)).unwrap();

        let start = Instant::now();
        for _ in 0..500 {
            let response = respond(&shared, Some(&b"GET / HTTP/1.1\r\n\r\n"[..]));
            assert!(response.is_some());
        }
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "responder demorou {:?}",
            start.elapsed()
        );

        handle.trigger();
        worker.join().unwrap();
    }
}
