//! Substrato de execução: threads nomeadas, laço periódico e sinal de parada.
//!
//! O único ponto de suspensão de uma tarefa periódica é a espera no canal de
//! parada. Quando o [`ShutdownHandle`] é descartado o canal fecha e todas as
//! esperas retornam imediatamente.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::info;

/// Mantém o sistema vivo enquanto existir.
#[derive(Debug)]
pub struct ShutdownHandle {
    _tx: Sender<()>,
}

impl ShutdownHandle {
    /// Pede a parada de todas as tarefas.
    pub fn trigger(self) {
        drop(self);
    }
}

/// Lado das tarefas: espera o fim do período ou a parada.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: Receiver<()>,
}

pub fn shutdown_pair() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = bounded::<()>(0);
    (ShutdownHandle { _tx: tx }, Shutdown { rx })
}

impl Shutdown {
    /// Dorme por `duration`. Retorna `false` se a parada foi pedida.
    pub fn sleep(&self, duration: Duration) -> bool {
        match self.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Executa `body` a cada `period` até a parada.
///
/// O tempo gasto no corpo é descontado da espera, como no laço do sender.
pub fn run_periodic(period: Duration, shutdown: &Shutdown, mut body: impl FnMut()) {
    loop {
        let cycle_start = Instant::now();
        body();
        let rest = period.saturating_sub(cycle_start.elapsed());
        if !shutdown.sleep(rest) {
            break;
        }
    }
}

/// Descrição de uma tarefa do sistema.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static str,
    /// Prioridade do firmware de referência. Threads do SO não são
    /// priorizadas; o valor só aparece no log.
    pub priority: u8,
}

pub const NETWORK_TASK: TaskSpec = TaskSpec {
    name: "network",
    priority: 2,
};
pub const SAMPLE_TASK: TaskSpec = TaskSpec {
    name: "sample",
    priority: 3,
};
pub const DISPLAY_TASK: TaskSpec = TaskSpec {
    name: "display",
    priority: 1,
};

pub fn spawn_task<F>(spec: TaskSpec, body: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name(spec.name.into())
        .spawn(body)?;
    info!("Tarefa '{}' criada (prioridade {})", spec.name, spec.priority);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn sleep_returns_true_while_handle_alive() {
        let (_handle, shutdown) = shutdown_pair();
        assert!(shutdown.sleep(Duration::from_millis(1)));
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn trigger_wakes_sleepers_immediately() {
        let (handle, shutdown) = shutdown_pair();
        handle.trigger();
        let start = Instant::now();
        assert!(!shutdown.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn periodic_loop_stops_on_shutdown() {
        let (handle, shutdown) = shutdown_pair();
        let count = Arc::new(AtomicUsize::new(0));
        let task = {
            let count = count.clone();
            spawn_task(SAMPLE_TASK, move || {
                run_periodic(Duration::from_millis(5), &shutdown, || {
                    count.fetch_add(1, Ordering::SeqCst);
                });
            })
            .unwrap()
        };

        std::thread::sleep(Duration::from_millis(60));
        handle.trigger();
        task.join().unwrap();
        assert!(count.load(Ordering::SeqCst) >= 2);
    }
}
