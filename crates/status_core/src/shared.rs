//! Célula de estado compartilhado: um único mutex em volta do [`StatusRecord`].
//!
//! Cada tarefa recebe um clone de [`SharedStatus`] na construção. As seções
//! críticas são curtas: nenhuma I/O acontece com o lock na mão.

use crate::types::{StatusRecord, StatusSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    inner: Arc<Mutex<StatusRecord>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bloqueia até obter o lock (sem timeout).
    ///
    /// Um lock envenenado é recuperado: o registro é só dados e continua válido.
    pub fn lock(&self) -> MutexGuard<'_, StatusRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executa `f` dentro de uma seção crítica.
    pub fn with<R>(&self, f: impl FnOnce(&mut StatusRecord) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Copia todos os campos sob um único lock.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().snapshot()
    }
}
