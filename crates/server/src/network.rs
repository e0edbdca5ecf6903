//! Serviço de rede: sobe o link, abre o listener uma única vez e entrega ao
//! [`respond`] os dados de cada conexão aberta.

use crate::responder::respond;
use crate::scheduler::Shutdown;
use status_core::SharedStatus;
use status_core::config::{NetworkConfig, ServerConfig};
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const RX_BUFFER_SIZE: usize = 2048;
/// Conexões abertas ao mesmo tempo; as excedentes esperam no backlog.
const MAX_CONNECTIONS: usize = 8;
/// Cliente que não esvazia o buffer de envio por mais que isso é descartado.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

// ──────────────────────────────────────────────
// Link
// ──────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Link indisponível: {0}")]
    Unavailable(String),
}

/// Colaborador que estabelece a conectividade e informa o IP obtido.
pub trait Link {
    fn connect(&mut self, timeout: Duration) -> Result<IpAddr, LinkError>;
}

/// Link do host: a rede já está de pé, só descobre o IP local.
///
/// Não há associação a esperar, então `connect` retorna na hora e o timeout
/// não se aplica.
pub struct HostLink {
    bind_ip: IpAddr,
}

impl HostLink {
    pub fn new(bind_ip: IpAddr) -> Self {
        Self { bind_ip }
    }
}

impl Link for HostLink {
    fn connect(&mut self, _timeout: Duration) -> Result<IpAddr, LinkError> {
        if !self.bind_ip.is_unspecified() {
            // O IP configurado precisa pertencer a alguma interface deste host
            UdpSocket::bind(SocketAddr::new(self.bind_ip, 0))
                .map_err(|e| LinkError::Unavailable(format!("{}: {e}", self.bind_ip)))?;
            return Ok(self.bind_ip);
        }

        // UDP connect não envia pacotes; só escolhe a interface de saída
        let route = UdpSocket::bind("0.0.0.0:0")
            .and_then(|sock| sock.connect("8.8.8.8:53").map(|_| sock))
            .and_then(|sock| sock.local_addr());
        match route {
            Ok(addr) => Ok(addr.ip()),
            Err(e) => {
                debug!("Sem rota externa ({e}); usando loopback");
                Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
            }
        }
    }
}

/// Tenta subir o link até conseguir. Retorna `None` só se a parada for pedida.
pub fn bring_up(
    link: &mut impl Link,
    config: &NetworkConfig,
    shutdown: &Shutdown,
) -> Option<IpAddr> {
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let retry = Duration::from_millis(config.retry_delay_ms);

    loop {
        info!("Conectando à rede...");
        match link.connect(timeout) {
            Ok(ip) => {
                info!("Conectado! Endereço IP: {ip}");
                return Some(ip);
            }
            Err(e) => {
                warn!(
                    "Falha ao conectar: {e}. Tentando novamente em {:.1}s...",
                    retry.as_secs_f64()
                );
                if !shutdown.sleep(retry) {
                    return None;
                }
            }
        }
    }
}

// ──────────────────────────────────────────────
// Servidor HTTP
// ──────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Endereço de bind inválido: {0}")]
    InvalidAddress(String),

    #[error("Erro ao ligar o servidor em {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Erro ao aceitar conexão: {0}")]
    Accept(#[from] std::io::Error),
}

/// Conexão aberta e o instante do último tráfego.
struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    last_activity: Instant,
}

/// Listener aberto uma única vez.
///
/// Todas as conexões ficam não bloqueantes e são varridas a cada ciclo de
/// polling, então uma conexão ociosa não segura as outras.
pub struct StatusServer {
    listener: TcpListener,
    idle_timeout: Duration,
    poll_interval: Duration,
}

impl StatusServer {
    pub fn bind(server: &ServerConfig, network: &NetworkConfig) -> Result<Self, ServerError> {
        let ip: IpAddr = server
            .bind_ip
            .parse()
            .map_err(|_| ServerError::InvalidAddress(server.bind_ip.clone()))?;
        let addr = SocketAddr::new(ip, server.port);
        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            idle_timeout: Duration::from_millis(server.idle_timeout_ms),
            poll_interval: Duration::from_millis(network.poll_interval_ms),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Laço de atendimento até a parada.
    pub fn serve(&self, shared: &SharedStatus, shutdown: &Shutdown) {
        let mut connections: Vec<Connection> = Vec::new();
        loop {
            self.accept_pending(&mut connections);

            connections.retain_mut(|conn| match self.service(conn, shared, shutdown) {
                Ok(true) => true,
                Ok(false) => {
                    debug!("Conexão com {} encerrada", conn.peer);
                    false
                }
                Err(e) => {
                    debug!("Conexão com {} encerrada: {e}", conn.peer);
                    false
                }
            });

            if !shutdown.sleep(self.poll_interval) {
                break;
            }
        }
    }

    fn accept_pending(&self, connections: &mut Vec<Connection>) {
        while connections.len() < MAX_CONNECTIONS {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let setup = stream
                        .set_nonblocking(true)
                        .and_then(|_| stream.set_write_timeout(Some(WRITE_TIMEOUT)));
                    if let Err(e) = setup {
                        warn!("Conexão de {peer} descartada: {e}");
                        continue;
                    }
                    debug!("Conexão de {peer}");
                    connections.push(Connection {
                        stream,
                        peer,
                        last_activity: Instant::now(),
                    });
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("{}", ServerError::Accept(e));
                    break;
                }
            }
        }
    }

    /// Drena o que chegou na conexão e responde cada bloco.
    ///
    /// Retorna `false` quando a conexão deve ser fechada: fim de stream,
    /// ociosidade ou parada.
    fn service(
        &self,
        conn: &mut Connection,
        shared: &SharedStatus,
        shutdown: &Shutdown,
    ) -> std::io::Result<bool> {
        let mut buf = [0u8; RX_BUFFER_SIZE];
        loop {
            if shutdown.is_triggered() {
                return Ok(false);
            }

            let payload = match conn.stream.read(&mut buf) {
                Ok(0) => None,
                Ok(n) => Some(&buf[..n]),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    if conn.last_activity.elapsed() >= self.idle_timeout {
                        debug!("Conexão com {} ociosa, fechando", conn.peer);
                        return Ok(false);
                    }
                    return Ok(true);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let Some(response) = respond(shared, payload) else {
                // Fim de stream: fecha sem resposta
                return Ok(false);
            };
            write_response(&mut conn.stream, &response)?;
            conn.last_activity = Instant::now();
        }
    }
}

/// Escreve a resposta inteira; o socket volta a ser não bloqueante depois.
fn write_response(stream: &mut TcpStream, response: &[u8]) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    let written = stream.write_all(response).and_then(|_| stream.flush());
    stream.set_nonblocking(true)?;
    written
}

// ──────────────────────────────────────────────
// Tarefa de rede
// ──────────────────────────────────────────────

pub struct NetworkTask<L> {
    link: L,
    shared: SharedStatus,
    network: NetworkConfig,
    server: ServerConfig,
}

impl<L: Link> NetworkTask<L> {
    pub fn new(link: L, shared: SharedStatus, network: NetworkConfig, server: ServerConfig) -> Self {
        Self {
            link,
            shared,
            network,
            server,
        }
    }

    pub fn run(mut self, shutdown: &Shutdown) {
        info!("Iniciando servidor HTTP");
        let Some(_ip) = bring_up(&mut self.link, &self.network, shutdown) else {
            return;
        };

        // Setup único: falhou, registra e a tarefa termina sem novas tentativas
        let server = match StatusServer::bind(&self.server, &self.network) {
            Ok(server) => server,
            Err(e) => {
                error!("{e}");
                return;
            }
        };
        match server.local_addr() {
            Ok(addr) => info!("Servidor HTTP rodando em {addr}..."),
            Err(_) => info!("Servidor HTTP rodando na porta {}...", self.server.port),
        }

        server.serve(&self.shared, shutdown);
        debug!("Tarefa de rede encerrada");
    }
}
