//! Página de status servida via HTTP.
//!
//! Toda requisição recebe a mesma resposta, independente de método ou
//! caminho:
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: text/html; charset=UTF-8
//! Content-Length: N
//! Connection: keep-alive
//!
//! <!DOCTYPE html> ... (auto-refresh de 1s)
//! ```

use crate::types::StatusSnapshot;
use std::fmt::Write as _;

pub const STATUS_LINE: &str = "HTTP/1.1 200 OK";
pub const CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Intervalo de auto-refresh da página (s).
pub const REFRESH_SECS: u32 = 1;

const STYLE: &str = "\
    body {\
      font-family: Arial, sans-serif;\
      background-color: #0066cc;\
      margin: 0;\
      padding: 20px;\
      display: flex;\
      flex-direction: column;\
      align-items: center;\
      justify-content: center;\
      min-height: 100vh;\
      color: white;\
    }\
    a {\
      color: white;\
      text-decoration: none;\
    }";

/// Renderiza o corpo HTML a partir de um snapshot.
pub fn render_page(snapshot: &StatusSnapshot) -> String {
    let mut body = String::with_capacity(1024);
    let _ = write!(
        body,
        "<!DOCTYPE html>\
<html>\
<head>\
  <meta charset=\"UTF-8\">\
  <title>Microfone</title>\
  <meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">\
  <style>{STYLE}</style>\
</head>\
<body>\
  <h1>Controle do Microfone</h1>\
    <h2>Estado do Botão:</h2>\
    <p>{button}</p>\
    <h2>Nível do Som:</h2>\
    <p>{sound}</p>\
    <p>Nível atual: {current:.2} V</p>\
    <p>Máximo captado: {peak:.2} V</p>\
  <p><a href=\"/\">Atualizar</a></p>\
</body>\
</html>\r\n",
        button = snapshot.button_message.message(),
        sound = snapshot.classification.message(),
        current = snapshot.current_level,
        peak = snapshot.peak_level,
    );
    body
}

/// Monta a resposta HTTP completa (headers + corpo) num buffer próprio.
pub fn encode_response(snapshot: &StatusSnapshot) -> Vec<u8> {
    let body = render_page(snapshot);
    let mut out = String::with_capacity(body.len() + 128);
    let _ = write!(
        out,
        "{STATUS_LINE}\r\n\
Content-Type: {CONTENT_TYPE}\r\n\
Content-Length: {}\r\n\
Connection: keep-alive\r\n\
\r\n",
        body.len()
    );
    out.push_str(&body);
    out.into_bytes()
}
