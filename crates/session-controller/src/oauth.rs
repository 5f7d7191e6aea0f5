//! Loopback callback server for the delegated (browser) sign-in flow.
//!
//! The browser is sent to the provider's sign-in page with a
//! `http://localhost:<port>/callback` return address. The page redirects back
//! with either `id_token` (and optionally `provider_id`) or `error`.

use crate::{AuthError, AuthResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

/// Default callback port. `0` picks a free port.
pub const DEFAULT_CALLBACK_PORT: u16 = 0;

/// Default time the user has to finish the browser flow.
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 120;

/// What the browser sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The upstream identity provider issued an ID token.
    Token {
        id_token: String,
        provider_id: String,
    },
    /// The user cancelled or the provider refused.
    Denied(String),
}

type OutcomeSender = Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>;

/// Configuration of the loopback server.
#[derive(Debug, Clone)]
pub struct CallbackServer {
    port: u16,
    timeout: Duration,
}

impl CallbackServer {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_CALLBACK_PORT,
            Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
        )
    }

    /// Bind the listener and start accepting connections.
    pub async fn listen(&self) -> AuthResult<CallbackListener> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            AuthError::Config(format!("Failed to bind callback server to {}: {}", addr, e))
        })?;
        let port = listener.local_addr()?.port();

        info!(port, "Delegated sign-in callback server listening");

        let (tx, rx) = oneshot::channel::<CallbackOutcome>();
        let tx: OutcomeSender = Arc::new(Mutex::new(Some(tx)));

        let server = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let tx = Arc::clone(&tx);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(&mut socket, tx).await {
                                error!(error = %e, "Error handling callback connection");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Callback accept error");
                        break;
                    }
                }
            }
        });

        Ok(CallbackListener {
            port,
            timeout: self.timeout,
            rx,
            server,
        })
    }
}

/// A bound callback server waiting for the browser.
pub struct CallbackListener {
    port: u16,
    timeout: Duration,
    rx: oneshot::Receiver<CallbackOutcome>,
    server: JoinHandle<()>,
}

impl CallbackListener {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Return address handed to the provider's sign-in page.
    pub fn callback_url(&self) -> String {
        format!("http://localhost:{}/callback", self.port)
    }

    /// Wait for the redirect, then shut the server down.
    pub async fn wait(self) -> AuthResult<CallbackOutcome> {
        let result = match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(AuthError::DelegatedFlowAbandoned(
                "callback channel closed".to_string(),
            )),
            Err(_) => Err(AuthError::Timeout),
        };
        self.server.abort();
        result
    }
}

/// Handle an incoming HTTP connection.
async fn handle_connection(
    socket: &mut tokio::net::TcpStream,
    tx: OutcomeSender,
) -> AuthResult<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    debug!(request = %request_line.trim(), "Received callback request");

    let Some(target) = request_line
        .strip_prefix("GET ")
        .and_then(|rest| rest.split_whitespace().next())
    else {
        send_response(&mut writer, 405, "Method Not Allowed", "Method Not Allowed").await?;
        return Ok(());
    };

    let Some(params) = callback_params(target) else {
        send_response(&mut writer, 404, "Not Found", "Not Found").await?;
        return Ok(());
    };

    let outcome = match outcome_from_params(&params) {
        Some(outcome) => outcome,
        None => {
            // Nothing usable yet; keep waiting.
            send_response(&mut writer, 400, "Bad Request", &result_page(false, "Missing id_token"))
                .await?;
            return Ok(());
        }
    };

    let page = match &outcome {
        CallbackOutcome::Token { .. } => result_page(true, "Puedes cerrar esta ventana."),
        CallbackOutcome::Denied(reason) => result_page(false, reason),
    };
    send_response(&mut writer, 200, "OK", &page).await?;

    if let Some(tx) = tx.lock().await.take() {
        let _ = tx.send(outcome);
    }
    Ok(())
}

/// Query parameters of a `/callback` request target, or `None` for any
/// other path.
fn callback_params(target: &str) -> Option<HashMap<String, String>> {
    let url = Url::parse("http://localhost").ok()?.join(target).ok()?;
    if url.path() != "/callback" {
        return None;
    }
    Some(url.query_pairs().into_owned().collect())
}

fn outcome_from_params(params: &HashMap<String, String>) -> Option<CallbackOutcome> {
    if let Some(error) = params.get("error") {
        return Some(CallbackOutcome::Denied(error.clone()));
    }
    let id_token = params.get("id_token").filter(|t| !t.is_empty())?;
    Some(CallbackOutcome::Token {
        id_token: id_token.clone(),
        provider_id: params
            .get("provider_id")
            .cloned()
            .unwrap_or_else(|| "google.com".to_string()),
    })
}

async fn send_response(
    writer: &mut tokio::net::tcp::WriteHalf<'_>,
    status_code: u16,
    status_text: &str,
    body: &str,
) -> AuthResult<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_code,
        status_text,
        body.len(),
        body
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn result_page(success: bool, detail: &str) -> String {
    let (title, color) = if success {
        ("Inicio de sesión exitoso", "#22c55e")
    } else {
        ("No se pudo iniciar sesión", "#ef4444")
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>ProsperIA - {title}</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px;">
<h1 style="color: {color};">{title}</h1>
<p>{detail}</p>
</body>
</html>"#,
        detail = escape_html(detail)
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn get(port: u16, target: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream
            .write_all(format!("GET {} HTTP/1.1\r\n\r\n", target).as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_callback_params_parse_and_decode() {
        let params = callback_params("/callback?id_token=abc%2Edef&provider_id=google.com").unwrap();
        assert_eq!(params["id_token"], "abc.def");
        assert!(callback_params("/favicon.ico").is_none());
    }

    #[test]
    fn test_outcome_from_params() {
        let mut params = HashMap::new();
        assert_eq!(outcome_from_params(&params), None);

        params.insert("id_token".to_string(), "tok".to_string());
        assert_eq!(
            outcome_from_params(&params),
            Some(CallbackOutcome::Token {
                id_token: "tok".into(),
                provider_id: "google.com".into()
            })
        );

        params.insert("error".to_string(), "access_denied".to_string());
        assert_eq!(
            outcome_from_params(&params),
            Some(CallbackOutcome::Denied("access_denied".into()))
        );
    }

    #[tokio::test]
    async fn test_listener_receives_token() {
        let listener = CallbackServer::new(0, Duration::from_secs(5))
            .listen()
            .await
            .unwrap();
        let port = listener.port();
        assert_eq!(listener.callback_url(), format!("http://localhost:{}/callback", port));

        let client = tokio::spawn(async move {
            let not_found = get(port, "/other").await;
            assert!(not_found.starts_with("HTTP/1.1 404"));
            get(port, "/callback?id_token=google-id-token").await
        });

        let outcome = listener.wait().await.unwrap();
        assert_eq!(
            outcome,
            CallbackOutcome::Token {
                id_token: "google-id-token".into(),
                provider_id: "google.com".into()
            }
        );
        assert!(client.await.unwrap().starts_with("HTTP/1.1 200"));
    }

    #[tokio::test]
    async fn test_listener_times_out() {
        let listener = CallbackServer::new(0, Duration::from_millis(50))
            .listen()
            .await
            .unwrap();
        assert!(matches!(listener.wait().await, Err(AuthError::Timeout)));
    }
}
