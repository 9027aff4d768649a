use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// How the stub API behaves, so tests can force failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// Faithful mimic of the translation API.
    WellBehaved,
    /// Accepts every translate payload with 200, even invalid ones.
    AcceptsEverything,
}

/// Spawn a threaded stub of the translation API for e2e tests.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_translation_stub(mode: StubMode) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream, mode));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn handle_client(stream: TcpStream, mode: StubMode) {
    let Ok(()) = stream.set_read_timeout(Some(Duration::from_secs(5))) else {
        return;
    };
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_owned();
    let path = parts.next().unwrap_or("").to_owned();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    break;
                }
                let lower = trimmed.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
            Err(_) => return,
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body).is_err() {
        return;
    }
    let body = String::from_utf8_lossy(&body).into_owned();

    let (status, payload) = route(&method, &path, &body, mode);
    respond(reader.into_inner(), status, &payload);
}

fn route(method: &str, path: &str, body: &str, mode: StubMode) -> (u16, String) {
    match (method, path) {
        ("GET", "/") => (
            200,
            envelope(
                200,
                "Translation API is running!",
                "{\"endpoints\":{\"/translate\":\"POST - Translate text\",\"/languages\":\"GET - Get supported languages\"},\"total_languages\":20}",
            ),
        ),
        ("GET", "/languages") => (
            200,
            envelope(
                200,
                "Supported languages retrieved successfully",
                "{\"languages\":[{\"code\":\"de\",\"name\":\"German\"},{\"code\":\"en\",\"name\":\"English\"},{\"code\":\"es\",\"name\":\"Spanish\"},{\"code\":\"fr\",\"name\":\"French\"}],\"count\":20}",
            ),
        ),
        ("POST", "/translate") => translate(body, mode),
        _ => (404, envelope(404, "Endpoint not found", "null")),
    }
}

fn translate(body: &str, mode: StubMode) -> (u16, String) {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return (400, envelope(400, "Request must be JSON", "null")),
    };

    let text = parsed["text"].as_str().unwrap_or("");
    let target = parsed["target_language"].as_str().unwrap_or("en");

    if mode == StubMode::WellBehaved {
        if text.trim().is_empty() {
            return (400, envelope(400, "Text must be a non-empty string", "null"));
        }
        if !matches!(target, "en" | "es" | "fr" | "de" | "it") {
            return (400, envelope(400, "Invalid target language code", "null"));
        }
    }

    let data = format!(
        "{{\"original_text\":{:?},\"translated_text\":\"{} [translated to {}]\",\"confidence\":0.8}}",
        text,
        text.replace('"', ""),
        target
    );
    (200, envelope(200, "Translation successful", &data))
}

fn envelope(status: u16, message: &str, data: &str) -> String {
    format!(
        "{{\"status\":{},\"message\":{:?},\"data\":{}}}",
        status, message, data
    )
}

fn respond(mut stream: TcpStream, status: u16, payload: &str) {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    drop(stream.flush());
}

/// Run the lingocheck binary with the given arguments.
///
/// # Errors
///
/// Returns an error if the binary cannot be located or spawned.
pub fn run_lingocheck<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = lingocheck_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("LINGOCHECK_URL")
        .output()
        .map_err(|err| format!("run lingocheck failed: {}", err))
}

fn lingocheck_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_lingocheck").map_or_else(
        || Err("CARGO_BIN_EXE_lingocheck missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
