//! LSP client for end-to-end tests.
//!
//! Talks to the infinite-ls binary over stdin/stdout using JSON-RPC 2.0
//! with Content-Length framing.

// Not every test binary uses every method.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(30);
const MAX_MESSAGES: u32 = 1000;

pub struct LspClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    request_id: i64,
    /// Notifications read while waiting for something else
    pending: Vec<Value>,
}

impl LspClient {
    /// Spawn the infinite-ls binary.
    pub fn new() -> Self {
        // Set by Cargo for integration tests.
        let mut child = Command::new(env!("CARGO_BIN_EXE_infinite-ls"))
            .arg("--stdio")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn infinite-ls binary");

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            request_id: 0,
            pending: Vec::new(),
        }
    }

    /// Send a request and wait for its response.
    pub fn send_request(&mut self, method: &str, params: Value) -> Value {
        self.request_id += 1;
        let request_id = self.request_id;

        let mut request = serde_json::Map::new();
        request.insert("jsonrpc".to_string(), json!("2.0"));
        request.insert("id".to_string(), json!(request_id));
        request.insert("method".to_string(), json!(method));
        if !params.is_null() {
            request.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(request));
        self.receive_response_for_id(request_id)
    }

    pub fn send_notification(&mut self, method: &str, params: Value) {
        let mut notification = serde_json::Map::new();
        notification.insert("jsonrpc".to_string(), json!("2.0"));
        notification.insert("method".to_string(), json!(method));
        if !params.is_null() {
            notification.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(notification));
    }

    /// Run the initialize handshake with `root` as the only workspace folder.
    pub fn initialize(&mut self, root_uri: &str) -> Value {
        let response = self.send_request(
            "initialize",
            json!({
                "processId": std::process::id(),
                "rootUri": root_uri,
                "workspaceFolders": [{ "uri": root_uri, "name": "root" }],
                "capabilities": {}
            }),
        );
        self.send_notification("initialized", json!({}));
        response
    }

    pub fn did_open(&mut self, uri: &str, text: &str) {
        self.send_notification(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": "plaintext",
                    "version": 1,
                    "text": text
                }
            }),
        );
    }

    /// Wait for the next `textDocument/publishDiagnostics` for `uri`.
    pub fn wait_for_diagnostics(&mut self, uri: &str) -> Vec<Value> {
        let notification = self.wait_for_notification(|message| {
            message["method"] == "textDocument/publishDiagnostics"
                && message["params"]["uri"] == uri
        });
        notification["params"]["diagnostics"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// Wait for a notification matching `predicate`, keeping others queued.
    pub fn wait_for_notification(&mut self, predicate: impl Fn(&Value) -> bool) -> Value {
        if let Some(index) = self.pending.iter().position(&predicate) {
            return self.pending.remove(index);
        }

        let start = Instant::now();
        for _ in 0..MAX_MESSAGES {
            if start.elapsed() > TIMEOUT {
                break;
            }
            let message = self.receive_message();
            if predicate(&message) {
                return message;
            }
            if message.get("id").is_none() {
                self.pending.push(message);
            }
        }
        panic!("Timeout waiting for notification");
    }

    pub fn shutdown(&mut self) {
        let response = self.send_request("shutdown", Value::Null);
        assert!(response.get("error").is_none(), "shutdown failed: {response}");
        self.send_notification("exit", Value::Null);
    }

    fn send_message(&mut self, message: &Value) {
        let body = serde_json::to_string(message).expect("Failed to serialize message");
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(header.as_bytes())
            .expect("Failed to write header");
        stdin
            .write_all(body.as_bytes())
            .expect("Failed to write body");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Skip notifications and server requests until the matching response.
    fn receive_response_for_id(&mut self, expected_id: i64) -> Value {
        let start = Instant::now();
        for _ in 0..MAX_MESSAGES {
            if start.elapsed() > TIMEOUT {
                break;
            }
            let message = self.receive_message();
            match message.get("id") {
                Some(id) if message.get("method").is_none() => {
                    if id.as_i64() == Some(expected_id) {
                        return message;
                    }
                }
                Some(_) => {}
                None => self.pending.push(message),
            }
        }
        panic!("Timeout waiting for response with id {}", expected_id);
    }

    fn receive_message(&mut self) -> Value {
        let mut content_length = None;
        loop {
            let mut header = String::new();
            let bytes_read = self
                .stdout
                .read_line(&mut header)
                .expect("Failed to read header line");
            if bytes_read == 0 {
                panic!("Server closed connection prematurely while reading header");
            }

            let header = header.trim_end();
            if header.is_empty() {
                if content_length.is_some() {
                    break;
                }
                continue;
            }
            if let Some(value) = header.strip_prefix("Content-Length:") {
                content_length = Some(
                    value
                        .trim()
                        .parse::<usize>()
                        .expect("Invalid Content-Length value"),
                );
            }
        }

        let mut body = vec![0u8; content_length.unwrap_or_default()];
        self.stdout
            .read_exact(&mut body)
            .expect("Failed to read body");
        serde_json::from_slice(&body).expect("Failed to parse message")
    }

    fn kill(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        self.kill();
    }
}
