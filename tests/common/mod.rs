//! An in-process stand-in for a store node.
//!
//! Speaks just enough HTTP/1.1 to answer one JSON-RPC request per
//! connection and keeps its values in a `HashMap`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};

/// Deleting this key answers as if half the replicas timed out.
pub const TIMEOUT_KEY: &str = "slow-key";

/// A running fake store.
pub struct FakeStore {
    address: String,
    values: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeStore {
    /// Starts a fake store on an ephemeral local port.
    pub fn spawn() -> FakeStore {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let values = Arc::new(Mutex::new(HashMap::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let store = FakeStore {
            address,
            values: values.clone(),
            requests: requests.clone(),
        };
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let values = values.clone();
                let requests = requests.clone();
                thread::spawn(move || handle_connection(stream, &values, &requests));
            }
        });
        store
    }

    /// The `host:port` this store listens on.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Seeds a raw stored value.
    pub fn insert(&self, key: &str, value: Value) {
        self.values.lock().unwrap().insert(key.to_owned(), value);
    }

    /// The raw stored value of `key`.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Every `(path, body)` received so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

/// An address nothing listens on.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn handle_connection(
    stream: TcpStream,
    values: &Mutex<HashMap<String, Value>>,
    requests: &Mutex<Vec<(String, Value)>>,
) {
    let mut reader = BufReader::new(&stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_owned();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    let request: Value = serde_json::from_slice(&body).unwrap();
    requests
        .lock()
        .unwrap()
        .push((path.clone(), request.clone()));

    let result = {
        let mut values = values.lock().unwrap();
        dispatch(&path, &request, &mut values)
    };
    let answer = json!({"id": request["id"], "error": null, "result": result}).to_string();

    let mut writer = &stream;
    write!(
        writer,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        answer.len(),
        answer
    )
    .unwrap();
    writer.flush().unwrap();
}

fn dispatch(path: &str, request: &Value, values: &mut HashMap<String, Value>) -> Value {
    let params = &request["params"];
    match (path, request["method"].as_str().unwrap_or("")) {
        ("/api/tx.yaws", "read") => read(values, params[0].as_str().unwrap_or("")),
        ("/api/tx.yaws", "write") => {
            let key = params[0].as_str().unwrap_or("").to_owned();
            values.insert(key, params[1].clone());
            json!({"status": "ok"})
        }
        ("/api/tx.yaws", "test_and_set") => test_and_set(
            values,
            params[0].as_str().unwrap_or(""),
            &params[1],
            &params[2],
        ),
        ("/api/tx.yaws", "req_list") => req_list(values, &params[0]),
        ("/api/rdht.yaws", "delete") => {
            let key = params[0]["key"].as_str().unwrap_or("");
            if key == TIMEOUT_KEY {
                return json!({"failure": "timeout", "ok": 2, "results": ["ok", "ok", "undef", "undef"]});
            }
            match values.remove(key) {
                Some(_) => json!({"ok": 4, "results": ["ok", "ok", "ok", "ok"]}),
                None => json!({"ok": 0, "results": ["undef", "undef", "undef", "undef"]}),
            }
        }
        _ => json!({"status": "fail", "reason": "unknown_method"}),
    }
}

fn read(values: &HashMap<String, Value>, key: &str) -> Value {
    match values.get(key) {
        Some(value) => json!({"status": "ok", "value": value}),
        None => json!({"status": "fail", "reason": "not_found"}),
    }
}

fn test_and_set(values: &mut HashMap<String, Value>, key: &str, old: &Value, new: &Value) -> Value {
    match values.get(key) {
        None => json!({"status": "fail", "reason": "not_found"}),
        Some(current) if current["value"] != old["value"] => {
            json!({"status": "fail", "reason": "key_changed", "value": current})
        }
        Some(_) => {
            values.insert(key.to_owned(), new.clone());
            json!({"status": "ok"})
        }
    }
}

/// Applies a transaction to a scratch copy and keeps it only if every
/// operation succeeded.
fn req_list(values: &mut HashMap<String, Value>, ops: &Value) -> Value {
    let mut scratch = values.clone();
    let mut results = Vec::new();
    let mut committed = false;

    for op in ops.as_array().cloned().unwrap_or_default() {
        let result = if let Some(key) = op.get("read").and_then(Value::as_str) {
            read(&scratch, key)
        } else if let Some(write) = op.get("write").and_then(Value::as_object) {
            for (key, value) in write {
                scratch.insert(key.clone(), value.clone());
            }
            json!({"status": "ok"})
        } else if let Some(tas) = op.get("test_and_set") {
            test_and_set(
                &mut scratch,
                tas["key"].as_str().unwrap_or(""),
                &tas["old"],
                &tas["new"],
            )
        } else if op.get("commit").is_some() {
            committed = true;
            json!({"status": "ok"})
        } else {
            json!({"status": "fail", "reason": "abort"})
        };
        results.push(result);
    }

    let failed = results.iter().any(|r| r["status"] != "ok");
    if committed && !failed {
        *values = scratch;
    }
    json!({"tlog": "opaque", "results": results})
}
