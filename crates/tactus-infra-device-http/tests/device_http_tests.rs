use pretty_assertions::assert_eq;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use tactus_infra_device_http::{parse_key_map, HttpDevicePort};
use tactus_ports::device::{DeviceError, DeviceKeyMap, DevicePort};

/// Serves exactly one request with a canned response and returns the raw request.
fn one_shot_server(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&request).to_string()
    });
    (format!("http://{addr}"), handle)
}

#[test]
fn push_posts_the_key_map() {
    let (endpoint, server) = one_shot_server("HTTP/1.1 200 OK", "");
    let port = HttpDevicePort::new(endpoint);

    let mut map = DeviceKeyMap::new();
    map.insert("W".to_string(), "C5".to_string());
    port.push_config(&map).unwrap();

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /config "));
    assert!(request.contains(r#"{"W":"C5"}"#));
}

#[test]
fn fetch_returns_none_on_404() {
    let (endpoint, server) = one_shot_server("HTTP/1.1 404 Not Found", "");
    let port = HttpDevicePort::new(endpoint);

    assert_eq!(port.fetch_config().unwrap(), None);
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /ultimaConfig "));
}

#[test]
fn fetch_parses_the_stored_map() {
    let (endpoint, server) = one_shot_server("HTTP/1.1 200 OK", r#"{"Q":"G5","W":"A5"}"#);
    let port = HttpDevicePort::new(endpoint);

    let map = port.fetch_config().unwrap().unwrap();
    assert_eq!(map.get("Q").map(String::as_str), Some("G5"));
    assert_eq!(map.len(), 2);
    server.join().unwrap();
}

#[test]
fn server_errors_are_reported_as_status() {
    let (endpoint, server) = one_shot_server("HTTP/1.1 500 Internal Server Error", "");
    let port = HttpDevicePort::new(endpoint);

    let err = port.push_config(&DeviceKeyMap::new()).unwrap_err();
    assert!(matches!(err, DeviceError::Status(500)));
    server.join().unwrap();
}

#[test]
fn unreachable_device_is_a_transport_error() {
    // Bind then drop to get a local port nothing listens on.
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let port = HttpDevicePort::new(format!("http://{addr}"));

    let err = port.fetch_config().unwrap_err();
    assert!(matches!(err, DeviceError::Unreachable(_)));
}

#[test]
fn endpoint_is_normalized() {
    let port = HttpDevicePort::new("192.168.4.1/");
    assert_eq!(port.config_url(), "http://192.168.4.1/config");
    assert_eq!(port.last_config_url(), "http://192.168.4.1/ultimaConfig");
}

#[test]
fn key_map_parsing_skips_non_strings() {
    let map = parse_key_map(r#"{"Q":"C5","W":3}"#).unwrap().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(parse_key_map("null").unwrap(), None);
    assert_eq!(parse_key_map("  ").unwrap(), None);
    assert!(matches!(parse_key_map("[1]"), Err(DeviceError::Protocol(_))));
}
