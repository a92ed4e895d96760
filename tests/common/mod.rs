//! Shared helpers for integration tests
//!
//! - synthetic Go binaries carrying a Go 1.18+ build info blob
//! - wiremock endpoints speaking the module proxy protocol

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUILD_INFO_MAGIC: &[u8] = b"\xff Go buildinf:";

fn put_string(out: &mut Vec<u8>, s: &[u8]) {
    let mut len = s.len() as u64;
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(s);
}

/// Bytes of a fake executable whose build info names `package` in `module` at `version`
pub fn go_binary(package: &str, module: &str, version: &str) -> Vec<u8> {
    let modinfo = format!(
        "path\t{}\nmod\t{}\t{}\th1:fake=\nbuild\t-compiler=gc\n",
        package, module, version
    );

    // Something that looks like an ELF prologue, then the aligned header
    let mut data = b"\x7fELF".to_vec();
    data.resize(4096, 0);
    data.extend_from_slice(BUILD_INFO_MAGIC);
    data.push(8);
    data.push(0x2);
    data.resize(4096 + 32, 0);
    put_string(&mut data, b"go1.22.5");

    let mut wrapped = b"0w\xaf\x0c\x92t\x08\x02A\xe1\xc1\x07\xe6\xd6\x18\xe6".to_vec();
    wrapped.extend_from_slice(modinfo.as_bytes());
    wrapped.extend_from_slice(b"\xf92C1\x86\x18 r\x00\x82B\x10A\x16\xd8\xf2");
    put_string(&mut data, &wrapped);

    data.resize(data.len() + 1024, 0);
    data
}

/// Write a fake Go binary into `dir`
pub fn write_go_binary(dir: &Path, name: &str, module: &str, version: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, go_binary(module, module, version)).expect("write fake binary");
    path
}

/// Write a file without build info into `dir`
pub fn write_script(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\necho hello\n").expect("write script");
    path
}

/// Serve `{"Version": version}` for `/{module}/@latest`
pub async fn mock_latest(server: &MockServer, module: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/@latest", module)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Version": version,
            "Time": "2024-05-06T18:54:15Z",
        })))
        .mount(server)
        .await;
}

/// Serve a version list for `/{module}/@v/list`
pub async fn mock_list(server: &MockServer, module: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/@v/list", module)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Answer `suffix` for `module` with a bare status code
pub async fn mock_status(server: &MockServer, module: &str, suffix: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", module, suffix)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Number of requests the server saw whose path ends with `suffix`
pub async fn request_count(server: &MockServer, suffix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().ends_with(suffix))
        .count()
}
