//! Embedded build metadata reader for Go binaries
//!
//! Go 1.18 and later embed a build info blob in every binary:
//! - a 32-byte header starting with `\xff Go buildinf:` at a 16-byte aligned offset
//! - byte 14 holds the pointer size, byte 15 the flags
//! - with the inline flag set, two varint-prefixed strings follow the header:
//!   the toolchain version and the module info
//!
//! The module info is wrapped in 16-byte sentinels and lists the main package
//! (`path`), the main module (`mod`) and an optional replacement (`=>`).

use crate::domain::{InstalledBinary, DEVEL_VERSION};
use crate::error::BuildInfoError;
use std::path::Path;

const BUILD_INFO_MAGIC: &[u8] = b"\xff Go buildinf:";
const HEADER_LEN: usize = 32;
const HEADER_ALIGN: usize = 16;
const FLAG_INLINE_STRINGS: u8 = 0x2;
const SENTINEL_LEN: usize = 16;

/// Source of build metadata for files on disk
pub trait BuildInfoReader: Send + Sync {
    /// Read the build metadata of the binary at `path`
    fn read(&self, path: &Path) -> Result<InstalledBinary, BuildInfoError>;
}

/// Reader for the build info blob of Go binaries
#[derive(Debug, Default, Clone, Copy)]
pub struct GoBuildInfoReader;

impl GoBuildInfoReader {
    /// Create a new reader
    pub fn new() -> Self {
        Self
    }
}

impl BuildInfoReader for GoBuildInfoReader {
    fn read(&self, path: &Path) -> Result<InstalledBinary, BuildInfoError> {
        let data = std::fs::read(path).map_err(|source| BuildInfoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let info = parse_build_info(&data).map_err(|fault| fault.into_error(path))?;

        Ok(
            InstalledBinary::new(path, info.package, info.module, info.version)
                .with_go_version(info.go_version),
        )
    }
}

/// Fields decoded from a build info blob
#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildInfo {
    go_version: String,
    package: String,
    module: String,
    version: String,
}

/// Why a blob could not be decoded, before a path is attached
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fault {
    NoHeader,
    Legacy,
    Malformed(String),
}

impl Fault {
    fn into_error(self, path: &Path) -> BuildInfoError {
        let path = path.to_path_buf();
        match self {
            Fault::NoHeader => BuildInfoError::NotGoBinary { path },
            Fault::Legacy => BuildInfoError::UnsupportedFormat { path },
            Fault::Malformed(message) => BuildInfoError::MissingModuleInfo { path, message },
        }
    }
}

/// Try every aligned header candidate; the first that decodes wins
fn parse_build_info(data: &[u8]) -> Result<BuildInfo, Fault> {
    let mut fault = Fault::NoHeader;
    let mut offset = 0;

    while offset + HEADER_LEN <= data.len() {
        if data[offset..].starts_with(BUILD_INFO_MAGIC) {
            match parse_blob(&data[offset..]) {
                Ok(info) => return Ok(info),
                Err(f) => fault = f,
            }
        }
        offset += HEADER_ALIGN;
    }

    Err(fault)
}

fn parse_blob(blob: &[u8]) -> Result<BuildInfo, Fault> {
    let ptr_size = blob[14];
    let flags = blob[15];

    if ptr_size != 4 && ptr_size != 8 {
        return Err(Fault::Malformed(format!("invalid pointer size {}", ptr_size)));
    }
    if flags & FLAG_INLINE_STRINGS == 0 {
        return Err(Fault::Legacy);
    }

    let rest = &blob[HEADER_LEN..];
    let (go_version, rest) = read_string(rest)
        .ok_or_else(|| Fault::Malformed("truncated toolchain version".to_string()))?;
    let (modinfo, _) =
        read_string(rest).ok_or_else(|| Fault::Malformed("truncated module info".to_string()))?;

    let go_version = String::from_utf8_lossy(go_version).into_owned();
    if go_version.is_empty() {
        return Err(Fault::Malformed("empty toolchain version".to_string()));
    }

    let modinfo =
        strip_sentinels(modinfo).ok_or_else(|| Fault::Malformed("empty module info".to_string()))?;

    parse_modinfo(go_version, &String::from_utf8_lossy(modinfo))
}

/// Unsigned LEB128, at most 10 bytes
fn read_uvarint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

fn read_string(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let (len, n) = read_uvarint(buf)?;
    let len = usize::try_from(len).ok()?;
    let end = n.checked_add(len)?;
    if end > buf.len() {
        return None;
    }
    Some((&buf[n..end], &buf[end..]))
}

fn strip_sentinels(modinfo: &[u8]) -> Option<&[u8]> {
    let len = modinfo.len();
    if len > 2 * SENTINEL_LEN && modinfo[len - SENTINEL_LEN - 1] == b'\n' {
        Some(&modinfo[SENTINEL_LEN..len - SENTINEL_LEN])
    } else {
        None
    }
}

fn parse_modinfo(go_version: String, text: &str) -> Result<BuildInfo, Fault> {
    let mut package = None;
    let mut main: Option<(String, String)> = None;
    let mut after_main = false;

    for line in text.lines() {
        let mut fields = line.split('\t');
        let kind = fields.next();
        match kind {
            Some("path") => package = fields.next().map(str::to_string),
            Some("mod") => {
                if let Some(path) = fields.next().filter(|p| !p.is_empty()) {
                    let version = fields.next().unwrap_or_default().to_string();
                    main = Some((path.to_string(), version));
                }
            }
            // A versioned replacement of the main module wins over the mod line
            Some("=>") if after_main => {
                if let (Some((_, version)), Some(replaced)) =
                    (main.as_mut(), fields.nth(1).filter(|v| !v.is_empty()))
                {
                    *version = replaced.to_string();
                }
            }
            _ => {}
        }
        after_main = kind == Some("mod");
    }

    let package = package.ok_or_else(|| Fault::Malformed("missing main package".to_string()))?;
    let (module, version) =
        main.ok_or_else(|| Fault::Malformed("missing main module".to_string()))?;
    let version = if version.is_empty() {
        DEVEL_VERSION.to_string()
    } else {
        version
    };

    Ok(BuildInfo {
        go_version,
        package,
        module,
        version,
    })
}
