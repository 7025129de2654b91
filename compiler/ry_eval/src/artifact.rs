//! The compiled-program file format.
//!
//! ```text
//! "RYBC" | format version (u16, little endian) | bincode(Program)
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ry_diagnostic::{Diagnostic, ErrorCode};

use crate::Program;

pub const MAGIC: [u8; 4] = *b"RYBC";

/// Bumped whenever the serialized tree changes shape.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("cannot access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a Ryton artifact (bad magic header)")]
    BadMagic,

    #[error("artifact format version {found} is not supported (expected {expected}); recompile it")]
    StaleVersion { found: u16, expected: u16 },

    #[error("artifact payload is corrupt: {0}")]
    Decode(String),

    #[error("cannot encode program: {0}")]
    Encode(String),
}

impl ArtifactError {
    #[cold]
    fn io(path: &Path, source: io::Error) -> Self {
        ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            ArtifactError::Io { .. } => ErrorCode::E5001,
            ArtifactError::BadMagic => ErrorCode::E5002,
            ArtifactError::StaleVersion { .. } => ErrorCode::E5003,
            ArtifactError::Decode(_) | ArtifactError::Encode(_) => ErrorCode::E5004,
        };
        Diagnostic::error(code).with_message(self.to_string())
    }
}

pub fn encode(program: &Program) -> Result<Vec<u8>, ArtifactError> {
    let payload =
        bincode::serialize(program).map_err(|e| ArtifactError::Encode(e.to_string()))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<Program, ArtifactError> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(ArtifactError::BadMagic);
    }
    let found = u16::from_le_bytes([bytes[4], bytes[5]]);
    if found != FORMAT_VERSION {
        return Err(ArtifactError::StaleVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| ArtifactError::Decode(e.to_string()))
}

pub fn write_to(mut writer: impl Write, path: &Path, program: &Program) -> Result<(), ArtifactError> {
    let bytes = encode(program)?;
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| ArtifactError::io(path, e))
}

pub fn write_artifact(path: &Path, program: &Program) -> Result<(), ArtifactError> {
    let file = std::fs::File::create(path).map_err(|e| ArtifactError::io(path, e))?;
    write_to(io::BufWriter::new(file), path, program)
}

pub fn read_artifact(path: &Path) -> Result<Program, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| ArtifactError::io(path, e))?;
    decode(&bytes)
}
