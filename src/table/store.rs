//! Raw binary persistence.
//!
//! A table is two headerless files named after the non-king slots: the
//! value array in `<id>.table.bin` and the status array in
//! `<id>.status.bin`, each exactly one byte per position. Loading verifies
//! only presence and length; the length is derivable from the piece set.
//!
//! A build additionally writes `<id>.summary.json`, a human-readable
//! manifest with the evaluation statistics. The engine never reads it back.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::pieces::PieceSet;
use crate::table::stats::Evaluation;
use crate::table::TableError;

const IO_CHUNK: usize = 64 * 1024;

pub fn table_path(dir: &Path, set: &PieceSet) -> PathBuf {
    dir.join(format!("{}.table.bin", set.id()))
}

pub fn status_path(dir: &Path, set: &PieceSet) -> PathBuf {
    dir.join(format!("{}.status.bin", set.id()))
}

pub fn summary_path(dir: &Path, set: &PieceSet) -> PathBuf {
    dir.join(format!("{}.summary.json", set.id()))
}

/// True iff both raw files of the set are present under `dir`.
pub fn table_exists(dir: &Path, set: &PieceSet) -> bool {
    table_path(dir, set).exists() && status_path(dir, set).exists()
}

pub(crate) fn save(
    dir: &Path,
    set: &PieceSet,
    values: &[i8],
    status: &[u8],
) -> Result<(), TableError> {
    fs::create_dir_all(dir).map_err(|e| TableError::Io {
        stage: "table_save_create_dir",
        path: dir.display().to_string(),
        error: e.to_string(),
    })?;
    write_values(&table_path(dir, set), values)?;
    write_bytes(&status_path(dir, set), status)?;
    Ok(())
}

pub(crate) fn load_values(
    dir: &Path,
    set: &PieceSet,
    expected_len: u64,
) -> Result<Vec<i8>, TableError> {
    let bytes = read_whole(&table_path(dir, set), expected_len, "table_load_values")?;
    Ok(bytes.into_iter().map(|b| b as i8).collect())
}

pub(crate) fn load_status(
    dir: &Path,
    set: &PieceSet,
    expected_len: u64,
) -> Result<Vec<u8>, TableError> {
    read_whole(&status_path(dir, set), expected_len, "table_load_status")
}

fn write_values(path: &Path, values: &[i8]) -> Result<(), TableError> {
    let file = create(path, "table_save_values")?;
    let mut w = BufWriter::new(file);
    let mut buf = [0u8; IO_CHUNK];
    for chunk in values.chunks(IO_CHUNK) {
        for (dst, &v) in buf.iter_mut().zip(chunk) {
            *dst = v as u8;
        }
        w.write_all(&buf[..chunk.len()]).map_err(|e| TableError::Io {
            stage: "table_save_values",
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
    }
    w.flush().map_err(|e| TableError::Io {
        stage: "table_save_values",
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), TableError> {
    let file = create(path, "table_save_status")?;
    let mut w = BufWriter::new(file);
    w.write_all(bytes).map_err(|e| TableError::Io {
        stage: "table_save_status",
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    w.flush().map_err(|e| TableError::Io {
        stage: "table_save_status",
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn create(path: &Path, stage: &'static str) -> Result<File, TableError> {
    File::create(path).map_err(|e| TableError::Io {
        stage,
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn read_whole(path: &Path, expected_len: u64, stage: &'static str) -> Result<Vec<u8>, TableError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TableError::MissingTable {
                path: path.display().to_string(),
            })
        }
        Err(e) => {
            return Err(TableError::Io {
                stage,
                path: path.display().to_string(),
                error: e.to_string(),
            })
        }
    };

    let actual_len = file
        .metadata()
        .map_err(|e| TableError::Io {
            stage,
            path: path.display().to_string(),
            error: e.to_string(),
        })?
        .len();
    if actual_len != expected_len {
        return Err(TableError::BadTableFile {
            path: path.display().to_string(),
            expected_len,
            actual_len,
        });
    }

    let mut bytes = Vec::with_capacity(expected_len as usize);
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| TableError::Io {
            stage,
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
    Ok(bytes)
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    table: String,
    slots: Vec<String>,
    total_positions: u64,
    evaluation: &'a Evaluation,
}

pub(crate) fn write_summary(
    dir: &Path,
    set: &PieceSet,
    evaluation: &Evaluation,
) -> Result<(), TableError> {
    let summary = Summary {
        table: set.id(),
        slots: set.slots().iter().map(|p| p.code()).collect(),
        total_positions: evaluation.total,
        evaluation,
    };

    let path = summary_path(dir, set);
    let file = create(&path, "table_save_summary")?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, &summary).map_err(|e| TableError::Io {
        stage: "table_save_summary",
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    w.flush().map_err(|e| TableError::Io {
        stage: "table_save_summary",
        path: path.display().to_string(),
        error: e.to_string(),
    })
}
