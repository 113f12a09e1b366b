//! Wireframe import from line-oriented mesh text (`v` / `f` records).

use glam::DVec4;
use shared::{Edge, Object3D};

use crate::validation::ObjectValidator;

/// Extraction failure. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: vertex needs 3 coordinates, found {found}")]
    MissingCoordinate { line: usize, found: usize },
    #[error("line {line}: vertex indices start at 1, got {index}")]
    IndexBelowOne { line: usize, index: i64 },
    #[error("line {line}: vertex {index} referenced, but only {count} defined")]
    IndexOutOfRange { line: usize, index: i64, count: usize },
}

impl ImportError {
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidNumber { line, .. }
            | Self::MissingCoordinate { line, .. }
            | Self::IndexBelowOne { line, .. }
            | Self::IndexOutOfRange { line, .. } => *line,
        }
    }
}

/// Parse mesh text into an object.
///
/// Each face of k references becomes k edges, wrapping last to first.
/// Faces may reference vertices defined further down; indices are checked
/// against the final vertex count.
pub fn parse_object(text: &str) -> Result<Object3D, ImportError> {
    let mut vertices = Vec::new();
    // (line, 1-based references)
    let mut faces: Vec<(usize, Vec<i64>)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => vertices.push(parse_vertex(line, tokens)?),
            Some("f") => faces.push((line, parse_face(line, tokens)?)),
            // vn, vt, comments, groups...
            _ => {}
        }
    }

    let count = vertices.len();
    let mut edges: Vec<Edge> = Vec::new();
    for (line, refs) in faces {
        let resolved = refs
            .iter()
            .map(|&index| resolve_index(line, index, count))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, &start) in resolved.iter().enumerate() {
            edges.push([start, resolved[(i + 1) % resolved.len()]]);
        }
    }

    let object = Object3D { vertices, edges };
    // Accepted, but likely not what the author meant
    for warning in ObjectValidator::new(&object).warnings() {
        tracing::warn!("Imported object: {warning}");
    }
    tracing::debug!(
        "Parsed object: {} vertices, {} edges",
        object.vertex_count(),
        object.edge_count()
    );
    Ok(object)
}

fn parse_vertex<'a>(
    line: usize,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<DVec4, ImportError> {
    let mut coords = [0.0; 3];
    let mut found = 0;
    for token in tokens.take(3) {
        coords[found] = parse_coordinate(line, token)?;
        found += 1;
    }
    if found < 3 {
        return Err(ImportError::MissingCoordinate { line, found });
    }
    Ok(DVec4::new(coords[0], coords[1], coords[2], 1.0))
}

fn parse_coordinate(line: usize, token: &str) -> Result<f64, ImportError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::InvalidNumber {
            line,
            token: token.to_string(),
        })
}

fn parse_face<'a>(
    line: usize,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<Vec<i64>, ImportError> {
    tokens
        .map(|token| {
            // i/t/n: only the position index matters
            let first = token.split('/').next().unwrap_or(token);
            first.parse::<i64>().map_err(|_| ImportError::InvalidNumber {
                line,
                token: token.to_string(),
            })
        })
        .collect()
}

fn resolve_index(line: usize, index: i64, count: usize) -> Result<usize, ImportError> {
    if index < 1 {
        return Err(ImportError::IndexBelowOne { line, index });
    }
    let zero_based = (index - 1) as usize;
    if zero_based >= count {
        return Err(ImportError::IndexOutOfRange { line, index, count });
    }
    Ok(zero_based)
}
