use std::collections::BTreeMap;

use crate::error::IoError;

/// A header value written next to the pixel data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderValue {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
}

/// A destination for the planes of a multi-plane container.
pub trait PlaneSink {
    /// Write one header key of the plane at `plane_index`.
    fn write_key(&mut self, plane_index: usize, key: &str, value: HeaderValue)
        -> Result<(), IoError>;

    /// Write the raw big-endian pixel bytes of the plane at `plane_index`.
    fn write_data(&mut self, plane_index: usize, bytes: &[u8]) -> Result<(), IoError>;
}

/// A plane as captured by a [`MemorySink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPlane {
    /// Header keys in write order.
    pub keys: Vec<(String, HeaderValue)>,
    /// Raw big-endian pixel bytes.
    pub data: Vec<u8>,
}

impl StoredPlane {
    /// Look up a header key.
    pub fn key(&self, name: &str) -> Option<HeaderValue> {
        self.keys
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    /// Look up an integer header key.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.key(name)? {
            HeaderValue::Int(v) => Some(v),
            HeaderValue::Float(_) => None,
        }
    }

    /// Look up a numeric header key as a float.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.key(name)? {
            HeaderValue::Int(v) => Some(v as f64),
            HeaderValue::Float(v) => Some(v),
        }
    }
}

/// A sink keeping every stored plane in memory, keyed by plane index.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    planes: BTreeMap<usize, StoredPlane>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The plane stored at `plane_index`, if any.
    pub fn plane(&self, plane_index: usize) -> Option<&StoredPlane> {
        self.planes.get(&plane_index)
    }

    /// Number of planes written so far.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Whether no plane was written.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

impl PlaneSink for MemorySink {
    fn write_key(
        &mut self,
        plane_index: usize,
        key: &str,
        value: HeaderValue,
    ) -> Result<(), IoError> {
        self.planes
            .entry(plane_index)
            .or_default()
            .keys
            .push((key.to_string(), value));
        Ok(())
    }

    fn write_data(&mut self, plane_index: usize, bytes: &[u8]) -> Result<(), IoError> {
        let plane = self.planes.entry(plane_index).or_default();
        plane.data.clear();
        plane.data.extend_from_slice(bytes);
        Ok(())
    }
}
