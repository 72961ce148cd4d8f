use crate::errors::{LitError, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Render the `<type> <len>\0` prefix that precedes every stored payload.
    pub fn header(&self, payload_len: usize) -> String {
        format!("{} {}\0", self.as_str(), payload_len)
    }

    /// Consume a `<type> <len>\0` header, returning the type and declared length.
    pub fn parse_header(data_reader: &mut impl BufRead) -> std::result::Result<(Self, usize), String> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| e.to_string())?;
        if object_type.pop() != Some(b' ') {
            return Err("truncated object header".to_string());
        }

        let object_type = std::str::from_utf8(&object_type).map_err(|e| e.to_string())?;
        let object_type = ObjectType::try_from(object_type).map_err(|e| e.to_string())?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| e.to_string())?;
        if size.pop() != Some(b'\0') {
            return Err("unterminated object header".to_string());
        }

        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| "invalid object length".to_string())?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = LitError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(LitError::corrupt_object(
                "<header>",
                format!("unknown object type {other:?}"),
            )),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
