use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize a value as pretty-printed JSON.
pub fn write_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing solution to JSON")
}

/// Write a value to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = write_json_string(value)?;
    fs::write(path, json).with_context(|| format!("writing JSON to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::DispatchTable;
    use tempfile::tempdir;

    #[test]
    fn test_write_table() {
        let table = DispatchTable::from_profiles(vec!["A".into()], &[10.0], &[0.0], &[vec![10.0]]);
        let dir = tempdir().unwrap();
        let path = dir.path().join("dispatch.json");
        write_json(&table, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["generator_names"][0], "A");
        assert_eq!(value["rows"][0]["output"][0], 10.0);
    }
}
