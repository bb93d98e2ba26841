use crate::error::Result;
use crate::models::{JOIN_KEY_PROPERTY, KeyedValue, MapPoint, REGION_CODE_PROPERTY};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read a `key,value` table (header required). Empty values become `None`.
pub fn load_values_csv<P: AsRef<Path>>(path: P) -> Result<Vec<KeyedValue>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut out = Vec::new();
    for row in rdr.deserialize() {
        let row: KeyedValue = row?;
        out.push(row);
    }
    Ok(out)
}

/// One exported row per rendered area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    pub key: String,
    pub name: String,
    pub value: Option<f64>,
}

impl From<&MapPoint> for AreaRow {
    fn from(p: &MapPoint) -> Self {
        let key = p
            .property(JOIN_KEY_PROPERTY)
            .or_else(|| p.property(REGION_CODE_PROPERTY))
            .unwrap_or_default();
        Self {
            key,
            name: p.name.clone(),
            value: p.value,
        }
    }
}

/// Save areas as CSV with header.
pub fn save_csv<P: AsRef<Path>>(points: &[MapPoint], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("key", "name", "value"))?;
    for p in points {
        let row = AreaRow::from(p);
        wtr.serialize((&row.key, &row.name, row.value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save areas as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(points: &[MapPoint], path: P) -> Result<()> {
    let rows: Vec<AreaRow> = points.iter().map(AreaRow::from).collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn read_values_with_blanks() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("values.csv");
        std::fs::write(&p, "key,value\nde-by, 13.1\nde-be,\n").unwrap();
        let rows = load_values_csv(&p).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "de-by");
        assert_eq!(rows[0].value, Some(13.1));
        assert_eq!(rows[1].value, None);
    }

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let pts = vec![MapPoint {
            name: "Bavaria".into(),
            properties: json!({"hc-key": "de-by"}).as_object().cloned().unwrap(),
            geometry: None,
            value: Some(1.23),
        }];
        save_csv(&pts, &csvp).unwrap();
        save_json(&pts, &jsonp).unwrap();
        let csv_text = std::fs::read_to_string(&csvp).unwrap();
        assert!(csv_text.starts_with("key,name,value"));
        assert!(csv_text.contains("de-by,Bavaria,1.23"));
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(v[0]["key"], "de-by");
    }
}
