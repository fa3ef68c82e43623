//! Plain-text column tables for downstream plotting.
//!
//! Values use 18-digit scientific notation with a signed two-digit
//! exponent, the layout NumPy's `savetxt` writes by default.

use mdcorr_core::{Error, Result};
use std::io::Write;

/// Default file name for RDF tables.
pub const RDF_FILE_NAME: &str = "rdf.dat";

/// Format one value as `d.dddddddddddddddddde+XX`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.18e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

/// Write equally long columns as space separated rows.
pub fn write_table<W: Write>(mut writer: W, columns: &[&[f64]]) -> Result<()> {
    let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
    if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
        return Err(Error::invalid_parameter(
            "columns",
            format!(
                "column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                n_rows
            ),
        ));
    }

    let mut line = String::new();
    for row in 0..n_rows {
        line.clear();
        for (col, values) in columns.iter().enumerate() {
            if col > 0 {
                line.push(' ');
            }
            line.push_str(&format_value(values[row]));
        }
        line.push('\n');
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_matches_savetxt() {
        assert_eq!(format_value(1.0), "1.000000000000000000e+00");
        assert_eq!(format_value(0.0), "0.000000000000000000e+00");
        assert_eq!(format_value(-0.025), "-2.500000000000000139e-02");
        assert_eq!(format_value(123.0), "1.230000000000000000e+02");
        assert_eq!(format_value(f64::NAN), "nan");
    }

    #[test]
    fn test_write_table() {
        let mut out = Vec::new();
        write_table(&mut out, &[&[0.0, 1.0], &[2.0, 3.0]]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "1.000000000000000000e+00 3.000000000000000000e+00"
        );
    }

    #[test]
    fn test_write_table_rejects_ragged_columns() {
        let mut out = Vec::new();
        assert!(write_table(&mut out, &[&[0.0, 1.0], &[2.0]]).is_err());
        assert!(out.is_empty());
    }
}
