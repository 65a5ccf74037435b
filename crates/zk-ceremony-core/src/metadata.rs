//! Extraction of circuit statistics from `snarkjs r1cs info` reports.
//!
//! The report is unstructured text; each statistic sits on its own line as
//! `<label>: <value>`, usually behind a `[INFO]  snarkJS:` log prefix.
//! Parsing locates the label anywhere in the line and takes the remainder.

use crate::ceremony::CircuitMetadata;
use crate::error::{CeremonyError, Result};
use crate::powers::estimate_pot;

const LABEL_CURVE: &str = "Curve: ";
const LABEL_WIRES: &str = "# of Wires: ";
const LABEL_CONSTRAINTS: &str = "# of Constraints: ";
const LABEL_PRIVATE_INPUTS: &str = "# of Private Inputs: ";
const LABEL_PUBLIC_INPUTS: &str = "# of Public Inputs: ";
const LABEL_LABELS: &str = "# of Labels: ";
const LABEL_OUTPUTS: &str = "# of Outputs: ";

/// Parse a full r1cs statistics report into structured metadata.
///
/// Fails with [`CeremonyError::MetadataParse`] if any required label is
/// absent or carries a non-numeric value; a run with unparseable metadata
/// must abort before any staging begins.
pub fn parse_report(report: &str) -> Result<CircuitMetadata> {
    let curve = extract(report, LABEL_CURVE)?.to_string();
    let wires = extract_u64(report, LABEL_WIRES)?;
    let constraints = extract_u64(report, LABEL_CONSTRAINTS)?;
    let private_inputs = extract_u64(report, LABEL_PRIVATE_INPUTS)?;
    let public_inputs = extract_u64(report, LABEL_PUBLIC_INPUTS)?;
    let labels = extract_u64(report, LABEL_LABELS)?;
    let outputs = extract_u64(report, LABEL_OUTPUTS)?;

    Ok(CircuitMetadata {
        curve,
        wires,
        constraints,
        private_inputs,
        public_inputs,
        labels,
        outputs,
        pot: estimate_pot(constraints),
    })
}

/// Find `label` in the report and return the rest of its line, trimmed.
fn extract<'a>(report: &'a str, label: &str) -> Result<&'a str> {
    for line in report.lines() {
        if let Some(idx) = line.find(label) {
            return Ok(line[idx + label.len()..].trim());
        }
    }
    Err(CeremonyError::MetadataParse {
        label: label.trim_end_matches(": ").to_string(),
        reason: "label not found in report".into(),
    })
}

fn extract_u64(report: &str, label: &str) -> Result<u64> {
    let value = extract(report, label)?;
    value.parse().map_err(|_| CeremonyError::MetadataParse {
        label: label.trim_end_matches(": ").to_string(),
        reason: format!("expected a non-negative integer, got '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[INFO]  snarkJS: Curve: bn-128
[INFO]  snarkJS: # of Wires: 1003
[INFO]  snarkJS: # of Constraints: 500
[INFO]  snarkJS: # of Private Inputs: 2
[INFO]  snarkJS: # of Public Inputs: 1
[INFO]  snarkJS: # of Labels: 1006
[INFO]  snarkJS: # of Outputs: 1
";

    #[test]
    fn test_parse_full_report() {
        let meta = parse_report(SAMPLE).unwrap();
        assert_eq!(meta.curve, "bn-128");
        assert_eq!(meta.wires, 1003);
        assert_eq!(meta.constraints, 500);
        assert_eq!(meta.private_inputs, 2);
        assert_eq!(meta.public_inputs, 1);
        assert_eq!(meta.labels, 1006);
        assert_eq!(meta.outputs, 1);
        assert_eq!(meta.pot, 9);
    }

    #[test]
    fn test_parse_without_log_prefix() {
        let plain = SAMPLE.replace("[INFO]  snarkJS: ", "");
        let meta = parse_report(&plain).unwrap();
        assert_eq!(meta.constraints, 500);
    }

    #[test]
    fn test_missing_constraints_label_fails() {
        let broken: String = SAMPLE
            .lines()
            .filter(|l| !l.contains("# of Constraints"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = parse_report(&broken).unwrap_err();
        match err {
            CeremonyError::MetadataParse { label, .. } => {
                assert_eq!(label, "# of Constraints");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_value_fails() {
        let broken = SAMPLE.replace("# of Wires: 1003", "# of Wires: many");
        let err = parse_report(&broken).unwrap_err();
        assert!(matches!(err, CeremonyError::MetadataParse { .. }));
    }
}
