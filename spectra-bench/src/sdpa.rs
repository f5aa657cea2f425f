//! SDPA sparse format writer (.dat-s).
//!
//! Renders an LMI plus a linear objective as the dual-form problem
//!
//! ```text
//! min  c'x
//! s.t. F0 + x1*F1 + ... + xn*Fn ⪰ 0
//! ```
//!
//! with F0 = A0 and Fi = -Ai, so the constraint set is exactly
//! {x : A0 - Σ xi·Ai ⪰ 0}. One block, upper-triangle entries only,
//! 1-indexed, one `matNo blockNo i j value` line per nonzero. Write-only:
//! the file is meant for hand-off to an external SDP solver and is never
//! read back here.

use std::io::{self, Write};

use spectra_core::Lmi;

/// Write `lmi` with objective `c` in SDPA sparse format.
pub fn write_sdpa<W: Write>(out: &mut W, lmi: &Lmi, objective: &[f64]) -> io::Result<()> {
    assert_eq!(
        objective.len(),
        lmi.ambient_dim(),
        "objective length must match the ambient dimension"
    );
    let n = lmi.ambient_dim();
    let m = lmi.matrix_dim();

    writeln!(out, "\"generated by spectra-bench\"")?;
    writeln!(out, "{}", n)?;
    writeln!(out, "1")?;
    writeln!(out, "{}", m)?;
    let c_line: Vec<String> = objective.iter().map(|v| format!("{}", v)).collect();
    writeln!(out, "{}", c_line.join(" "))?;

    // F0 = A0
    write_matrix(out, 0, lmi.a0(), 1.0)?;
    // Fi = -Ai
    for k in 0..n {
        write_matrix(out, k + 1, lmi.coefficient(k), -1.0)?;
    }
    Ok(())
}

fn write_matrix<W: Write>(
    out: &mut W,
    mat_no: usize,
    mat: &nalgebra::DMatrix<f64>,
    sign: f64,
) -> io::Result<()> {
    let m = mat.nrows();
    for i in 0..m {
        for j in i..m {
            let v = sign * mat[(i, j)];
            if v != 0.0 {
                writeln!(out, "{} 1 {} {} {}", mat_no, i + 1, j + 1, v)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn small_lmi() -> Lmi {
        Lmi::new(
            DMatrix::identity(2, 2),
            vec![
                DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 0.0])),
                DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_header_lines() {
        let mut buf = Vec::new();
        write_sdpa(&mut buf, &small_lmi(), &[1.0, -2.0]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('"'));
        assert_eq!(lines[1], "2"); // mDim
        assert_eq!(lines[2], "1"); // nBlock
        assert_eq!(lines[3], "2"); // blockStruct
        assert_eq!(lines[4], "1 -2");
    }

    #[test]
    fn test_entry_count_and_indexing() {
        let mut buf = Vec::new();
        write_sdpa(&mut buf, &small_lmi(), &[0.0, 0.0]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let entries: Vec<&str> = text.lines().skip(5).collect();
        // F0 = I: two diagonal entries; F1 = -diag(1,0): one entry;
        // F2 = -offdiag: one upper-triangle entry
        assert_eq!(entries.len(), 4);
        assert!(entries.contains(&"0 1 1 1 1"));
        assert!(entries.contains(&"0 1 2 2 1"));
        assert!(entries.contains(&"1 1 1 1 -1"));
        assert!(entries.contains(&"2 1 1 2 -1"));
    }
}
