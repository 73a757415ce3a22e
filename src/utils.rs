use std::io::{BufRead, Write};

/// Console yes/no prompt. Loops until the answer, trimmed and lowercased,
/// is exactly one of y/yes/n/no; EOF counts as no.
pub fn prompt_yes_no<R: BufRead, W: Write>(prompt: &str, input: R, mut output: W) -> bool {
    let mut lines = input.lines();
    loop {
        let _ = write!(output, "{} [y/n]: ", prompt);
        let _ = output.flush();

        let Some(Ok(line)) = lines.next() else {
            return false;
        };

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            other => {
                let _ = writeln!(output, "Unrecognized answer '{}', expected y or n", other);
            },
        }
    }
}

/// Pads a value range by `frac` on both sides, for plot bounds.
pub fn padded_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = max - min;
    let pad = if span > 0.0 { span * frac } else { 1.0 };
    (min - pad, max + pad)
}
