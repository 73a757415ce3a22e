use crate::cmd::RunConfig;
use crate::plot_export::draw_sample_plot;
use crate::results::export_filename;
use crate::session::Session;
use crate::stats::LinReg;
use crate::utils::prompt_yes_no;

use chrono::Local;

use std::io::{BufRead, Write};

/// Session-end export: report the fitted count, ask on the console, then
/// write the CSV (and the per-sample plots when enabled) or discard.
pub fn run_export_flow<R: BufRead, W: Write>(
    session: &Session,
    run: &RunConfig,
    input: R,
    mut output: W,
) {
    let _ = writeln!(output, "{}", session.summary());

    if session.results().is_empty() {
        let _ = writeln!(output, "Nothing to export");
        return;
    }

    if !prompt_yes_no("Export results to csv?", input, &mut output) {
        let _ = writeln!(output, "Results discarded");
        return;
    }

    if let Err(e) = std::fs::create_dir_all(&run.out_dir) {
        eprintln!("Failed to create '{}': {}", run.out_dir.display(), e);
        return;
    }

    let path = run.out_dir.join(export_filename(Local::now()));
    if let Err(e) = session.results().write_csv(&path) {
        eprintln!("Failed to write '{}': {}", path.display(), e);
        return;
    }

    if run.save_plots {
        for record in session.results().rows() {
            let Some(sample) = session.samples().iter().find(|s| s.id == record.sample_id)
            else {
                continue;
            };
            let model = LinReg::from_val(record.intercept, record.slope);
            match draw_sample_plot(sample, &model, record.selection, &run.out_dir) {
                Ok(path) => println!("Plot written to {}", path.display()),
                Err(e) => eprintln!("Failed to plot '{}': {}", record.sample_id, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run_export_flow;
    use crate::cmd::RunConfig;
    use crate::config::LoaderConfig;
    use crate::sample::Sample;
    use crate::selection::Selection;
    use crate::session::Session;

    use std::fs;
    use std::path::Path;

    fn session_with_confirmed(total: usize, confirmed: usize) -> Session {
        let samples: Vec<Sample> = (0..total)
            .map(|i| {
                let mut s = Sample::new(&format!("A{}", i + 1));
                for j in 0..10 {
                    let d = j as f64 * 0.01;
                    s.push_row(j as f64 * 0.5, 250.0 * d + 0.5, d);
                }
                s
            })
            .collect();

        let mut session = Session::new(samples);
        session.start();
        for _ in 0..confirmed {
            session.select(Selection { start_idx: 0, end_idx: 10 });
            assert!(session.confirm());
        }
        session.close();
        session
    }

    fn run(dir: &Path) -> RunConfig {
        RunConfig {
            workbook: None,
            loader: LoaderConfig::default(),
            out_dir: dir.to_path_buf(),
            save_plots: false,
        }
    }

    fn csv_files(dir: &Path) -> Vec<std::path::PathBuf> {
        match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn test_declining_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_confirmed(3, 2);

        let mut out = Vec::new();
        run_export_flow(&session, &run(dir.path()), "no\n".as_bytes(), &mut out);

        assert!(csv_files(dir.path()).is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2 out of 3 curves fitted"));
        assert!(text.contains("Results discarded"));
    }

    #[test]
    fn test_accepting_writes_one_row_per_confirmed_sample() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_confirmed(3, 2);

        let mut out = Vec::new();
        run_export_flow(&session, &run(dir.path()), "yes\n".as_bytes(), &mut out);

        let files = csv_files(dir.path());
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content.lines().count(), 3); // header + 2 rows
    }

    #[test]
    fn test_nothing_confirmed_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_confirmed(3, 0);

        let mut out = Vec::new();
        run_export_flow(&session, &run(dir.path()), "yes\n".as_bytes(), &mut out);

        assert!(csv_files(dir.path()).is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0 out of 3 curves fitted"));
        assert!(text.contains("Nothing to export"));
        assert!(!text.contains("[y/n]"));
    }
}
