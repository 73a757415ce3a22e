use clap::Parser;

use stiffrs::cmd::Cli;
use stiffrs::session::Session;
use stiffrs::ui::main_frame::StiffApp;
use stiffrs::workbook::load_workbook;

use std::process;

fn main() -> eframe::Result {
    let cli = Cli::parse();
    let run = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        },
    };

    let (session, workbook_loaded) = match &run.workbook {
        Some(path) => match load_workbook(path, &run.loader) {
            Ok(samples) => {
                println!("Stiffness data loaded with {} samples", samples.len());
                let mut session = Session::new(samples);
                session.start();
                (session, true)
            },
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            },
        },
        None => (Session::new(Vec::new()), false),
    };

    let app = StiffApp::new(run, session, workbook_loaded);
    eframe::run_native("stiffrs", Default::default(), Box::new(|_cc| Ok(Box::new(app))))
}
