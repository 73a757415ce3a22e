use crate::fit::StiffnessFit;
use crate::results::{fitted_summary, FitRecord, ResultsTable};
use crate::sample::Sample;
use crate::selection::Selection;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Displaying,
    Selecting,
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Displaying => write!(f, "Displaying"),
            SessionState::Selecting => write!(f, "Selecting"),
            SessionState::Done => write!(f, "Done"),
        }
    }
}

/// All mutable session state: the loaded samples, the queue cursor, the
/// current selection's fit and the accumulated results. The queue is an
/// index walked from the back of the list (reverse sheet order), samples are
/// never removed.
pub struct Session {
    samples: Vec<Sample>,
    cursor: Option<usize>,
    state: SessionState,
    current_fit: Option<StiffnessFit>,
    results: ResultsTable,
    message: Option<String>,
}

impl Session {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            cursor: None,
            state: SessionState::Idle,
            current_fit: None,
            results: ResultsTable::new(),
            message: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn total_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn fitted_count(&self) -> usize {
        self.results.len()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn current_fit(&self) -> Option<&StiffnessFit> {
        self.current_fit.as_ref()
    }

    pub fn current_sample(&self) -> Option<&Sample> {
        self.cursor.and_then(|i| self.samples.get(i))
    }

    /// Takes and clears the pending operator message, if any.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    /// Idle → Displaying(last sample), or straight to Done for an empty
    /// queue.
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        if self.samples.is_empty() {
            println!("No samples to process, session complete");
            self.state = SessionState::Done;
        } else {
            self.cursor = Some(self.samples.len() - 1);
            self.state = SessionState::Displaying;
        }
    }

    /// A finished drag over the displayed curve. A fittable range replaces
    /// the current fit and moves to Selecting; a too-small range leaves the
    /// prior fit (if any) untouched.
    pub fn select(&mut self, selection: Selection) {
        if self.state != SessionState::Displaying && self.state != SessionState::Selecting {
            return;
        }
        let Some(sample) = self.current_sample() else {
            return;
        };

        if !selection.is_fittable() {
            return;
        }

        match StiffnessFit::from_selection(sample, selection) {
            Ok(fit) => {
                self.current_fit = Some(fit);
                self.state = SessionState::Selecting;
            },
            Err(e) => {
                self.message = Some(format!("Fit failed: {}", e));
            },
        }
    }

    /// Confirms the current sample's fit, appends its results row and
    /// advances the queue. Without a valid fit this is a no-op with a
    /// message and the displayed sample does not change.
    pub fn confirm(&mut self) -> bool {
        if self.state == SessionState::Done || self.state == SessionState::Idle {
            return false;
        }

        let record = match (self.current_fit.as_ref(), self.current_sample()) {
            (Some(fit), Some(sample)) => {
                println!("Confirmed {}: {}", sample.id, fit);
                FitRecord::from_fit(&sample.id, fit)
            },
            _ => {
                self.message =
                    Some("No region selected yet, drag over the curve first".to_owned());
                return false;
            },
        };

        self.results.push(record);
        self.current_fit = None;
        self.advance();
        true
    }

    /// Escape: drops the current selection and fit, back to Displaying.
    pub fn clear_selection(&mut self) {
        if self.state != SessionState::Selecting && self.state != SessionState::Displaying {
            return;
        }
        self.current_fit = None;
        self.state = SessionState::Displaying;
    }

    /// Early close. Already-confirmed rows are retained.
    pub fn close(&mut self) {
        self.state = SessionState::Done;
        self.current_fit = None;
    }

    pub fn summary(&self) -> String {
        fitted_summary(self.fitted_count(), self.total_samples())
    }

    fn advance(&mut self) {
        match self.cursor {
            Some(0) | None => {
                self.cursor = None;
                self.state = SessionState::Done;
                println!("{}", self.summary());
            },
            Some(i) => {
                self.cursor = Some(i - 1);
                self.state = SessionState::Displaying;
            },
        }
    }
}
