//! Reporter that records every event.

use setup_validator::{CaseReport, Reporter, RunResult, Verdict};

#[derive(Debug, Clone)]
pub enum RecordedEvent {
    GroupStarted(String),
    CaseFinished(CaseReport),
    RunFinished(RunResult),
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<RecordedEvent>,
}

impl RecordingReporter {
    /// Per-case `(name, verdict)` pairs in the order they were reported.
    pub fn lines(&self) -> Vec<(String, Verdict)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::CaseFinished(report) => Some((report.name.clone(), report.verdict)),
                _ => None,
            })
            .collect()
    }

    pub fn groups(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::GroupStarted(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Summaries emitted so far (one per run).
    pub fn summaries(&self) -> Vec<RunResult> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::RunFinished(result) => Some(*result),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn group_started(&mut self, label: &str) {
        self.events.push(RecordedEvent::GroupStarted(label.to_string()));
    }

    fn case_finished(&mut self, report: &CaseReport) {
        self.events.push(RecordedEvent::CaseFinished(report.clone()));
    }

    fn run_finished(&mut self, result: &RunResult) {
        self.events.push(RecordedEvent::RunFinished(*result));
    }
}
