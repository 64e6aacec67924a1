//! Upload-and-result lifecycle: owns the file selection, gates submission on
//! the current phase, runs the backend call on a worker thread and keeps the
//! latest result or error for the rendering layer.

use crate::client::AnalysisBackend;
use crate::error::{AnalysisError, RemoteError, ValidationError};
use crate::result::AnalysisResult;
use crate::selection::{MissionSlot, SelectedFile, SelectedFileSet};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const WAIT_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl AnalysisPhase {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::Validating => "validating",
            AnalysisPhase::Submitting => "submitting",
            AnalysisPhase::Succeeded => "succeeded",
            AnalysisPhase::Failed => "failed",
        }
    }

    /// Phases from which a new submission may start.
    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            AnalysisPhase::Idle | AnalysisPhase::Succeeded | AnalysisPhase::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request is in flight on a worker.
    Dispatched,
    /// The selection was invalid; no request was made.
    Rejected(ValidationError),
    /// A request was already in flight.
    Ignored,
}

struct Completion {
    run_id: u64,
    outcome: Result<AnalysisResult, AnalysisError>,
}

type PhaseListener = Box<dyn FnMut(AnalysisPhase)>;

pub struct AnalysisController {
    backend: Arc<dyn AnalysisBackend>,
    selection: SelectedFileSet,
    phase: AnalysisPhase,
    result: Option<AnalysisResult>,
    error: Option<AnalysisError>,
    run_id: u64,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
    listeners: Vec<PhaseListener>,
}

impl AnalysisController {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        let (completion_tx, completion_rx) = bounded(8);
        Self {
            backend,
            selection: SelectedFileSet::new(),
            phase: AnalysisPhase::Idle,
            result: None,
            error: None,
            run_id: 0,
            completion_tx,
            completion_rx,
            worker: None,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called with every phase the controller enters.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(AnalysisPhase) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Identifier of the most recent run; changes whenever a new result may
    /// replace the displayed one.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_busy(&self) -> bool {
        self.phase == AnalysisPhase::Submitting
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|err| err.to_string())
    }

    pub fn selection(&self) -> &SelectedFileSet {
        &self.selection
    }

    /// True when the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase.is_resting() && !self.selection.is_empty()
    }

    pub fn select_file(&mut self, slot: MissionSlot, file: SelectedFile) -> Result<(), ValidationError> {
        self.ensure_unlocked()?;
        self.selection.select_file(slot, file)
    }

    pub fn select_path(&mut self, slot: MissionSlot, path: &Path) -> Result<(), ValidationError> {
        self.ensure_unlocked()?;
        self.selection.select_path(slot, path)
    }

    pub fn clear_slot(&mut self, slot: MissionSlot) -> Result<(), ValidationError> {
        self.ensure_unlocked()?;
        self.selection.clear_slot(slot);
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), ValidationError> {
        self.ensure_unlocked()?;
        self.selection.clear_selection();
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<(), ValidationError> {
        if self.is_busy() {
            Err(ValidationError::SelectionLocked)
        } else {
            Ok(())
        }
    }

    /// Start an analysis run. From `Submitting` this is a no-op; from any
    /// resting phase the selection is re-validated and, if valid, uploaded on
    /// a worker thread.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.phase.is_resting() {
            log::debug!("submit ignored while {}", self.phase.label());
            return SubmitOutcome::Ignored;
        }

        let resting = self.phase;
        self.set_phase(AnalysisPhase::Validating);
        if let Err(err) = self.selection.ensure_ready() {
            log::info!("submission rejected: {err}");
            self.error = Some(err.clone().into());
            self.set_phase(resting);
            return SubmitOutcome::Rejected(err);
        }

        self.error = None;
        self.result = None;
        self.run_id += 1;
        let run_id = self.run_id;
        let backend = Arc::clone(&self.backend);
        let files = self.selection.clone();
        let tx = self.completion_tx.clone();
        self.reap_worker();
        self.worker = Some(std::thread::spawn(move || {
            let outcome = backend.analyze(&files);
            let _ = tx.send(Completion { run_id, outcome });
        }));
        log::info!("analysis run {run_id} dispatched ({} file(s))", self.selection.len());
        self.set_phase(AnalysisPhase::Submitting);
        SubmitOutcome::Dispatched
    }

    /// Apply any finished run without blocking. Returns true if state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed | self.check_worker_lost()
    }

    /// Block until the in-flight run resolves, then return the settled phase.
    pub fn wait(&mut self) -> AnalysisPhase {
        while self.is_busy() {
            match self.completion_rx.recv_timeout(WAIT_SLICE) {
                Ok(completion) => {
                    self.apply(completion);
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.check_worker_lost();
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.phase
    }

    /// A worker that exits without reporting (it panicked) fails the run
    /// instead of leaving the controller stuck in `Submitting`.
    fn check_worker_lost(&mut self) -> bool {
        let finished = self
            .worker
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if !self.is_busy() || !finished || !self.completion_rx.is_empty() {
            return false;
        }
        self.reap_worker();
        let err: AnalysisError =
            RemoteError::Transport("analysis worker stopped before reporting a result".into()).into();
        log::error!("analysis run {} lost: {err}", self.run_id);
        self.result = None;
        self.error = Some(err);
        self.set_phase(AnalysisPhase::Failed);
        true
    }

    /// Stop waiting for the in-flight run. Its response, when it eventually
    /// arrives, is discarded. The previous result and error are not restored.
    pub fn abandon(&mut self) {
        if !self.is_busy() {
            return;
        }
        log::info!("abandoning analysis run {}", self.run_id);
        self.run_id += 1;
        self.worker = None;
        self.set_phase(AnalysisPhase::Idle);
    }

    fn apply(&mut self, completion: Completion) -> bool {
        if completion.run_id != self.run_id || !self.is_busy() {
            log::debug!("discarding stale completion for run {}", completion.run_id);
            return false;
        }
        self.reap_worker();
        match completion.outcome {
            Ok(result) => {
                log::info!("analysis run {} succeeded", completion.run_id);
                self.result = Some(result);
                self.error = None;
                self.set_phase(AnalysisPhase::Succeeded);
            }
            Err(err) => {
                log::warn!("analysis run {} failed: {err}", completion.run_id);
                self.result = None;
                self.error = Some(err);
                self.set_phase(AnalysisPhase::Failed);
            }
        }
        true
    }

    fn reap_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    fn set_phase(&mut self, phase: AnalysisPhase) {
        self.phase = phase;
        for listener in self.listeners.iter_mut() {
            listener(phase);
        }
    }
}
