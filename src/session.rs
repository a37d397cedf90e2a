//! The compression-session state machine.
//!
//! A [`CompressionSession`] owns the uploaded source, at most one stored
//! result per encoder and the active comparison. The bookkeeping lives behind
//! a mutex that is only ever held between suspension points, so completions
//! are applied one at a time while the encoders themselves run in parallel.

use crate::comparison::{ActiveComparison, ComparisonImages, ComparisonMode, ComparisonTarget};
use crate::encoder::{CompressorEncoder, EncodeRequest, Encoder, EncoderId, SizeTargetEncoder};
use crate::error::{CompressionError, EncodeFailure, Result};
use crate::result::{CompressionStats, EncodeResult};
use crate::settings::CompressionSettings;
use crate::source::SourceImage;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Both results of a successful [`CompressionSession::compare_both`].
#[derive(Debug, Clone)]
pub struct ResultPair {
    pub a: Arc<EncodeResult>,
    pub b: Arc<EncodeResult>,
}

#[derive(Debug, Default)]
struct SessionState {
    source: Option<Arc<SourceImage>>,
    /// Bumped on every `set_source`; an encode started under an older epoch is stale
    epoch: u64,
    results: [Option<Arc<EncodeResult>>; 2],
    /// Ticket of the encode currently holding each encoder's gate
    in_flight: [Option<u64>; 2],
    next_ticket: u64,
    comparison: ActiveComparison,
    latest: Option<EncoderId>,
}

impl SessionState {
    fn result(&self, id: EncoderId) -> Option<Arc<EncodeResult>> {
        self.results[id.index()].clone()
    }

    fn latest_result(&self) -> Option<Arc<EncodeResult>> {
        self.latest.and_then(|id| self.result(id))
    }

    fn release(&mut self, id: EncoderId, ticket: u64) {
        let slot = &mut self.in_flight[id.index()];
        if *slot == Some(ticket) {
            *slot = None;
        }
    }

    fn images_for(&self, target: ComparisonTarget) -> Option<ComparisonImages> {
        match target {
            ComparisonTarget::SourceVsLatest => {
                let source = self.source.as_ref()?;
                let latest = self.latest_result()?;
                Some(ComparisonImages {
                    before: source.shared_bytes(),
                    after: latest.shared_bytes(),
                    before_label: "Original".to_string(),
                    after_label: format!("Compressed ({})", latest.encoder()),
                })
            }
            ComparisonTarget::ResultPair => {
                let a = self.result(EncoderId::A)?;
                let b = self.result(EncoderId::B)?;
                Some(ComparisonImages {
                    before: a.shared_bytes(),
                    after: b.shared_bytes(),
                    before_label: "Encoder A".to_string(),
                    after_label: "Encoder B".to_string(),
                })
            }
        }
    }
}

/// Holds an encoder's in-flight slot. Dropping it (e.g. when the encode
/// future is dropped) frees the slot; `complete` frees it under a lock the
/// caller already holds.
struct InFlightGuard {
    state: Arc<Mutex<SessionState>>,
    id: EncoderId,
    ticket: u64,
    armed: bool,
}

impl InFlightGuard {
    fn complete(mut self, state: &mut SessionState) {
        state.release(self.id, self.ticket);
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().release(self.id, self.ticket);
        }
    }
}

/// Cheap-to-clone handle on one compression session.
#[derive(Clone)]
pub struct CompressionSession {
    state: Arc<Mutex<SessionState>>,
    encoders: [Arc<dyn Encoder>; 2],
}

impl Default for CompressionSession {
    fn default() -> Self {
        Self::new(
            Arc::new(CompressorEncoder::default()),
            Arc::new(SizeTargetEncoder::default()),
        )
    }
}

impl CompressionSession {
    pub fn new(encoder_a: Arc<dyn Encoder>, encoder_b: Arc<dyn Encoder>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            encoders: [encoder_a, encoder_b],
        }
    }

    /// Session with the shipped encoders; `max_size_bytes` is encoder B's size target.
    pub fn with_default_encoders(max_size_bytes: u64) -> Self {
        Self::new(
            Arc::new(CompressorEncoder::default()),
            Arc::new(SizeTargetEncoder::new(max_size_bytes)),
        )
    }

    pub fn encoder_name(&self, id: EncoderId) -> &str {
        self.encoders[id.index()].name()
    }

    /// Replaces the source, clears both results and hides the comparison.
    /// Encodes still running for the previous source become stale.
    pub fn set_source(&self, source: SourceImage) {
        let mut state = self.state.lock();
        state.epoch += 1;
        info!(
            epoch = state.epoch,
            bytes = source.size(),
            mime = source.mime_type(),
            width = source.width(),
            height = source.height(),
            "source image set"
        );
        state.source = Some(Arc::new(source));
        state.results = [None, None];
        state.in_flight = [None, None];
        state.latest = None;
        state.comparison = ActiveComparison::NONE;
    }

    /// Runs one encoder against the current source.
    ///
    /// # Errors
    /// * `NoSource` - no image has been uploaded
    /// * `EncodeInProgress` - this encoder is already running for the current source
    /// * `SourceReplaced` - the source changed while encoding; the output was discarded
    /// * `EncodeFailed` - the encoder failed; the previous result is kept
    pub async fn encode_with(
        &self,
        id: EncoderId,
        settings: CompressionSettings,
    ) -> Result<Arc<EncodeResult>> {
        let idx = id.index();
        let (request, epoch, guard) = {
            let mut state = self.state.lock();
            let source = state.source.clone().ok_or(CompressionError::NoSource)?;
            if state.in_flight[idx].is_some() {
                debug!(encoder = %id, "rejecting re-entrant encode");
                return Err(CompressionError::EncodeInProgress(id));
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.in_flight[idx] = Some(ticket);

            let guard = InFlightGuard {
                state: Arc::clone(&self.state),
                id,
                ticket,
                armed: true,
            };
            (EncodeRequest::new(source, settings), state.epoch, guard)
        };

        let encoder = Arc::clone(&self.encoders[idx]);
        debug!(
            encoder = %id,
            name = encoder.name(),
            quality = settings.quality,
            format = %settings.output_type,
            "encode started"
        );
        let outcome = encoder
            .encode(request)
            .await
            .and_then(|encoded| EncodeResult::new(id, encoded, settings));

        let mut state = self.state.lock();
        guard.complete(&mut state);

        if state.epoch != epoch {
            warn!(encoder = %id, "source replaced during encode, discarding outcome");
            return Err(CompressionError::SourceReplaced(id));
        }

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                state.results[idx] = Some(Arc::clone(&result));
                state.latest = Some(id);
                info!(encoder = %id, bytes = result.size(), format = %result.format(), "encode finished");
                Ok(result)
            }
            Err(cause) => {
                warn!(encoder = %id, error = %cause, "encode failed");
                Err(CompressionError::EncodeFailed(EncodeFailure::new(id, cause)))
            }
        }
    }

    /// Runs both encoders with the same settings and waits for both to settle.
    /// Results of successful branches are stored even when the other fails.
    ///
    /// When both succeed, B's result is the latest one whichever branch
    /// finished last, so downloads and `SourceVsLatest` do not depend on timing.
    pub async fn compare_both(&self, settings: CompressionSettings) -> Result<ResultPair> {
        if !self.has_source() {
            return Err(CompressionError::NoSource);
        }

        let (a, b) = tokio::join!(
            self.encode_with(EncoderId::A, settings),
            self.encode_with(EncoderId::B, settings)
        );

        match (a, b) {
            (Ok(a), Ok(b)) => {
                let mut state = self.state.lock();
                // a source swap after both completions already cleared the results
                if state
                    .result(EncoderId::B)
                    .is_some_and(|stored| Arc::ptr_eq(&stored, &b))
                {
                    state.latest = Some(EncoderId::B);
                }
                Ok(ResultPair { a, b })
            }
            (a, b) => {
                let failures: Vec<EncodeFailure> = [(EncoderId::A, a.err()), (EncoderId::B, b.err())]
                    .into_iter()
                    .filter_map(|(id, err)| err.map(|e| into_failure(id, e)))
                    .collect();
                Err(CompressionError::CompareFailed(failures))
            }
        }
    }

    pub fn statistics_for(&self, id: EncoderId) -> Result<CompressionStats> {
        let (source, result) = {
            let state = self.state.lock();
            let result = state.result(id).ok_or(CompressionError::NoResult(id))?;
            let source = state.source.clone().ok_or(CompressionError::NoSource)?;
            (source, result)
        };
        Ok(CompressionStats::compute(&source, &result))
    }

    /// Selects the active comparison. `None` is always accepted; any other
    /// mode needs both images of `target`, otherwise the comparison is left
    /// unchanged and `MissingTarget` is returned.
    pub fn select_comparison_mode(
        &self,
        mode: ComparisonMode,
        target: ComparisonTarget,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if mode == ComparisonMode::None {
            state.comparison = ActiveComparison::NONE;
            return Ok(());
        }

        if state.images_for(target).is_none() {
            return Err(CompressionError::MissingTarget(target));
        }

        state.comparison = ActiveComparison { mode, target };
        debug!(?mode, %target, "comparison selected");
        Ok(())
    }

    pub fn has_source(&self) -> bool {
        self.state.lock().source.is_some()
    }

    pub fn source(&self) -> Option<Arc<SourceImage>> {
        self.state.lock().source.clone()
    }

    pub fn result(&self, id: EncoderId) -> Option<Arc<EncodeResult>> {
        self.state.lock().result(id)
    }

    /// The most recently stored result; what a download writes.
    pub fn latest_result(&self) -> Result<Arc<EncodeResult>> {
        self.state
            .lock()
            .latest_result()
            .ok_or(CompressionError::NoLatestResult)
    }

    pub fn comparison(&self) -> ActiveComparison {
        self.state.lock().comparison
    }

    /// Images of the active comparison; `None` while no comparison is shown.
    pub fn comparison_images(&self) -> Option<ComparisonImages> {
        let state = self.state.lock();
        if state.comparison.is_none() {
            return None;
        }
        state.images_for(state.comparison.target)
    }

    pub fn is_encoding(&self, id: EncoderId) -> bool {
        self.state.lock().in_flight[id.index()].is_some()
    }
}

fn into_failure(id: EncoderId, err: CompressionError) -> EncodeFailure {
    match err {
        CompressionError::EncodeFailed(failure) => failure,
        other => EncodeFailure::new(id, other),
    }
}
