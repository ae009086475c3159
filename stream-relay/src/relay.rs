//! Drives one upstream stream to completion.

use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    enrich::{FileNameResolver, enrich_sources},
    frame::{FileRef, UpstreamFrame},
    line_buffer::{LineBuffer, parse_sse_line},
    sources::{SourcePolicy, SourceRecord, display_name::display_name, extract_sources},
};

/// Answer text plus the documents it was based on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalAnswer {
    pub text: String,
    pub sources: Vec<String>,
}

/// What the relay reports downstream, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A text increment, forwarded as soon as it is decoded.
    Text(String),
    /// Upstream completed cleanly.
    Finished(FinalAnswer),
    /// Upstream failed or closed early; `answer` holds the partial text.
    Interrupted { answer: FinalAnswer, reason: String },
}

/// How a relay run ended, for logging by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Completed { frames: usize, sources: usize },
    Interrupted { reason: String },
    /// The receiver went away; the upstream stream was dropped unread.
    Cancelled,
}

/// Per-process relay settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayOptions {
    pub policy: SourcePolicy,
    /// Apply [`display_name`] to metadata-derived names.
    pub pretty_names: bool,
}

/// Stateless driver; all per-request state lives inside [`StreamRelay::run`].
#[derive(Debug, Clone)]
pub struct StreamRelay<R> {
    options: RelayOptions,
    resolver: Option<R>,
}

/// Request-local relay state.
#[derive(Default)]
struct RelayState {
    lines: LineBuffer,
    answer: String,
    sources: SourceRecord,
    frames: usize,
    end: Option<StreamEnd>,
}

enum StreamEnd {
    Clean,
    Failed(String),
}

impl RelayState {
    /// Applies one line; returns a text increment to forward, if any.
    fn apply_line(&mut self, line: &str) -> Option<String> {
        let payload = parse_sse_line(line)?;
        let Some(frame) = UpstreamFrame::classify(payload) else {
            debug!(payload_len = payload.len(), "dropping malformed frame");
            return None;
        };
        self.frames += 1;

        match frame {
            UpstreamFrame::TextDelta(text) | UpstreamFrame::FullText(text) => {
                if text.is_empty() {
                    return None;
                }
                self.answer.push_str(&text);
                Some(text)
            }
            UpstreamFrame::ToolResult(refs) => {
                self.record_all(refs);
                None
            }
            UpstreamFrame::Completed(refs) => {
                self.record_all(refs);
                self.end = Some(StreamEnd::Clean);
                None
            }
            UpstreamFrame::Done => {
                self.end = Some(StreamEnd::Clean);
                None
            }
            UpstreamFrame::Failed(message) => {
                self.end = Some(StreamEnd::Failed(message));
                None
            }
            UpstreamFrame::Unknown => None,
        }
    }

    fn record_all(&mut self, refs: Vec<FileRef>) {
        for file in refs {
            if self.sources.record(file) {
                debug!(sources = self.sources.len(), "new source recorded");
            }
        }
    }
}

impl<R: FileNameResolver> StreamRelay<R> {
    pub fn new(options: RelayOptions, resolver: Option<R>) -> Self {
        Self { options, resolver }
    }

    /// Relays `upstream` into `sink` until completion, failure or cancellation.
    ///
    /// Emits one [`RelayEvent::Text`] per increment, then exactly one of
    /// [`RelayEvent::Finished`] / [`RelayEvent::Interrupted`]. Source
    /// enrichment runs only after the upstream stream has ended. If `sink`
    /// is closed the run stops at once and nothing more is read.
    pub async fn run<S, E>(&self, mut upstream: S, sink: &mpsc::Sender<RelayEvent>) -> RelayOutcome
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut state = RelayState::default();
        let mut transport_error: Option<String> = None;

        'read: while state.end.is_none() {
            let next = tokio::select! {
                biased;
                _ = sink.closed() => {
                    info!(frames = state.frames, "client disconnected; dropping upstream stream");
                    return RelayOutcome::Cancelled;
                }
                item = upstream.next() => item,
            };

            let lines = match next {
                Some(Ok(chunk)) => state.lines.push(&chunk),
                Some(Err(err)) => {
                    warn!(error = %err, frames = state.frames, "upstream stream failed");
                    transport_error = Some(format!("upstream stream error: {err}"));
                    break 'read;
                }
                None => {
                    let tail = state.lines.finish().into_iter().collect::<Vec<_>>();
                    for line in &tail {
                        if let Some(text) = state.apply_line(line) {
                            if sink.send(RelayEvent::Text(text)).await.is_err() {
                                return RelayOutcome::Cancelled;
                            }
                        }
                    }
                    break 'read;
                }
            };

            for line in &lines {
                if let Some(text) = state.apply_line(line) {
                    if sink.send(RelayEvent::Text(text)).await.is_err() {
                        info!(frames = state.frames, "client disconnected; dropping upstream stream");
                        return RelayOutcome::Cancelled;
                    }
                }
                if state.end.is_some() {
                    break;
                }
            }
        }
        drop(upstream);

        let answer = self.finalize(&state).await;

        let (event, outcome) = match (state.end, transport_error) {
            (Some(StreamEnd::Clean), _) => {
                info!(
                    frames = state.frames,
                    chars = answer.text.chars().count(),
                    sources = answer.sources.len(),
                    "relay completed"
                );
                let outcome = RelayOutcome::Completed {
                    frames: state.frames,
                    sources: answer.sources.len(),
                };
                (RelayEvent::Finished(answer), outcome)
            }
            (Some(StreamEnd::Failed(reason)), _) | (None, Some(reason)) => {
                warn!(%reason, chars = answer.text.chars().count(), "relay interrupted");
                (
                    RelayEvent::Interrupted {
                        answer,
                        reason: reason.clone(),
                    },
                    RelayOutcome::Interrupted { reason },
                )
            }
            (None, None) => {
                let reason = "upstream closed the stream before completion".to_string();
                warn!(%reason, chars = answer.text.chars().count(), "relay interrupted");
                (
                    RelayEvent::Interrupted {
                        answer,
                        reason: reason.clone(),
                    },
                    RelayOutcome::Interrupted { reason },
                )
            }
        };

        if sink.send(event).await.is_err() {
            return RelayOutcome::Cancelled;
        }
        outcome
    }

    async fn finalize(&self, state: &RelayState) -> FinalAnswer {
        let mut names = enrich_sources(&state.sources, self.resolver.as_ref()).await;
        if self.options.pretty_names {
            names = names.iter().map(|n| display_name(n)).collect();
        }
        FinalAnswer {
            sources: extract_sources(self.options.policy, &state.answer, &names),
            text: state.answer.clone(),
        }
    }
}
