//! Replays a recorded-style Responses API stream through the public relay API.

use bytes::Bytes;
use futures::stream;
use stream_relay::{
    FinalAnswer, NoResolver, RelayEvent, RelayOptions, RelayOutcome, SourcePolicy, StreamRelay,
};
use tokio::sync::mpsc;

const TRANSCRIPT: &str = concat!(
    "event: response.created\n",
    "data: {\"type\":\"response.created\",\"response\":{\"id\":\"resp_1\",\"status\":\"in_progress\"}}\n\n",
    "event: response.file_search_call.searching\n",
    "data: {\"type\":\"response.file_search_call.searching\",\"item_id\":\"fs_1\"}\n\n",
    "event: response.output_item.done\n",
    "data: {\"type\":\"response.output_item.done\",\"item\":{\"id\":\"fs_1\",\"type\":\"file_search_call\",\"status\":\"completed\",\"results\":[",
    "{\"file_id\":\"file-A\",\"filename\":\"leave-policy.pdf\",\"score\":0.91,\"text\":\"...\"},",
    "{\"file_id\":\"file-B\",\"filename\":\"handbook.pdf\",\"score\":0.72,\"text\":\"...\"},",
    "{\"file_id\":\"file-A\",\"filename\":\"leave-policy.pdf\",\"score\":0.70,\"text\":\"...\"}]}}\n\n",
    "event: response.output_text.delta\n",
    "data: {\"type\":\"response.output_text.delta\",\"item_id\":\"msg_1\",\"delta\":\"Employees get \"}\n\n",
    "event: response.output_text.delta\n",
    "data: {\"type\":\"response.output_text.delta\",\"item_id\":\"msg_1\",\"delta\":\"25 days.\"}\n\n",
    "event: response.output_text.annotation.added\n",
    "data: {\"type\":\"response.output_text.annotation.added\",\"annotation\":{\"type\":\"file_citation\",\"file_id\":\"file-B\",\"filename\":\"handbook.pdf\",\"index\":20}}\n\n",
    "event: response.output_text.done\n",
    "data: {\"type\":\"response.output_text.done\",\"text\":\"Employees get 25 days.\"}\n\n",
    "event: response.completed\n",
    "data: {\"type\":\"response.completed\",\"response\":{\"id\":\"resp_1\",\"status\":\"completed\"}}\n\n",
);

/// Feeds the transcript in fixed-size chunks, like a network read loop would.
fn chunked(size: usize) -> Vec<Result<Bytes, std::io::Error>> {
    TRANSCRIPT
        .as_bytes()
        .chunks(size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect()
}

async fn run(policy: SourcePolicy, size: usize) -> (Vec<RelayEvent>, RelayOutcome) {
    let relay: StreamRelay<NoResolver> = StreamRelay::new(
        RelayOptions {
            policy,
            pretty_names: false,
        },
        None,
    );
    let (tx, mut rx) = mpsc::channel(16);

    let reader = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        events
    });

    let outcome = relay.run(stream::iter(chunked(size)), &tx).await;
    drop(tx);
    (reader.await.expect("reader task"), outcome)
}

#[tokio::test]
async fn transcript_yields_text_then_final_answer() {
    for size in [1, 7, 64, 4096] {
        let (events, outcome) = run(SourcePolicy::PreferMetadata, size).await;

        assert_eq!(
            events,
            vec![
                RelayEvent::Text("Employees get ".into()),
                RelayEvent::Text("25 days.".into()),
                RelayEvent::Finished(FinalAnswer {
                    text: "Employees get 25 days.".into(),
                    sources: vec!["leave-policy.pdf".into(), "handbook.pdf".into()],
                }),
            ],
            "chunk size {size}"
        );
        assert!(matches!(outcome, RelayOutcome::Completed { sources: 2, .. }));
    }
}

#[tokio::test]
async fn text_only_policy_ignores_metadata() {
    let (events, _) = run(SourcePolicy::TextOnly, 32).await;
    match events.last() {
        Some(RelayEvent::Finished(answer)) => assert!(answer.sources.is_empty()),
        other => panic!("unexpected final event: {other:?}"),
    }
}
