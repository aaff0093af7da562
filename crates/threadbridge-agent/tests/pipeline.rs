// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the relay pipeline against a scripted backend.
//!
//! Events enter through the inbound filter exactly as the gateway adapter
//! delivers them, and replies are captured by recording sinks.

use std::sync::Arc;
use std::time::Duration;

use threadbridge_agent::{
    message_queue, AllowList, DispatchLoop, DispatchReport, HandlerSettings, InboundFilter,
    MessageHandler,
};
use threadbridge_config::model::DispatchConfig;
use threadbridge_core::replies::TOO_LONG_FALLBACK;
use threadbridge_core::traits::EventSink;
use threadbridge_core::types::{ChannelId, ThreadId};
use threadbridge_test_utils::{
    bot_event, user_event, AppendOutcome, BackendCall, MockAssistant, RecordingReply, RunScript,
};
use tokio_util::sync::CancellationToken;

const C1: &str = "1202718026353475594";
const C2: &str = "1202718036797161482";

/// Submits events through the filter, closes the queue and runs the loop to completion.
async fn relay(
    mock: &Arc<MockAssistant>,
    events: Vec<threadbridge_core::types::InboundEvent>,
) -> DispatchReport {
    let (tx, rx) = message_queue();
    let allow = AllowList::new([ChannelId::from(C1), ChannelId::from(C2)]);
    let filter = InboundFilter::new(allow.clone(), tx);
    for event in events {
        filter.submit(event);
    }
    drop(filter);

    let handler = MessageHandler::new(
        mock.clone(),
        allow,
        HandlerSettings::from_config("asst_test", &DispatchConfig::default()),
    );
    DispatchLoop::new(rx, handler, Duration::from_secs(1))
        .run(CancellationToken::new())
        .await
}

#[tokio::test(start_paused = true)]
async fn hello_gets_assistant_reply_on_new_thread() {
    let mock = Arc::new(MockAssistant::new());
    mock.push_run(RunScript::completed("Hi there!")).await;
    let reply = RecordingReply::new();

    let report = relay(&mock, vec![user_event(C1, "Hello", &reply)]).await;

    assert_eq!(report.processed, 1);
    assert_eq!(reply.sent().await, vec!["Hi there!"]);
    assert_eq!(mock.create_thread_count().await, 1);
    assert_eq!(
        mock.calls().await[..3],
        [
            BackendCall::CreateThread,
            BackendCall::Append {
                thread_id: ThreadId::from("thread_1"),
                content: "Hello".into(),
            },
            BackendCall::CreateRun {
                thread_id: ThreadId::from("thread_1"),
                assistant_id: "asst_test".into(),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn busy_thread_is_retried_once_and_replied_once() {
    let mock = Arc::new(MockAssistant::new());
    mock.push_append(AppendOutcome::Busy).await;
    mock.push_run(RunScript::completed("I'm here!")).await;
    let reply = RecordingReply::new();

    relay(&mock, vec![user_event(C1, "Are you there?", &reply)]).await;

    assert_eq!(mock.append_count().await, 2);
    assert_eq!(reply.sent().await, vec!["I'm here!"]);
}

#[tokio::test(start_paused = true)]
async fn busy_twice_drops_message_and_moves_on() {
    let mock = Arc::new(MockAssistant::new());
    mock.push_append(AppendOutcome::Busy).await;
    mock.push_append(AppendOutcome::Busy).await;
    mock.push_run(RunScript::completed("answer to second")).await;
    let first = RecordingReply::new();
    let second = RecordingReply::new();

    let report = relay(
        &mock,
        vec![
            user_event(C1, "Are you there?", &first),
            user_event(C1, "Hello again", &second),
        ],
    )
    .await;

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(first.sent_count().await, 0);
    assert_eq!(second.sent().await, vec!["answer to second"]);
    assert_eq!(
        mock.appended().await,
        vec!["Are you there?", "Are you there?", "Hello again"]
    );
}

#[tokio::test(start_paused = true)]
async fn messages_are_processed_in_arrival_order() {
    let mock = Arc::new(MockAssistant::new());
    for i in 1..=5 {
        mock.push_run(RunScript::completed(format!("reply {i}"))).await;
    }
    let c1 = RecordingReply::new();
    let c2 = RecordingReply::new();

    let report = relay(
        &mock,
        vec![
            user_event(C1, "m1", &c1),
            user_event(C2, "m2", &c2),
            user_event(C1, "m3", &c1),
            user_event(C2, "m4", &c2),
            user_event(C1, "m5", &c1),
        ],
    )
    .await;

    assert_eq!(report.processed, 5);
    assert_eq!(report.dropped, 0);
    assert_eq!(mock.appended().await, vec!["m1", "m2", "m3", "m4", "m5"]);
    assert_eq!(c1.sent().await, vec!["reply 1", "reply 3", "reply 5"]);
    assert_eq!(c2.sent().await, vec!["reply 2", "reply 4"]);
    // One thread per channel, reused afterwards.
    assert_eq!(mock.create_thread_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn foreign_channels_and_bots_never_reach_the_backend() {
    let mock = Arc::new(MockAssistant::new());
    let reply = RecordingReply::new();

    let report = relay(
        &mock,
        vec![
            user_event("42", "Hello", &reply),
            bot_event(C1, "I am a bot", &reply),
            user_event(C1, "   ", &reply),
        ],
    )
    .await;

    assert_eq!(report.processed, 0);
    assert!(mock.calls().await.is_empty());
    assert_eq!(reply.sent_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn reply_length_limit_is_inclusive() {
    let mock = Arc::new(MockAssistant::new());
    let exact = "x".repeat(2000);
    mock.push_run(RunScript::completed(exact.clone())).await;
    mock.push_run(RunScript::completed("y".repeat(2001))).await;
    let reply = RecordingReply::new();

    relay(
        &mock,
        vec![user_event(C1, "short", &reply), user_event(C1, "long", &reply)],
    )
    .await;

    assert_eq!(reply.sent().await, vec![exact, TOO_LONG_FALLBACK.to_string()]);
}
