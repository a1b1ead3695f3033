//! End-to-end session lifecycles over a shared in-memory worksheet.

use super::helpers::{active_labels, clock, open_session, worksheet};
use crate::test_helpers::{FixedClock, instant, open_row, worksheet as rows_worksheet};
use rstest::rstest;
use std::sync::Arc;
use taskmaster::task::{
    adapters::memory::InMemoryRemoteTable,
    domain::{MoveDirection, Priority, TaskId},
    services::PromotionRun,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_day_of_work_round_trips_through_the_worksheet(
    worksheet: InMemoryRemoteTable,
    clock: Arc<FixedClock>,
) {
    let remote = Arc::new(worksheet);
    let mut session = open_session(&remote, &clock);

    let first = session
        .add("Draft agenda", Priority::Medium)
        .await
        .expect("add first")
        .into_value()
        .expect("applied");
    let second = session
        .add("Book room", Priority::Low)
        .await
        .expect("add second")
        .into_value()
        .expect("applied");
    assert_eq!(active_labels(&session), vec!["Book room", "Draft agenda"]);

    let moved = session
        .move_task(second.id(), MoveDirection::Down)
        .await
        .expect("move");
    assert_eq!(moved.value(), Some(&true));
    let toggled = session.toggle(first.id()).await.expect("toggle");
    assert!(toggled.value().is_some_and(|task| task.is_completed()));
    assert_eq!(active_labels(&session), vec!["Book room"]);
    drop(session.close());

    let mut next = open_session(&remote, &clock);
    let table = next.load(false).await.expect("reload");
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.history().first().map(|task| task.text()),
        Some("Draft agenda")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn next_day_session_promotes_yesterdays_tasks(clock: Arc<FixedClock>) {
    let remote = Arc::new(InMemoryRemoteTable::with_table(
        "Tasks",
        rows_worksheet([
            open_row("1", "Low chore", "Low", "2024-01-01 09:00:00.000000", 1),
            open_row("2", "Urgent fix", "High", "2024-01-01 09:30:00.000000", 2),
        ]),
    ));
    clock.set(instant(2024, 1, 2, 8, 0));
    let mut session = open_session(&remote, &clock);

    let run = session.run_auto_promotion().await.expect("promotion");

    let summary = run.summary().expect("promotion ran");
    assert_eq!(summary.promoted.len(), 1);
    assert_eq!(summary.carried_over.len(), 1);
    assert_eq!(active_labels(&session), vec!["Low chore", "Urgent fix"]);

    let mut fresh = open_session(&remote, &clock);
    let table = fresh.load(false).await.expect("reload");
    assert!(table.tasks().iter().all(|task| task.priority() == Priority::High));
    assert!(table.tasks().iter().all(|task| task.was_auto_promoted()));
    let again = fresh.run_auto_promotion().await.expect("second session");
    assert!(run_is_empty(&again));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_from_another_session_are_seen_after_refresh(
    worksheet: InMemoryRemoteTable,
    clock: Arc<FixedClock>,
) {
    let remote = Arc::new(worksheet);
    let mut phone = open_session(&remote, &clock);
    let mut laptop = open_session(&remote, &clock);
    let added = phone
        .add("Pay rent", Priority::High)
        .await
        .expect("add")
        .into_value()
        .expect("applied");

    assert!(laptop.load(false).await.expect("laptop load").contains(added.id()));

    phone.delete(added.id()).await.expect("delete").into_value().expect("applied");
    assert!(laptop.load(false).await.expect("cached").contains(added.id()));
    assert!(!laptop.load(true).await.expect("refreshed").contains(added.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_sets_the_full_order(clock: Arc<FixedClock>) {
    let remote = Arc::new(InMemoryRemoteTable::with_table(
        "Tasks",
        rows_worksheet([
            open_row("a", "Alpha", "Low", "2024-01-01 09:00:00.000000", 3),
            open_row("b", "Beta", "Low", "2024-01-01 09:00:00.000000", 2),
            open_row("c", "Gamma", "Low", "2024-01-01 09:00:00.000000", 1),
        ]),
    ));
    let mut session = open_session(&remote, &clock);
    let order: Vec<TaskId> = ["c", "a", "b"]
        .into_iter()
        .map(|raw| TaskId::parse(raw).expect("valid id"))
        .collect();

    let outcome = session.reorder(&order).await.expect("reorder");

    assert_eq!(outcome.value(), Some(&3));
    assert_eq!(active_labels(&session), vec!["Gamma", "Alpha", "Beta"]);
}

fn run_is_empty(run: &PromotionRun) -> bool {
    run.summary().is_some_and(|summary| summary.is_empty())
}
