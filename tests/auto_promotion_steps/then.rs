//! Then steps for auto-promotion BDD scenarios.

use super::world::AutoPromotionWorld;
use rstest_bdd_macros::then;
use taskmaster::task::{domain::Priority, services::SyncStatus};

#[then(r#"the task "{text}" has priority "{priority}""#)]
fn task_has_priority(
    world: &AutoPromotionWorld,
    text: String,
    priority: String,
) -> Result<(), eyre::Report> {
    let expected: Priority = priority
        .parse()
        .map_err(|err| eyre::eyre!("invalid priority in scenario: {err}"))?;
    let task = world.task_labelled(&text)?;
    if task.priority() != expected {
        return Err(eyre::eyre!(
            "expected priority {expected}, found {}",
            task.priority()
        ));
    }
    Ok(())
}

#[then(r#"the task "{text}" is open and not carried over"#)]
fn task_is_open(world: &AutoPromotionWorld, text: String) -> Result<(), eyre::Report> {
    let task = world.task_labelled(&text)?;
    if task.is_completed() || task.was_auto_promoted() {
        return Err(eyre::eyre!("expected a fresh open task, got {task:?}"));
    }
    Ok(())
}

#[then(r#"the task "{text}" is carried over"#)]
fn task_is_carried_over(world: &AutoPromotionWorld, text: String) -> Result<(), eyre::Report> {
    let task = world.task_labelled(&text)?;
    if !task.was_auto_promoted() {
        return Err(eyre::eyre!("expected '{text}' to be flagged as carried over"));
    }
    Ok(())
}

#[then("the move reports no change")]
fn move_reports_no_change(world: &AutoPromotionWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move outcome"))?;
    if outcome.value() != Some(&false) || !matches!(outcome.sync_status(), Some(SyncStatus::Skipped))
    {
        return Err(eyre::eyre!("expected an unchanged move, got {outcome:?}"));
    }
    Ok(())
}

#[then(r#"the active order is "{labels}""#)]
fn active_order_is(world: &AutoPromotionWorld, labels: String) -> Result<(), eyre::Report> {
    let table = world
        .session
        .cached()
        .ok_or_else(|| eyre::eyre!("session has not loaded the worksheet"))?;
    let actual: Vec<&str> = table.active().into_iter().map(|task| task.text()).collect();
    let expected: Vec<&str> = labels.split(", ").collect();
    if actual != expected {
        return Err(eyre::eyre!("expected order {expected:?}, found {actual:?}"));
    }
    Ok(())
}
