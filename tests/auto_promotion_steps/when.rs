//! When steps for auto-promotion BDD scenarios.

use super::world::{AutoPromotionWorld, parse_instant, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskmaster::task::domain::{MoveDirection, Priority, Task};

#[when(r#"the task "{text}" is added with priority "{priority}""#)]
fn add_task(
    world: &mut AutoPromotionWorld,
    text: String,
    priority: String,
) -> Result<(), eyre::Report> {
    let parsed: Priority = priority
        .parse()
        .map_err(|err| eyre::eyre!("invalid priority in scenario: {err}"))?;
    let outcome = run_async(world.session.add(text, parsed)).wrap_err("add task")?;
    if outcome.is_stale() {
        return Err(eyre::eyre!("add reported a stale reference"));
    }
    Ok(())
}

#[when(r#"a new session starts at "{moment}""#)]
fn new_session(world: &mut AutoPromotionWorld, moment: String) -> Result<(), eyre::Report> {
    world.clock.set(parse_instant(&moment)?);
    world.restart_session();
    Ok(())
}

#[when("auto-promotion runs")]
fn auto_promotion_runs(world: &mut AutoPromotionWorld) -> Result<(), eyre::Report> {
    let run = run_async(world.session.run_auto_promotion()).wrap_err("run auto-promotion")?;
    world.last_promotion = Some(run);
    Ok(())
}

#[when(r#"the task "{text}" is moved "{direction}""#)]
fn move_task(
    world: &mut AutoPromotionWorld,
    text: String,
    direction: String,
) -> Result<(), eyre::Report> {
    let parsed: MoveDirection = direction
        .parse()
        .map_err(|err| eyre::eyre!("invalid direction in scenario: {err}"))?;
    run_async(world.session.load(false)).wrap_err("load worksheet")?;
    let id = world.task_labelled(&text).map(Task::id)?.clone();
    let outcome = run_async(world.session.move_task(&id, parsed)).wrap_err("move task")?;
    world.last_move = Some(outcome);
    Ok(())
}
