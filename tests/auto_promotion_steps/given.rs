//! Given steps for auto-promotion BDD scenarios.

use super::world::{AutoPromotionWorld, parse_instant, run_async};
use crate::test_helpers::{open_row, worksheet};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskmaster::task::ports::RemoteTable;

#[given(r#"the clock reads "{moment}""#)]
fn clock_reads(world: &mut AutoPromotionWorld, moment: String) -> Result<(), eyre::Report> {
    world.clock.set(parse_instant(&moment)?);
    Ok(())
}

#[given(r#"a stored task "{text}" with priority "{priority}" created on "{day}""#)]
fn stored_task(
    world: &mut AutoPromotionWorld,
    text: String,
    priority: String,
    day: String,
) -> Result<(), eyre::Report> {
    let position = world.stored_rows.len().saturating_add(1);
    let rank = i64::try_from(position).wrap_err("rank overflow")?;
    let id = format!("task-{position}");
    let created_at = format!("{day} 08:00:00.000000");
    world
        .stored_rows
        .push(open_row(&id, &text, &priority, &created_at, rank));

    let table = worksheet(world.stored_rows.clone());
    run_async(world.remote.write_all(&table)).wrap_err("seed worksheet")?;
    Ok(())
}
