//! Then steps for handler discovery BDD scenarios.

use super::world::{DiscoveryWorld, run_async};
use autowire::event_handler::ports::EventConsumer;
use rstest_bdd_macros::then;

#[then(r#"{count:usize} handlers are registered for "{name}""#)]
fn handlers_registered_for(
    world: &mut DiscoveryWorld,
    count: usize,
    name: String,
) -> Result<(), eyre::Report> {
    let service = world.live_service(&name)?;
    let handlers = run_async(world.coordinator.registered_handlers(service.as_ref()))
        .map_err(|err| eyre::eyre!("registered_handlers failed: {err}"))?;
    if handlers.len() != count {
        return Err(eyre::eyre!(
            "expected {count} handlers for '{name}', found {}",
            handlers.len()
        ));
    }
    Ok(())
}

#[then(r#"the ledger records strategy "{strategy}" for "{name}""#)]
fn ledger_records_strategy(
    world: &mut DiscoveryWorld,
    strategy: String,
    name: String,
) -> Result<(), eyre::Report> {
    let stats = run_async(world.coordinator.registration_stats())
        .map_err(|err| eyre::eyre!("registration_stats failed: {err}"))?;
    if stats.services_by_strategy.get(&strategy) != Some(&1) {
        return Err(eyre::eyre!(
            "expected '{name}' to be registered by '{strategy}', got {:?}",
            stats.services_by_strategy
        ));
    }
    Ok(())
}

#[then("{count:usize} handlers are registered in total")]
fn handlers_registered_in_total(
    world: &mut DiscoveryWorld,
    count: usize,
) -> Result<(), eyre::Report> {
    let stats = run_async(world.coordinator.registration_stats())
        .map_err(|err| eyre::eyre!("registration_stats failed: {err}"))?;
    if stats.total_handlers != count {
        return Err(eyre::eyre!(
            "expected {count} handlers in total, found {}",
            stats.total_handlers
        ));
    }
    Ok(())
}

#[then("the delivery succeeds")]
fn delivery_succeeds(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    match &world.last_delivery {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("delivery failed: {err}")),
        None => Err(eyre::eyre!("no event was delivered")),
    }
}

#[then(r#""{name}" was invoked {count:usize} times"#)]
fn service_invoked(world: &DiscoveryWorld, name: String, count: usize) -> Result<(), eyre::Report> {
    let invoked = world.live_service(&name)?.invocation_count();
    if invoked != count {
        return Err(eyre::eyre!(
            "expected '{name}' to be invoked {count} times, was {invoked}"
        ));
    }
    Ok(())
}

#[then("the bus holds {count:usize} handlers")]
fn bus_holds(world: &DiscoveryWorld, count: usize) -> Result<(), eyre::Report> {
    let held = world.bus.stats().handler_count;
    if held != count {
        return Err(eyre::eyre!("expected {count} bus handlers, found {held}"));
    }
    Ok(())
}
