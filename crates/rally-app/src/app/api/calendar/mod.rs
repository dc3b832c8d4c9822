//! Calendar routes: expanded event listings, exceptions and detached instances.

mod events;
mod instances;
mod window;


use salvo::Router;

use rally_core::constants::{CALENDAR_ROUTE_COMPONENT, EVENTS_ROUTE_COMPONENT};

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CALENDAR_ROUTE_COMPONENT).push(
        Router::with_path(EVENTS_ROUTE_COMPONENT)
            .get(events::list_events)
            .post(events::create_event)
            .push(Router::with_path("{id}/occurrences").get(events::event_occurrences))
            .push(Router::with_path("{id}/exceptions").post(instances::add_exception))
            .push(Router::with_path("{id}/detach").post(instances::detach_instance)),
    )
}
