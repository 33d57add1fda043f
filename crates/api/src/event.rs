//! Lifecycle events, delivered to listeners injected at construction.
//!
//! The router emits `before_run` and `after_run` around each dispatch; a controller handler emits
//! one [`ControllerEvent`] per step of its lifecycle. Listeners get the request mutably and may bind
//! parameters with [`Source::Event`](micro_param::Source::Event).

use crate::{ApiResponse, Request};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerEvent {
    Start,
    BeforeLoad,
    AfterLoad,
    BeforeExec,
    AfterExec,
}

#[cfg_attr(test, mockall::automock)]
pub trait EventListener: Send + Sync {
    fn before_run(&self, _request: &mut Request) {}

    fn after_run(&self, _rid: Uuid, _response: &ApiResponse) {}

    fn on_controller(&self, _event: ControllerEvent, _request: &mut Request) {}
}

/// Fans every event out to the registered listeners, in order.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Vec<Arc<dyn EventListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_last(&mut self, listener: Arc<dyn EventListener>) {
        self.inner.push(listener);
    }

    pub fn add_first(&mut self, listener: Arc<dyn EventListener>) {
        self.inner.insert(0, listener);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.inner.len()).finish()
    }
}

impl EventListener for Listeners {
    fn before_run(&self, request: &mut Request) {
        for listener in &self.inner {
            listener.before_run(request);
        }
    }

    fn after_run(&self, rid: Uuid, response: &ApiResponse) {
        for listener in &self.inner {
            listener.after_run(rid, response);
        }
    }

    fn on_controller(&self, event: ControllerEvent, request: &mut Request) {
        for listener in &self.inner {
            listener.on_controller(event, request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportSnapshot;
    use http::{Method, Uri};
    use mockall::predicate::{always, eq};
    use micro_param::Source;

    #[test]
    fn fans_out_in_order() {
        let mut first = MockEventListener::new();
        first.expect_before_run().times(1).returning(|request| request.set_param("user", "42", Source::Event));
        first.expect_on_controller().times(1).return_const(());

        let mut second = MockEventListener::new();
        second
            .expect_before_run()
            .withf(|request| request.is_param("user", Some(Source::Event)))
            .times(1)
            .return_const(());
        second.expect_on_controller().with(eq(ControllerEvent::Start), always()).times(1).return_const(());

        let mut listeners = Listeners::new();
        listeners.add_last(Arc::new(second));
        listeners.add_first(Arc::new(first));
        assert_eq!(listeners.len(), 2);

        let mut request = Request::new(&TransportSnapshot::new(Method::GET, Uri::from_static("/"))).unwrap();
        listeners.before_run(&mut request);
        listeners.on_controller(ControllerEvent::Start, &mut request);
    }
}
