use crate::event::EventLoop;

/// A host object that owns an event loop and replays its events.
pub trait EventTarget {
    type Event;

    fn event_loop(&self) -> &EventLoop<Self::Event>;

    fn handle_event(&self, event: Self::Event);
}
