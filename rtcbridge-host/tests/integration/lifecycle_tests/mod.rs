mod test_abandoned_operations;
mod test_close_suppresses_notifications;
mod test_factory_lifetime;
mod test_panicking_listener;
