use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("relaychat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("relaychat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("relaychat.client.request_duration_seconds");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("relaychat.session.submissions");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("relaychat.session.rejected");
pub(crate) static SESSION_DROPPED: Counter = Counter::new("relaychat.session.dropped");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("relaychat.session.failures");

pub(crate) static RELAY_REQUESTS: Counter = Counter::new("relaychat.relay.requests");
pub(crate) static RELAY_REJECTED: Counter = Counter::new("relaychat.relay.rejected");
pub(crate) static RELAY_ANSWER_ERRORS: Counter = Counter::new("relaychat.relay.answer_errors");
pub(crate) static RELAY_ANSWER_DURATION: Moments =
    Moments::new("relaychat.relay.answer_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_DROPPED);
    collector.register_counter(&SESSION_FAILURES);

    collector.register_counter(&RELAY_REQUESTS);
    collector.register_counter(&RELAY_REJECTED);
    collector.register_counter(&RELAY_ANSWER_ERRORS);
    collector.register_moments(&RELAY_ANSWER_DURATION);
}
