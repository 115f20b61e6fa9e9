use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("agenthub.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("agenthub.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("agenthub.client.request_duration_seconds");

pub(crate) static REGISTRY_FALLBACKS: Counter = Counter::new("agenthub.registry.fallbacks");

pub(crate) static CHAT_SENDS: Counter = Counter::new("agenthub.chat.sends");
pub(crate) static CHAT_REJECTED: Counter = Counter::new("agenthub.chat.rejected_busy");
pub(crate) static CHAT_FAILURES: Counter = Counter::new("agenthub.chat.failures");
pub(crate) static CHAT_DISCARDED: Counter = Counter::new("agenthub.chat.discarded_stale");
pub(crate) static CHAT_AGENT_SWITCHES: Counter = Counter::new("agenthub.chat.agent_switches");

pub(crate) static SESSION_CLEARS: Counter = Counter::new("agenthub.session.clears");
pub(crate) static SESSION_DELETE_ERRORS: Counter =
    Counter::new("agenthub.session.delete_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&REGISTRY_FALLBACKS);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_REJECTED);
    collector.register_counter(&CHAT_FAILURES);
    collector.register_counter(&CHAT_DISCARDED);
    collector.register_counter(&CHAT_AGENT_SWITCHES);

    collector.register_counter(&SESSION_CLEARS);
    collector.register_counter(&SESSION_DELETE_ERRORS);
}
