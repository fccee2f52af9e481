use rand::distributions::Alphanumeric;
use rand::Rng;

/// Short random identifier for user events (check-ins, urges, focus sessions).
pub fn new_event_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
