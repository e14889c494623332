use std::time::Duration;

use super::ReconnectConfig;

#[test]
fn backoff_doubles_from_one_second_and_caps_at_thirty() {
    let config = ReconnectConfig::default();

    assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
    assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
    assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
    assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    assert_eq!(config.delay_for_attempt(4), Duration::from_secs(16));
    assert_eq!(config.delay_for_attempt(5), Duration::from_secs(30));
    assert_eq!(config.delay_for_attempt(12), Duration::from_secs(30));
}

#[test]
fn default_budget_is_five_attempts() {
    assert_eq!(ReconnectConfig::default().max_attempts, 5);
}
