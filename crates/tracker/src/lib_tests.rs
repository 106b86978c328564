use super::*;

#[test]
fn run_state_default_is_unknown() {
    assert_eq!(RunState::default(), RunState::Unknown);
}
