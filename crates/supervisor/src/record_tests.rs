use super::*;

#[test]
fn run_id_is_set_only_once() {
    let mut discovered = Discovered::default();
    discovered.set_run_id_once("run-1".to_string());
    discovered.set_run_id_once("run-2".to_string());
    assert_eq!(discovered.run_id, Some("run-1".to_string()));
}

#[test]
fn run_name_is_set_only_once() {
    let mut discovered = Discovered::default();
    discovered.set_run_name_once("first".to_string());
    discovered.set_run_name_once("second".to_string());
    assert_eq!(discovered.run_name, Some("first".to_string()));
}
