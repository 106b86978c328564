use super::*;

#[test]
fn disabled_assignment_returns_none() {
    let mut cfg = GpuConfig::default();
    cfg.enable_gpu_assignment = false;
    assert_eq!(assign_gpu(&cfg, 0), GpuAssignment::None);
}

#[test]
fn explicit_mapping_overrides_slot_math() {
    let mut cfg = GpuConfig::default();
    cfg.process_gpu_mapping.insert(2, vec!["7".to_string()]);
    cfg.process_gpu_mapping
        .insert(3, vec!["1".to_string(), "2".to_string()]);
    assert_eq!(assign_gpu(&cfg, 2), GpuAssignment::Single("7".into()));
    assert_eq!(
        assign_gpu(&cfg, 3),
        GpuAssignment::Multi(vec!["1".into(), "2".into()])
    );
}

#[test]
fn empty_gpu_list_falls_back_to_default() {
    let mut cfg = GpuConfig::default();
    cfg.gpu_list.clear();
    assert_eq!(assign_gpu(&cfg, 0), GpuAssignment::Single(cfg.default_gpu.clone()));
}

#[test]
fn multi_gpu_gives_slot_zero_everything() {
    let mut cfg = GpuConfig::default();
    cfg.gpu_list = vec!["0".into(), "1".into(), "2".into()];
    cfg.allow_multi_gpu = true;
    assert_eq!(
        assign_gpu(&cfg, 0),
        GpuAssignment::Multi(vec!["0".into(), "1".into(), "2".into()])
    );
}

#[test]
fn multi_gpu_round_robins_remaining_slots() {
    let mut cfg = GpuConfig::default();
    cfg.gpu_list = vec!["0".into(), "1".into(), "2".into()];
    cfg.allow_multi_gpu = true;
    assert_eq!(assign_gpu(&cfg, 1), GpuAssignment::Single("0".into()));
    assert_eq!(assign_gpu(&cfg, 2), GpuAssignment::Single("1".into()));
    assert_eq!(assign_gpu(&cfg, 3), GpuAssignment::Single("2".into()));
    assert_eq!(assign_gpu(&cfg, 4), GpuAssignment::Single("0".into()));
}

#[test]
fn single_gpu_mode_round_robins_from_slot_zero() {
    let mut cfg = GpuConfig::default();
    cfg.gpu_list = vec!["0".into(), "1".into()];
    cfg.allow_multi_gpu = false;
    assert_eq!(assign_gpu(&cfg, 0), GpuAssignment::Single("0".into()));
    assert_eq!(assign_gpu(&cfg, 1), GpuAssignment::Single("1".into()));
    assert_eq!(assign_gpu(&cfg, 2), GpuAssignment::Single("0".into()));
}

#[test]
fn as_env_value_renders_multi_as_comma_joined() {
    let assignment = GpuAssignment::Multi(vec!["0".into(), "1".into()]);
    assert_eq!(assignment.as_env_value(), Some("0,1".to_string()));
    assert_eq!(GpuAssignment::None.as_env_value(), None);
}

#[test]
fn slot_counter_increments_from_zero() {
    let mut counter = SlotCounter::new();
    assert_eq!(counter.next_slot(), 0);
    assert_eq!(counter.next_slot(), 1);
    assert_eq!(counter.next_slot(), 2);
}
