use super::*;

#[test]
fn appends_boolean_flag_when_absent() {
    let args = vec![("verbose".to_string(), ExtraArg::Flag(true))];
    assert_eq!(apply_extra_args("python train.py", &args), "python train.py --verbose");
}

#[test]
fn does_not_duplicate_existing_flag() {
    let args = vec![("verbose".to_string(), ExtraArg::Flag(true))];
    assert_eq!(
        apply_extra_args("python train.py --verbose", &args),
        "python train.py --verbose"
    );
}

#[test]
fn omits_false_flag() {
    let args = vec![("verbose".to_string(), ExtraArg::Flag(false))];
    assert_eq!(apply_extra_args("python train.py", &args), "python train.py");
}

#[test]
fn appends_new_value_arg() {
    let args = vec![("epochs".to_string(), ExtraArg::Value("10".into()))];
    assert_eq!(
        apply_extra_args("python train.py", &args),
        "python train.py --epochs=10"
    );
}

#[test]
fn replaces_existing_value_arg_with_equals_form() {
    let args = vec![("epochs".to_string(), ExtraArg::Value("20".into()))];
    assert_eq!(
        apply_extra_args("python train.py --epochs=10", &args),
        "python train.py --epochs=20"
    );
}

#[test]
fn replaces_existing_value_arg_with_space_form() {
    let args = vec![("epochs".to_string(), ExtraArg::Value("20".into()))];
    assert_eq!(
        apply_extra_args("python train.py --epochs 10 --lr 0.1", &args),
        "python train.py --epochs=20 --lr 0.1"
    );
}

#[test]
fn replacement_value_containing_dollar_sign_is_inserted_literally() {
    let args = vec![("data_dir".to_string(), ExtraArg::Value("$HOME/data".into()))];
    assert_eq!(
        apply_extra_args("python train.py --data_dir=/old", &args),
        "python train.py --data_dir=$HOME/data"
    );
}

#[test]
fn no_prefixes_leaves_command_untouched() {
    let prefixes = EnvPrefixes::default();
    assert_eq!(compose_effective_command("python train.py", &prefixes), "python train.py");
}

#[test]
fn setup_script_file_is_sourced() {
    let prefixes = EnvPrefixes {
        setup_script: Some("env.sh".to_string()),
        setup_script_is_file: true,
        conda_env: None,
    };
    assert_eq!(
        compose_effective_command("python train.py", &prefixes),
        "bash -c 'source env.sh && python train.py'"
    );
}

#[test]
fn setup_script_text_runs_directly() {
    let prefixes = EnvPrefixes {
        setup_script: Some("export FOO=1".to_string()),
        setup_script_is_file: false,
        conda_env: None,
    };
    assert_eq!(
        compose_effective_command("python train.py", &prefixes),
        "bash -c 'export FOO=1 && python train.py'"
    );
}

#[test]
fn conda_and_setup_script_combine_in_order() {
    let prefixes = EnvPrefixes {
        setup_script: Some("env.sh".to_string()),
        setup_script_is_file: true,
        conda_env: Some("torch".to_string()),
    };
    assert_eq!(
        compose_effective_command("python train.py", &prefixes),
        "bash -c 'source env.sh && conda activate torch && python train.py'"
    );
}

#[test]
fn extracts_run_id_from_wandb_line() {
    assert_eq!(
        extract_run_id("wandb: View run at https://wandb.ai/x/y/run-abc123"),
        Some("run-abc123".to_string())
    );
}

#[test]
fn run_id_requires_both_tokens() {
    assert_eq!(extract_run_id("plain log line"), None);
    assert_eq!(extract_run_id("run- without wandb token"), None);
}

#[test]
fn extracts_run_name_from_canonical_syncing_pattern() {
    assert_eq!(
        extract_run_name("wandb: Syncing run charming-wave-12"),
        Some("charming-wave-12".to_string())
    );
}

#[test]
fn extracts_run_name_from_lowercase_variant() {
    assert_eq!(
        extract_run_name("wandb: syncing run silly-dawn-3 other text"),
        Some("silly-dawn-3".to_string())
    );
}

#[test]
fn extracts_run_name_falling_back_to_whitespace_split() {
    assert_eq!(
        extract_run_name("wandb: started run eager-frost-9 now tracking"),
        Some("eager-frost-9".to_string())
    );
}

#[test]
fn rejects_empty_or_overlong_run_name() {
    assert_eq!(extract_run_name("wandb: Syncing run "), None);
    let long_name = "x".repeat(101);
    assert_eq!(
        extract_run_name(&format!("wandb: Syncing run {long_name}")),
        None
    );
}

#[test]
fn ignores_lines_without_syncing_marker() {
    assert_eq!(extract_run_name("wandb: some other message"), None);
}
