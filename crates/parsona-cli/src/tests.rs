use super::*;

const USER: &str = "6f1c2c1e-9a4b-4c1a-8d3e-2b7f5a9c0d11";

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["parsona-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["parsona-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn sync_requires_user() {
    assert!(Cli::try_parse_from(["parsona-cli", "sync"]).is_err());
}

#[test]
fn sync_rejects_malformed_user_id() {
    assert!(Cli::try_parse_from(["parsona-cli", "sync", "--user", "not-a-uuid"]).is_err());
}

#[test]
fn sync_with_file() {
    let cli = Cli::try_parse_from([
        "parsona-cli",
        "sync",
        "--user",
        USER,
        "--file",
        "activities.json",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Sync { user, file }) => {
            assert_eq!(user.to_string(), USER);
            assert_eq!(file, Some(PathBuf::from("activities.json")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn dashboard_defaults_to_founder() {
    let cli = Cli::try_parse_from(["parsona-cli", "dashboard", "--user", USER]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Dashboard { ref persona, .. }) if persona == DEFAULT_PERSONA
    ));
}

#[test]
fn dashboard_accepts_persona() {
    let cli = Cli::try_parse_from([
        "parsona-cli",
        "dashboard",
        "--user",
        USER,
        "--persona",
        "FREELANCER",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Dashboard { ref persona, .. }) if persona == "FREELANCER"
    ));
}

#[test]
fn parse_activities_accepts_bare_array() {
    let items = commands::parse_activities(r#"[{"text": "a"}, {"text": "b"}]"#).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn parse_activities_accepts_wrapped_array() {
    let items = commands::parse_activities(r#"{"activities": [{"likes": 3}]}"#).unwrap();
    assert_eq!(items[0]["likes"], 3);
}

#[test]
fn parse_activities_rejects_other_shapes() {
    assert!(commands::parse_activities(r#"{"items": []}"#).is_err());
    assert!(commands::parse_activities(r#"{"activities": 4}"#).is_err());
    assert!(commands::parse_activities("42").is_err());
    assert!(commands::parse_activities("not json").is_err());
}

#[test]
fn builtin_benchmarks_render_as_yaml() {
    let yaml = serde_yaml::to_string(&parsona_core::BenchmarkTable::builtin().to_file()).unwrap();
    assert!(yaml.contains("FOUNDER"));
    assert!(yaml.contains("ENGINEER_LEADER"));
}
