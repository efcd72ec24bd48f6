use super::*;
use crate::core::config::DEFAULT_ENDPOINT;
use crate::core::protocol::InboundFormat;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["paquera"]);
    assert!(args.command.is_none());
    assert!(args.log.is_none());
    assert!(args.debug_log.is_none());
}

#[test]
fn global_flags_work_after_subcommands() {
    let args = parse_args(&["paquera", "chat", "-p", "anna", "--log", "chat.txt"]);
    assert_eq!(args.command, Some(Commands::Chat));
    assert_eq!(args.personality.as_deref(), Some("anna"));
    assert_eq!(args.log.as_deref(), Some("chat.txt"));
}

#[test]
fn set_accepts_optional_key_and_value() {
    let args = parse_args(&["paquera", "set", "endpoint", "ws://example.test/ws"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: Some("endpoint".into()),
            value: Some("ws://example.test/ws".into()),
        })
    );

    let args = parse_args(&["paquera", "set"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: None,
            value: None
        })
    );
}

#[test]
fn unset_requires_a_key() {
    assert!(Args::try_parse_from(["paquera", "unset"]).is_err());
    let args = parse_args(&["paquera", "unset", "endpoint"]);
    assert_eq!(
        args.command,
        Some(Commands::Unset {
            key: "endpoint".into()
        })
    );
}

#[test]
fn chat_options_fall_back_to_config_then_defaults() {
    let args = parse_args(&["paquera"]);
    let mut config = Config::default();
    if args.endpoint.is_none() {
        let options = resolve_chat_options(&args, &config).expect("defaults resolve");
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
    }

    config.endpoint = Some("wss://chat.example/ws".into());
    config.default_personality = Some("cynthia".into());
    config.inbound_format = Some(InboundFormat::Tagged);
    let options = resolve_chat_options(&args, &config).expect("config resolves");
    assert_eq!(options.personality.id, "cynthia");
    assert_eq!(options.inbound_format, InboundFormat::Tagged);
    if args.endpoint.is_none() {
        assert_eq!(options.endpoint, "wss://chat.example/ws");
    }
}

#[test]
fn flags_override_config() {
    let args = parse_args(&[
        "paquera",
        "--endpoint",
        "ws://127.0.0.1:9000/ws",
        "--personality",
        "Chler",
    ]);
    let config = Config {
        endpoint: Some("wss://chat.example/ws".into()),
        default_personality: Some("anna".into()),
        ..Config::default()
    };
    let options = resolve_chat_options(&args, &config).expect("flags resolve");
    assert_eq!(options.endpoint, "ws://127.0.0.1:9000/ws");
    assert_eq!(options.personality.id, "chler");
}

#[test]
fn invalid_flags_are_reported() {
    let config = Config::default();
    let args = parse_args(&["paquera", "--personality", "hitch"]);
    assert!(resolve_chat_options(&args, &config).is_err());

    let args = parse_args(&["paquera", "--endpoint", "http://example.test"]);
    let err = resolve_chat_options(&args, &config).err().expect("bad scheme");
    assert!(err.contains("ws://"));
}
