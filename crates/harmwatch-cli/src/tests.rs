use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["harmwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_extract_with_enqueue() {
    let cli = Cli::try_parse_from([
        "harmwatch-cli",
        "extract",
        "--file",
        "page.html",
        "--url",
        "https://example.com/p",
        "--enqueue",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Extract {
            ref file,
            ref url,
            enqueue: true,
        }) if file == &PathBuf::from("page.html") && url == "https://example.com/p"
    ));
}

#[test]
fn extract_requires_url() {
    assert!(Cli::try_parse_from(["harmwatch-cli", "extract", "--file", "page.html"]).is_err());
}

#[test]
fn parses_queue_status() {
    let cli = Cli::try_parse_from(["harmwatch-cli", "queue", "status"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Queue {
            command: QueueCommands::Status
        })
    ));
}

#[test]
fn queue_peek_defaults_to_ten() {
    let cli = Cli::try_parse_from(["harmwatch-cli", "queue", "peek"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Queue {
            command: QueueCommands::Peek { limit: 10 }
        })
    ));
}

#[test]
fn parses_flush() {
    let cli = Cli::try_parse_from(["harmwatch-cli", "flush"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Flush)));
}

#[test]
fn parses_feedback_label() {
    let cli = Cli::try_parse_from([
        "harmwatch-cli",
        "feedback",
        "--snippet",
        "some post",
        "--label",
        "Other",
        "--reason",
        "off-topic",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Feedback {
            label: FeedbackLabel::Other,
            post_id: None,
            ref reason,
            ..
        }) if reason.as_deref() == Some("off-topic")
    ));
}

#[test]
fn rejects_unknown_feedback_label() {
    assert!(Cli::try_parse_from([
        "harmwatch-cli",
        "feedback",
        "--snippet",
        "x",
        "--label",
        "meh"
    ])
    .is_err());
}
