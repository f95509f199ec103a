/// Commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Check,
}

/// Parse the command at the start of a message.
///
/// Accepts the `/cmd@botname` form used in groups and ignores trailing
/// arguments.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);

    match name {
        "start" => Some(BotCommand::Start),
        "check" => Some(BotCommand::Check),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_commands() {
        assert_eq!(parse_command("/start"), Some(BotCommand::Start));
        assert_eq!(parse_command("/check"), Some(BotCommand::Check));
        assert_eq!(parse_command("  /check  "), Some(BotCommand::Check));
    }

    #[test]
    fn test_addressed_and_with_args() {
        assert_eq!(parse_command("/check@class_bot"), Some(BotCommand::Check));
        assert_eq!(parse_command("/check now please"), Some(BotCommand::Check));
    }

    #[test]
    fn test_not_commands() {
        assert_eq!(parse_command("check"), None);
        assert_eq!(parse_command("/checkout"), None);
        assert_eq!(parse_command("/help"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("hello /check"), None);
    }
}
