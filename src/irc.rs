//! Minimal IRC line handling: inbound `PRIVMSG` parsing and reply formatting.

/// An inbound `PRIVMSG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privmsg {
    /// Sender nick, empty when the line carried no prefix
    pub nick: String,
    /// Channel or nick the message was sent to
    pub target: String,
    /// Message body
    pub text: String,
}

impl Privmsg {
    /// Parse a raw line of the form
    /// `[@tags ][:nick[!user@host] ]PRIVMSG <target> :<text>`.
    ///
    /// Message tags are skipped. Returns `None` for any other command or a
    /// malformed line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let line = match line.strip_prefix('@') {
            Some(tagged) => tagged.split_once(' ')?.1.trim_start(),
            None => line,
        };

        let (nick, rest) = match line.strip_prefix(':') {
            Some(prefixed) => {
                let (prefix, rest) = prefixed.split_once(' ')?;
                let nick = prefix.split(['!', '@']).next().unwrap_or_default();
                (nick, rest.trim_start())
            }
            None => ("", line),
        };

        let (command, params) = rest.split_once(' ')?;
        if !command.eq_ignore_ascii_case("PRIVMSG") {
            return None;
        }

        let (target, text) = params.trim_start().split_once(' ')?;
        let text = text.trim_start();
        let text = text.strip_prefix(':').unwrap_or(text);
        if target.is_empty() {
            return None;
        }

        Some(Self {
            nick: nick.to_string(),
            target: target.to_string(),
            text: text.to_string(),
        })
    }
}

/// An outbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Where the reply goes
    pub target: String,
    /// Reply body
    pub text: String,
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PRIVMSG {} :{}", self.target, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_prefix() {
        let msg = Privmsg::parse(":alice!~alice@example.org PRIVMSG #chan :hello there\r\n").unwrap();

        assert_eq!(msg.nick, "alice");
        assert_eq!(msg.target, "#chan");
        assert_eq!(msg.text, "hello there");
    }

    #[test]
    fn test_parse_bare_nick_prefix() {
        let msg = Privmsg::parse(":bob PRIVMSG bot :hi").unwrap();

        assert_eq!(msg.nick, "bob");
        assert_eq!(msg.target, "bot");
    }

    #[test]
    fn test_parse_without_prefix() {
        let msg = Privmsg::parse("privmsg #chan :x").unwrap();

        assert_eq!(msg.nick, "");
        assert_eq!(msg.target, "#chan");
        assert_eq!(msg.text, "x");
    }

    #[test]
    fn test_parse_skips_message_tags() {
        let msg = Privmsg::parse(
            "@time=2024-01-01T00:00:00.000Z;account=alice :alice!a@host PRIVMSG #chan :hi\r\n",
        )
        .unwrap();

        assert_eq!(msg.nick, "alice");
        assert_eq!(msg.target, "#chan");
        assert_eq!(msg.text, "hi");

        let bare = Privmsg::parse("@msgid=abc PRIVMSG #chan :hi").unwrap();
        assert_eq!(bare.nick, "");
        assert!(Privmsg::parse("@time=x").is_none());
    }

    #[test]
    fn test_parse_trailing_without_colon() {
        let msg = Privmsg::parse(":carol PRIVMSG #chan word").unwrap();
        assert_eq!(msg.text, "word");
    }

    #[test]
    fn test_parse_rejects_other_commands() {
        assert!(Privmsg::parse(":alice JOIN #chan").is_none());
        assert!(Privmsg::parse("PING :server").is_none());
        assert!(Privmsg::parse(":alice NOTICE #chan :hi").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Privmsg::parse("").is_none());
        assert!(Privmsg::parse(":alice").is_none());
        assert!(Privmsg::parse(":alice PRIVMSG").is_none());
        assert!(Privmsg::parse(":alice PRIVMSG #chan").is_none());
    }

    #[test]
    fn test_reply_display() {
        let reply = Reply {
            target: "#chan".to_string(),
            text: "squawk!".to_string(),
        };
        assert_eq!(reply.to_string(), "PRIVMSG #chan :squawk!");
    }
}
