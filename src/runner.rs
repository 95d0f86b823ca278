//! Line-oriented event loop feeding the responder.

use std::borrow::Cow;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::irc::Privmsg;
use crate::responder::Squawker;
use crate::throttle::Clock;

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read
    pub lines: u64,
    /// Lines that parsed as `PRIVMSG`
    pub messages: u64,
    /// Replies written
    pub replies: u64,
}

/// Read IRC lines until EOF, writing a `PRIVMSG` line for every reply.
///
/// Lines that are not valid UTF-8 are decoded lossily.
pub async fn run<R, W, C>(
    mut reader: R,
    writer: &mut W,
    squawker: &Squawker<C>,
    network: &str,
) -> Result<RunStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    C: Clock,
{
    let mut stats = RunStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        stats.lines += 1;

        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            warn!(line = %line.trim_end(), "Line is not valid UTF-8, decoding lossily");
        }

        let Some(msg) = Privmsg::parse(&line) else {
            trace!(line = %line.trim_end(), "Skipping non-PRIVMSG line");
            continue;
        };
        stats.messages += 1;

        if let Some(reply) = squawker.handle(network, &msg) {
            debug!(target_name = %reply.target, "Sending reply");
            writer.write_all(format!("{}\r\n", reply).as_bytes()).await?;
            writer.flush().await?;
            stats.replies += 1;
        }
    }

    info!(
        lines = stats.lines,
        messages = stats.messages,
        replies = stats.replies,
        "Input closed"
    );
    Ok(stats)
}
