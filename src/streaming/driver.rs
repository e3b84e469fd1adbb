//! Async stream driver.

use futures_util::{Stream, StreamExt};

use crate::error::Result;
use crate::exchange::Exchange;

/// Feed every chunk of `stream` into `exchange` until it finishes.
///
/// Returns when a `done` frame has been applied or the stream ends with a
/// flushed terminal record. Chunks after `done` are not polled. A transport
/// error item, an `error` frame or an undecodable payload ends the exchange
/// with the corresponding [`StreamError`](crate::StreamError).
pub async fn drive<S, C, E>(mut exchange: Exchange<'_>, mut stream: S) -> Result<()>
where
    S: Stream<Item = std::result::Result<C, E>> + Unpin,
    C: AsRef<[u8]>,
    E: std::fmt::Display,
{
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                if exchange.push_bytes(chunk.as_ref())? {
                    tracing::debug!(phase = %exchange.phase(), "Exchange finished");
                    return Ok(());
                }
            }
            Err(e) => return Err(exchange.transport_error(e.to_string())),
        }
    }

    exchange.close()
}
