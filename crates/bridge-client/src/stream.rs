//! Decoder for the bridge's push protocol.
//!
//! One background task per streaming call reads the response body line by
//! line and is the sole producer into the event channel. Events reach the
//! consumer in arrival order, and nothing follows the terminal event.
//! Dropping the [`CompletionStream`] closes the channel, which wakes the
//! task; the task returns and the body (and the connection under it) drops
//! with it, so an abandoned stream never leaks its connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::errors::{ClientError, ClientResult};
use crate::models::event::StreamEvent;
use crate::transport::BodyStream;

/// Marker in front of every meaningful protocol line.
const DATA_PREFIX: &str = "data: ";

/// Events in flight between the decoder task and a slow consumer.
const CHANNEL_CAPACITY: usize = 16;

/// Consumer half of a live completion stream.
///
/// Ceasing to read is the cancellation primitive: drop the handle and the
/// background decoder tears the connection down on its own.
#[derive(Debug)]
pub struct CompletionStream {
    events: ReceiverStream<StreamEvent>,
}

impl CompletionStream {
    /// Next event, or `None` once the stream has terminated.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.next().await
    }

    /// Collect the full answer: concatenates text fragments until the end
    /// marker, mapping an error event to [`ClientError::Stream`].
    pub async fn read_to_string(mut self) -> ClientResult<String> {
        let mut answer = String::new();
        while let Some(event) = self.recv().await {
            match event {
                StreamEvent::Text(fragment) => answer.push_str(&fragment),
                StreamEvent::End => return Ok(answer),
                StreamEvent::Error(cause) => return Err(ClientError::Stream(cause)),
            }
        }
        Err(ClientError::Stream(
            "event stream closed unexpectedly".to_string(),
        ))
    }
}

impl Stream for CompletionStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// Start decoding `body`. The returned handle is the queue's only consumer;
/// the spawned task is its only producer.
pub(crate) fn decode(body: BodyStream) -> CompletionStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(decode_loop(body, tx));
    CompletionStream {
        events: ReceiverStream::new(rx),
    }
}

#[derive(PartialEq)]
enum Publish {
    Continue,
    Done,
}

async fn decode_loop(mut body: BodyStream, tx: mpsc::Sender<StreamEvent>) {
    let mut buffered = BytesMut::new();

    loop {
        let chunk = tokio::select! {
            // Consumer dropped the handle; stop reading so the body drops
            // with this task.
            _ = tx.closed() => return,
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                buffered.extend_from_slice(&bytes);
                while let Some(line) = next_line(&mut buffered) {
                    if publish_line(&tx, &line).await == Publish::Done {
                        return;
                    }
                }
            }
            Some(Err(err)) => {
                tracing::warn!("stream read failed: {}", err);
                let _ = tx
                    .send(StreamEvent::Error(format!("error reading stream: {}", err)))
                    .await;
                return;
            }
            None => {
                // A final line without a trailing newline still counts.
                if !buffered.is_empty() {
                    let line = trim_cr(buffered.split());
                    if publish_line(&tx, &line).await == Publish::Done {
                        return;
                    }
                }
                let _ = tx
                    .send(StreamEvent::Error(
                        "stream closed before the completion finished".to_string(),
                    ))
                    .await;
                return;
            }
        }
    }
}

/// Decode one line and publish its event, if any. `Done` means decoding is
/// over: a terminal or malformed frame was seen, or the consumer is gone.
async fn publish_line(tx: &mpsc::Sender<StreamEvent>, line: &Bytes) -> Publish {
    let line = String::from_utf8_lossy(line);
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        // Protocol padding such as comments or keep-alive blanks.
        return Publish::Continue;
    };
    if payload.is_empty() {
        return Publish::Continue;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => {
            let terminal = event.is_terminal();
            if tx.send(event).await.is_err() || terminal {
                Publish::Done
            } else {
                Publish::Continue
            }
        }
        Err(err) => {
            tracing::warn!("malformed stream event: {}", err);
            let _ = tx
                .send(StreamEvent::Error(format!(
                    "error parsing stream event: {}",
                    err
                )))
                .await;
            Publish::Done
        }
    }
}

/// Split one newline-terminated line off the front of `buffered`, dropping
/// the newline and any trailing carriage return.
fn next_line(buffered: &mut BytesMut) -> Option<Bytes> {
    let end = buffered.iter().position(|&b| b == b'\n')?;
    let mut line = buffered.split_to(end + 1);
    line.truncate(end);
    Some(trim_cr(line))
}

fn trim_cr(mut line: BytesMut) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.freeze()
}
