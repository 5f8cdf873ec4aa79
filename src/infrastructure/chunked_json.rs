// Chunked newline-delimited JSON streaming utilities
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

/// Create a chunked response with one JSON document per line
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(msg, compress).await });

    // Chunks are compressed one by one, so no Content-Encoding for the whole body.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one message into a newline-terminated chunk.
///
/// Compressed chunks are instead prefixed with their 4-byte big-endian length.
async fn serialize_chunk<T: Serialize>(msg: T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&msg)?;

    if compress {
        let payload = brotli_compress(&json).await?;
        let length = u32::try_from(payload.len())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut chunk = BytesMut::with_capacity(4 + payload.len());
        chunk.put_u32(length);
        chunk.put_slice(&payload);
        Ok(chunk.freeze())
    } else {
        let mut chunk = BytesMut::with_capacity(json.len() + 1);
        chunk.put_slice(&json);
        chunk.put_u8(b'\n');
        Ok(chunk.freeze())
    }
}

/// Turn every value the receiver observes into a streamed response
pub fn stream_from_watch<T, U, F>(
    rx: tokio::sync::watch::Receiver<T>,
    compress: bool,
    map: F,
) -> impl IntoResponse
where
    T: Clone + Send + Sync + 'static,
    U: Serialize + Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    let mut updates = tokio_stream::wrappers::WatchStream::new(rx);
    let stream = async_stream::stream! {
        while let Some(value) = updates.next().await {
            yield map(value);
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
