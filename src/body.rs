use crate::store::ByteStream;
use http_body_util::{combinators::BoxBody, BodyExt, Full, StreamBody};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio_stream::{Stream, StreamExt};

pub type StreamItem = Result<Frame<Bytes>, io::Error>;

pub type BoxStream = Pin<Box<dyn Stream<Item = StreamItem> + Send>>;

pub enum ResponseBody {
    Box(BoxBody<Bytes, io::Error>),
    Stream(StreamBody<BoxStream>),
}

impl ResponseBody {
    pub fn full<T: Into<Bytes>>(chunk: T) -> Self {
        ResponseBody::Box(
            Full::new(chunk.into())
                .map_err(|never| match never {})
                .boxed(),
        )
    }

    /// Each chunk becomes one data frame.
    pub fn stream(raw: ByteStream) -> Self {
        let frames: BoxStream = Box::pin(raw.map(|chunk| chunk.map(Frame::data)));
        ResponseBody::Stream(StreamBody::new(frames))
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut *self.get_mut() {
            Self::Box(b) => Pin::new(&mut *b).poll_frame(cx),
            Self::Stream(s) => Pin::new(&mut *s).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Box(b) => b.is_end_stream(),
            Self::Stream(s) => s.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Box(b) => b.size_hint(),
            Self::Stream(_) => SizeHint::default(),
        }
    }
}
