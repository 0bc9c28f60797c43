use crate::{SerialError, framing};
use tokio::io::{AsyncRead, AsyncWrite, BufReader, ReadHalf, WriteHalf};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

const LINE_QUEUE_DEPTH: usize = 64;

type LineResult = Result<String, SerialError>;

/// Bidirectional line channel to the controller.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Return the next complete line if one is buffered, without waiting.
    ///
    /// `Ok(None)` means nothing has arrived yet. Errors for which
    /// `SerialError::is_fatal()` is false affect only the line that caused them.
    fn try_read_line(&mut self) -> Result<Option<String>, SerialError>;

    /// Send `text` as one newline-terminated line.
    async fn write_line(&mut self, text: &str) -> Result<(), SerialError>;
}

/// `Transport` over any async byte stream.
///
/// A background task frames inbound bytes into lines and queues them, so
/// `try_read_line` is a plain channel poll. The write half stays here and is
/// written inline by the caller.
pub struct SerialLink<S> {
    lines: mpsc::Receiver<LineResult>,
    writer: WriteHalf<S>,
    reader_task: JoinHandle<()>,
}

impl<S> SerialLink<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Split `stream` and start the reader task. Must be called inside a tokio runtime.
    pub fn new(stream: S) -> Self {
        let (read_half, writer) = tokio::io::split(stream);
        let (tx, lines) = mpsc::channel(LINE_QUEUE_DEPTH);
        let reader_task = tokio::spawn(read_loop(BufReader::new(read_half), tx));
        Self {
            lines,
            writer,
            reader_task,
        }
    }
}

async fn read_loop(mut reader: BufReader<ReadHalf<impl AsyncRead>>, tx: mpsc::Sender<LineResult>) {
    loop {
        let result = framing::read_line(&mut reader).await;
        let fatal = matches!(&result, Err(e) if e.is_fatal());
        if tx.send(result).await.is_err() || fatal {
            break;
        }
    }
}

impl<S> Transport for SerialLink<S>
where
    S: AsyncRead + AsyncWrite,
{
    fn try_read_line(&mut self) -> Result<Option<String>, SerialError> {
        match self.lines.try_recv() {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(e)) => Err(e),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SerialError::ConnectionClosed),
        }
    }

    async fn write_line(&mut self, text: &str) -> Result<(), SerialError> {
        framing::write_line(&mut self.writer, text).await
    }
}

impl<S> Drop for SerialLink<S> {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Open a serial port at 8N1 and wrap it in a `SerialLink`.
pub fn open(port: &str, baud_rate: u32) -> Result<SerialLink<SerialStream>, SerialError> {
    let stream = tokio_serial::new(port, baud_rate).open_native_async()?;
    log::info!("opened serial port {} at {} baud", port, baud_rate);
    Ok(SerialLink::new(stream))
}

