//! Line-oriented transport for running the bot in a terminal.
//!
//! Every non-empty input line becomes a [`ChatEvent`] from a single local
//! user. Replies are written back one message per line.

use std::{
    io::{self, BufRead},
    sync::Mutex as StdMutex,
    thread,
};

use {
    async_trait::async_trait,
    graceless_channels::{ChatEvent, ChatUser, Error, Result, Transport},
    graceless_common::ErrorSender,
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines},
        sync::{Mutex, mpsc},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

/// Conversation ID used for everything typed into the console.
pub const CONSOLE_ORIGIN: &str = "console";

/// Lines buffered between the reader thread and the tunnel.
const LINE_BUFFER: usize = 16;

type Reader = Box<dyn AsyncBufRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

enum Input {
    Async(Lines<Reader>),
    /// Fed by a dedicated OS thread. A blocked read there never holds up
    /// runtime shutdown.
    Thread(mpsc::Receiver<io::Result<String>>),
}

impl Input {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        match self {
            Self::Async(lines) => lines.next_line().await,
            Self::Thread(rx) => rx.recv().await.transpose(),
        }
    }
}

pub struct ConsoleTransport {
    local: ChatUser,
    input: StdMutex<Option<Input>>,
    writer: Mutex<Writer>,
}

impl ConsoleTransport {
    pub fn new(
        local: ChatUser,
        reader: impl AsyncBufRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        let reader: Reader = Box::new(reader);
        Self::with_input(local, Input::Async(reader.lines()), writer)
    }

    /// Read `reader` line by line on its own thread.
    pub fn blocking(
        local: ChatUser,
        reader: impl BufRead + Send + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self::with_input(local, Input::Thread(rx), writer))
    }

    /// Console bound to the process's stdin and stdout.
    pub fn stdio(local: ChatUser) -> Result<Self> {
        Self::blocking(local, io::BufReader::new(io::stdin()), tokio::io::stdout())
    }

    fn with_input(
        local: ChatUser,
        input: Input,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            local,
            input: StdMutex::new(Some(input)),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn local_user(&self) -> &ChatUser {
        &self.local
    }

    fn take_input(&self) -> Option<Input> {
        self.input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn id(&self) -> &str {
        "console"
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<()> {
        let line = if to == CONSOLE_ORIGIN {
            format!("{text}\n")
        } else {
            format!("[{to}] {text}\n")
        };
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<ChatUser> {
        if id == self.local.id {
            Ok(self.local.clone())
        } else {
            Err(Error::unknown_user(id))
        }
    }

    async fn get_users(&self) -> Result<Vec<ChatUser>> {
        Ok(vec![self.local.clone()])
    }

    async fn get_conversation(&self, user_id: &str) -> Result<String> {
        if user_id == self.local.id {
            Ok(CONSOLE_ORIGIN.to_string())
        } else {
            Err(Error::unknown_user(user_id))
        }
    }

    async fn tunnel_events(
        &self,
        cancel: CancellationToken,
        events: mpsc::Sender<ChatEvent>,
        errors: ErrorSender,
    ) {
        let Some(mut input) = self.take_input() else {
            errors.report(Error::unavailable("console input already consumed"));
            return;
        };
        info!(user = self.local.label(), "console ready");

        loop {
            let line = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                line = input.next_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    let body = line.trim();
                    if body.is_empty() {
                        continue;
                    }
                    let event = ChatEvent::new(CONSOLE_ORIGIN, self.local.clone(), body);
                    if events.send(event).await.is_err() {
                        debug!("event receiver dropped");
                        break;
                    }
                },
                Ok(None) => {
                    debug!("console input closed");
                    break;
                },
                Err(e) => {
                    errors.report(Error::from(e));
                    break;
                },
            }
        }
    }
}
