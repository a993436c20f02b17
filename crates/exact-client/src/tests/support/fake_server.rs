//! Scripted EXL server for behavioural tests.
//!
//! The server accepts one plaintext connection, answers each request line
//! with the next batch of canned replies, pushes any scripted notifications,
//! then keeps the connection open until the client hangs up.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Canned behaviour for one connection.
#[derive(Debug, Clone, Default)]
pub(in crate::tests) struct Script {
    exchanges: Vec<Vec<String>>,
    pushes: Vec<String>,
    hang_up: bool,
}

impl Script {
    /// Answers `count` requests with `ack`s echoing msgids 1..=count.
    pub fn acknowledging(count: u64) -> Self {
        Self {
            exchanges: (1..=count)
                .map(|msgid| vec![format!(r#"{{"response":"ack","msgid":{msgid}}}"#)])
                .collect(),
            ..Self::default()
        }
    }

    /// Answers one `listCells` request with a cell element per id.
    pub fn listing_cells(ids: &[&str]) -> Self {
        let mut replies = vec![String::from(r#"{"response":"begin","msgid":1}"#)];
        replies.extend(
            ids.iter()
                .map(|id| format!(r#"{{"response":"element","msgid":1,"id":"{id}"}}"#)),
        );
        replies.push(String::from(r#"{"response":"end","msgid":1}"#));
        Self {
            exchanges: vec![replies],
            ..Self::default()
        }
    }

    /// Answers one request with a server `error`.
    pub fn rejecting(code: i64) -> Self {
        Self {
            exchanges: vec![vec![format!(
                r#"{{"response":"error","msgid":1,"code":{code},"desc":"invalid credentials"}}"#
            )]],
            ..Self::default()
        }
    }

    /// Pushes `line` as soon as the client connects.
    pub fn pushing(line: impl Into<String>) -> Self {
        Self {
            pushes: vec![line.into()],
            ..Self::default()
        }
    }

    /// Reads one request and closes the connection without replying.
    pub fn hanging_up() -> Self {
        Self {
            exchanges: vec![Vec::new()],
            hang_up: true,
            ..Self::default()
        }
    }

    /// Answers one request with a frame of `size` bytes.
    pub fn oversized(size: usize) -> Self {
        let padding = "x".repeat(size.saturating_sub(30));
        Self {
            exchanges: vec![vec![format!(
                r#"{{"response":"ack","pad":"{padding}"}}"#
            )]],
            ..Self::default()
        }
    }
}

/// Handle to a running fake server.
pub(in crate::tests) struct FakeServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeServer {
    /// Starts serving `script` on an ephemeral port.
    pub fn spawn(script: Script) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || serve(&listener, &script, &recorded));
        Ok(Self {
            port,
            requests,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the connection to end and returns the request lines read.
    pub fn take_requests(&mut self) -> Result<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?
                .context("fake server failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(listener: &TcpListener, script: &Script, requests: &Mutex<Vec<String>>) -> Result<()> {
    let Some(stream) = accept(listener)? else {
        return Ok(());
    };
    stream
        .set_read_timeout(Some(IDLE_TIMEOUT))
        .context("server read timeout")?;
    let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
    let mut writer = stream;

    for replies in &script.exchanges {
        let Some(line) = read_request(&mut reader)? else {
            return Ok(());
        };
        record(requests, line)?;
        write_lines(&mut writer, replies).context("write replies")?;
    }
    write_lines(&mut writer, &script.pushes).context("write notifications")?;

    if script.hang_up {
        return Ok(());
    }
    while let Some(line) = read_request(&mut reader)? {
        record(requests, line)?;
    }
    Ok(())
}

fn accept(listener: &TcpListener) -> Result<Option<TcpStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .context("fake server blocking stream")?;
                return Ok(Some(stream));
            }
            Err(ref error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            // Scenarios without a connection leave the server unused.
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Result<Option<String>> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(line)),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            ) =>
        {
            Ok(None)
        }
        Err(error) => Err(error).context("read request"),
    }
}

fn record(requests: &Mutex<Vec<String>>, line: String) -> Result<()> {
    requests
        .lock()
        .map_err(|error| anyhow!("lock requests: {error}"))?
        .push(line);
    Ok(())
}

fn write_lines(stream: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
    }
    stream.flush()
}
