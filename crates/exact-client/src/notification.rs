//! Passive notification listening.
//!
//! [`ExactClient::listen`] turns the connection into a notification stream:
//! every frame is decoded as a [`Notification`] and handed to the callback on
//! the reading thread. The loop polls the socket with a short timeout so a
//! [`StopHandle`] raised from another thread or a signal handler is noticed
//! between frames. [`NotificationFeed`] moves the loop onto a worker thread
//! and delivers notifications through a bounded channel instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::Notification;

const NOTIFICATION_TARGET: &str = "exact_client::notification";

/// Read timeout used while listening, bounding how long a stop request
/// waits to be observed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Whether the notification loop is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationState {
    #[default]
    Stopped,
    Running,
}

/// Shared handle that asks a notification loop to return and reports
/// whether one is running.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Clears the stop request so the handle can drive a later loop.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }

    /// Stop flag, for registration with signal handlers.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// State of the loop driven by this handle.
    #[must_use]
    pub fn state(&self) -> NotificationState {
        if self.running.load(Ordering::SeqCst) {
            NotificationState::Running
        } else {
            NotificationState::Stopped
        }
    }
}

/// Marks a handle as running until dropped, so a panicking callback still
/// leaves it stopped.
struct RunningGuard<'a>(&'a StopHandle);

impl<'a> RunningGuard<'a> {
    fn enter(handle: &'a StopHandle) -> Self {
        handle.running.store(true, Ordering::SeqCst);
        Self(handle)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::SeqCst);
    }
}

impl ExactClient {
    /// Reads notifications until `stop` is raised or a read fails.
    ///
    /// `stop` reports [`NotificationState::Running`] for as long as the loop
    /// runs, including while `on_notification` executes. Returns immediately when `stop` is already raised or no connection
    /// is open. The configured read timeout is restored on return.
    ///
    /// # Errors
    ///
    /// Returns the first transport or decode failure; a malformed
    /// notification ends the loop.
    pub fn listen<F>(&mut self, stop: &StopHandle, mut on_notification: F) -> Result<(), ClientError>
    where
        F: FnMut(Notification),
    {
        if !self.transport.is_open() {
            debug!(target: NOTIFICATION_TARGET, "not connected; nothing to listen to");
            return Ok(());
        }

        self.transport.set_read_timeout(Some(POLL_INTERVAL))?;
        let running = RunningGuard::enter(stop);
        info!(target: NOTIFICATION_TARGET, "notification loop running");

        let outcome = loop {
            if stop.is_stopped() {
                break Ok(());
            }
            match self.transport.read_record() {
                Ok(record) => on_notification(Notification::from(record)),
                Err(error) if error.is_read_timeout() => {}
                Err(error) => break Err(error),
            }
        };

        drop(running);
        match &outcome {
            Ok(()) => info!(target: NOTIFICATION_TARGET, "notification loop stopped"),
            Err(error) => info!(
                target: NOTIFICATION_TARGET,
                %error,
                "notification loop ended by read failure"
            ),
        }
        let restored = if self.transport.is_open() {
            self.transport.reset_read_timeout()
        } else {
            Ok(())
        };
        outcome.and(restored)
    }
}

/// Notification loop running on a worker thread that owns the client.
#[derive(Debug)]
pub struct NotificationFeed {
    receiver: Receiver<Notification>,
    stop: StopHandle,
    worker: Option<JoinHandle<Result<ExactClient, ClientError>>>,
}

impl NotificationFeed {
    /// Starts listening on a worker thread.
    ///
    /// At most `capacity` notifications are queued; the worker stops
    /// reading while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Spawn`] when the thread cannot be started.
    pub fn spawn(mut client: ExactClient, capacity: usize) -> Result<Self, ClientError> {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let stop = StopHandle::new();
        let worker_stop = stop.clone();
        let worker = thread::Builder::new()
            .name(String::from("exact-notifications"))
            .spawn(move || {
                client.listen(&worker_stop, |notification| {
                    if sender.send(notification).is_err() {
                        worker_stop.stop();
                    }
                })?;
                Ok(client)
            })
            .map_err(ClientError::Spawn)?;
        Ok(Self {
            receiver,
            stop,
            worker: Some(worker),
        })
    }

    /// Blocks for the next notification; `None` once the worker has ended.
    #[must_use]
    pub fn recv(&self) -> Option<Notification> {
        self.receiver.recv().ok()
    }

    /// Waits at most `timeout` for the next notification.
    ///
    /// # Errors
    ///
    /// Returns [`RecvTimeoutError`] on timeout or once the worker has ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Notification, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Returns a queued notification without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError`] when the queue is empty or the worker ended.
    pub fn try_recv(&self) -> Result<Notification, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Iterates until the worker ends.
    pub fn iter(&self) -> impl Iterator<Item = Notification> + '_ {
        self.receiver.iter()
    }

    /// Handle that stops the worker loop.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// State of the worker's loop.
    #[must_use]
    pub fn state(&self) -> NotificationState {
        self.stop.state()
    }

    /// Stops the worker, discards undelivered notifications and returns
    /// the client, or the failure that ended the loop.
    ///
    /// # Errors
    ///
    /// Returns the loop's read failure, or [`ClientError::WorkerPanicked`].
    pub fn join(mut self) -> Result<ExactClient, ClientError> {
        self.stop.stop();
        let Some(worker) = self.worker.take() else {
            return Err(ClientError::WorkerPanicked);
        };
        self.receiver.iter().for_each(drop);
        worker.join().map_err(|_| ClientError::WorkerPanicked)?
    }
}

impl Drop for NotificationFeed {
    fn drop(&mut self) {
        self.stop.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn stop_handle_clones_share_the_flag() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
        handle.reset();
        assert!(!clone.is_stopped());
        assert!(!handle.flag().load(Ordering::SeqCst));
        assert_eq!(handle.state(), NotificationState::Stopped);
    }

    #[test]
    fn listening_offline_returns_immediately() {
        let mut client = ExactClient::from_config(&exact_config::Config::default());
        let mut calls = 0;
        client
            .listen(&StopHandle::new(), |_| calls += 1)
            .expect("offline listen");
        assert_eq!(calls, 0);
    }

    fn pushing_server(lines: &'static [&'static str]) -> (u16, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            for line in lines {
                stream.write_all(line.as_bytes()).expect("push");
            }
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("timeout");
            let _ = stream.read(&mut [0_u8; 64]);
        });
        (port, handle)
    }

    fn connected_client(port: u16) -> ExactClient {
        let config = exact_config::Config {
            server: exact_config::ServerEndpoint::tcp("127.0.0.1", port),
            ..exact_config::Config::default()
        };
        let mut client = ExactClient::from_config(&config);
        client.connect().expect("connect");
        client
    }

    #[test]
    fn handle_reports_running_while_the_loop_runs() {
        let (port, server) = pushing_server(&["{\"channel\":\"debug\",\"msg\":\"a\"}\n"]);
        let mut client = connected_client(port);
        let stop = StopHandle::new();
        let mut seen = Vec::new();

        client
            .listen(&stop, |_| {
                seen.push(stop.state());
                stop.stop();
            })
            .expect("listen");

        assert_eq!(seen, [NotificationState::Running]);
        assert_eq!(stop.state(), NotificationState::Stopped);
        client.disconnect();
        server.join().expect("server thread");
    }

    #[test]
    fn feed_exposes_worker_state() {
        let (port, server) = pushing_server(&["{\"channel\":\"debug\",\"msg\":\"a\"}\n"]);
        let feed = NotificationFeed::spawn(connected_client(port), 4).expect("spawn");
        let handle = feed.stop_handle();

        let first = feed.recv_timeout(Duration::from_secs(5)).expect("notification");
        assert_eq!(first.channel_name(), Some("debug"));
        assert_eq!(feed.state(), NotificationState::Running);

        let mut client = feed.join().expect("join");
        assert_eq!(handle.state(), NotificationState::Stopped);
        client.disconnect();
        server.join().expect("server thread");
    }
}
