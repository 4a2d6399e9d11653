use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ssh2::Session;
use tracing::{debug, info, warn};

use crate::error::{DeployError, Result};
use crate::remote::{CommandOutput, RemoteShell};

/// Pause between polls when neither output stream had data.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub private_key: Option<PathBuf>,
    pub timeout: Duration,
}

pub struct SshShell {
    session: Session,
    host: String,
}

impl SshShell {
    /// One connection attempt: TCP connect within the timeout, handshake,
    /// then key or password authentication. The timeout only covers these
    /// steps; remote commands may run for as long as they need.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                DeployError::InvalidArg(format!("cannot resolve host {}", config.host))
            })?;

        let tcp = TcpStream::connect_timeout(&addr, config.timeout)?;
        tcp.set_read_timeout(Some(config.timeout)).ok();
        tcp.set_write_timeout(Some(config.timeout)).ok();
        let socket = tcp.try_clone()?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_millis(config.timeout));
        session.handshake()?;

        if let Some(key) = config.private_key.as_deref() {
            session.userauth_pubkey_file(&config.user, None, key, None)?;
        } else if let Some(password) = config.password.as_deref() {
            session.userauth_password(&config.user, password)?;
        }

        if !session.authenticated() {
            return Err(DeployError::AuthFailed {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }
        clear_timeouts(&session, &socket)?;

        info!(host = %config.host, user = %config.user, "SSH connection established");
        Ok(Self {
            session,
            host: config.host.clone(),
        })
    }
}

fn timeout_millis(timeout: Duration) -> u32 {
    timeout.as_millis().min(u128::from(u32::MAX)) as u32
}

/// Drops the connect timeout from the session and its socket.
fn clear_timeouts(session: &Session, socket: &TcpStream) -> io::Result<()> {
    session.set_timeout(0);
    socket.set_read_timeout(None)?;
    socket.set_write_timeout(None)
}

/// Fills `buf` from one read. Returns whether any bytes arrived.
fn pump<R: Read>(stream: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    let mut chunk = [0u8; 8192];
    match stream.read(&mut chunk) {
        Ok(0) => Ok(false),
        Ok(n) => {
            buf.extend_from_slice(&chunk[..n]);
            Ok(true)
        }
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Reads stdout and stderr in turn so neither stream can stall the other.
/// Stops once a pass reads nothing and `finished` reports the channel closed.
fn read_interleaved<O, E, F>(
    stdout: &mut O,
    stderr: &mut E,
    mut finished: F,
) -> io::Result<(Vec<u8>, Vec<u8>)>
where
    O: Read,
    E: Read,
    F: FnMut() -> bool,
{
    let mut out = Vec::new();
    let mut err = Vec::new();
    loop {
        let read_out = pump(stdout, &mut out)?;
        let read_err = pump(stderr, &mut err)?;
        if read_out || read_err {
            continue;
        }
        if finished() {
            return Ok((out, err));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

impl RemoteShell for SshShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;

        let mut stdout = channel.stream(0);
        let mut stderr = channel.stderr();
        self.session.set_blocking(false);
        let read = read_interleaved(&mut stdout, &mut stderr, || channel.eof());
        self.session.set_blocking(true);
        let (stdout, stderr) = read?;

        channel.wait_close()?;
        let exit_status = channel.exit_status()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        })
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        let contents = std::fs::read(local)?;
        self.write_file(&contents, remote)
    }

    fn write_file(&mut self, contents: &[u8], remote: &str) -> Result<()> {
        let sftp = self.session.sftp()?;
        let mut file = sftp.create(Path::new(remote))?;
        file.write_all(contents)?;
        debug!(%remote, bytes = contents.len(), "Wrote remote file");
        Ok(())
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        match self.session.disconnect(None, "bye", None) {
            Ok(()) => debug!(host = %self.host, "SSH connection closed"),
            Err(err) => warn!(host = %self.host, error = %err, "Failed to close SSH connection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::net::TcpListener;
    use std::rc::Rc;

    use super::*;

    enum Step {
        Data(&'static [u8]),
        Block,
    }

    /// Replays a script of reads, then reports end of stream.
    struct Scripted {
        steps: VecDeque<Step>,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                Some(Step::Data(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                Some(Step::Block) => Err(io::ErrorKind::WouldBlock.into()),
                None => Ok(0),
            }
        }
    }

    /// Stdout that stays blocked until the stderr reader has drained.
    struct WaitsForStderr {
        stderr_done: Rc<Cell<bool>>,
        eof: Rc<Cell<bool>>,
        sent: bool,
    }

    impl Read for WaitsForStderr {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.stderr_done.get() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            if self.sent {
                self.eof.set(true);
                return Ok(0);
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"done");
            Ok(4)
        }
    }

    struct FlagOnEof {
        inner: Scripted,
        done: Rc<Cell<bool>>,
    }

    impl Read for FlagOnEof {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            if n == 0 {
                self.done.set(true);
            }
            Ok(n)
        }
    }

    #[test]
    fn collects_both_streams_across_blocked_reads() {
        let mut stdout = Scripted::new(vec![Step::Block, Step::Data(b"up"), Step::Data(b"\n")]);
        let mut stderr = Scripted::new(vec![Step::Data(b"npm WARN"), Step::Block]);
        let (out, err) = read_interleaved(&mut stdout, &mut stderr, || true).unwrap();
        assert_eq!(out, b"up\n");
        assert_eq!(err, b"npm WARN");
    }

    #[test]
    fn stderr_is_drained_while_stdout_waits() {
        let stderr_done = Rc::new(Cell::new(false));
        let stdout_done = Rc::new(Cell::new(false));
        let mut stdout = WaitsForStderr {
            stderr_done: stderr_done.clone(),
            eof: stdout_done.clone(),
            sent: false,
        };
        let mut stderr = FlagOnEof {
            inner: Scripted::new(vec![Step::Data(b"warning 1\n"), Step::Data(b"warning 2\n")]),
            done: stderr_done.clone(),
        };
        let (out, err) = read_interleaved(&mut stdout, &mut stderr, || {
            stdout_done.get() && stderr_done.get()
        })
        .unwrap();
        assert_eq!(out, b"done");
        assert_eq!(err, b"warning 1\nwarning 2\n");
    }

    #[test]
    fn waits_for_channel_close_before_returning() {
        let mut polls = 0;
        let mut stdout = Scripted::new(vec![Step::Data(b"a")]);
        let mut stderr = Scripted::new(Vec::new());
        let (out, _) = read_interleaved(&mut stdout, &mut stderr, || {
            polls += 1;
            polls == 3
        })
        .unwrap();
        assert_eq!(out, b"a");
        assert_eq!(polls, 3);
    }

    #[test]
    fn read_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("channel reset"))
            }
        }
        let mut stderr = Scripted::new(Vec::new());
        let err = read_interleaved(&mut Broken, &mut stderr, || true).unwrap_err();
        assert_eq!(err.to_string(), "channel reset");
    }

    #[test]
    fn connect_timeout_is_cleared_after_authentication() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let socket = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(30))).unwrap();
        socket.set_write_timeout(Some(Duration::from_secs(30))).unwrap();

        let session = Session::new().unwrap();
        session.set_timeout(timeout_millis(Duration::from_secs(30)));
        assert_eq!(session.timeout(), 30_000);

        clear_timeouts(&session, &socket).unwrap();
        assert_eq!(session.timeout(), 0);
        assert_eq!(socket.read_timeout().unwrap(), None);
        assert_eq!(socket.write_timeout().unwrap(), None);
    }

    #[test]
    fn timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_secs(30)), 30_000);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
