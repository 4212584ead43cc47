//! The receive/dispatch/send loop.
//!
//! Strictly one request at a time: wait for a frame, run it through the
//! engine, put the reply on the wire, repeat. Termination signals race the
//! receive and flip the loop out cleanly; an in-flight dispatch always
//! completes.

use std::io;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, trace, warn};

use crate::engine::Engine;
use crate::link::Link;
use crate::proto::RECV_BUFFER_LEN;

/// Serves frames until SIGTERM, SIGINT or SIGQUIT arrives.
pub async fn serve<L: Link>(link: &mut L, engine: &mut Engine) -> io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut buf = vec![0u8; RECV_BUFFER_LEN];

    loop {
        tokio::select! {
            _ = sigterm.recv() => break,
            _ = sigint.recv() => break,
            _ = sigquit.recv() => break,
            received = link.recv(&mut buf) => {
                let len = match received {
                    Ok(len) => len,
                    Err(err) => {
                        warn!(%err, "receive failed");
                        continue;
                    }
                };
                trace!("received frame of {len} bytes\n{}", hex_dump(&buf[..len]));

                let Some(reply) = engine.handle_frame(&buf[..len]) else {
                    debug!("frame dropped");
                    continue;
                };
                trace!("sending reply of {} bytes\n{}", reply.len(), hex_dump(reply));
                if let Err(err) = link.send(reply) {
                    warn!(%err, "send failed");
                }
            }
        }
    }

    info!("terminating");
    Ok(())
}

/// Renders a frame as 16-byte lines of hex and ASCII, for trace logs.
fn hex_dump(frame: &[u8]) -> String {
    const WIDTH: usize = 16;
    let mut out = String::new();
    for line in frame.chunks(WIDTH) {
        for (i, byte) in line.iter().enumerate() {
            if i == WIDTH / 2 {
                out.push(' ');
            }
            out.push_str(&format!(" {byte:02X}"));
        }
        for i in line.len()..WIDTH {
            if i == WIDTH / 2 {
                out.push(' ');
            }
            out.push_str("   ");
        }
        out.push_str(" | ");
        for (i, byte) in line.iter().enumerate() {
            if i == WIDTH / 2 {
                out.push(' ');
            }
            out.push(if (b' '..=b'~').contains(byte) { *byte as char } else { '.' });
        }
        out.push('\n');
    }
    out
}
