//! The link driver: one Ethernet frame in, one Ethernet frame out.
//!
//! The engine only sees the [`Link`] trait; the production implementation is
//! a raw `AF_PACKET` socket bound to one interface in promiscuous mode,
//! filtered to the EtherDFS ethertype and kept non-blocking so the receive
//! loop stays interruptible.

use std::io;
use std::os::fd::{AsRawFd, OwnedFd};

use async_trait::async_trait;
use tokio::io::unix::AsyncFd;

use crate::proto::ETHERTYPE_DFS;

/// Frame-level transport used by the server loop.
#[async_trait]
pub trait Link {
    /// The local hardware address frames are filtered against.
    fn mac(&self) -> [u8; 6];

    /// Waits for one frame and copies it into `buf`.
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Puts one frame on the wire.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// A non-blocking raw packet socket driven by the tokio reactor.
#[derive(Debug)]
pub struct PacketSocket {
    fd: AsyncFd<OwnedFd>,
    mac: [u8; 6],
}

impl PacketSocket {
    /// Wraps an already bound and non-blocking raw socket. Must be called
    /// inside a tokio runtime.
    pub fn new(fd: OwnedFd, mac: [u8; 6]) -> io::Result<Self> {
        Ok(Self { fd: AsyncFd::new(fd)?, mac })
    }
}

#[async_trait]
impl Link for PacketSocket {
    fn mac(&self) -> [u8; 6] {
        self.mac
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.fd.readable().await?;
            let received = guard.try_io(|inner| {
                let n = unsafe {
                    libc::recv(inner.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len(), 0)
                };
                if n < 0 {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(n as usize)
                }
            });
            match received {
                Ok(result) => return result,
                Err(_would_block) => continue,
            }
        }
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let n = unsafe {
            libc::send(self.fd.get_ref().as_raw_fd(), frame.as_ptr().cast(), frame.len(), 0)
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Opens a raw socket on `interface`: ethertype-filtered, promiscuous,
/// bound and non-blocking. Returns the socket and the interface's MAC.
/// Requires CAP_NET_RAW (or root).
#[cfg(target_os = "linux")]
pub fn open_raw(interface: &str) -> io::Result<(OwnedFd, [u8; 6])> {
    use std::os::fd::FromRawFd;

    if interface.is_empty() || interface.len() >= libc::IFNAMSIZ {
        return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }

    let protocol = libc::c_int::from(ETHERTYPE_DFS.to_be());
    let raw = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, protocol) };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    let mut ifr = named_ifreq(interface);
    ioctl(&fd, libc::SIOCGIFINDEX, &mut ifr)?;
    let ifindex = unsafe { ifr.ifr_ifru.ifru_ifindex };

    let mut ifr = named_ifreq(interface);
    ioctl(&fd, libc::SIOCGIFFLAGS, &mut ifr)?;
    unsafe { ifr.ifr_ifru.ifru_flags |= libc::IFF_PROMISC as libc::c_short };
    ioctl(&fd, libc::SIOCSIFFLAGS, &mut ifr)?;

    let mut ifr = named_ifreq(interface);
    ioctl(&fd, libc::SIOCGIFHWADDR, &mut ifr)?;
    let mut mac = [0u8; 6];
    for (dst, src) in mac.iter_mut().zip(unsafe { ifr.ifr_ifru.ifru_hwaddr.sa_data }.iter()) {
        *dst = *src as u8;
    }

    let mut addr: libc::sockaddr_ll = unsafe { std::mem::zeroed() };
    addr.sll_family = libc::AF_PACKET as libc::c_ushort;
    addr.sll_protocol = ETHERTYPE_DFS.to_be();
    addr.sll_ifindex = ifindex;
    addr.sll_pkttype = (libc::PACKET_HOST | libc::PACKET_BROADCAST) as libc::c_uchar;
    addr.sll_halen = 6;
    addr.sll_addr[..6].copy_from_slice(&mac);
    let res = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            std::ptr::addr_of!(addr).cast(),
            std::mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
        )
    };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }

    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok((fd, mac))
}

/// Raw packet sockets are only wired up for Linux hosts.
#[cfg(not(target_os = "linux"))]
pub fn open_raw(_interface: &str) -> io::Result<(OwnedFd, [u8; 6])> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

#[cfg(target_os = "linux")]
fn named_ifreq(interface: &str) -> libc::ifreq {
    let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in ifr.ifr_name.iter_mut().zip(interface.as_bytes().iter()) {
        *dst = *src as libc::c_char;
    }
    ifr
}

#[cfg(target_os = "linux")]
fn ioctl(fd: &OwnedFd, request: libc::c_ulong, ifr: &mut libc::ifreq) -> io::Result<()> {
    if unsafe { libc::ioctl(fd.as_raw_fd(), request, ifr) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
