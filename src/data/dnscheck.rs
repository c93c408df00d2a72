// src/data/dnscheck.rs

//! Send resolving servers one DNS query each and keep the response code,
//! for the `--dig` column of a report.
//!
//! A check is one `A` query for a fixed name sent over UDP, with no retries.
//! A server that does not answer before the timeout, or an address that
//! cannot be queried at all, gets the status [`NO_RESPONSE`].
//!
//! ```text
//! 12 198.51.100.7 NOERROR isp-a
//! 9 198.51.100.9 REFUSED unknown
//! 4 203.0.113.1 NORESPONSE unknown
//! ```

use crate::debug::printers::e_err;

use std::collections::{HashMap, HashSet};
use std::io::{Error, ErrorKind, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use ::crossbeam_channel;
use ::domain::base::{Message, MessageBuilder, Name, Rtype};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Name queried when none is configured.
pub const QNAME_DEFAULT: &str = "www.qq.com";
pub const PORT_DEFAULT: u16 = 53;
pub const TIMEOUT_DEFAULT: Duration = Duration::from_secs(2);
/// Status of a server that did not answer.
pub const NO_RESPONSE: &str = "NORESPONSE";
/// Responses longer than this are truncated; only the header and question
/// are read.
const RECV_BUFFER_SZ: usize = 1232;

/// Status of each checked address, keyed by address.
pub type DnsStatuses = HashMap<String, String>;

/// The response code of `response` if it is a response to `query`.
pub fn response_rcode(query: &Message<Vec<u8>>, response: Vec<u8>) -> Result<String> {
    let response: Message<Vec<u8>> = match Message::from_octets(response) {
        Ok(val) => val,
        Err(_err) => {
            return Err(Error::new(ErrorKind::InvalidData, "datagram is shorter than a DNS header"));
        }
    };
    if !response.is_answer(query) {
        return Err(Error::new(ErrorKind::InvalidData, "datagram is not a response to the query"));
    }

    Ok(response.header().rcode().to_string())
}

/// Sends `A` queries for one name to resolving servers.
#[derive(Clone, Debug)]
pub struct DnsChecker {
    qname: Name<Vec<u8>>,
    port: u16,
    timeout: Duration,
    /// count of querying threads for [`DnsChecker::check_all`]
    workers: usize,
}

impl DnsChecker {
    /// Returns `Err` if `qname` is not a domain name or `timeout` is zero.
    /// A `workers` count of `0` is raised to `1`.
    pub fn new(qname: &str, port: u16, timeout: Duration, workers: usize) -> Result<DnsChecker> {
        let qname_: Name<Vec<u8>> = match Name::from_str(qname) {
            Ok(val) => val,
            Err(err) => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("query name {:?} is not a domain name; {}", qname, err),
                ));
            }
        };
        if timeout.is_zero() {
            return Err(Error::new(ErrorKind::InvalidInput, "query timeout must be more than zero"));
        }

        Ok(DnsChecker {
            qname: qname_,
            port,
            timeout,
            workers: std::cmp::max(workers, 1),
        })
    }

    /// A new recursive `A` query for the configured name with a random ID.
    pub fn build_query(&self) -> Result<Message<Vec<u8>>> {
        let mut builder = MessageBuilder::new_vec();
        builder.header_mut().set_rd(true);
        builder.header_mut().set_random_id();
        let mut question = builder.question();
        if let Err(err) = question.push((self.qname.clone(), Rtype::A)) {
            return Err(Error::new(ErrorKind::InvalidInput, format!("failed to compose query; {}", err)));
        }

        Ok(question.into_message())
    }

    /// Send one query to `resolver` and wait for its response code.
    ///
    /// Datagrams that are not a response to the query are ignored until the
    /// timeout.
    pub fn check(&self, resolver: &str) -> Result<String> {
        defn!("({:?})", resolver);
        let ip: IpAddr = match IpAddr::from_str(resolver) {
            Ok(val) => val,
            Err(err) => {
                defx!("not an IP address");
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("{:?} is not an IP address; {}", resolver, err),
                ));
            }
        };
        let bind: SocketAddr = match ip {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind)?;
        socket.connect(SocketAddr::new(ip, self.port))?;
        let query: Message<Vec<u8>> = self.build_query()?;
        socket.send(query.as_slice())?;

        let deadline: Instant = Instant::now() + self.timeout;
        let mut buffer = [0u8; RECV_BUFFER_SZ];
        loop {
            let remaining: Duration = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                defx!("timed out");
                return Err(Error::new(ErrorKind::TimedOut, format!("no response from {}", ip)));
            }
            socket.set_read_timeout(Some(remaining))?;
            let len: usize = socket.recv(&mut buffer)?;
            match response_rcode(&query, buffer[..len].to_vec()) {
                Ok(rcode) => {
                    defx!("{:?}", rcode);
                    return Ok(rcode);
                }
                Err(_err) => {
                    defo!("ignore datagram of {} bytes; {}", len, _err);
                }
            }
        }
    }

    /// The response code of `resolver`, or [`NO_RESPONSE`].
    pub fn status(&self, resolver: &str) -> String {
        match self.check(resolver) {
            Ok(rcode) => rcode,
            Err(_err) => {
                defñ!("{:?} {}", resolver, _err);
                String::from(NO_RESPONSE)
            }
        }
    }

    /// Check each distinct address of `resolvers` once, from up to `workers`
    /// threads at a time.
    ///
    /// Every distinct address has an entry in the returned map.
    pub fn check_all(&self, resolvers: &[&str]) -> DnsStatuses {
        defn!("({} addresses)", resolvers.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(resolvers.len());
        let (chan_send, chan_recv) = crossbeam_channel::unbounded::<String>();
        let mut statuses = DnsStatuses::with_capacity(resolvers.len());
        for resolver in resolvers.iter() {
            if !seen.insert(*resolver) {
                continue;
            }
            statuses.insert(String::from(*resolver), String::from(NO_RESPONSE));
            // the receiver is held here so sending cannot fail
            if chan_send.send(String::from(*resolver)).is_err() {
                break;
            }
        }
        drop(chan_send);
        let workers: usize = std::cmp::max(std::cmp::min(self.workers, seen.len()), 1);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for worker_id in 0..workers {
                let chan_recv_ = chan_recv.clone();
                let tname: String = format!("dig-{}", worker_id);
                match thread::Builder::new()
                    .name(tname.clone())
                    .spawn_scoped(scope, move || {
                        chan_recv_
                            .iter()
                            .map(|resolver| {
                                let status: String = self.status(&resolver);
                                (resolver, status)
                            })
                            .collect::<Vec<(String, String)>>()
                    }) {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        e_err!("thread.name({:?}).spawn() failed {:?}", tname, err);
                    }
                }
            }
            for handle in handles.into_iter() {
                match handle.join() {
                    Ok(results) => statuses.extend(results),
                    Err(_err) => {
                        e_err!("dig thread panicked");
                    }
                }
            }
        });
        defx!("{} statuses", statuses.len());

        statuses
    }
}
