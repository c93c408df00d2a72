// src/data/iprange.rs

//! Implements an [`IpRangeTable`], a lookup of IP address to a label, e.g.
//! the name of the client organization that owns the address block.
//!
//! The table is read from text lines of the form
//!
//! ```text
//! 203.0.113.0/24 some-isp
//! 198.51.100.10-198.51.100.20 other isp
//! 2001:db8::/32 v6-customer
//! ```
//!
//! The first whitespace-separated token is a CIDR block or an inclusive
//! `start-end` range, the last token is the label. Blank lines and lines
//! starting with `#` are ignored. Lines that do not parse are skipped and
//! counted.
//!
//! [`IpRangeTable`]: crate::data::iprange::IpRangeTable

use crate::common::{err_from_err_path, Count, FPath, File};
use crate::readers::helpers::fpath_to_path;

use std::io::{BufRead, BufReader, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use ::rangemap::RangeInclusiveMap;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Label printed for an address that is in no range.
pub const LABEL_UNKNOWN: &str = "unknown";

/// A parsed range of addresses, either family.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IpRange {
    V4(RangeInclusive<u32>),
    V6(RangeInclusive<u128>),
}

impl FromStr for IpRange {
    type Err = String;

    /// Parse a CIDR block `addr/prefix` or an inclusive range `start-end`.
    fn from_str(s: &str) -> std::result::Result<IpRange, String> {
        if let Some((addr_s, prefix_s)) = s.split_once('/') {
            let addr: IpAddr = addr_s
                .parse()
                .map_err(|err| format!("bad address {:?} in {:?}; {}", addr_s, s, err))?;
            let prefix: u32 = prefix_s
                .parse()
                .map_err(|err| format!("bad prefix length {:?} in {:?}; {}", prefix_s, s, err))?;
            return match addr {
                IpAddr::V4(addr4) => {
                    if prefix > u32::BITS {
                        return Err(format!("prefix length {} too long in {:?}", prefix, s));
                    }
                    let mask: u32 = u32::MAX.checked_shl(u32::BITS - prefix).unwrap_or(0);
                    let start: u32 = u32::from(addr4) & mask;
                    Ok(IpRange::V4(start..=(start | !mask)))
                }
                IpAddr::V6(addr6) => {
                    if prefix > u128::BITS {
                        return Err(format!("prefix length {} too long in {:?}", prefix, s));
                    }
                    let mask: u128 = u128::MAX.checked_shl(u128::BITS - prefix).unwrap_or(0);
                    let start: u128 = u128::from(addr6) & mask;
                    Ok(IpRange::V6(start..=(start | !mask)))
                }
            };
        }
        if let Some((start_s, end_s)) = s.split_once('-') {
            let start: IpAddr = start_s
                .trim()
                .parse()
                .map_err(|err| format!("bad start address {:?} in {:?}; {}", start_s, s, err))?;
            let end: IpAddr = end_s
                .trim()
                .parse()
                .map_err(|err| format!("bad end address {:?} in {:?}; {}", end_s, s, err))?;
            return match (start, end) {
                (IpAddr::V4(start4), IpAddr::V4(end4)) if start4 <= end4 => {
                    Ok(IpRange::V4(u32::from(start4)..=u32::from(end4)))
                }
                (IpAddr::V6(start6), IpAddr::V6(end6)) if start6 <= end6 => {
                    Ok(IpRange::V6(u128::from(start6)..=u128::from(end6)))
                }
                _ => Err(format!("start must not be after end and both the same family in {:?}", s)),
            };
        }

        Err(format!("not a CIDR block or start-end range {:?}", s))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IpRangeTable
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Labeled IP address ranges. Where ranges overlap, the range inserted last
/// wins for the overlapping addresses.
#[derive(Clone, Debug, Default)]
pub struct IpRangeTable {
    v4: RangeInclusiveMap<u32, String>,
    v6: RangeInclusiveMap<u128, String>,
    /// count of lines inserted
    pub lines_ok: Count,
    /// count of lines skipped because they did not parse
    pub lines_skipped: Count,
}

impl IpRangeTable {
    pub fn new() -> IpRangeTable {
        IpRangeTable::default()
    }

    /// Label all addresses of `range` with `label`.
    pub fn insert(&mut self, range: IpRange, label: &str) {
        match range {
            IpRange::V4(range4) => self.v4.insert(range4, String::from(label)),
            IpRange::V6(range6) => self.v6.insert(range6, String::from(label)),
        }
    }

    /// Parse one text line and insert it. Returns `false` if the line was not
    /// a range line.
    pub fn insert_line(&mut self, line: &str) -> bool {
        let line: &str = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return false;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            defñ!("skip, no label {:?}", line);
            self.lines_skipped += 1;
            return false;
        }
        match IpRange::from_str(tokens[0]) {
            Ok(range) => {
                self.insert(range, tokens[tokens.len() - 1]);
                self.lines_ok += 1;
                true
            }
            Err(_err) => {
                defñ!("skip {:?}; {}", line, _err);
                self.lines_skipped += 1;
                false
            }
        }
    }

    /// Read a table from lines of `reader`.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<IpRangeTable> {
        let mut table = IpRangeTable::new();
        for line in reader.lines() {
            table.insert_line(&line?);
        }

        Ok(table)
    }

    /// Read a table from the file at `path`.
    pub fn from_path(path: &FPath) -> Result<IpRangeTable> {
        defn!("({:?})", path);
        let file: File = File::open(fpath_to_path(path))
            .map_err(|err| err_from_err_path(&err, path, Some("open failed")))?;
        let table = IpRangeTable::from_reader(BufReader::new(file))
            .map_err(|err| err_from_err_path(&err, path, Some("read failed")))?;
        defx!("lines_ok {}, lines_skipped {}", table.lines_ok, table.lines_skipped);

        Ok(table)
    }

    /// Label of the range containing `addr`. IPv4-mapped IPv6 addresses
    /// (`::ffff:a.b.c.d`) are also checked against the IPv4 ranges.
    pub fn lookup_addr(&self, addr: &IpAddr) -> Option<&str> {
        match addr {
            IpAddr::V4(addr4) => self.lookup_v4(addr4),
            IpAddr::V6(addr6) => match self.v6.get(&u128::from(*addr6)) {
                Some(label) => Some(label.as_str()),
                None => match addr6.to_ipv4_mapped() {
                    Some(addr4) => self.lookup_v4(&addr4),
                    None => None,
                },
            },
        }
    }

    fn lookup_v4(&self, addr4: &Ipv4Addr) -> Option<&str> {
        self.v4
            .get(&u32::from(*addr4))
            .map(|label| label.as_str())
    }

    /// Label of the range containing the address written in `addr`.
    /// Returns `None` if `addr` is not an address.
    pub fn lookup(&self, addr: &str) -> Option<&str> {
        match addr.trim().parse::<IpAddr>() {
            Ok(addr_) => self.lookup_addr(&addr_),
            Err(_) => None,
        }
    }

    /// Is the address written in `addr` within any range?
    pub fn contains(&self, addr: &str) -> bool {
        self.lookup(addr).is_some()
    }

    /// Label of `addr` or [`LABEL_UNKNOWN`].
    pub fn label_or_unknown(&self, addr: &str) -> &str {
        self.lookup(addr).unwrap_or(LABEL_UNKNOWN)
    }

    pub fn is_empty(&self) -> bool {
        self.v4.iter().next().is_none() && self.v6.iter().next().is_none()
    }
}
