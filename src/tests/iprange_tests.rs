// src/tests/iprange_tests.rs

//! tests for `iprange.rs`

use crate::data::iprange::{IpRange, IpRangeTable, LABEL_UNKNOWN};
use crate::debug::helpers::{create_temp_file_bytes_with_suffix, ntf_fpath};

use std::io::Cursor;
use std::str::FromStr;

use ::test_case::test_case;

const RANGES: &str = "\
# client address blocks
203.0.113.0/24 isp-a
198.51.100.10-198.51.100.20 isp b

2001:db8::/32 v6-customer
10.0.0.0/8 private
10.1.0.0/16 private-lab
not-a-range label
192.0.2.0/33 bad-prefix
lonely
";

fn table() -> IpRangeTable {
    IpRangeTable::from_reader(Cursor::new(RANGES)).unwrap()
}

#[test_case("10.0.0.0/8", IpRange::V4(0x0A00_0000..=0x0AFF_FFFF); "v4 cidr")]
#[test_case("10.1.2.3/8", IpRange::V4(0x0A00_0000..=0x0AFF_FFFF); "v4 cidr host bits")]
#[test_case("192.0.2.1/32", IpRange::V4(0xC000_0201..=0xC000_0201); "v4 single")]
#[test_case("0.0.0.0/0", IpRange::V4(0..=u32::MAX); "v4 all")]
#[test_case("10.0.0.5-10.0.0.9", IpRange::V4(0x0A00_0005..=0x0A00_0009); "v4 start end")]
#[test_case("::/0", IpRange::V6(0..=u128::MAX); "v6 all")]
#[test_case("::1-::3", IpRange::V6(1..=3); "v6 start end")]
fn test_iprange_from_str_ok(s: &str, expect: IpRange) {
    assert_eq!(IpRange::from_str(s).unwrap(), expect);
}

#[test_case(""; "empty")]
#[test_case("10.0.0.0"; "no prefix")]
#[test_case("10.0.0.0/33"; "v4 prefix too long")]
#[test_case("::/129"; "v6 prefix too long")]
#[test_case("10.0.0.0/x"; "bad prefix")]
#[test_case("10.0.0.300/8"; "bad address")]
#[test_case("10.0.0.9-10.0.0.5"; "start after end")]
#[test_case("10.0.0.1-::1"; "mixed family")]
fn test_iprange_from_str_err(s: &str) {
    assert!(IpRange::from_str(s).is_err());
}

#[test]
fn test_from_reader_counts() {
    let table = table();
    assert_eq!(table.lines_ok, 5);
    // `not-a-range`, `/33`, `lonely`
    assert_eq!(table.lines_skipped, 3);
    assert!(!table.is_empty());
}

#[test_case("203.0.113.7", Some("isp-a"))]
#[test_case("198.51.100.10", Some("b"); "range start, last token is label")]
#[test_case("198.51.100.20", Some("b"); "range end")]
#[test_case("198.51.100.21", None; "after range end")]
#[test_case("2001:db8::53", Some("v6-customer"))]
#[test_case("2001:db9::53", None; "v6 outside")]
#[test_case("10.2.3.4", Some("private"))]
#[test_case("10.1.3.4", Some("private-lab"); "later overlapping range wins")]
#[test_case("::ffff:203.0.113.9", Some("isp-a"); "v4 mapped v6")]
#[test_case(" 203.0.113.9 ", Some("isp-a"); "whitespace trimmed")]
#[test_case("192.0.2.1", None; "no range")]
#[test_case("resolver-a", None; "not an address")]
#[test_case("", None; "empty")]
fn test_lookup(addr: &str, expect: Option<&str>) {
    let table = table();
    assert_eq!(table.lookup(addr), expect);
    assert_eq!(table.contains(addr), expect.is_some());
    assert_eq!(table.label_or_unknown(addr), expect.unwrap_or(LABEL_UNKNOWN));
}

#[test]
fn test_insert_line_ignores_comments_and_blanks() {
    let mut table = IpRangeTable::new();
    assert!(table.is_empty());
    assert!(!table.insert_line(""));
    assert!(!table.insert_line("   "));
    assert!(!table.insert_line("# 10.0.0.0/8 comment"));
    assert_eq!(table.lines_ok, 0);
    assert_eq!(table.lines_skipped, 0);
    assert!(table.insert_line("  10.0.0.0/8   lab  "));
    assert_eq!(table.lookup("10.9.9.9"), Some("lab"));
}

#[test]
fn test_from_path() {
    let ntf = create_temp_file_bytes_with_suffix(RANGES.as_bytes(), ".txt");
    let table = IpRangeTable::from_path(&ntf_fpath(&ntf)).unwrap();
    assert_eq!(table.lines_ok, 5);
    assert_eq!(table.lookup("203.0.113.1"), Some("isp-a"));
}

#[test]
fn test_from_path_missing() {
    let fpath = String::from("/this/path/does/not/exist/ranges.txt");
    let err = IpRangeTable::from_path(&fpath).unwrap_err();
    assert!(err.to_string().contains(fpath.as_str()), "{}", err);
}
