//! Common regex patterns for DARF line matching.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Brazilian amounts: "." groups thousands, "," separates two decimals
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"[0-9]{1,3}(?:\.[0-9]{3})*,[0-9]{2}"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
