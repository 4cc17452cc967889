use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Issues human-readable reservation codes of the form `PREFIX-<suffix>`.
///
/// The suffix is the upper-case base-36 form of the creation time in
/// milliseconds. Suffixes are strictly increasing within one generator even
/// when several codes are issued in the same millisecond.
#[derive(Debug)]
pub struct ReservationCodeGenerator {
    prefix: String,
    last: AtomicU64,
}

impl ReservationCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim().to_uppercase(),
            last: AtomicU64::new(0),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_code(&self) -> String {
        self.next_code_at(Utc::now())
    }

    pub fn next_code_at(&self, now: DateTime<Utc>) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        let mut previous = self.last.load(Ordering::Relaxed);
        let value = loop {
            let candidate = millis.max(previous + 1);
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(current) => previous = current,
            }
        };

        format!("{}-{}", self.prefix, to_base36(value))
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
