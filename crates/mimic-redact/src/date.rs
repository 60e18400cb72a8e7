//! Date redaction
//!
//! A date is moved to a new instant on the same side of "now", with jitter
//! that shrinks relative to the distance: instants within a minute move by up
//! to half an hour, far-away instants are scaled by 0.8-1.8x. Shifts past
//! year 1 or year 9999 stop at that bound. The result is written back with
//! the template of the input (field order, separator, time part, fractional
//! digits and `Z` suffix).

use lazy_static::lazy_static;
use rand::Rng;
use regex::{Captures, Regex};
use time::macros::datetime;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

lazy_static! {
    static ref YEAR_FIRST: Regex = Regex::new(
        r"^(\d{4})([-/.])(\d{2})[-/.](\d{2})(?:T(\d{2}):(\d{2}):(\d{2})(?:\.(\d+))?(Z)?)?$"
    )
    .unwrap();
    static ref DAY_FIRST: Regex = Regex::new(r"^(\d{2})([-/.])(\d{2})[-/.](\d{4})$").unwrap();
}

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;
const YEAR_MS: f64 = 365.0 * DAY_MS;
const MIN_OFFSET_MS: f64 = 5.0 * SECOND_MS;

/// Four-digit year templates cover 0001 through 9999.
const EARLIEST: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);
const LATEST: OffsetDateTime = datetime!(9999-12-31 23:59:59.999999999 UTC);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    YearFirst,
    DayFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeTemplate {
    fraction_digits: usize,
    zulu: bool,
}

/// Layout of the original value, reused when formatting the fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateTemplate {
    order: FieldOrder,
    separator: char,
    time: Option<TimeTemplate>,
}

pub fn is_date(value: &str) -> bool {
    YEAR_FIRST.is_match(value) || DAY_FIRST.is_match(value)
}

/// Redact a date-shaped value; `None` if `value` does not look like a date.
pub fn redact_date(value: &str) -> Option<String> {
    redact_date_at(value, OffsetDateTime::now_utc())
}

fn redact_date_at(value: &str, now: OffsetDateTime) -> Option<String> {
    let (template, parsed) = parse(value)?;
    let mut rng = rand::thread_rng();

    let target = match parsed {
        Some(instant) => shift(instant, now, &mut rng),
        None => random_calendar_instant(&mut rng),
    };

    Some(render(&template, target))
}

fn parse(value: &str) -> Option<(DateTemplate, Option<OffsetDateTime>)> {
    if let Some(caps) = YEAR_FIRST.captures(value) {
        let time = caps.get(5).map(|_| TimeTemplate {
            fraction_digits: caps.get(8).map_or(0, |m| m.as_str().len()),
            zulu: caps.get(9).is_some(),
        });
        let template = DateTemplate {
            order: FieldOrder::YearFirst,
            separator: separator(&caps),
            time,
        };
        let instant = build_instant(
            number(&caps, 1),
            number(&caps, 3),
            number(&caps, 4),
            &caps,
        );
        return Some((template, instant));
    }

    let caps = DAY_FIRST.captures(value)?;
    let template = DateTemplate {
        order: FieldOrder::DayFirst,
        separator: separator(&caps),
        time: None,
    };
    let (day, month, year) = (number(&caps, 1), number(&caps, 3), number(&caps, 4));
    // Fall back to month-first when the day-first reading is not a real date.
    let instant =
        build_instant(year, month, day, &caps).or_else(|| build_instant(year, day, month, &caps));
    Some((template, instant))
}

fn separator(caps: &Captures<'_>) -> char {
    caps.get(2)
        .and_then(|m| m.as_str().chars().next())
        .unwrap_or('-')
}

fn number(caps: &Captures<'_>, index: usize) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn build_instant(year: u32, month: u32, day: u32, caps: &Captures<'_>) -> Option<OffsetDateTime> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    let date = Date::from_calendar_date(i32::try_from(year).ok()?, month, u8::try_from(day).ok()?).ok()?;

    // Only year-first captures carry a time part (groups 5-8).
    let time = if caps.get(5).is_some() {
        let nanos = caps.get(8).map_or(0, |m| fraction_to_nanos(m.as_str()));
        Time::from_hms_nano(
            u8::try_from(number(caps, 5)).ok()?,
            u8::try_from(number(caps, 6)).ok()?,
            u8::try_from(number(caps, 7)).ok()?,
            nanos,
        )
        .ok()?
    } else {
        Time::MIDNIGHT
    };

    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

fn fraction_to_nanos(digits: &str) -> u32 {
    let mut padded: String = digits.chars().take(9).collect();
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn shift<R: Rng + ?Sized>(
    instant: OffsetDateTime,
    now: OffsetDateTime,
    rng: &mut R,
) -> OffsetDateTime {
    let diff = (instant - now).whole_milliseconds() as f64;
    let magnitude = diff.abs();

    let shifted = if magnitude < MINUTE_MS {
        diff + (rng.r#gen::<f64>() - 0.5) * HOUR_MS
    } else {
        let (low, span) = if magnitude < HOUR_MS {
            (0.5, 0.8)
        } else if magnitude < DAY_MS {
            (0.6, 0.6)
        } else if magnitude < YEAR_MS {
            (0.7, 0.8)
        } else {
            (0.8, 1.0)
        };
        diff * (low + rng.r#gen::<f64>() * span)
    };

    let future = diff >= 0.0;
    let signed = if future {
        shifted.max(MIN_OFFSET_MS)
    } else {
        shifted.min(-MIN_OFFSET_MS)
    };

    let bound = if future { LATEST } else { EARLIEST };
    now.checked_add(Duration::milliseconds(signed as i64))
        .map_or(bound, |target| target.clamp(EARLIEST, LATEST))
}

fn random_calendar_instant<R: Rng + ?Sized>(rng: &mut R) -> OffsetDateTime {
    let year = rng.gen_range(1980..2040);
    let month = Month::try_from(rng.gen_range(1..=12u8)).unwrap_or(Month::January);
    let date = Date::from_calendar_date(year, month, rng.gen_range(1..=month.length(year)))
        .unwrap_or(Date::MIN);
    let time = Time::from_hms(rng.gen_range(0..24), rng.gen_range(0..60), rng.gen_range(0..60))
        .unwrap_or(Time::MIDNIGHT);
    PrimitiveDateTime::new(date, time).assume_utc()
}

fn render(template: &DateTemplate, instant: OffsetDateTime) -> String {
    let sep = template.separator;
    let (year, month, day) = (instant.year(), u8::from(instant.month()), instant.day());

    let mut out = match template.order {
        FieldOrder::YearFirst => format!("{year:04}{sep}{month:02}{sep}{day:02}"),
        FieldOrder::DayFirst => format!("{day:02}{sep}{month:02}{sep}{year:04}"),
    };

    if let Some(time) = template.time {
        out.push_str(&format!(
            "T{:02}:{:02}:{:02}",
            instant.hour(),
            instant.minute(),
            instant.second()
        ));
        if time.fraction_digits > 0 {
            let nanos = format!("{:09}", instant.nanosecond());
            let mut fraction: String = nanos.chars().take(time.fraction_digits).collect();
            while fraction.len() < time.fraction_digits {
                fraction.push('0');
            }
            out.push('.');
            out.push_str(&fraction);
        }
        if time.zulu {
            out.push('Z');
        }
    }

    out
}
